//! Domain layer for the Checkpoint Store.

pub mod checkpoint;
pub mod votes;
pub mod watermarks;

pub use checkpoint::{Checkpoint, CheckpointKey};
pub use votes::{DigestTally, DuplicateVote};
pub use watermarks::WatermarkWindow;
