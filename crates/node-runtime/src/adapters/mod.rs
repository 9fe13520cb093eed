//! # Adapters
//!
//! Implementations of the ports the subsystems and the node depend on.

pub mod checkpoint_reset;
pub mod transport;

pub use checkpoint_reset::CheckpointResetObserver;
pub use transport::{Destination, InMemoryTransport, Transport};
