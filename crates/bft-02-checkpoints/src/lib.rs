//! # bft-02-checkpoints
//!
//! Checkpoint Store: tracks checkpoint windows per consensus instance as
//! sequence numbers are ordered, tallies peer digest votes and moves the
//! watermarks when a window stabilizes.
//!
//! ## Watermarks
//!
//! ```text
//!        h                                   H = h + L
//!  ──────┼────────┬────────┬────────┬────────┼──────────
//!   pruned│ (h+1,F)│ (F+1,2F)│  ...  │        │ stashed votes
//! ```
//!
//! Windows end on multiples of the checkpoint frequency `F`. A window
//! becomes stable only when `2f+1` peers vote the same digest for the exact
//! same `(first_seq_no, last_seq_no)`; reaching its last sequence number
//! locally is not enough. Stabilization sets `h` to the window's end and
//! prunes every other checkpoint at or below it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bft_02_checkpoints::{CheckpointApi, CheckpointConfig, CheckpointStore};
//!
//! let store = CheckpointStore::new(CheckpointConfig::default(), quorums, suspicions)?;
//! let outcome = store.advance(InstanceId::MASTER, seq_no)?;
//! if outcome.completed {
//!     // broadcast own DigestVote for outcome.key
//! }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use config::CheckpointConfig;
pub use domain::{Checkpoint, CheckpointKey, DigestTally, WatermarkWindow};
pub use error::{CheckpointError, CheckpointResult};
pub use ports::inbound::{AdvanceOutcome, CheckpointApi, DigestVoteOutcome, StabilizedCheckpoint};
pub use service::CheckpointStore;
