//! Ports (hexagonal architecture)

pub mod inbound;

pub use inbound::{AdvanceOutcome, CheckpointApi, DigestVoteOutcome, StabilizedCheckpoint};
