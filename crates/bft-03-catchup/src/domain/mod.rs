//! Catch-up domain: Merkle trees and the session state machine

pub mod merkle;
pub mod session;

pub use merkle::{empty_root, leaf_hash, node_hash, verify_consistency, CompactMerkleTree, MerkleTree};
pub use session::{AbortReason, CatchupPhase, CatchupSession, CatchupTarget};
