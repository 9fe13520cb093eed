//! Errors surfaced by `ReplicaNode`

use bft_01_primary_selector::SelectionError;
use bft_02_checkpoints::CheckpointError;
use bft_03_catchup::CatchupError;
use shared_types::{Classify, ErrorKind};
use thiserror::Error;

/// Failure of one routed operation, tagged with the subsystem that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("primary selection: {0}")]
    Selection(#[from] SelectionError),

    #[error("checkpoints: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("catch-up: {0}")]
    Catchup(#[from] CatchupError),
}

impl Classify for NodeError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Selection(e) => e.kind(),
            Self::Checkpoint(e) => e.kind(),
            Self::Catchup(e) => e.kind(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Selection(e) => e.label(),
            Self::Checkpoint(e) => e.label(),
            Self::Catchup(e) => e.label(),
        }
    }
}

pub type NodeResult<T> = Result<T, NodeError>;
