//! Error types for primary selection

use shared_types::{Classify, ErrorKind, InstanceError, InstanceId, NodeName, ViewNo};
use thiserror::Error;

/// Primary Selector errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Instance id outside the configured range
    #[error(transparent)]
    Instance(#[from] InstanceError),

    /// Declaration for a view older than the current one
    #[error("Instance {instance_id}: declaration for stale view {view_no} (current {current})")]
    StaleView {
        instance_id: InstanceId,
        view_no: ViewNo,
        current: ViewNo,
    },

    /// Declaration too far beyond the current view to buffer
    #[error("Instance {instance_id}: view {view_no} is more than {max_ahead} views ahead of {current}")]
    ViewTooFarAhead {
        instance_id: InstanceId,
        view_no: ViewNo,
        current: ViewNo,
        max_ahead: u64,
    },

    /// Master candidate was the master primary of the previous view
    #[error("{candidate} was master primary in the previous view")]
    AntiRepeat { candidate: NodeName },

    /// Candidate not in the pool
    #[error("Unknown candidate {candidate}")]
    UnknownCandidate { candidate: NodeName },

    /// Sender already declared for this instance and view
    #[error("Instance {instance_id}: duplicate declaration from {sender} for view {view_no}")]
    DuplicateDeclaration {
        instance_id: InstanceId,
        sender: NodeName,
        view_no: ViewNo,
    },

    /// Primary already installed for this instance and view
    #[error("Instance {instance_id}: primary {primary} already decided for view {view_no}")]
    AlreadyDecided {
        instance_id: InstanceId,
        view_no: ViewNo,
        primary: NodeName,
    },

    /// View change to a view not greater than the current one
    #[error("View {requested} is not greater than current view {current}")]
    StaleViewChange { requested: ViewNo, current: ViewNo },

    /// Registry holds no nodes
    #[error("Node registry is empty")]
    EmptyRegistry,

    /// Configuration rejected at construction
    #[error("Invalid selector configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Classify for SelectionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyRegistry => ErrorKind::InvariantViolation,
            _ => ErrorKind::Rejected,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Instance(_) => "unknown_instance",
            Self::StaleView { .. } => "stale_view",
            Self::ViewTooFarAhead { .. } => "view_too_far_ahead",
            Self::AntiRepeat { .. } => "anti_repeat",
            Self::UnknownCandidate { .. } => "unknown_candidate",
            Self::DuplicateDeclaration { .. } => "duplicate_declaration",
            Self::AlreadyDecided { .. } => "already_decided",
            Self::StaleViewChange { .. } => "stale_view_change",
            Self::EmptyRegistry => "empty_registry",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }
}

/// Result type for selection operations
pub type SelectionResult<T> = Result<T, SelectionError>;
