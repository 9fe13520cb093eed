//! Error types for the Checkpoint Store

use shared_types::{Classify, ErrorKind, InstanceError, InstanceId, NodeName, SeqNo};
use thiserror::Error;

/// Checkpoint Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    /// Instance id outside the configured range
    #[error(transparent)]
    Instance(#[from] InstanceError),

    /// Sequence number at or below the low watermark
    #[error("Instance {instance_id}: seq_no {seq_no} is at or below low watermark {low}")]
    BelowLowWatermark {
        instance_id: InstanceId,
        seq_no: SeqNo,
        low: SeqNo,
    },

    /// Ordering beyond the high watermark (flow-control violation upstream)
    #[error("Instance {instance_id}: seq_no {seq_no} is beyond high watermark {high}")]
    BeyondHighWatermark {
        instance_id: InstanceId,
        seq_no: SeqNo,
        high: SeqNo,
    },

    /// Vote for a window whose bounds are reversed
    #[error("Malformed checkpoint window ({first_seq_no}, {last_seq_no})")]
    MalformedWindow {
        first_seq_no: SeqNo,
        last_seq_no: SeqNo,
    },

    /// Vote for a window that no replica could have produced
    #[error("Instance {instance_id}: checkpoint window ({first_seq_no}, {last_seq_no}) is not aligned to frequency {chk_freq}")]
    MisalignedWindow {
        instance_id: InstanceId,
        first_seq_no: SeqNo,
        last_seq_no: SeqNo,
        chk_freq: u64,
    },

    /// The window owning a sequence number ends past `SeqNo::MAX`
    #[error("Instance {instance_id}: no checkpoint window fits seq_no {seq_no}")]
    WindowOverflow { instance_id: InstanceId, seq_no: SeqNo },

    /// Vote for a window already covered by the low watermark
    #[error("Instance {instance_id}: checkpoint ending at {last_seq_no} is stale (h = {low})")]
    StaleCheckpoint {
        instance_id: InstanceId,
        last_seq_no: SeqNo,
        low: SeqNo,
    },

    /// Second vote from the same sender for the same window
    #[error("Instance {instance_id}: duplicate digest vote from {sender} for ({first_seq_no}, {last_seq_no})")]
    DuplicateDigestVote {
        instance_id: InstanceId,
        sender: NodeName,
        first_seq_no: SeqNo,
        last_seq_no: SeqNo,
    },

    /// Too many votes for windows beyond the high watermark
    #[error("Instance {instance_id}: vote stash full ({limit} votes)")]
    StashFull { instance_id: InstanceId, limit: usize },

    /// Attempt to move the low watermark backwards
    #[error("Instance {instance_id}: low watermark regression from {current} to {requested}")]
    WatermarkRegression {
        instance_id: InstanceId,
        current: SeqNo,
        requested: SeqNo,
    },

    /// Configuration rejected at construction
    #[error("Invalid checkpoint configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Classify for CheckpointError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::WatermarkRegression { .. } => ErrorKind::InvariantViolation,
            _ => ErrorKind::Rejected,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Instance(_) => "unknown_instance",
            Self::BelowLowWatermark { .. } => "below_low_watermark",
            Self::BeyondHighWatermark { .. } => "beyond_high_watermark",
            Self::MalformedWindow { .. } => "malformed_window",
            Self::MisalignedWindow { .. } => "misaligned_window",
            Self::WindowOverflow { .. } => "window_overflow",
            Self::StaleCheckpoint { .. } => "stale_checkpoint",
            Self::DuplicateDigestVote { .. } => "duplicate_digest_vote",
            Self::StashFull { .. } => "stash_full",
            Self::WatermarkRegression { .. } => "watermark_regression",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;
