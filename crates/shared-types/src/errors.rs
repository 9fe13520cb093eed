//! # Error Types
//!
//! Error taxonomy shared by every subsystem. Each subsystem owns its own
//! error enum and classifies its variants with [`ErrorKind`].

use crate::entities::InstanceId;
use thiserror::Error;

/// How the node should treat a subsystem error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input violated a stated invariant. Logged, possibly counted, ignored.
    Rejected,
    /// A catch-up session failed. Recoverable by starting a new session.
    Aborted,
    /// Local state would break an invariant. Reported upward; the node
    /// decides whether to halt.
    InvariantViolation,
}

/// Implemented by every subsystem error enum.
pub trait Classify {
    /// Classification of this error.
    fn kind(&self) -> ErrorKind;

    /// Short, stable label for logs and metrics.
    fn label(&self) -> &'static str;

    /// Whether the error is a plain rejection of input.
    fn is_rejection(&self) -> bool {
        self.kind() == ErrorKind::Rejected
    }
}

/// Errors raised by bounds-checked per-instance tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// Instance id outside the configured instance count.
    #[error("Unknown instance {instance_id}: node runs {instance_count} instances")]
    UnknownInstance {
        instance_id: InstanceId,
        instance_count: usize,
    },
}

/// Look up per-instance state, rejecting ids beyond the configured count.
pub fn instance_slot<T>(slots: &[T], instance_id: InstanceId) -> Result<&T, InstanceError> {
    slots
        .get(instance_id.index())
        .ok_or(InstanceError::UnknownInstance {
            instance_id,
            instance_count: slots.len(),
        })
}
