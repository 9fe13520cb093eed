//! Error types for catch-up

use crate::domain::CatchupPhase;
use shared_types::{Classify, ErrorKind, InstanceError, InstanceId, NodeName, SeqNo};
use thiserror::Error;

/// Catch-up errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatchupError {
    /// Instance id outside the configured range
    #[error(transparent)]
    Instance(#[from] InstanceError),

    /// A session is already running for the instance
    #[error("Instance {instance_id}: catch-up already in progress ({phase})")]
    AlreadyCatchingUp {
        instance_id: InstanceId,
        phase: CatchupPhase,
    },

    /// No session is running for the instance
    #[error("Instance {instance_id}: no catch-up in progress")]
    NoSession { instance_id: InstanceId },

    /// Message does not belong to the session's current phase
    #[error("Instance {instance_id}: expected phase {expected}, session is {actual}")]
    UnexpectedPhase {
        instance_id: InstanceId,
        expected: CatchupPhase,
        actual: CatchupPhase,
    },

    /// Proof starts from a ledger size other than ours
    #[error("Instance {instance_id}: proof starts at {got}, local ledger size is {expected}")]
    StaleProof {
        instance_id: InstanceId,
        expected: SeqNo,
        got: SeqNo,
    },

    /// Proof's old root does not match the local ledger
    #[error("Instance {instance_id}: proof old root does not match local root at {start_seq_no}")]
    RootMismatch {
        instance_id: InstanceId,
        start_seq_no: SeqNo,
    },

    /// Merkle consistency check failed
    #[error("Instance {instance_id}: inconsistent proof from {sender} ({start_seq_no} -> {end_seq_no})")]
    InconsistentProof {
        instance_id: InstanceId,
        sender: NodeName,
        start_seq_no: SeqNo,
        end_seq_no: SeqNo,
    },

    /// Sender already supplied a proof for this session
    #[error("Instance {instance_id}: duplicate consistency proof from {sender}")]
    DuplicateProof {
        instance_id: InstanceId,
        sender: NodeName,
    },

    /// Requested proof starts beyond the local ledger
    #[error("Instance {instance_id}: proof requested from {start_seq_no}, ledger size is {ledger_size}")]
    ProofStartBeyondLedger {
        instance_id: InstanceId,
        start_seq_no: SeqNo,
        ledger_size: SeqNo,
    },

    /// Catch-up request the local ledger cannot serve
    #[error("Instance {instance_id}: cannot serve catch-up request: {reason}")]
    InvalidCatchupRequest {
        instance_id: InstanceId,
        reason: String,
    },

    /// Batch does not start right after the collected prefix
    #[error("Instance {instance_id}: batch starts at {got}, expected {expected}")]
    NonContiguousBatch {
        instance_id: InstanceId,
        expected: SeqNo,
        got: SeqNo,
    },

    /// Entry count does not match the claimed range
    #[error("Instance {instance_id}: batch claims {claimed} entries but carries {actual}")]
    BatchLengthMismatch {
        instance_id: InstanceId,
        claimed: u64,
        actual: u64,
    },

    /// Batch extends past the agreed target
    #[error("Instance {instance_id}: batch ends at {last_seq_no}, target is {target}")]
    BatchBeyondTarget {
        instance_id: InstanceId,
        last_seq_no: SeqNo,
        target: SeqNo,
    },

    /// Batch entries do not hash to the agreed target
    #[error("Instance {instance_id}: batch ({first_seq_no}, {last_seq_no}) from {sender} does not match target root")]
    HashMismatch {
        instance_id: InstanceId,
        sender: NodeName,
        first_seq_no: SeqNo,
        last_seq_no: SeqNo,
    },

    /// Nobody to ask for entries
    #[error("No peers to request catch-up entries from")]
    NoPeers,

    /// Ledger read or write failed
    #[error("Ledger error: {reason}")]
    Ledger { reason: String },

    /// Configuration rejected at construction
    #[error("Invalid catch-up configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Classify for CatchupError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger { .. } => ErrorKind::Aborted,
            _ => ErrorKind::Rejected,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Instance(_) => "unknown_instance",
            Self::AlreadyCatchingUp { .. } => "already_catching_up",
            Self::NoSession { .. } => "no_session",
            Self::UnexpectedPhase { .. } => "unexpected_phase",
            Self::StaleProof { .. } => "stale_proof",
            Self::RootMismatch { .. } => "root_mismatch",
            Self::InconsistentProof { .. } => "inconsistent_proof",
            Self::DuplicateProof { .. } => "duplicate_proof",
            Self::ProofStartBeyondLedger { .. } => "proof_start_beyond_ledger",
            Self::InvalidCatchupRequest { .. } => "invalid_catchup_request",
            Self::NonContiguousBatch { .. } => "non_contiguous_batch",
            Self::BatchLengthMismatch { .. } => "batch_length_mismatch",
            Self::BatchBeyondTarget { .. } => "batch_beyond_target",
            Self::HashMismatch { .. } => "hash_mismatch",
            Self::NoPeers => "no_peers",
            Self::Ledger { .. } => "ledger",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }
}

/// Result type for catch-up operations
pub type CatchupResult<T> = Result<T, CatchupError>;
