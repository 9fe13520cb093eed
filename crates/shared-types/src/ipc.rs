//! # Peer Message Payloads
//!
//! Shapes of the messages exchanged between replicas. Wire encoding and
//! signing belong to the transport; these are the decoded payloads handed
//! to the replica core.
//!
//! ## Design Rules
//!
//! - The sender's identity travels next to the payload (transport
//!   authenticated), never inside it.
//! - Every payload names the instance it belongs to.

use crate::entities::{Hash, InstanceId, NodeName, SeqNo, ViewNo};
use serde::{Deserialize, Serialize};

// =============================================================================
// PRIMARY SELECTION
// =============================================================================

/// Announcement of the primary a peer settled on for an instance after a
/// view change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewChangeDone {
    /// Name of the node announced as primary.
    pub candidate_primary_name: NodeName,
    /// Instance the announcement applies to.
    pub instance_id: InstanceId,
    /// View the announcement applies to.
    pub view_no: ViewNo,
    /// Opaque evidence supporting the announcement, if any.
    pub proof: Option<Vec<u8>>,
}

// =============================================================================
// CHECKPOINTS
// =============================================================================

/// One peer's digest of the state accumulated over a checkpoint window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestVote {
    /// Instance the window belongs to.
    pub instance_id: InstanceId,
    /// First sequence number of the window.
    pub first_seq_no: SeqNo,
    /// Last sequence number of the window.
    pub last_seq_no: SeqNo,
    /// Digest of the window.
    pub digest: Hash,
}

// =============================================================================
// CATCH-UP
// =============================================================================

/// Evidence that a ledger of size `start_seq_no` is a prefix of a ledger of
/// size `end_seq_no`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProof {
    /// Instance whose ledger is proven.
    pub instance_id: InstanceId,
    /// Size of the older ledger (the requester's size).
    pub start_seq_no: SeqNo,
    /// Size of the newer ledger (the responder's size).
    pub end_seq_no: SeqNo,
    /// Merkle root at `start_seq_no`.
    pub old_root: Hash,
    /// Merkle root at `end_seq_no`.
    pub new_root: Hash,
    /// Merkle consistency path between the two roots.
    pub hashes: Vec<Hash>,
}

/// Request for a consistency proof starting at the requester's size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProofRequest {
    /// Instance whose ledger is requested.
    pub instance_id: InstanceId,
    /// Requester's ledger size.
    pub start_seq_no: SeqNo,
}

/// Request for a range of ledger entries during catch-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchupRequest {
    /// Instance whose ledger is requested.
    pub instance_id: InstanceId,
    /// First requested sequence number.
    pub first_seq_no: SeqNo,
    /// Last requested sequence number.
    pub last_seq_no: SeqNo,
    /// Size of the ledger the requester is catching up to.
    pub catchup_till: SeqNo,
}

/// A contiguous batch of ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchupReply {
    /// Instance whose ledger the entries belong to.
    pub instance_id: InstanceId,
    /// Sequence number of the first entry.
    pub first_seq_no: SeqNo,
    /// Sequence number of the last entry.
    pub last_seq_no: SeqNo,
    /// Serialized entries, in order.
    pub entries: Vec<Vec<u8>>,
    /// Consistency path from the ledger ending at `last_seq_no` to the
    /// catch-up target. Empty when `last_seq_no` is the target.
    pub cons_proof: Vec<Hash>,
}

impl CatchupReply {
    /// Number of sequence numbers the batch claims to cover.
    #[must_use]
    pub fn claimed_len(&self) -> u64 {
        if self.last_seq_no < self.first_seq_no {
            0
        } else {
            self.last_seq_no - self.first_seq_no + 1
        }
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Every message the replica core consumes or produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaMessage {
    /// Primary announcement.
    ViewChangeDone(ViewChangeDone),
    /// Checkpoint digest vote.
    DigestVote(DigestVote),
    /// Consistency proof.
    ConsistencyProof(ConsistencyProof),
    /// Consistency proof request.
    ConsistencyProofRequest(ConsistencyProofRequest),
    /// Catch-up entry request.
    CatchupRequest(CatchupRequest),
    /// Catch-up entry batch.
    CatchupReply(CatchupReply),
}

impl ReplicaMessage {
    /// Instance the message belongs to.
    #[must_use]
    pub fn instance_id(&self) -> InstanceId {
        match self {
            Self::ViewChangeDone(m) => m.instance_id,
            Self::DigestVote(m) => m.instance_id,
            Self::ConsistencyProof(m) => m.instance_id,
            Self::ConsistencyProofRequest(m) => m.instance_id,
            Self::CatchupRequest(m) => m.instance_id,
            Self::CatchupReply(m) => m.instance_id,
        }
    }

    /// Short type name for logs and metric labels.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ViewChangeDone(_) => "VIEW_CHANGE_DONE",
            Self::DigestVote(_) => "CHECKPOINT",
            Self::ConsistencyProof(_) => "CONSISTENCY_PROOF",
            Self::ConsistencyProofRequest(_) => "CONSISTENCY_PROOF_REQ",
            Self::CatchupRequest(_) => "CATCHUP_REQ",
            Self::CatchupReply(_) => "CATCHUP_REP",
        }
    }
}
