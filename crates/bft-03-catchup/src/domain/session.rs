//! Catch-up session state

use crate::domain::merkle::CompactMerkleTree;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, InstanceId, NodeName, SeqNo};
use std::collections::HashMap;
use std::fmt;
use tokio::time::Instant;
use uuid::Uuid;

/// Where an instance stands in the catch-up state machine.
///
/// ```text
/// Idle ──start──▶ ProvingConsistency ──f+1 proofs──▶ CollectingReplies
///   ▲                     │                                 │
///   └──── Aborted ◀───────┴──────── timeout ────────────────┤
///   └──── Completed ◀──────────── target reached ───────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchupPhase {
    Idle,
    ProvingConsistency,
    CollectingReplies,
    Completed,
    Aborted,
}

impl CatchupPhase {
    /// Whether a session in this phase is still running.
    pub fn is_active(self) -> bool {
        matches!(self, Self::ProvingConsistency | Self::CollectingReplies)
    }
}

impl fmt::Display for CatchupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ProvingConsistency => "proving_consistency",
            Self::CollectingReplies => "collecting_replies",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Ledger size and root a quorum of peers proved consistent with ours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatchupTarget {
    pub seq_no: SeqNo,
    pub root: Hash,
}

/// Why a session ended without reaching its target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// Deadline passed before the session finished.
    Timeout,
    /// Cancelled by the node.
    Cancelled(String),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::Cancelled(reason) => write!(f, "cancelled: {reason}"),
        }
    }
}

/// One catch-up attempt for one instance.
#[derive(Clone, Debug)]
pub struct CatchupSession {
    pub session_id: Uuid,
    pub instance_id: InstanceId,
    pub phase: CatchupPhase,
    /// Ledger size when the session opened.
    pub started_from: SeqNo,
    /// Frontier of the ledger including every accepted batch.
    pub tree: CompactMerkleTree,
    pub deadline: Instant,
    /// Agreed target, set on entering `CollectingReplies`.
    pub target: Option<CatchupTarget>,
    proofs: HashMap<NodeName, CatchupTarget>,
}

impl CatchupSession {
    pub fn new(instance_id: InstanceId, tree: CompactMerkleTree, deadline: Instant) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            instance_id,
            phase: CatchupPhase::ProvingConsistency,
            started_from: tree.size(),
            tree,
            deadline,
            target: None,
            proofs: HashMap::new(),
        }
    }

    /// Last sequence number held locally.
    pub fn collected(&self) -> SeqNo {
        self.tree.size()
    }

    pub fn has_proof_from(&self, sender: &NodeName) -> bool {
        self.proofs.contains_key(sender)
    }

    /// Record a sender's proven end state. Returns how many senders now
    /// agree on it.
    pub fn record_proof(&mut self, sender: NodeName, claimed: CatchupTarget) -> usize {
        self.proofs.insert(sender, claimed);
        self.proofs.values().filter(|t| **t == claimed).count()
    }

    pub fn proof_count(&self) -> usize {
        self.proofs.len()
    }

    /// Fix the target and start collecting replies.
    pub fn agree_on(&mut self, target: CatchupTarget) {
        self.target = Some(target);
        self.phase = CatchupPhase::CollectingReplies;
        self.proofs.clear();
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> CatchupSession {
        let mut tree = CompactMerkleTree::new();
        tree.append_entry(b"genesis");
        CatchupSession::new(InstanceId(0), tree, Instant::now() + Duration::from_secs(5))
    }

    #[test]
    fn test_new_session_proves_consistency() {
        let session = session();
        assert_eq!(session.phase, CatchupPhase::ProvingConsistency);
        assert_eq!(session.started_from, 1);
        assert_eq!(session.collected(), 1);
        assert!(session.target.is_none());
    }

    #[test]
    fn test_matching_proofs_counted() {
        let mut session = session();
        let a = CatchupTarget { seq_no: 10, root: [1; 32] };
        let b = CatchupTarget { seq_no: 10, root: [2; 32] };
        assert_eq!(session.record_proof(NodeName::from("Alpha"), a), 1);
        assert_eq!(session.record_proof(NodeName::from("Beta"), b), 1);
        assert_eq!(session.record_proof(NodeName::from("Gamma"), a), 2);
        assert!(session.has_proof_from(&NodeName::from("Beta")));
        assert_eq!(session.proof_count(), 3);

        session.agree_on(a);
        assert_eq!(session.phase, CatchupPhase::CollectingReplies);
        assert_eq!(session.proof_count(), 0);
    }

    #[test]
    fn test_expiry() {
        let session = session();
        assert!(!session.is_expired(Instant::now()));
        assert!(session.is_expired(session.deadline));
    }

    #[test]
    fn test_phase_activity() {
        assert!(!CatchupPhase::Idle.is_active());
        assert!(CatchupPhase::CollectingReplies.is_active());
        assert_eq!(CatchupPhase::ProvingConsistency.to_string(), "proving_consistency");
    }
}
