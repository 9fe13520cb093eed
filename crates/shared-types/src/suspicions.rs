//! # Misbehaviour Counters
//!
//! Counts repeated protocol violations per peer so the node can make
//! blacklisting decisions. Nothing here acts on the counts.

use crate::entities::{InstanceId, NodeName};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Kinds of countable misbehaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suspicion {
    /// More than one primary declaration in the same view.
    DuplicatePrimaryDeclaration,
    /// More than one digest vote for the same checkpoint window.
    DuplicateDigestVote,
    /// Consistency proof that does not verify against local state.
    InconsistentProof,
    /// Catch-up batch that failed hash verification.
    InvalidCatchupReply,
}

impl Suspicion {
    /// Label for logs and metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::DuplicatePrimaryDeclaration => "duplicate_primary_declaration",
            Self::DuplicateDigestVote => "duplicate_digest_vote",
            Self::InconsistentProof => "inconsistent_proof",
            Self::InvalidCatchupReply => "invalid_catchup_reply",
        }
    }
}

type SuspicionKey = (InstanceId, NodeName, Suspicion);

/// Thread-safe counters keyed by `(instance, sender, suspicion)`.
#[derive(Debug, Default)]
pub struct SuspicionCounters {
    counts: Mutex<HashMap<SuspicionKey, u64>>,
}

impl SuspicionCounters {
    /// Empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter, returning the new value.
    pub fn record(&self, instance_id: InstanceId, sender: &NodeName, suspicion: Suspicion) -> u64 {
        let mut counts = self.counts.lock();
        let count = counts
            .entry((instance_id, sender.clone(), suspicion))
            .or_insert(0);
        *count += 1;
        *count
    }

    /// Current value of a counter.
    #[must_use]
    pub fn count(&self, instance_id: InstanceId, sender: &NodeName, suspicion: Suspicion) -> u64 {
        self.counts
            .lock()
            .get(&(instance_id, sender.clone(), suspicion))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all counters recorded against a sender.
    #[must_use]
    pub fn total_for(&self, sender: &NodeName) -> u64 {
        self.counts
            .lock()
            .iter()
            .filter(|((_, name, _), _)| name == sender)
            .map(|(_, count)| *count)
            .sum()
    }
}
