//! Digest vote tally for one checkpoint window.

use shared_types::{Hash, NodeName};
use std::collections::HashMap;

/// Votes from distinct senders for one window.
#[derive(Clone, Debug, Default)]
pub struct DigestTally {
    votes: HashMap<NodeName, Hash>,
}

/// The sender already voted for this window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateVote;

impl DigestTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote. Returns how many votes now match `digest`.
    pub fn record(&mut self, sender: NodeName, digest: Hash) -> Result<usize, DuplicateVote> {
        if self.votes.contains_key(&sender) {
            return Err(DuplicateVote);
        }
        self.votes.insert(sender, digest);
        Ok(self.matching(&digest))
    }

    /// Votes matching `digest`.
    pub fn matching(&self, digest: &Hash) -> usize {
        self.votes.values().filter(|d| *d == digest).count()
    }

    /// A digest backed by at least `quorum` votes, if any.
    pub fn quorum_digest(&self, quorum: usize) -> Option<Hash> {
        let mut counts: HashMap<&Hash, usize> = HashMap::new();
        for digest in self.votes.values() {
            *counts.entry(digest).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .find(|(_, count)| *count >= quorum)
            .map(|(digest, _)| *digest)
    }

    /// Total votes recorded.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
