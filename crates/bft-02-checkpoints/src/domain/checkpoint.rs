//! Checkpoint entity
//!
//! A checkpoint covers the window `[first_seq_no, last_seq_no]` of one
//! instance's ordered log.

use serde::{Deserialize, Serialize};
use shared_types::{Hash, SeqNo};
use std::fmt;

/// Identifies a checkpoint window. Ordered by `first_seq_no`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckpointKey {
    pub first_seq_no: SeqNo,
    pub last_seq_no: SeqNo,
}

impl CheckpointKey {
    pub fn new(first_seq_no: SeqNo, last_seq_no: SeqNo) -> Self {
        Self {
            first_seq_no,
            last_seq_no,
        }
    }

    /// Number of sequence numbers covered.
    pub fn len(&self) -> u64 {
        self.last_seq_no.saturating_sub(self.first_seq_no).saturating_add(1)
    }

    /// Whether `first_seq_no <= last_seq_no`.
    pub fn is_well_formed(&self) -> bool {
        self.first_seq_no <= self.last_seq_no
    }

    /// Ends on a multiple of `chk_freq` and spans at most `chk_freq`
    /// sequence numbers. Windows truncated by a low watermark still qualify.
    pub fn is_aligned(&self, chk_freq: u64) -> bool {
        chk_freq > 0
            && self.is_well_formed()
            && self.last_seq_no % chk_freq == 0
            && self.len() <= chk_freq
    }
}

impl fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first_seq_no, self.last_seq_no)
    }
}

/// In-progress or stable checkpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub key: CheckpointKey,
    /// Highest sequence number ordered inside the window so far.
    pub highest_seq_no_seen: SeqNo,
    /// Quorum-agreed digest, set on stabilization.
    pub digest: Option<Hash>,
    pub is_stable: bool,
}

impl Checkpoint {
    /// Fresh unstable checkpoint with nothing ordered yet.
    pub fn new(key: CheckpointKey) -> Self {
        Self {
            key,
            highest_seq_no_seen: 0,
            digest: None,
            is_stable: false,
        }
    }

    /// Record an ordered sequence number. Returns whether the window's last
    /// sequence number has now been ordered.
    pub fn observe(&mut self, seq_no: SeqNo) -> bool {
        self.highest_seq_no_seen = self.highest_seq_no_seen.max(seq_no);
        self.is_complete()
    }

    /// Every sequence number of the window has been ordered locally.
    pub fn is_complete(&self) -> bool {
        self.highest_seq_no_seen >= self.key.last_seq_no
    }

    /// Mark stable with the agreed digest.
    pub fn stabilize(&mut self, digest: Hash) {
        self.digest = Some(digest);
        self.is_stable = true;
    }
}
