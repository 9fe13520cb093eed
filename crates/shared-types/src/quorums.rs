//! # Quorum Sizes
//!
//! BFT quorum arithmetic for `n = 3f + 1` nodes.

use serde::{Deserialize, Serialize};

/// Quorum thresholds derived from the total node count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quorums {
    /// Total nodes in the pool.
    pub n: usize,
    /// Maximum tolerated Byzantine nodes.
    pub f: usize,
    /// `2f + 1` (more precisely `n - f`): enough to outvote `f` faulty nodes.
    pub strong: usize,
    /// `f + 1`: guarantees at least one honest participant.
    pub weak: usize,
}

impl Quorums {
    /// Compute quorums for `n` nodes.
    #[must_use]
    pub fn new(n: usize) -> Self {
        let f = max_failures(n);
        Self {
            n,
            f,
            strong: n - f,
            weak: f + 1,
        }
    }

    /// Declarations required to install a primary.
    #[must_use]
    pub fn view_change_done(&self) -> usize {
        self.strong
    }

    /// Matching digests required to stabilize a checkpoint.
    #[must_use]
    pub fn checkpoint(&self) -> usize {
        self.strong
    }

    /// Identical consistency proofs required to fix a catch-up target.
    #[must_use]
    pub fn consistency_proof(&self) -> usize {
        self.weak
    }

    /// Whether `count` votes reach the strong quorum.
    #[must_use]
    pub fn is_strong(&self, count: usize) -> bool {
        count >= self.strong
    }
}

/// Maximum Byzantine nodes tolerated by `n` nodes.
#[must_use]
pub fn max_failures(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n - 1) / 3
    }
}
