//! Watermark window
//!
//! Pure arithmetic over the low watermark `h` and the window size `L`.
//! Sequence numbers in `(h, H]` with `H = h + L` may be ordered.

use serde::{Deserialize, Serialize};
use shared_types::SeqNo;

use super::checkpoint::CheckpointKey;

/// Low/high watermark pair for one instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkWindow {
    low: SeqNo,
    size: u64,
}

impl WatermarkWindow {
    /// Window starting at `low` spanning `size` sequence numbers.
    pub fn new(low: SeqNo, size: u64) -> Self {
        Self { low, size }
    }

    /// Low watermark `h`.
    pub fn low(&self) -> SeqNo {
        self.low
    }

    /// High watermark `H = h + L`.
    pub fn high(&self) -> SeqNo {
        self.low.saturating_add(self.size)
    }

    /// Window size `L`.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether `seq_no` lies in `(h, H]`.
    pub fn contains(&self, seq_no: SeqNo) -> bool {
        seq_no > self.low && seq_no <= self.high()
    }

    /// Checkpoint window owning `seq_no`.
    ///
    /// Windows end on multiples of `chk_freq`; the first window after `h`
    /// is truncated to start at `h + 1`. `None` when `chk_freq` is zero or
    /// the window end does not fit in a `SeqNo`.
    pub fn window_for(&self, seq_no: SeqNo, chk_freq: u64) -> Option<CheckpointKey> {
        let last = seq_no.checked_next_multiple_of(chk_freq)?;
        let first = self
            .low
            .saturating_add(1)
            .max(last.saturating_sub(chk_freq - 1));
        Some(CheckpointKey::new(first, last))
    }

    /// Move `h` forward. Returns `false` (unchanged) when `new_low < h`.
    pub fn raise_to(&mut self, new_low: SeqNo) -> bool {
        if new_low < self.low {
            return false;
        }
        self.low = new_low;
        true
    }
}
