//! Driving Ports (API - Inbound)
//!
//! The ordering layer calls `advance`; peer votes arrive through
//! `receive_digest_vote`; the catch-up coordinator calls
//! `reset_after_catchup`.

use crate::domain::{Checkpoint, CheckpointKey, WatermarkWindow};
use crate::error::CheckpointResult;
use shared_types::{Hash, InstanceId, NodeName, SeqNo};

/// Result of ordering one sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Window the sequence number belongs to.
    pub key: CheckpointKey,
    /// The window's last sequence number is now ordered; the node should
    /// compute and broadcast its digest vote.
    pub completed: bool,
}

/// A checkpoint that reached quorum, with the watermarks it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StabilizedCheckpoint {
    pub instance_id: InstanceId,
    pub checkpoint: Checkpoint,
    pub watermarks: WatermarkWindow,
    /// The window ends past anything this node has ordered; `h` now sits
    /// above its own log and it must catch up.
    pub lagging: bool,
}

/// Result of tallying one digest vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DigestVoteOutcome {
    /// Counted; no quorum yet.
    Recorded { matching: usize },
    /// Window lies beyond `H`; held until the watermark catches up.
    Stashed { matching: usize },
    /// Quorum reached; `h` moved.
    Stabilized(StabilizedCheckpoint),
    /// A quorum agrees on a window beyond `H`: this node is behind and
    /// should start catch-up.
    LaggingBehind { key: CheckpointKey, digest: Hash },
}

/// Primary Checkpoint Store API
pub trait CheckpointApi: Send + Sync {
    /// Record that `seq_no` has been ordered on `instance_id`.
    fn advance(&self, instance_id: InstanceId, seq_no: SeqNo) -> CheckpointResult<AdvanceOutcome>;

    /// Tally one peer's digest for a window.
    fn receive_digest_vote(
        &self,
        instance_id: InstanceId,
        key: CheckpointKey,
        sender: &NodeName,
        digest: Hash,
    ) -> CheckpointResult<DigestVoteOutcome>;

    /// Snapshot of the instance's checkpoints ordered by `first_seq_no`.
    fn checkpoints_for(&self, instance_id: InstanceId) -> CheckpointResult<Vec<Checkpoint>>;

    /// Current watermarks.
    fn watermarks(&self, instance_id: InstanceId) -> CheckpointResult<WatermarkWindow>;

    /// Drop all window state and restart from `new_h`.
    fn reset_after_catchup(
        &self,
        instance_id: InstanceId,
        new_h: SeqNo,
    ) -> CheckpointResult<WatermarkWindow>;
}
