//! Checkpoint Store - per-instance windows, digest tallies and watermarks

use crate::config::CheckpointConfig;
use crate::domain::{Checkpoint, CheckpointKey, DigestTally, DuplicateVote, WatermarkWindow};
use crate::error::{CheckpointError, CheckpointResult};
use crate::metrics;
use crate::ports::inbound::{AdvanceOutcome, CheckpointApi, DigestVoteOutcome, StabilizedCheckpoint};
use parking_lot::Mutex;
use shared_types::{
    instance_slot, short_hex, Classify, Hash, InstanceId, NodeName, Quorums, SeqNo, Suspicion,
    SuspicionCounters,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State owned by one instance.
#[derive(Debug)]
struct InstanceCheckpoints {
    watermarks: WatermarkWindow,
    checkpoints: BTreeMap<CheckpointKey, Checkpoint>,
    tallies: HashMap<CheckpointKey, DigestTally>,
    /// Votes for windows beyond `H`.
    stashed: BTreeMap<CheckpointKey, DigestTally>,
    stashed_votes: usize,
    /// Highest sequence number ordered locally.
    highest_ordered: SeqNo,
}

impl InstanceCheckpoints {
    fn new(log_size: u64) -> Self {
        Self {
            watermarks: WatermarkWindow::new(0, log_size),
            checkpoints: BTreeMap::new(),
            tallies: HashMap::new(),
            stashed: BTreeMap::new(),
            stashed_votes: 0,
            highest_ordered: 0,
        }
    }

    fn clear(&mut self) {
        self.checkpoints.clear();
        self.tallies.clear();
        self.stashed.clear();
        self.stashed_votes = 0;
    }

    /// Stabilize `key` with `digest`, move `h` and prune superseded state.
    fn stabilize(&mut self, key: CheckpointKey, digest: Hash) -> Checkpoint {
        let mut checkpoint = self
            .checkpoints
            .remove(&key)
            .unwrap_or_else(|| Checkpoint::new(key));
        checkpoint.stabilize(digest);

        self.watermarks.raise_to(key.last_seq_no);
        let low = self.watermarks.low();
        self.checkpoints.retain(|k, _| k.last_seq_no > low);
        self.checkpoints.insert(key, checkpoint.clone());
        self.tallies.retain(|k, _| k.last_seq_no > low);
        self.absorb_stash();
        checkpoint
    }

    /// Move stashed tallies that now fall inside the window into the live
    /// tallies; drop the ones already covered by `h`.
    fn absorb_stash(&mut self) {
        let low = self.watermarks.low();
        let high = self.watermarks.high();
        let keys: Vec<CheckpointKey> = self
            .stashed
            .keys()
            .filter(|k| k.last_seq_no <= high)
            .copied()
            .collect();
        for key in keys {
            if let Some(tally) = self.stashed.remove(&key) {
                self.stashed_votes = self.stashed_votes.saturating_sub(tally.len());
                if key.last_seq_no > low {
                    self.tallies.insert(key, tally);
                }
            }
        }
    }

    /// First live window (by `first_seq_no`) whose tally holds a quorum.
    fn next_ready(&self, quorum: usize) -> Option<(CheckpointKey, Hash)> {
        let mut ready: Vec<(CheckpointKey, Hash)> = self
            .tallies
            .iter()
            .filter_map(|(key, tally)| tally.quorum_digest(quorum).map(|d| (*key, d)))
            .collect();
        ready.sort_by_key(|(key, _)| *key);
        ready.into_iter().next()
    }
}

/// Checkpoint Store service
///
/// Each instance's state sits behind its own mutex; operations on different
/// instances never contend.
pub struct CheckpointStore {
    config: CheckpointConfig,
    quorums: Quorums,
    instances: Vec<Mutex<InstanceCheckpoints>>,
    suspicions: Arc<SuspicionCounters>,
}

impl CheckpointStore {
    /// Create a store for `quorums.n` nodes.
    pub fn new(
        config: CheckpointConfig,
        quorums: Quorums,
        suspicions: Arc<SuspicionCounters>,
    ) -> CheckpointResult<Self> {
        config.validate()?;
        let instances = (0..config.instance_count)
            .map(|_| Mutex::new(InstanceCheckpoints::new(config.log_size)))
            .collect();
        Ok(Self {
            config,
            quorums,
            instances,
            suspicions,
        })
    }

    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    /// Latest stable checkpoint of an instance, if any.
    pub fn stable_checkpoint(&self, instance_id: InstanceId) -> CheckpointResult<Option<Checkpoint>> {
        let state = instance_slot(&self.instances, instance_id)?.lock();
        Ok(state.checkpoints.values().rev().find(|c| c.is_stable).cloned())
    }

    fn reject(&self, err: CheckpointError) -> CheckpointError {
        metrics::record_vote_rejected(err.label());
        err
    }

    fn stabilize_ready(
        &self,
        instance_id: InstanceId,
        state: &mut InstanceCheckpoints,
    ) -> Option<StabilizedCheckpoint> {
        let mut latest = None;
        // Absorbing the stash after a move can make further windows ready.
        while let Some((key, digest)) = state.next_ready(self.quorums.checkpoint()) {
            let checkpoint = state.stabilize(key, digest);
            info!(
                instance_id = %instance_id,
                window = %key,
                digest = %short_hex(&digest),
                h = state.watermarks.low(),
                H = state.watermarks.high(),
                "Checkpoint stabilized"
            );
            metrics::record_stabilized(instance_id.0, state.watermarks.low());
            let lagging = state.highest_ordered < key.last_seq_no;
            if lagging {
                warn!(
                    instance_id = %instance_id,
                    window = %key,
                    highest_ordered = state.highest_ordered,
                    "Quorum stabilized a window not yet ordered locally"
                );
                metrics::record_lag_detected(instance_id.0);
            }
            latest = Some(StabilizedCheckpoint {
                instance_id,
                checkpoint,
                watermarks: state.watermarks,
                lagging,
            });
        }
        latest
    }
}

impl CheckpointApi for CheckpointStore {
    fn advance(&self, instance_id: InstanceId, seq_no: SeqNo) -> CheckpointResult<AdvanceOutcome> {
        let mut state = instance_slot(&self.instances, instance_id)?.lock();
        let watermarks = state.watermarks;

        if seq_no <= watermarks.low() {
            debug!(instance_id = %instance_id, seq_no, h = watermarks.low(), "Ignoring seq_no below low watermark");
            return Err(CheckpointError::BelowLowWatermark {
                instance_id,
                seq_no,
                low: watermarks.low(),
            });
        }
        if seq_no > watermarks.high() {
            warn!(
                instance_id = %instance_id,
                seq_no,
                H = watermarks.high(),
                "Ordered seq_no beyond high watermark"
            );
            return Err(CheckpointError::BeyondHighWatermark {
                instance_id,
                seq_no,
                high: watermarks.high(),
            });
        }

        let key = watermarks
            .window_for(seq_no, self.config.chk_freq)
            .ok_or(CheckpointError::WindowOverflow {
                instance_id,
                seq_no,
            })?;
        state.highest_ordered = state.highest_ordered.max(seq_no);
        let completed = state
            .checkpoints
            .entry(key)
            .or_insert_with(|| {
                debug!(instance_id = %instance_id, window = %key, "Opened checkpoint window");
                Checkpoint::new(key)
            })
            .observe(seq_no);

        Ok(AdvanceOutcome { key, completed })
    }

    fn receive_digest_vote(
        &self,
        instance_id: InstanceId,
        key: CheckpointKey,
        sender: &NodeName,
        digest: Hash,
    ) -> CheckpointResult<DigestVoteOutcome> {
        let mut state = instance_slot(&self.instances, instance_id)?.lock();

        if !key.is_well_formed() {
            return Err(self.reject(CheckpointError::MalformedWindow {
                first_seq_no: key.first_seq_no,
                last_seq_no: key.last_seq_no,
            }));
        }
        if !key.is_aligned(self.config.chk_freq) {
            debug!(instance_id = %instance_id, window = %key, sender = %sender, "Misaligned checkpoint vote");
            return Err(self.reject(CheckpointError::MisalignedWindow {
                instance_id,
                first_seq_no: key.first_seq_no,
                last_seq_no: key.last_seq_no,
                chk_freq: self.config.chk_freq,
            }));
        }
        let low = state.watermarks.low();
        if key.last_seq_no <= low {
            debug!(instance_id = %instance_id, window = %key, sender = %sender, h = low, "Stale checkpoint vote");
            return Err(self.reject(CheckpointError::StaleCheckpoint {
                instance_id,
                last_seq_no: key.last_seq_no,
                low,
            }));
        }

        let duplicate = || {
            let count = self
                .suspicions
                .record(instance_id, sender, Suspicion::DuplicateDigestVote);
            warn!(
                instance_id = %instance_id,
                window = %key,
                sender = %sender,
                duplicates = count,
                "Duplicate digest vote"
            );
            self.reject(CheckpointError::DuplicateDigestVote {
                instance_id,
                sender: sender.clone(),
                first_seq_no: key.first_seq_no,
                last_seq_no: key.last_seq_no,
            })
        };

        if key.last_seq_no > state.watermarks.high() {
            let limit = self.config.max_stashed_votes;
            if state.stashed_votes >= limit {
                return Err(self.reject(CheckpointError::StashFull { instance_id, limit }));
            }
            let matching = state
                .stashed
                .entry(key)
                .or_default()
                .record(sender.clone(), digest)
                .map_err(|DuplicateVote| duplicate())?;
            state.stashed_votes += 1;

            if matching >= self.quorums.checkpoint() {
                warn!(
                    instance_id = %instance_id,
                    window = %key,
                    H = state.watermarks.high(),
                    "Quorum reached beyond high watermark, node is lagging"
                );
                metrics::record_lag_detected(instance_id.0);
                return Ok(DigestVoteOutcome::LaggingBehind { key, digest });
            }
            return Ok(DigestVoteOutcome::Stashed { matching });
        }

        let matching = state
            .tallies
            .entry(key)
            .or_default()
            .record(sender.clone(), digest)
            .map_err(|DuplicateVote| duplicate())?;

        if matching >= self.quorums.checkpoint() {
            if let Some(stabilized) = self.stabilize_ready(instance_id, &mut state) {
                return Ok(DigestVoteOutcome::Stabilized(stabilized));
            }
        }
        Ok(DigestVoteOutcome::Recorded { matching })
    }

    fn checkpoints_for(&self, instance_id: InstanceId) -> CheckpointResult<Vec<Checkpoint>> {
        let state = instance_slot(&self.instances, instance_id)?.lock();
        Ok(state.checkpoints.values().cloned().collect())
    }

    fn watermarks(&self, instance_id: InstanceId) -> CheckpointResult<WatermarkWindow> {
        Ok(instance_slot(&self.instances, instance_id)?.lock().watermarks)
    }

    fn reset_after_catchup(
        &self,
        instance_id: InstanceId,
        new_h: SeqNo,
    ) -> CheckpointResult<WatermarkWindow> {
        let mut state = instance_slot(&self.instances, instance_id)?.lock();
        let current = state.watermarks.low();
        if !state.watermarks.raise_to(new_h) {
            warn!(instance_id = %instance_id, current, requested = new_h, "Refusing to move low watermark back");
            return Err(CheckpointError::WatermarkRegression {
                instance_id,
                current,
                requested: new_h,
            });
        }
        state.clear();
        state.highest_ordered = state.highest_ordered.max(new_h);
        metrics::set_low_watermark(instance_id.0, new_h);
        info!(
            instance_id = %instance_id,
            h = state.watermarks.low(),
            H = state.watermarks.high(),
            "Checkpoint windows reset after catch-up"
        );
        Ok(state.watermarks)
    }
}
