//! Checkpoints: ordering notifications and digest votes.

use bft_02_checkpoints::{AdvanceOutcome, CheckpointApi, CheckpointKey, DigestVoteOutcome};
use shared_bus::ReplicaEvent;
use shared_types::{short_hex, DigestVote, Hash, InstanceId, NodeName, ReplicaMessage, SeqNo};
use tracing::{debug, warn};

use crate::error::NodeResult;
use crate::node::ReplicaNode;

impl ReplicaNode {
    /// The ordering layer finished `seq_no` on `instance_id`; `digest` is
    /// the state digest after applying it.
    ///
    /// Ignored (`Ok(None)`) while the instance is catching up. When the
    /// sequence number completes a window the node votes for its own digest
    /// and broadcasts the vote.
    pub async fn on_ordered(
        &self,
        instance_id: InstanceId,
        seq_no: SeqNo,
        digest: Hash,
    ) -> NodeResult<Option<AdvanceOutcome>> {
        if self.is_catching_up(instance_id).await {
            debug!(instance_id = %instance_id, seq_no, "Ordering suppressed during catch-up");
            return Ok(None);
        }

        let checkpoints = &self.subsystems.checkpoints;
        let outcome = checkpoints.advance(instance_id, seq_no)?;
        if outcome.completed {
            let key = outcome.key;
            let own = checkpoints.receive_digest_vote(instance_id, key, &self.name, digest)?;
            self.transport
                .broadcast(ReplicaMessage::DigestVote(DigestVote {
                    instance_id,
                    first_seq_no: key.first_seq_no,
                    last_seq_no: key.last_seq_no,
                    digest,
                }))
                .await;
            self.after_digest_vote(instance_id, own).await?;
        }
        Ok(Some(outcome))
    }

    pub(crate) async fn on_digest_vote(&self, sender: &NodeName, vote: DigestVote) -> NodeResult<()> {
        let key = CheckpointKey::new(vote.first_seq_no, vote.last_seq_no);
        let outcome =
            self.subsystems
                .checkpoints
                .receive_digest_vote(vote.instance_id, key, sender, vote.digest)?;
        self.after_digest_vote(vote.instance_id, outcome).await
    }

    async fn after_digest_vote(
        &self,
        instance_id: InstanceId,
        outcome: DigestVoteOutcome,
    ) -> NodeResult<()> {
        match outcome {
            DigestVoteOutcome::Stabilized(stable) => {
                let key = stable.checkpoint.key;
                self.publish(ReplicaEvent::CheckpointStabilized {
                    instance_id,
                    first_seq_no: key.first_seq_no,
                    last_seq_no: key.last_seq_no,
                    digest: stable.checkpoint.digest.unwrap_or_default(),
                })
                .await;
                if stable.lagging {
                    warn!(
                        instance_id = %instance_id,
                        checkpoint = %key,
                        h = stable.watermarks.low(),
                        "Low watermark moved past local log, starting catch-up"
                    );
                    self.begin_catchup_if_idle(instance_id).await?;
                }
            }
            DigestVoteOutcome::LaggingBehind { key, digest } => {
                warn!(
                    instance_id = %instance_id,
                    checkpoint = %key,
                    digest = %short_hex(&digest),
                    "Quorum checkpoint beyond high watermark, starting catch-up"
                );
                self.begin_catchup_if_idle(instance_id).await?;
            }
            DigestVoteOutcome::Recorded { .. } | DigestVoteOutcome::Stashed { .. } => {}
        }
        Ok(())
    }
}
