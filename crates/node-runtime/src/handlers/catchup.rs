//! Catch-up: session lifecycle on the requesting side, ledger service on
//! the responding side.

use bft_03_catchup::{
    CatchupAborted, CatchupApi, CatchupCompletion, CatchupError, ProofOutcome, ReplyOutcome,
};
use shared_bus::ReplicaEvent;
use shared_types::{
    CatchupReply, CatchupRequest, ConsistencyProof, ConsistencyProofRequest, InstanceId, NodeName,
    ReplicaMessage, SeqNo,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{NodeError, NodeResult};
use crate::node::ReplicaNode;

/// Replies held across all instances while earlier batches are missing.
const MAX_EARLY_REPLIES: usize = 256;

impl ReplicaNode {
    /// Open a catch-up session for `instance_id` and ask every peer for a
    /// consistency proof from the local ledger size.
    pub async fn start_catchup(&self, instance_id: InstanceId) -> NodeResult<ConsistencyProofRequest> {
        let catchup = &self.subsystems.catchup;
        let request = catchup
            .start_catchup(instance_id, catchup.default_deadline())
            .await?;
        self.publish(ReplicaEvent::CatchupStarted {
            instance_id,
            from_seq_no: request.start_seq_no,
        })
        .await;
        self.transport
            .broadcast(ReplicaMessage::ConsistencyProofRequest(request.clone()))
            .await;
        Ok(request)
    }

    pub(crate) async fn begin_catchup_if_idle(&self, instance_id: InstanceId) -> NodeResult<()> {
        match self.start_catchup(instance_id).await {
            Ok(_) => Ok(()),
            Err(NodeError::Catchup(CatchupError::AlreadyCatchingUp { phase, .. })) => {
                debug!(instance_id = %instance_id, phase = %phase, "Catch-up already running");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub(crate) async fn on_consistency_proof(
        &self,
        sender: &NodeName,
        proof: ConsistencyProof,
    ) -> NodeResult<()> {
        let outcome = self
            .subsystems
            .catchup
            .process_consistency_proof(&proof, sender)
            .await?;
        match outcome {
            ProofOutcome::Recorded { .. } => {}
            ProofOutcome::TargetAgreed { target_seq_no } => {
                let requests = self
                    .subsystems
                    .catchup
                    .catchup_requests(proof.instance_id, &self.peers())
                    .await?;
                info!(
                    instance_id = %proof.instance_id,
                    target_seq_no,
                    requests = requests.len(),
                    "Requesting missing entries"
                );
                for (peer, request) in requests {
                    self.transport
                        .send(&peer, ReplicaMessage::CatchupRequest(request))
                        .await;
                }
            }
            ProofOutcome::Completed(completion) => self.finish_catchup(completion).await,
        }
        Ok(())
    }

    pub(crate) async fn on_consistency_proof_req(
        &self,
        sender: &NodeName,
        request: ConsistencyProofRequest,
    ) -> NodeResult<()> {
        let proof = self
            .subsystems
            .catchup
            .process_consistency_proof_req(&request, sender)?;
        self.transport
            .send(sender, ReplicaMessage::ConsistencyProof(proof))
            .await;
        Ok(())
    }

    pub(crate) async fn on_catchup_req(
        &self,
        sender: &NodeName,
        request: CatchupRequest,
    ) -> NodeResult<()> {
        let reply = self.subsystems.catchup.process_catchup_req(&request, sender)?;
        self.transport
            .send(sender, ReplicaMessage::CatchupReply(reply))
            .await;
        Ok(())
    }

    pub(crate) async fn on_catchup_reply(
        &self,
        sender: &NodeName,
        reply: CatchupReply,
    ) -> NodeResult<()> {
        let instance_id = reply.instance_id;
        match self
            .subsystems
            .catchup
            .process_catchup_reply(&reply, sender)
            .await
        {
            Ok(outcome) => self.after_catchup_reply(instance_id, outcome).await,
            Err(CatchupError::NonContiguousBatch {
                instance_id,
                expected,
                got,
            }) if got > expected => {
                self.hold_early_reply(sender, reply);
                Err(CatchupError::NonContiguousBatch {
                    instance_id,
                    expected,
                    got,
                }
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Feed held replies that now continue the collected prefix.
    async fn after_catchup_reply(
        &self,
        instance_id: InstanceId,
        mut outcome: ReplyOutcome,
    ) -> NodeResult<()> {
        loop {
            let collected = match outcome {
                ReplyOutcome::Completed(completion) => {
                    self.drop_early_replies(instance_id);
                    self.finish_catchup(completion).await;
                    return Ok(());
                }
                ReplyOutcome::Accepted { collected, .. } => collected,
            };
            match self.replay_early_reply(instance_id, collected + 1).await {
                Some(next) => outcome = next,
                None => return Ok(()),
            }
        }
    }

    /// Replay held replies starting at `first_seq_no` until one is accepted.
    ///
    /// A rejected replay is discarded and blamed on its own sender by the
    /// coordinator; it never fails the message that triggered the replay.
    async fn replay_early_reply(
        &self,
        instance_id: InstanceId,
        first_seq_no: SeqNo,
    ) -> Option<ReplyOutcome> {
        while let Some((sender, reply)) = self.take_early_reply(instance_id, first_seq_no) {
            debug!(
                instance_id = %instance_id,
                first_seq_no,
                sender = %sender,
                "Replaying held catch-up reply"
            );
            match self
                .subsystems
                .catchup
                .process_catchup_reply(&reply, &sender)
                .await
            {
                Ok(outcome) => return Some(outcome),
                Err(err) => warn!(
                    instance_id = %instance_id,
                    first_seq_no,
                    sender = %sender,
                    error = %err,
                    "Discarding held catch-up reply"
                ),
            }
        }
        None
    }

    fn hold_early_reply(&self, sender: &NodeName, reply: CatchupReply) {
        let mut held = self.early_replies.lock();
        if held.len() >= MAX_EARLY_REPLIES {
            debug!(instance_id = %reply.instance_id, sender = %sender, "Early reply buffer full");
            return;
        }
        held.push((sender.clone(), reply));
    }

    fn take_early_reply(
        &self,
        instance_id: InstanceId,
        first_seq_no: SeqNo,
    ) -> Option<(NodeName, CatchupReply)> {
        let mut held = self.early_replies.lock();
        let position = held.iter().position(|(_, reply)| {
            reply.instance_id == instance_id && reply.first_seq_no == first_seq_no
        })?;
        Some(held.swap_remove(position))
    }

    fn drop_early_replies(&self, instance_id: InstanceId) {
        self.early_replies
            .lock()
            .retain(|(_, reply)| reply.instance_id != instance_id);
    }

    /// The coordinator already told the checkpoint store; surface the
    /// watermark reset result and announce the completion.
    async fn finish_catchup(&self, completion: CatchupCompletion) {
        let instance_id = completion.instance_id;
        if let Some(Err(err)) = self.subsystems.reset_observer.take_reset(instance_id) {
            self.report(instance_id, &NodeError::from(err)).await;
        }
        self.publish(ReplicaEvent::CatchupCompleted {
            instance_id,
            last_seq_no: completion.last_seq_no,
        })
        .await;
    }

    /// Abort every catch-up session whose deadline passed by `now`.
    ///
    /// The next lagging signal starts a fresh session from the entries
    /// already applied.
    pub async fn tick(&self, now: Instant) -> Vec<CatchupAborted> {
        let aborted = self.subsystems.catchup.expire_sessions(now).await;
        for session in &aborted {
            self.drop_early_replies(session.instance_id);
            self.publish(ReplicaEvent::CatchupAborted {
                instance_id: session.instance_id,
                reason: session.reason.to_string(),
            })
            .await;
        }
        aborted
    }
}
