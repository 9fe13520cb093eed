//! Catch-up Coordinator
//!
//! Each instance owns one `tokio::sync::Mutex` around its optional
//! session. The lock is held across `LedgerGateway::append_entries`, so
//! batches for one instance are applied strictly in order while other
//! instances proceed independently.

use crate::config::CatchupConfig;
use crate::domain::{
    verify_consistency, AbortReason, CatchupPhase, CatchupSession, CatchupTarget,
};
use crate::error::{CatchupError, CatchupResult};
use crate::metrics;
use crate::ports::{
    CatchupAborted, CatchupApi, CatchupCompletion, CatchupObserver, LedgerGateway, ProofOutcome,
    ReplyOutcome,
};
use async_trait::async_trait;
use shared_types::{
    instance_slot, CatchupReply, CatchupRequest, Classify, ConsistencyProof,
    ConsistencyProofRequest, InstanceId, NodeName, Quorums, Suspicion, SuspicionCounters,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Default)]
struct InstanceCatchup {
    session: Option<CatchupSession>,
}

/// Drives catch-up sessions and serves peers' catch-up requests.
pub struct CatchupCoordinator {
    config: CatchupConfig,
    quorums: Quorums,
    ledger: Arc<dyn LedgerGateway>,
    observer: Arc<dyn CatchupObserver>,
    suspicions: Arc<SuspicionCounters>,
    instances: Vec<Mutex<InstanceCatchup>>,
}

impl CatchupCoordinator {
    pub fn new(
        config: CatchupConfig,
        quorums: Quorums,
        ledger: Arc<dyn LedgerGateway>,
        observer: Arc<dyn CatchupObserver>,
        suspicions: Arc<SuspicionCounters>,
    ) -> CatchupResult<Self> {
        config.validate()?;
        let instances = (0..config.instance_count)
            .map(|_| Mutex::new(InstanceCatchup::default()))
            .collect();
        Ok(Self {
            config,
            quorums,
            ledger,
            observer,
            suspicions,
            instances,
        })
    }

    pub fn config(&self) -> &CatchupConfig {
        &self.config
    }

    /// Deadline for a session opened now.
    pub fn default_deadline(&self) -> Instant {
        Instant::now() + self.config.proof_timeout()
    }

    fn reject<T>(&self, err: CatchupError) -> CatchupResult<T> {
        metrics::record_rejection(err.label());
        Err(err)
    }

    /// Close a session that reached its target and notify the observer.
    fn complete(&self, slot: &mut InstanceCatchup) -> Option<CatchupCompletion> {
        let session = slot.session.take()?;
        let completion = CatchupCompletion {
            instance_id: session.instance_id,
            session_id: session.session_id,
            started_from: session.started_from,
            last_seq_no: session.collected(),
        };
        info!(
            instance_id = %completion.instance_id,
            session_id = %completion.session_id,
            started_from = completion.started_from,
            last_seq_no = completion.last_seq_no,
            "Caught up"
        );
        metrics::record_session_finished(completion.instance_id.0, "completed");
        self.observer
            .catchup_completed(completion.instance_id, completion.last_seq_no);
        Some(completion)
    }

    fn close_aborted(session: CatchupSession, reason: AbortReason) -> CatchupAborted {
        warn!(
            instance_id = %session.instance_id,
            session_id = %session.session_id,
            phase = %session.phase,
            collected = session.collected(),
            reason = %reason,
            "Catch-up aborted"
        );
        metrics::record_session_finished(session.instance_id.0, "aborted");
        CatchupAborted {
            instance_id: session.instance_id,
            session_id: session.session_id,
            reason,
            collected: session.collected(),
        }
    }

    /// Checks a proof against the session without mutating it.
    fn validate_proof(
        session: &CatchupSession,
        proof: &ConsistencyProof,
    ) -> Result<(), CatchupError> {
        let instance_id = session.instance_id;
        if session.phase != CatchupPhase::ProvingConsistency {
            return Err(CatchupError::UnexpectedPhase {
                instance_id,
                expected: CatchupPhase::ProvingConsistency,
                actual: session.phase,
            });
        }
        let local_size = session.collected();
        if proof.start_seq_no != local_size {
            return Err(CatchupError::StaleProof {
                instance_id,
                expected: local_size,
                got: proof.start_seq_no,
            });
        }
        if proof.old_root != session.tree.root() {
            return Err(CatchupError::RootMismatch {
                instance_id,
                start_seq_no: proof.start_seq_no,
            });
        }
        Ok(())
    }

    fn proof_is_consistent(proof: &ConsistencyProof) -> bool {
        proof.end_seq_no >= proof.start_seq_no
            && verify_consistency(
                proof.start_seq_no,
                proof.end_seq_no,
                &proof.old_root,
                &proof.new_root,
                &proof.hashes,
            )
    }
}

#[async_trait]
impl CatchupApi for CatchupCoordinator {
    async fn start_catchup(
        &self,
        instance_id: InstanceId,
        deadline: Instant,
    ) -> CatchupResult<ConsistencyProofRequest> {
        let mut slot = instance_slot(&self.instances, instance_id)?.lock().await;
        if let Some(session) = &slot.session {
            return self.reject(CatchupError::AlreadyCatchingUp {
                instance_id,
                phase: session.phase,
            });
        }

        let tree = self.ledger.frontier(instance_id)?;
        let session = CatchupSession::new(instance_id, tree, deadline);
        let request = ConsistencyProofRequest {
            instance_id,
            start_seq_no: session.started_from,
        };
        info!(
            instance_id = %instance_id,
            session_id = %session.session_id,
            from_seq_no = session.started_from,
            "Starting catch-up"
        );
        metrics::record_session_started(instance_id.0);
        slot.session = Some(session);
        Ok(request)
    }

    async fn can_process_consistency_proof(&self, proof: &ConsistencyProof) -> bool {
        let Ok(slot) = instance_slot(&self.instances, proof.instance_id) else {
            return false;
        };
        let slot = slot.lock().await;
        slot.session.as_ref().is_some_and(|session| {
            Self::validate_proof(session, proof).is_ok() && Self::proof_is_consistent(proof)
        })
    }

    async fn process_consistency_proof(
        &self,
        proof: &ConsistencyProof,
        sender: &NodeName,
    ) -> CatchupResult<ProofOutcome> {
        let instance_id = proof.instance_id;
        let mut slot = instance_slot(&self.instances, instance_id)?.lock().await;
        let Some(session) = slot.session.as_mut() else {
            debug!(instance_id = %instance_id, sender = %sender, "Consistency proof outside catch-up");
            return self.reject(CatchupError::NoSession { instance_id });
        };

        if let Err(err) = Self::validate_proof(session, proof) {
            debug!(instance_id = %instance_id, sender = %sender, error = %err, "Discarding consistency proof");
            return self.reject(err);
        }
        if !Self::proof_is_consistent(proof) {
            let count = self
                .suspicions
                .record(instance_id, sender, Suspicion::InconsistentProof);
            warn!(
                instance_id = %instance_id,
                sender = %sender,
                start_seq_no = proof.start_seq_no,
                end_seq_no = proof.end_seq_no,
                count,
                "Consistency proof does not verify"
            );
            return self.reject(CatchupError::InconsistentProof {
                instance_id,
                sender: sender.clone(),
                start_seq_no: proof.start_seq_no,
                end_seq_no: proof.end_seq_no,
            });
        }
        if session.has_proof_from(sender) {
            return self.reject(CatchupError::DuplicateProof {
                instance_id,
                sender: sender.clone(),
            });
        }

        let claimed = CatchupTarget {
            seq_no: proof.end_seq_no,
            root: proof.new_root,
        };
        let matching = session.record_proof(sender.clone(), claimed);
        let quorum = self.quorums.consistency_proof();
        if matching < quorum {
            debug!(
                instance_id = %instance_id,
                sender = %sender,
                end_seq_no = proof.end_seq_no,
                matching,
                quorum,
                "Recorded consistency proof"
            );
            return Ok(ProofOutcome::Recorded { matching });
        }

        session.agree_on(claimed);
        if claimed.seq_no == session.collected() {
            info!(instance_id = %instance_id, seq_no = claimed.seq_no, "Ledger already current");
            return match self.complete(&mut slot) {
                Some(completion) => Ok(ProofOutcome::Completed(completion)),
                None => Err(CatchupError::NoSession { instance_id }),
            };
        }

        info!(
            instance_id = %instance_id,
            from_seq_no = session.collected(),
            target_seq_no = claimed.seq_no,
            "Catch-up target agreed"
        );
        Ok(ProofOutcome::TargetAgreed {
            target_seq_no: claimed.seq_no,
        })
    }

    fn process_consistency_proof_req(
        &self,
        request: &ConsistencyProofRequest,
        sender: &NodeName,
    ) -> CatchupResult<ConsistencyProof> {
        let instance_id = request.instance_id;
        instance_slot(&self.instances, instance_id)?;
        let size = self.ledger.size(instance_id)?;
        if request.start_seq_no > size {
            debug!(
                instance_id = %instance_id,
                sender = %sender,
                start_seq_no = request.start_seq_no,
                size,
                "Peer is ahead of us"
            );
            return self.reject(CatchupError::ProofStartBeyondLedger {
                instance_id,
                start_seq_no: request.start_seq_no,
                ledger_size: size,
            });
        }

        Ok(ConsistencyProof {
            instance_id,
            start_seq_no: request.start_seq_no,
            end_seq_no: size,
            old_root: self.ledger.root_at(instance_id, request.start_seq_no)?,
            new_root: self.ledger.root_at(instance_id, size)?,
            hashes: self
                .ledger
                .consistency_proof(instance_id, request.start_seq_no, size)?,
        })
    }

    async fn catchup_requests(
        &self,
        instance_id: InstanceId,
        peers: &[NodeName],
    ) -> CatchupResult<Vec<(NodeName, CatchupRequest)>> {
        if peers.is_empty() {
            return Err(CatchupError::NoPeers);
        }
        let slot = instance_slot(&self.instances, instance_id)?.lock().await;
        let session = slot
            .session
            .as_ref()
            .ok_or(CatchupError::NoSession { instance_id })?;
        let target = match (session.phase, session.target) {
            (CatchupPhase::CollectingReplies, Some(target)) => target,
            (actual, _) => {
                return Err(CatchupError::UnexpectedPhase {
                    instance_id,
                    expected: CatchupPhase::CollectingReplies,
                    actual,
                })
            }
        };

        let collected = session.collected();
        let gap = target.seq_no - collected;
        let per_peer = gap.div_ceil(peers.len() as u64);
        let batch = per_peer.min(self.config.max_batch_size).max(1);

        let mut requests = Vec::new();
        let mut first = collected + 1;
        for peer in peers.iter().cycle() {
            if first > target.seq_no {
                break;
            }
            let last = (first + batch - 1).min(target.seq_no);
            requests.push((
                peer.clone(),
                CatchupRequest {
                    instance_id,
                    first_seq_no: first,
                    last_seq_no: last,
                    catchup_till: target.seq_no,
                },
            ));
            first = last + 1;
        }
        debug!(
            instance_id = %instance_id,
            requests = requests.len(),
            batch,
            "Prepared catch-up requests"
        );
        Ok(requests)
    }

    fn process_catchup_req(
        &self,
        request: &CatchupRequest,
        sender: &NodeName,
    ) -> CatchupResult<CatchupReply> {
        let instance_id = request.instance_id;
        instance_slot(&self.instances, instance_id)?;
        let size = self.ledger.size(instance_id)?;
        let problem = if request.first_seq_no == 0 || request.first_seq_no > request.last_seq_no {
            Some(format!(
                "malformed range ({}, {})",
                request.first_seq_no, request.last_seq_no
            ))
        } else if request.last_seq_no > request.catchup_till {
            Some(format!(
                "range ends at {} past catchup_till {}",
                request.last_seq_no, request.catchup_till
            ))
        } else if request.catchup_till > size {
            Some(format!(
                "catchup_till {} beyond ledger size {size}",
                request.catchup_till
            ))
        } else {
            None
        };
        if let Some(reason) = problem {
            debug!(instance_id = %instance_id, sender = %sender, reason = %reason, "Cannot serve catch-up request");
            return self.reject(CatchupError::InvalidCatchupRequest {
                instance_id,
                reason,
            });
        }

        Ok(CatchupReply {
            instance_id,
            first_seq_no: request.first_seq_no,
            last_seq_no: request.last_seq_no,
            entries: self
                .ledger
                .entries(instance_id, request.first_seq_no, request.last_seq_no)?,
            cons_proof: self.ledger.consistency_proof(
                instance_id,
                request.last_seq_no,
                request.catchup_till,
            )?,
        })
    }

    async fn process_catchup_reply(
        &self,
        reply: &CatchupReply,
        sender: &NodeName,
    ) -> CatchupResult<ReplyOutcome> {
        let instance_id = reply.instance_id;
        let mut slot = instance_slot(&self.instances, instance_id)?.lock().await;
        let Some(session) = slot.session.as_mut() else {
            return self.reject(CatchupError::NoSession { instance_id });
        };
        let target = match (session.phase, session.target) {
            (CatchupPhase::CollectingReplies, Some(target)) => target,
            (actual, _) => {
                return self.reject(CatchupError::UnexpectedPhase {
                    instance_id,
                    expected: CatchupPhase::CollectingReplies,
                    actual,
                })
            }
        };

        let expected = session.collected() + 1;
        if reply.first_seq_no != expected {
            debug!(
                instance_id = %instance_id,
                sender = %sender,
                first_seq_no = reply.first_seq_no,
                expected,
                "Discarding non-contiguous catch-up reply"
            );
            return self.reject(CatchupError::NonContiguousBatch {
                instance_id,
                expected,
                got: reply.first_seq_no,
            });
        }
        let claimed = reply.claimed_len();
        let actual = reply.entries.len() as u64;
        if claimed == 0 || claimed != actual {
            return self.reject(CatchupError::BatchLengthMismatch {
                instance_id,
                claimed,
                actual,
            });
        }
        if reply.last_seq_no > target.seq_no {
            return self.reject(CatchupError::BatchBeyondTarget {
                instance_id,
                last_seq_no: reply.last_seq_no,
                target: target.seq_no,
            });
        }

        let mut extended = session.tree.clone();
        for entry in &reply.entries {
            extended.append_entry(entry);
        }
        if !verify_consistency(
            reply.last_seq_no,
            target.seq_no,
            &extended.root(),
            &target.root,
            &reply.cons_proof,
        ) {
            let count = self
                .suspicions
                .record(instance_id, sender, Suspicion::InvalidCatchupReply);
            warn!(
                instance_id = %instance_id,
                sender = %sender,
                first_seq_no = reply.first_seq_no,
                last_seq_no = reply.last_seq_no,
                count,
                "Catch-up reply does not match agreed root"
            );
            return self.reject(CatchupError::HashMismatch {
                instance_id,
                sender: sender.clone(),
                first_seq_no: reply.first_seq_no,
                last_seq_no: reply.last_seq_no,
            });
        }

        self.ledger
            .append_entries(instance_id, reply.first_seq_no, reply.entries.clone())
            .await?;
        session.tree = extended;
        metrics::record_entries_applied(instance_id.0, actual);

        let collected = session.collected();
        if collected < target.seq_no {
            debug!(
                instance_id = %instance_id,
                sender = %sender,
                collected,
                target_seq_no = target.seq_no,
                "Applied catch-up batch"
            );
            return Ok(ReplyOutcome::Accepted {
                collected,
                remaining: target.seq_no - collected,
            });
        }
        match self.complete(&mut slot) {
            Some(completion) => Ok(ReplyOutcome::Completed(completion)),
            None => Err(CatchupError::NoSession { instance_id }),
        }
    }

    async fn expire_sessions(&self, now: Instant) -> Vec<CatchupAborted> {
        let mut aborted = Vec::new();
        for slot in &self.instances {
            let mut slot = slot.lock().await;
            if slot.session.as_ref().is_some_and(|s| s.is_expired(now)) {
                if let Some(session) = slot.session.take() {
                    aborted.push(Self::close_aborted(session, AbortReason::Timeout));
                }
            }
        }
        aborted
    }

    async fn abort(
        &self,
        instance_id: InstanceId,
        reason: AbortReason,
    ) -> CatchupResult<CatchupAborted> {
        let mut slot = instance_slot(&self.instances, instance_id)?.lock().await;
        let session = slot
            .session
            .take()
            .ok_or(CatchupError::NoSession { instance_id })?;
        Ok(Self::close_aborted(session, reason))
    }

    async fn phase(&self, instance_id: InstanceId) -> CatchupResult<CatchupPhase> {
        let slot = instance_slot(&self.instances, instance_id)?.lock().await;
        Ok(slot
            .session
            .as_ref()
            .map_or(CatchupPhase::Idle, |session| session.phase))
    }
}
