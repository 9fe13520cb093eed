//! Driving Ports (API - Inbound)
//!
//! Requester-side operations drive one instance's session; responder-side
//! operations (`process_consistency_proof_req`, `process_catchup_req`)
//! serve peers from the local ledger and never touch session state.

use crate::domain::{AbortReason, CatchupPhase};
use crate::error::CatchupResult;
use async_trait::async_trait;
use shared_types::{
    CatchupReply, CatchupRequest, ConsistencyProof, ConsistencyProofRequest, InstanceId, NodeName,
    SeqNo,
};
use tokio::time::Instant;
use uuid::Uuid;

/// A session that reached its target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchupCompletion {
    pub instance_id: InstanceId,
    pub session_id: Uuid,
    pub started_from: SeqNo,
    pub last_seq_no: SeqNo,
}

/// A session that ended early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchupAborted {
    pub instance_id: InstanceId,
    pub session_id: Uuid,
    pub reason: AbortReason,
    /// Ledger size at abort; a retry resumes from here.
    pub collected: SeqNo,
}

/// Result of accepting one consistency proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofOutcome {
    /// Counted; not enough matching proofs yet.
    Recorded { matching: usize },
    /// Quorum agreed on a target beyond the local ledger.
    TargetAgreed { target_seq_no: SeqNo },
    /// Quorum agreed the local ledger is already current.
    Completed(CatchupCompletion),
}

/// Result of accepting one reply batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Batch applied; more entries needed.
    Accepted { collected: SeqNo, remaining: u64 },
    /// Batch applied and the target reached.
    Completed(CatchupCompletion),
}

/// Primary Catch-up API
#[async_trait]
pub trait CatchupApi: Send + Sync {
    /// Open a session from the current ledger size.
    async fn start_catchup(
        &self,
        instance_id: InstanceId,
        deadline: Instant,
    ) -> CatchupResult<ConsistencyProofRequest>;

    /// Side-effect free check that `proof` could advance the session.
    async fn can_process_consistency_proof(&self, proof: &ConsistencyProof) -> bool;

    async fn process_consistency_proof(
        &self,
        proof: &ConsistencyProof,
        sender: &NodeName,
    ) -> CatchupResult<ProofOutcome>;

    fn process_consistency_proof_req(
        &self,
        request: &ConsistencyProofRequest,
        sender: &NodeName,
    ) -> CatchupResult<ConsistencyProof>;

    /// Split the remaining gap into requests spread over `peers`.
    async fn catchup_requests(
        &self,
        instance_id: InstanceId,
        peers: &[NodeName],
    ) -> CatchupResult<Vec<(NodeName, CatchupRequest)>>;

    fn process_catchup_req(
        &self,
        request: &CatchupRequest,
        sender: &NodeName,
    ) -> CatchupResult<CatchupReply>;

    async fn process_catchup_reply(
        &self,
        reply: &CatchupReply,
        sender: &NodeName,
    ) -> CatchupResult<ReplyOutcome>;

    /// Abort every session whose deadline is at or before `now`.
    async fn expire_sessions(&self, now: Instant) -> Vec<CatchupAborted>;

    async fn abort(&self, instance_id: InstanceId, reason: AbortReason)
        -> CatchupResult<CatchupAborted>;

    async fn phase(&self, instance_id: InstanceId) -> CatchupResult<CatchupPhase>;
}
