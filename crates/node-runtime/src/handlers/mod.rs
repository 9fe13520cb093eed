//! # Message Handlers
//!
//! `handle_message` dispatches each inbound peer message to the subsystem
//! that owns it. The per-subsystem handlers are `impl ReplicaNode` blocks
//! in the submodules.

mod catchup;
mod checkpoints;
mod selection;

use shared_types::{NodeName, ReplicaMessage};

use crate::error::NodeResult;
use crate::node::ReplicaNode;

impl ReplicaNode {
    /// Route one inbound message from `sender`.
    ///
    /// Failures are logged; invariant violations are also published on the
    /// bus. The error is returned so the caller can decide about the peer.
    pub async fn handle_message(&self, sender: &NodeName, message: ReplicaMessage) -> NodeResult<()> {
        let message_type = message.type_name();
        let instance_id = message.instance_id();
        let _timer = replica_telemetry::message_timer(message_type);

        let result = match message {
            ReplicaMessage::ViewChangeDone(msg) => self.on_view_change_done(sender, msg).await,
            ReplicaMessage::DigestVote(vote) => self.on_digest_vote(sender, vote).await,
            ReplicaMessage::ConsistencyProof(proof) => self.on_consistency_proof(sender, proof).await,
            ReplicaMessage::ConsistencyProofRequest(request) => {
                self.on_consistency_proof_req(sender, request).await
            }
            ReplicaMessage::CatchupRequest(request) => self.on_catchup_req(sender, request).await,
            ReplicaMessage::CatchupReply(reply) => self.on_catchup_reply(sender, reply).await,
        };

        replica_telemetry::record_message_routed(message_type, result.is_ok());
        if let Err(err) = &result {
            self.report(instance_id, err).await;
        }
        result
    }
}
