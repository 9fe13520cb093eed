//! Primary selection: startup, view changes and `ViewChangeDone` traffic.

use bft_01_primary_selector::domain::select_rank;
use bft_01_primary_selector::{DeclarationOutcome, PrimaryChanged, SelectionMode};
use shared_bus::ReplicaEvent;
use shared_types::{InstanceId, NodeName, ReplicaMessage, ViewChangeDone, ViewNo};
use tracing::{debug, info};

use crate::error::NodeResult;
use crate::node::ReplicaNode;

impl ReplicaNode {
    /// Install primaries for the current view.
    pub async fn start(&self) -> NodeResult<Vec<PrimaryChanged>> {
        let changes = self.subsystems.selector.start_selection()?;
        self.publish_primaries(&changes).await;
        info!(node = %self.name, installed = changes.len(), "Replica node started");
        Ok(changes)
    }

    /// The view-change protocol finished and the pool moved to `view_no`.
    ///
    /// In quorum-confirmed mode the node also declares its own candidate
    /// for every instance still without a primary.
    pub async fn on_view_change(&self, view_no: ViewNo) -> NodeResult<Vec<PrimaryChanged>> {
        let selector = &self.subsystems.selector;
        let from = selector.view_no();
        let mut changes = selector.on_view_changed(view_no)?;
        self.publish(ReplicaEvent::ViewChanged { from, to: view_no }).await;

        if selector.config().mode == SelectionMode::QuorumConfirmed {
            changes.extend(self.declare_candidates(view_no).await?);
        }
        self.publish_primaries(&changes).await;
        Ok(changes)
    }

    async fn declare_candidates(&self, view_no: ViewNo) -> NodeResult<Vec<PrimaryChanged>> {
        let selector = &self.subsystems.selector;
        let previous_master = selector.previous_master_primary();
        let mut installed = Vec::new();

        for index in 0..self.config.instance_count {
            let instance_id = InstanceId(index as u32);
            if selector.primary_of(instance_id)?.is_some() {
                continue;
            }
            let exclude = previous_master.as_ref().filter(|_| instance_id.is_master());
            let Some(candidate) =
                select_rank(instance_id, view_no, self.subsystems.registry.as_ref(), exclude)
            else {
                continue;
            };

            match selector.record_declaration(instance_id, view_no, &self.name, &candidate) {
                Ok(DeclarationOutcome::PrimaryInstalled(changed)) => installed.push(changed),
                Ok(_) => {}
                Err(err) => {
                    debug!(instance_id = %instance_id, error = %err, "Own declaration not recorded");
                    continue;
                }
            }
            self.transport
                .broadcast(ReplicaMessage::ViewChangeDone(ViewChangeDone {
                    candidate_primary_name: candidate,
                    instance_id,
                    view_no,
                    proof: None,
                }))
                .await;
        }
        Ok(installed)
    }

    pub(crate) async fn on_view_change_done(
        &self,
        sender: &NodeName,
        msg: ViewChangeDone,
    ) -> NodeResult<()> {
        if let DeclarationOutcome::PrimaryInstalled(changed) =
            self.subsystems.selector.process_view_change_done(&msg, sender)?
        {
            self.publish_primaries(&[changed]).await;
        }
        Ok(())
    }

    /// Tell `to` about the primaries of the current view.
    ///
    /// Instances this node is still catching up on are skipped. Returns the
    /// number of messages sent.
    pub async fn sync_lagging_node(&self, to: &NodeName) -> usize {
        let mut sent = 0;
        for msg in self.subsystems.selector.pending_sync_messages() {
            if self.is_catching_up(msg.instance_id).await {
                debug!(instance_id = %msg.instance_id, to = %to, "Skipping sync while catching up");
                continue;
            }
            self.transport
                .send(to, ReplicaMessage::ViewChangeDone(msg))
                .await;
            sent += 1;
        }
        sent
    }

    async fn publish_primaries(&self, changes: &[PrimaryChanged]) {
        for changed in changes {
            self.publish(ReplicaEvent::PrimaryChanged {
                instance_id: changed.instance_id,
                view_no: changed.view_no,
                primary: changed.primary.clone(),
                quorum_confirmed: changed.quorum_confirmed,
            })
            .await;
        }
    }
}
