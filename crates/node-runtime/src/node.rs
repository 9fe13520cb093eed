//! # Replica Node
//!
//! One replica's view of the pool: the three subsystems, the outbound
//! transport and the event bus, driven by inbound peer messages, ordering
//! notifications, view changes and clock ticks.
//!
//! Handlers live in `crate::handlers`, one file per subsystem. This module
//! owns construction and the cross-cutting helpers they share.

use std::sync::Arc;

use anyhow::Result;
use bft_03_catchup::{CatchupApi, LedgerGateway};
use parking_lot::Mutex;
use replica_telemetry::log_instance_event;
use shared_bus::{EventPublisher, InMemoryEventBus, ReplicaEvent};
use shared_types::{CatchupReply, Classify, ErrorKind, InstanceId, NodeName};
use tracing::{error, info, trace};

use crate::adapters::Transport;
use crate::container::{NodeConfig, SubsystemContainer};
use crate::error::NodeError;

/// A replica participating in every consensus instance of the pool.
pub struct ReplicaNode {
    pub(crate) name: NodeName,
    pub(crate) config: NodeConfig,
    pub(crate) subsystems: SubsystemContainer,
    pub(crate) transport: Arc<dyn Transport>,
    /// Catch-up replies that arrived ahead of the collected prefix.
    pub(crate) early_replies: Mutex<Vec<(NodeName, CatchupReply)>>,
}

impl ReplicaNode {
    /// Validate `config` and build every subsystem over `ledger`.
    pub fn new(
        config: NodeConfig,
        ledger: Arc<dyn LedgerGateway>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let subsystems = SubsystemContainer::build(&config, ledger)?;
        let name = config.node();
        info!(node = %name, peers = config.peers().len(), "Replica node created");
        Ok(Self {
            name,
            config,
            subsystems,
            transport,
            early_replies: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn subsystems(&self) -> &SubsystemContainer {
        &self.subsystems
    }

    pub fn event_bus(&self) -> Arc<InMemoryEventBus> {
        self.subsystems.event_bus.clone()
    }

    /// Every other node in the pool, in rank order.
    pub fn peers(&self) -> Vec<NodeName> {
        self.config.peers()
    }

    /// Whether `instance_id` has a catch-up session in progress.
    pub async fn is_catching_up(&self, instance_id: InstanceId) -> bool {
        self.subsystems
            .catchup
            .phase(instance_id)
            .await
            .map(|phase| phase.is_active())
            .unwrap_or(false)
    }

    pub(crate) async fn publish(&self, event: ReplicaEvent) {
        let topic = event.topic();
        let receivers = self.subsystems.event_bus.publish(event).await;
        replica_telemetry::record_event_published(topic.as_str());
        trace!(topic = topic.as_str(), receivers, "Replica event published");
    }

    /// Log a failed operation; invariant violations also go on the bus.
    pub(crate) async fn report(&self, instance_id: InstanceId, err: &NodeError) {
        match err.kind() {
            ErrorKind::InvariantViolation => {
                error!(
                    node = %self.name,
                    instance_id = %instance_id,
                    error = %err,
                    "Invariant violation"
                );
                self.publish(ReplicaEvent::InvariantViolation {
                    instance_id,
                    detail: err.to_string(),
                })
                .await;
            }
            ErrorKind::Aborted => {
                log_instance_event!(warn, "node", instance_id, "Operation aborted", reason = err.label(), error = %err);
            }
            ErrorKind::Rejected => {
                log_instance_event!(debug, "node", instance_id, "Message rejected", reason = err.label());
            }
        }
    }
}
