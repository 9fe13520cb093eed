//! # Subsystem Container
//!
//! Builds the three replica subsystems around one shared registry, quorum
//! table, suspicion ledger and event bus.
//!
//! ```text
//! NodeConfig ──▶ StaticNodeRegistry ──▶ PrimarySelector
//!            ──▶ Quorums ─────────────▶ CheckpointStore ◀── CheckpointResetObserver
//!            ──▶ LedgerGateway ───────▶ CatchupCoordinator ──────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use bft_01_primary_selector::{PrimarySelector, StaticNodeRegistry};
use bft_02_checkpoints::CheckpointStore;
use bft_03_catchup::{CatchupCoordinator, LedgerGateway};
use shared_bus::InMemoryEventBus;
use shared_types::{Quorums, SuspicionCounters};

use crate::adapters::CheckpointResetObserver;
use crate::container::config::NodeConfig;

/// Every subsystem instance of one node.
pub struct SubsystemContainer {
    pub selector: Arc<PrimarySelector>,
    pub checkpoints: Arc<CheckpointStore>,
    pub catchup: Arc<CatchupCoordinator>,
    pub registry: Arc<StaticNodeRegistry>,
    pub reset_observer: Arc<CheckpointResetObserver>,
    pub event_bus: Arc<InMemoryEventBus>,
    pub suspicions: Arc<SuspicionCounters>,
    pub quorums: Quorums,
}

impl SubsystemContainer {
    /// Validate `config` and build every subsystem.
    pub fn build(config: &NodeConfig, ledger: Arc<dyn LedgerGateway>) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(StaticNodeRegistry::new(config.node_names.iter().cloned()));
        let quorums = Quorums::new(config.node_names.len());
        let suspicions = Arc::new(SuspicionCounters::new());
        let event_bus = Arc::new(InMemoryEventBus::new());

        let selector = Arc::new(
            PrimarySelector::new(config.selector.clone(), registry.clone(), suspicions.clone())
                .context("building primary selector")?,
        );
        let checkpoints = Arc::new(
            CheckpointStore::new(config.checkpoints.clone(), quorums, suspicions.clone())
                .context("building checkpoint store")?,
        );
        let reset_observer = Arc::new(CheckpointResetObserver::new(checkpoints.clone()));
        let catchup = Arc::new(
            CatchupCoordinator::new(
                config.catchup.clone(),
                quorums,
                ledger,
                reset_observer.clone(),
                suspicions.clone(),
            )
            .context("building catch-up coordinator")?,
        );

        info!(
            node = %config.node_name,
            n = quorums.n,
            f = quorums.f,
            instances = config.instance_count,
            "Replica subsystems initialized"
        );

        Ok(Self {
            selector,
            checkpoints,
            catchup,
            registry,
            reset_observer,
            event_bus,
            suspicions,
            quorums,
        })
    }
}
