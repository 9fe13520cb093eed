//! # Replica Node
//!
//! Standalone replica with an in-memory ledger and a loopback transport.
//! Configuration comes from `BFT_*` environment variables (see
//! [`NodeConfig::from_env`]).
//!
//! ## Startup Sequence
//!
//! 1. Load and validate configuration
//! 2. Initialize logging
//! 3. Build subsystems and install view-0 primaries
//! 4. Expire overdue catch-up sessions once per second until Ctrl-C

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use bft_03_catchup::InMemoryLedger;
use node_runtime::{InMemoryTransport, NodeConfig, ReplicaNode};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("loading configuration")?;
    replica_telemetry::init_telemetry(&config.telemetry()).context("initializing telemetry")?;
    config.validate()?;

    let ledger = Arc::new(InMemoryLedger::new(config.instance_count));
    let transport = Arc::new(InMemoryTransport::new());
    let node = ReplicaNode::new(config, ledger, transport.clone())?;
    node.start().await?;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let aborted = node.tick(tokio::time::Instant::now()).await;
                if !aborted.is_empty() {
                    warn!(sessions = aborted.len(), "Catch-up sessions expired");
                }
                // No peers are attached; drop whatever was queued.
                transport.drain();
            }
            _ = tokio::signal::ctrl_c() => {
                info!(node = %node.name(), "Shutting down");
                break;
            }
        }
    }

    match replica_telemetry::encode_metrics() {
        Ok(metrics) => info!(bytes = metrics.len(), "Final metrics snapshot encoded"),
        Err(err) => warn!(error = %err, "Could not encode metrics"),
    }
    Ok(())
}
