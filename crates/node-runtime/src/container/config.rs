//! # Node Configuration
//!
//! Unified configuration for the replica subsystems.
//!
//! Loaded from defaults, a JSON document or environment variables, then
//! validated once before any subsystem is built. The per-subsystem
//! `instance_count` always mirrors the node-level value.

use anyhow::{bail, ensure, Context, Result};
use bft_01_primary_selector::{SelectionMode, SelectorConfig};
use bft_02_checkpoints::CheckpointConfig;
use bft_03_catchup::CatchupConfig;
use replica_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use shared_types::{max_failures, NodeName};
use std::collections::HashSet;
use std::str::FromStr;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Name of this node; must appear in `node_names`.
    pub node_name: String,
    /// The pool in rank order.
    pub node_names: Vec<String>,
    /// Consensus instances run in parallel (master + backups).
    pub instance_count: usize,
    pub selector: SelectorConfig,
    pub checkpoints: CheckpointConfig,
    pub catchup: CatchupConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let node_names: Vec<String> = ["Alpha", "Beta", "Gamma", "Delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let instance_count = max_failures(node_names.len()) + 1;
        Self {
            node_name: node_names[0].clone(),
            node_names,
            instance_count,
            selector: SelectorConfig::default(),
            checkpoints: CheckpointConfig::default(),
            catchup: CatchupConfig::default(),
        }
        .with_instance_count(instance_count)
    }
}

impl NodeConfig {
    /// Four-node pool with small windows, seen from `node_name`.
    pub fn for_testing(node_name: &str) -> Self {
        Self {
            node_name: node_name.to_string(),
            selector: SelectorConfig::for_testing(),
            checkpoints: CheckpointConfig::for_testing(),
            catchup: CatchupConfig::for_testing(),
            ..Self::default()
        }
    }

    /// Set the instance count here and in every subsystem config.
    pub fn with_instance_count(mut self, instance_count: usize) -> Self {
        self.instance_count = instance_count;
        self.selector.instance_count = instance_count;
        self.checkpoints.instance_count = instance_count;
        self.catchup.instance_count = instance_count;
        self
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("parsing node configuration")?;
        let instance_count = config.instance_count;
        Ok(config.with_instance_count(instance_count))
    }

    /// Defaults overridden by `BFT_*` environment variables.
    ///
    /// - `BFT_NODE_NAME`, `BFT_NODE_NAMES` (comma separated, rank order)
    /// - `BFT_INSTANCE_COUNT`
    /// - `BFT_SELECTION_MODE` (`round_robin` or `quorum_confirmed`)
    /// - `BFT_CHK_FREQ`, `BFT_LOG_SIZE`
    /// - `BFT_CATCHUP_TIMEOUT_SECS`, `BFT_CATCHUP_BATCH_SIZE`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(names) = lookup("BFT_NODE_NAMES") {
            config.node_names = names
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            let instance_count = max_failures(config.node_names.len()) + 1;
            config = config.with_instance_count(instance_count);
        }
        if let Some(name) = lookup("BFT_NODE_NAME") {
            config.node_name = name;
        }
        if let Some(count) = parse_var::<usize>(&lookup, "BFT_INSTANCE_COUNT")? {
            config = config.with_instance_count(count);
        }
        if let Some(mode) = lookup("BFT_SELECTION_MODE") {
            config.selector.mode = match mode.to_lowercase().as_str() {
                "round_robin" => SelectionMode::RoundRobin,
                "quorum_confirmed" => SelectionMode::QuorumConfirmed,
                other => bail!("BFT_SELECTION_MODE: unknown mode {other:?}"),
            };
        }
        if let Some(freq) = parse_var(&lookup, "BFT_CHK_FREQ")? {
            config.checkpoints.chk_freq = freq;
        }
        if let Some(size) = parse_var(&lookup, "BFT_LOG_SIZE")? {
            config.checkpoints.log_size = size;
        }
        if let Some(secs) = parse_var(&lookup, "BFT_CATCHUP_TIMEOUT_SECS")? {
            config.catchup.proof_timeout_secs = secs;
        }
        if let Some(batch) = parse_var(&lookup, "BFT_CATCHUP_BATCH_SIZE")? {
            config.catchup.max_batch_size = batch;
        }
        Ok(config)
    }

    /// Reject configurations the node cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.node_names.is_empty(), "node_names must not be empty");
        let unique: HashSet<&String> = self.node_names.iter().collect();
        ensure!(
            unique.len() == self.node_names.len(),
            "node_names contains duplicates"
        );
        ensure!(
            self.node_names.contains(&self.node_name),
            "node {} is not in the pool",
            self.node_name
        );
        ensure!(
            self.selector.instance_count == self.instance_count
                && self.checkpoints.instance_count == self.instance_count
                && self.catchup.instance_count == self.instance_count,
            "subsystem instance counts differ from instance_count {}",
            self.instance_count
        );
        self.selector.validate().context("selector configuration")?;
        self.checkpoints
            .validate()
            .context("checkpoint configuration")?;
        self.catchup.validate().context("catch-up configuration")?;
        Ok(())
    }

    pub fn node(&self) -> NodeName {
        NodeName::new(self.node_name.clone())
    }

    /// Every other node in the pool, in rank order.
    pub fn peers(&self) -> Vec<NodeName> {
        self.node_names
            .iter()
            .filter(|name| **name != self.node_name)
            .map(|name| NodeName::new(name.clone()))
            .collect()
    }

    /// Telemetry settings for this node, with environment overrides.
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            node_name: self.node_name.clone(),
            ..TelemetryConfig::from_env()
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{key}={raw:?}")))
        .transpose()
}
