//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Logging and metrics settings for a replica process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// Name of the local node (e.g. "Alpha").
    pub node_name: String,

    /// Log level filter directive (trace, debug, info, warn, error or a
    /// full `EnvFilter` directive).
    pub log_level: String,

    /// Emit JSON formatted logs instead of human readable ones.
    pub json_logs: bool,

    /// Include file and line numbers in log output.
    pub with_source_location: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "bft-replica".to_string(),
            node_name: "node".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_source_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BFT_SERVICE_NAME`: Service name (default: bft-replica)
    /// - `BFT_NODE_NAME`: Local node name (default: node)
    /// - `BFT_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `BFT_JSON_LOGS`: JSON output (default: false, true in containers)
    /// - `BFT_LOG_SOURCE`: Include file/line (default: false)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let defaults = Self::default();

        Self {
            service_name: env::var("BFT_SERVICE_NAME").unwrap_or(defaults.service_name),
            node_name: env::var("BFT_NODE_NAME").unwrap_or(defaults.node_name),
            log_level: env::var("BFT_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: env::var("BFT_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),
            with_source_location: env::var("BFT_LOG_SOURCE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.with_source_location),
        }
    }

    /// Configuration for a named node, everything else from the environment.
    pub fn for_node(node_name: &str) -> Self {
        let mut config = Self::from_env();
        config.node_name = node_name.to_string();
        config
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
