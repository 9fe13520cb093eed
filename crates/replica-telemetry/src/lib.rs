//! # Replica Telemetry
//!
//! Logging and metrics setup shared by every replica crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use replica_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BFT_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `BFT_JSON_LOGS` | `false` | JSON formatted output |
//! | `BFT_NODE_NAME` | `node` | Node name in log lines |

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, message_timer, record_event_published, record_message_routed, HistogramTimer,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Tracing already initialized: {0}")]
    AlreadyInitialized(String),

    /// Metrics could not be rendered.
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialise logging for the process.
///
/// A second call returns [`TelemetryError::AlreadyInitialized`], which
/// callers running several nodes in one process may ignore.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(config)
}

/// Span carrying the subsystem and instance.
#[macro_export]
macro_rules! instance_span {
    ($name:expr, $subsystem:expr, $instance_id:expr) => {
        tracing::info_span!($name, subsystem = $subsystem, instance_id = %$instance_id)
    };
}
