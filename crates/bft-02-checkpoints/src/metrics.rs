//! # Checkpoint Metrics
//!
//! Prometheus metrics for checkpoint stabilization.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! bft-02-checkpoints = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `checkpoints_stabilized_total` - Counter of stabilized checkpoints, by instance
//! - `checkpoints_low_watermark` - Gauge of the low watermark, by instance
//! - `checkpoints_votes_rejected_total` - Counter of rejected digest votes, by reason
//! - `checkpoints_lag_detected_total` - Counter of quorums seen beyond the high watermark

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_gauge_vec, register_int_counter_vec, GaugeVec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref CHECKPOINTS_STABILIZED: IntCounterVec = register_int_counter_vec!(
        "checkpoints_stabilized_total",
        "Total checkpoints stabilized by quorum",
        &["instance"]
    )
    .expect("Failed to create CHECKPOINTS_STABILIZED metric");

    pub static ref LOW_WATERMARK: GaugeVec = register_gauge_vec!(
        "checkpoints_low_watermark",
        "Current low watermark h",
        &["instance"]
    )
    .expect("Failed to create LOW_WATERMARK metric");

    pub static ref VOTES_REJECTED: IntCounterVec = register_int_counter_vec!(
        "checkpoints_votes_rejected_total",
        "Digest votes rejected",
        &["reason"]
    )
    .expect("Failed to create VOTES_REJECTED metric");

    pub static ref LAG_DETECTED: IntCounterVec = register_int_counter_vec!(
        "checkpoints_lag_detected_total",
        "Quorums observed for windows beyond the high watermark",
        &["instance"]
    )
    .expect("Failed to create LAG_DETECTED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_stabilized(instance: u32, low: u64) {
    let label = instance.to_string();
    CHECKPOINTS_STABILIZED.with_label_values(&[&label]).inc();
    LOW_WATERMARK.with_label_values(&[&label]).set(low as f64);
}

#[cfg(feature = "metrics")]
pub fn set_low_watermark(instance: u32, low: u64) {
    LOW_WATERMARK
        .with_label_values(&[&instance.to_string()])
        .set(low as f64);
}

#[cfg(feature = "metrics")]
pub fn record_vote_rejected(reason: &str) {
    VOTES_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_lag_detected(instance: u32) {
    LAG_DETECTED.with_label_values(&[&instance.to_string()]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_stabilized(_instance: u32, _low: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_low_watermark(_instance: u32, _low: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_lag_detected(_instance: u32) {}
