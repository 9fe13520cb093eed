//! # Catch-up Metrics
//!
//! Enable with the `metrics` feature.
//!
//! ## Metrics Exported
//!
//! - `catchup_sessions_started_total` - Sessions opened, by instance
//! - `catchup_sessions_finished_total` - Sessions closed, by instance and outcome
//! - `catchup_entries_applied_total` - Entries accepted from reply batches, by instance
//! - `catchup_rejections_total` - Rejected proofs, replies and requests, by reason

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref SESSIONS_STARTED: IntCounterVec = register_int_counter_vec!(
        "catchup_sessions_started_total",
        "Catch-up sessions opened",
        &["instance"]
    )
    .expect("Failed to create SESSIONS_STARTED metric");

    pub static ref SESSIONS_FINISHED: IntCounterVec = register_int_counter_vec!(
        "catchup_sessions_finished_total",
        "Catch-up sessions closed",
        &["instance", "outcome"]
    )
    .expect("Failed to create SESSIONS_FINISHED metric");

    pub static ref ENTRIES_APPLIED: IntCounterVec = register_int_counter_vec!(
        "catchup_entries_applied_total",
        "Ledger entries accepted during catch-up",
        &["instance"]
    )
    .expect("Failed to create ENTRIES_APPLIED metric");

    pub static ref REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "catchup_rejections_total",
        "Catch-up messages rejected",
        &["reason"]
    )
    .expect("Failed to create REJECTIONS metric");
}

#[cfg(feature = "metrics")]
pub fn record_session_started(instance: u32) {
    SESSIONS_STARTED
        .with_label_values(&[&instance.to_string()])
        .inc();
}

#[cfg(feature = "metrics")]
pub fn record_session_finished(instance: u32, outcome: &str) {
    SESSIONS_FINISHED
        .with_label_values(&[&instance.to_string(), outcome])
        .inc();
}

#[cfg(feature = "metrics")]
pub fn record_entries_applied(instance: u32, count: u64) {
    ENTRIES_APPLIED
        .with_label_values(&[&instance.to_string()])
        .inc_by(count);
}

#[cfg(feature = "metrics")]
pub fn record_rejection(reason: &str) {
    REJECTIONS.with_label_values(&[reason]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_session_started(_instance: u32) {}

#[cfg(not(feature = "metrics"))]
pub fn record_session_finished(_instance: u32, _outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_entries_applied(_instance: u32, _count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejection(_reason: &str) {}
