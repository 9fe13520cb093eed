//! # Selection Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `selector_primaries_installed_total` - primaries installed, by instance and source
//! - `selector_declarations_rejected_total` - rejected declarations, by reason
//! - `selector_view_no` - current view

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_gauge, register_int_counter_vec, Gauge, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref PRIMARIES_INSTALLED: IntCounterVec = register_int_counter_vec!(
        "selector_primaries_installed_total",
        "Primaries installed per instance",
        &["instance", "source"]
    )
    .expect("Failed to create PRIMARIES_INSTALLED metric");

    pub static ref DECLARATIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "selector_declarations_rejected_total",
        "Primary declarations rejected",
        &["reason"]
    )
    .expect("Failed to create DECLARATIONS_REJECTED metric");

    pub static ref VIEW_NO: Gauge = register_gauge!(
        "selector_view_no",
        "Current view number"
    )
    .expect("Failed to create VIEW_NO metric");
}

#[cfg(feature = "metrics")]
pub fn record_primary_installed(instance: u32, quorum_confirmed: bool) {
    let source = if quorum_confirmed { "quorum" } else { "fallback" };
    PRIMARIES_INSTALLED
        .with_label_values(&[&instance.to_string(), source])
        .inc();
}

#[cfg(feature = "metrics")]
pub fn record_declaration_rejected(reason: &str) {
    DECLARATIONS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn set_view_no(view_no: u64) {
    VIEW_NO.set(view_no as f64);
}

#[cfg(not(feature = "metrics"))]
pub fn record_primary_installed(_instance: u32, _quorum_confirmed: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_declaration_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_view_no(_view_no: u64) {}
