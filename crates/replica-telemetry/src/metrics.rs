//! Process-wide Prometheus metrics.
//!
//! Subsystem crates register their own collectors in the default registry
//! behind their `metrics` feature; this module owns the node-level ones and
//! renders everything in the text exposition format.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, Histogram, HistogramVec,
    IntCounterVec, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Events published on the replica event bus, by topic.
    pub static ref BUS_EVENTS_PUBLISHED: IntCounterVec = register_int_counter_vec!(
        "bft_bus_events_published_total",
        "Events published on the replica event bus",
        &["topic"]
    )
    .expect("Failed to create BUS_EVENTS_PUBLISHED metric");

    /// Inbound peer messages routed, by message type.
    pub static ref MESSAGES_ROUTED: IntCounterVec = register_int_counter_vec!(
        "bft_messages_routed_total",
        "Inbound peer messages routed to a subsystem",
        &["message_type", "outcome"]
    )
    .expect("Failed to create MESSAGES_ROUTED metric");

    /// Time spent handling one inbound message, by message type.
    pub static ref MESSAGE_HANDLING_SECONDS: HistogramVec = register_histogram_vec!(
        "bft_message_handling_seconds",
        "Time spent handling one inbound peer message",
        &["message_type"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]
    )
    .expect("Failed to create MESSAGE_HANDLING_SECONDS metric");
}

/// Count one bus publication.
pub fn record_event_published(topic: &str) {
    BUS_EVENTS_PUBLISHED.with_label_values(&[topic]).inc();
}

/// Count one routed inbound message.
pub fn record_message_routed(message_type: &str, accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    MESSAGES_ROUTED
        .with_label_values(&[message_type, outcome])
        .inc();
}

/// Timer observing into the handling histogram for `message_type`.
pub fn message_timer(message_type: &str) -> HistogramTimer {
    HistogramTimer::new(&MESSAGE_HANDLING_SECONDS.with_label_values(&[message_type]))
}

/// Render every registered metric in Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

/// Observes elapsed seconds into a histogram when dropped.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start timing.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
