//! Prometheus metrics for the echo service.
//!
//! Accepted and closed are monotonic event counters incremented when a
//! connection opens or terminates; the active gauge is refreshed from the
//! shared counters at scrape time.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "wsecho";

lazy_static! {
    /// Total WebSocket connections accepted
    pub static ref CONNECTIONS_ACCEPTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_connections_accepted_total", METRIC_PREFIX),
        "Total number of WebSocket connections accepted"
    ).unwrap();

    /// Total WebSocket connections closed
    pub static ref CONNECTIONS_CLOSED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_connections_closed_total", METRIC_PREFIX),
        "Total number of WebSocket connections closed"
    ).unwrap();

    /// Current number of active WebSocket connections
    pub static ref CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_connections_active", METRIC_PREFIX),
        "Current number of active WebSocket connections"
    ).unwrap();

    /// Messages echoed back to clients, by frame kind
    pub static ref MESSAGES_ECHOED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_echoed_total", METRIC_PREFIX),
        "Total messages echoed back to clients",
        &["kind"]
    ).unwrap();

    /// WebSocket connection duration
    pub static ref CONNECTION_DURATION: Histogram = register_histogram!(
        format!("{}_connection_duration_seconds", METRIC_PREFIX),
        "WebSocket connection duration in seconds",
        vec![1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 600.0, 1800.0, 3600.0]
    ).unwrap();
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording echo metrics
pub struct EchoMetrics;

impl EchoMetrics {
    /// Record a text frame echoed back
    pub fn record_text() {
        MESSAGES_ECHOED_TOTAL.with_label_values(&["text"]).inc();
    }

    /// Record a binary frame echoed back
    pub fn record_binary() {
        MESSAGES_ECHOED_TOTAL.with_label_values(&["binary"]).inc();
    }
}
