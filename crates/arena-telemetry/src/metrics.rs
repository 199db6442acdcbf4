//! Prometheus metrics for the arena field monitor.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`: a failure means duplicate metric names,
//! a programming error that should crash at first use rather than go unseen.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder,
};

use crate::error::TelemetryResult;

/// Viewer sessions currently streaming.
pub static VIEWERS_CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "arena_viewers_connected",
        "Viewer streaming sessions currently open"
    )
    .unwrap()
});

/// Viewer sessions ended, by reason.
/// Labels: reason (disconnected/torn_down/bus_closed)
pub static VIEWER_SESSIONS_ENDED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "arena_viewer_sessions_ended_total",
        "Viewer streaming sessions ended",
        &["reason"]
    )
    .unwrap()
});

/// Notifications raised, by bus.
pub static NOTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "arena_notifications_total",
        "Notifications raised on a bus",
        &["bus"]
    )
    .unwrap()
});

/// Snapshot messages delivered to viewers.
pub static SNAPSHOTS_SENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "arena_snapshots_sent_total",
        "PLC snapshots sent to viewers",
        &["kind"]
    )
    .unwrap()
});

/// Mode assignment requests, by group and outcome.
pub static MODE_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "arena_mode_requests_total",
        "LED mode assignment requests",
        &["group", "outcome"]
    )
    .unwrap()
});

/// Static facade over the registered metrics.
pub struct Metrics;

impl Metrics {
    /// Record a viewer session opening.
    pub fn viewer_connected() {
        VIEWERS_CONNECTED.inc();
    }

    /// Record a viewer session releasing its slot.
    pub fn viewer_disconnected() {
        VIEWERS_CONNECTED.dec();
    }

    /// Record why a viewer session ended.
    pub fn session_ended(reason: &str) {
        VIEWER_SESSIONS_ENDED_TOTAL
            .with_label_values(&[reason])
            .inc();
    }

    /// Record a notification on the named bus.
    pub fn notification(bus: &str) {
        NOTIFICATIONS_TOTAL.with_label_values(&[bus]).inc();
    }

    /// Record a snapshot delivered to a viewer (`initial` or `change`).
    pub fn snapshot_sent(kind: &str) {
        SNAPSHOTS_SENT_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a mode assignment accepted.
    pub fn mode_applied(group: &str) {
        MODE_REQUESTS_TOTAL
            .with_label_values(&[group, "applied"])
            .inc();
    }

    /// Record a mode assignment rejected by the phase gate.
    pub fn mode_rejected(group: &str) {
        MODE_REQUESTS_TOTAL
            .with_label_values(&[group, "rejected"])
            .inc();
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let families = prometheus::gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
