//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts and latency by method, path, and status
//! - Active WebSocket connections and live room sessions
//! - Inbound real-time frames by type
//! - Rejected frames by error code
//! - Dropped connections by reason
//! - Room registry call latency

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "watch_party";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Live room sessions, including rooms inside their grace period
pub static ROOM_SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("room_sessions_active", "Number of live room sessions").namespace(NAMESPACE),
    )
    .expect("Failed to create ROOM_SESSIONS_ACTIVE metric")
});

pub static FRAMES_RECEIVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("frames_received_total", "Inbound real-time frames by type")
            .namespace(NAMESPACE),
        &["type"],
    )
    .expect("Failed to create FRAMES_RECEIVED_TOTAL metric")
});

/// Frames rejected with an error, by error code (`protocol-violation`, ...)
pub static FRAMES_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("frames_rejected_total", "Inbound frames rejected by error code")
            .namespace(NAMESPACE),
        &["code"],
    )
    .expect("Failed to create FRAMES_REJECTED_TOTAL metric")
});

pub static CONNECTIONS_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "connections_dropped_total",
            "Connections closed by the server, by reason",
        )
        .namespace(NAMESPACE),
        &["reason"],
    )
    .expect("Failed to create CONNECTIONS_DROPPED_TOTAL metric")
});

/// Room registry call duration histogram
pub static REGISTRY_CALL_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];
    HistogramVec::new(
        HistogramOpts::new(
            "registry_call_duration_seconds",
            "Room registry call latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["operation"],
    )
    .expect("Failed to create REGISTRY_CALL_DURATION_SECONDS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(ROOM_SESSIONS_ACTIVE.clone()))
        .expect("Failed to register ROOM_SESSIONS_ACTIVE");
    registry
        .register(Box::new(FRAMES_RECEIVED_TOTAL.clone()))
        .expect("Failed to register FRAMES_RECEIVED_TOTAL");
    registry
        .register(Box::new(FRAMES_REJECTED_TOTAL.clone()))
        .expect("Failed to register FRAMES_REJECTED_TOTAL");
    registry
        .register(Box::new(CONNECTIONS_DROPPED_TOTAL.clone()))
        .expect("Failed to register CONNECTIONS_DROPPED_TOTAL");
    registry
        .register(Box::new(REGISTRY_CALL_DURATION_SECONDS.clone()))
        .expect("Failed to register REGISTRY_CALL_DURATION_SECONDS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn set_websocket_connections(connected: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE.set(connected as i64);
}

pub fn set_room_sessions(live: usize) {
    ROOM_SESSIONS_ACTIVE.set(live as i64);
}

pub fn record_frame(frame_type: &str) {
    FRAMES_RECEIVED_TOTAL.with_label_values(&[frame_type]).inc();
}

pub fn record_rejected_frame(code: &str) {
    FRAMES_REJECTED_TOTAL.with_label_values(&[code]).inc();
}

/// `reason` is one of `slow-consumer`, `heartbeat-timeout`, `transport-error`
pub fn record_dropped_connection(reason: &str) {
    CONNECTIONS_DROPPED_TOTAL.with_label_values(&[reason]).inc();
}

/// Helper to record room registry call metrics
pub fn record_registry_call(operation: &str, duration_secs: f64) {
    REGISTRY_CALL_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration_secs);
}
