//! Telemetry and observability utilities

use std::sync::Arc;

#[cfg(feature = "metrics")]
use opentelemetry::{
    metrics::{Counter, Histogram},
    KeyValue,
};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Whether telemetry is enabled
    pub enabled: bool,
    /// Service name for metrics
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "commandk-sdk".to_string(),
        }
    }
}

/// SDK metrics collector
#[derive(Clone)]
pub struct Metrics {
    #[cfg(feature = "metrics")]
    pub(crate) requests_total: Counter<u64>,

    #[cfg(feature = "metrics")]
    pub(crate) request_duration: Histogram<f64>,

    #[cfg(feature = "metrics")]
    pub(crate) errors_total: Counter<u64>,

    #[cfg(feature = "metrics")]
    pub(crate) cache_hits: Counter<u64>,

    #[cfg(feature = "metrics")]
    pub(crate) cache_misses: Counter<u64>,
}

impl Metrics {
    /// Create new metrics instance
    #[cfg(feature = "metrics")]
    pub fn new(config: &TelemetryConfig) -> Self {
        use opentelemetry::global;

        let meter = global::meter(config.service_name.clone());

        let requests_total = meter
            .u64_counter("commandk_sdk.requests_total")
            .with_description("Total number of requests made")
            .init();

        let request_duration = meter
            .f64_histogram("commandk_sdk.request_duration_seconds")
            .with_description("Request duration in seconds")
            .init();

        let errors_total = meter
            .u64_counter("commandk_sdk.errors_total")
            .with_description("Total number of errors")
            .init();

        let cache_hits = meter
            .u64_counter("commandk_sdk.cache_hits_total")
            .with_description("Responses served from cache after 304")
            .init();

        let cache_misses = meter
            .u64_counter("commandk_sdk.cache_misses_total")
            .with_description("Requests sent without a cached ETag")
            .init();

        Self {
            requests_total,
            request_duration,
            errors_total,
            cache_hits,
            cache_misses,
        }
    }

    /// Create a no-op metrics instance when feature is disabled
    #[cfg(not(feature = "metrics"))]
    pub fn new(_config: &TelemetryConfig) -> Self {
        Self {}
    }

    /// Record a completed request
    #[cfg(feature = "metrics")]
    pub fn record_request(&self, status: u16, duration_secs: f64) {
        let labels = &[KeyValue::new("status", status.to_string())];

        self.requests_total.add(1, labels);
        self.request_duration.record(duration_secs, labels);

        if status >= 400 {
            self.errors_total.add(
                1,
                &[
                    KeyValue::new("type", if status >= 500 { "server" } else { "client" }),
                    KeyValue::new("status", status.to_string()),
                ],
            );
        }
    }

    /// Record a completed request (no-op when metrics disabled)
    #[cfg(not(feature = "metrics"))]
    pub fn record_request(&self, _status: u16, _duration_secs: f64) {}

    /// Record a transport failure with no HTTP status
    #[cfg(feature = "metrics")]
    pub fn record_transport_error(&self, reason: &'static str) {
        self.errors_total
            .add(1, &[KeyValue::new("type", reason)]);
    }

    /// Record a transport failure (no-op)
    #[cfg(not(feature = "metrics"))]
    pub fn record_transport_error(&self, _reason: &'static str) {}

    /// Record a cache hit
    #[cfg(feature = "metrics")]
    pub fn record_cache_hit(&self, catalog_app_id: &str) {
        self.cache_hits
            .add(1, &[KeyValue::new("catalog_app_id", catalog_app_id.to_string())]);
    }

    /// Record a cache hit (no-op)
    #[cfg(not(feature = "metrics"))]
    pub fn record_cache_hit(&self, _catalog_app_id: &str) {}

    /// Record a cache miss
    #[cfg(feature = "metrics")]
    pub fn record_cache_miss(&self, catalog_app_id: &str) {
        self.cache_misses
            .add(1, &[KeyValue::new("catalog_app_id", catalog_app_id.to_string())]);
    }

    /// Record a cache miss (no-op)
    #[cfg(not(feature = "metrics"))]
    pub fn record_cache_miss(&self, _catalog_app_id: &str) {}
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("enabled", &cfg!(feature = "metrics"))
            .finish()
    }
}

/// Global telemetry instance holder
static TELEMETRY: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Metrics for a client: the shared instance when telemetry is enabled,
/// otherwise a private collector that records into the global meter
pub(crate) fn metrics_for(config: &TelemetryConfig) -> Arc<Metrics> {
    if config.enabled {
        TELEMETRY
            .get_or_init(|| Arc::new(Metrics::new(config)))
            .clone()
    } else {
        Arc::new(Metrics::new(config))
    }
}
