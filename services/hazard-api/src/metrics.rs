//! Request metrics.
//!
//! Counters and histograms go through the `metrics` facade; the Prometheus
//! recorder installed by the binary renders them at `/metrics`. Without a
//! recorder the calls are no-ops, and `/metrics` falls back to the
//! in-process tally kept by the atomics below.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};

use hazard_common::RankedQuery;

/// Metrics collector for the ranking endpoints.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    pub requests: AtomicU64,
    pub client_errors: AtomicU64,
    pub server_errors: AtomicU64,
    pub features_returned: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful ranking request.
    pub fn record_success(&self, query: RankedQuery, features: usize, elapsed: Duration) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.features_returned
            .fetch_add(features as u64, Ordering::Relaxed);

        counter!(
            "hazard_requests_total",
            "model" => query.model.path_segment(),
            "metric" => query.metric.path_segment(),
            "outcome" => "ok"
        )
        .increment(1);
        histogram!(
            "hazard_request_duration_seconds",
            "model" => query.model.path_segment(),
            "metric" => query.metric.path_segment()
        )
        .record(elapsed.as_secs_f64());
        histogram!("hazard_features_returned").record(features as f64);
    }

    /// Record a failed ranking request; `kind` is the error kind label.
    pub fn record_failure(&self, query: RankedQuery, kind: &'static str, client_error: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if client_error {
            self.client_errors.fetch_add(1, Ordering::Relaxed);
        } else {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }

        counter!(
            "hazard_requests_total",
            "model" => query.model.path_segment(),
            "metric" => query.metric.path_segment(),
            "outcome" => kind
        )
        .increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            features_returned: self.features_returned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub features_returned: u64,
}
