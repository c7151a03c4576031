//! # Prometheus Metrics
//!
//! Request metrics and room gauges recorded through the `metrics` facade
//! into a Prometheus recorder owned by [`ApiMetrics`].
//!
//! HTTP metrics are pushed by [`metrics_middleware`]. Room gauges are pulled
//! from the inventory on each `/metrics` scrape, see the handler in `lib.rs`.
//!
//! Each `ApiMetrics` owns its recorder and records through
//! `metrics::with_local_recorder`, so several apps can coexist in one
//! process without fighting over the global recorder.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use hallbridge_state::{OccupancyStats, RoomStatus};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

/// Shared metrics state.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    request_count: AtomicU64,
    error_count: AtomicU64,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

impl ApiMetrics {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        Self {
            inner: Arc::new(Inner {
                recorder,
                handle,
                request_count: AtomicU64::new(0),
                error_count: AtomicU64::new(0),
            }),
        }
    }

    /// Total requests seen by the middleware.
    pub fn requests(&self) -> u64 {
        self.inner.request_count.load(Ordering::Relaxed)
    }

    /// Total 4xx and 5xx responses.
    pub fn errors(&self) -> u64 {
        self.inner.error_count.load(Ordering::Relaxed)
    }

    /// Record one completed request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, elapsed_secs: f64) {
        self.inner.request_count.fetch_add(1, Ordering::Relaxed);
        let is_error = status >= 400;
        if is_error {
            self.inner.error_count.fetch_add(1, Ordering::Relaxed);
        }

        let method = method.to_string();
        let path = path.to_string();
        metrics::with_local_recorder(&self.inner.recorder, || {
            metrics::counter!(
                "hallbridge_http_requests_total",
                "method" => method.clone(),
                "path" => path.clone(),
                "status" => status.to_string()
            )
            .increment(1);
            metrics::histogram!(
                "hallbridge_http_request_duration_seconds",
                "method" => method.clone(),
                "path" => path.clone()
            )
            .record(elapsed_secs);
            if is_error {
                let class = if status >= 500 { "5xx" } else { "4xx" };
                metrics::counter!(
                    "hallbridge_http_errors_total",
                    "method" => method,
                    "path" => path,
                    "class" => class
                )
                .increment(1);
            }
        });
    }

    /// Set room and bed gauges from a fresh occupancy snapshot.
    pub fn set_room_gauges(&self, stats: &OccupancyStats) {
        metrics::with_local_recorder(&self.inner.recorder, || {
            for status in RoomStatus::ALL {
                metrics::gauge!("hallbridge_rooms", "status" => status.as_str())
                    .set(stats.count(status) as f64);
            }
            metrics::gauge!("hallbridge_beds", "state" => "total").set(stats.total_beds as f64);
            metrics::gauge!("hallbridge_beds", "state" => "occupied")
                .set(stats.occupied_beds as f64);
            metrics::gauge!("hallbridge_beds", "state" => "available")
                .set(stats.available_beds as f64);
        });
    }

    /// Render the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.inner.handle.render()
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware that records request count, latency and errors.
///
/// The `path` label is the matched route template (`/v1/rooms/{id}`), not
/// the raw URI, to keep label cardinality bounded.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().as_str().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.record_request(
            &method,
            &path,
            response.status().as_u16(),
            start.elapsed().as_secs_f64(),
        );
    }

    response
}
