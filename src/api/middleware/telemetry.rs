//! Request telemetry: request tracking and server-error tracking.
//!
//! Counters are published through the `metrics` facade (a no-op until the
//! host installs a recorder) and kept in-process for [`Telemetry::snapshot`].
//! When no instrumentation key is configured both middleware pass requests
//! through untouched.

use axum::{
    extract::{Request, State},
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::layer::MiddlewareLayer;

/// Options for request telemetry.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Telemetry is enabled only when a key is present.
    pub instrumentation_key: Option<String>,
}

/// Point-in-time copy of the telemetry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub requests: u64,
    pub failed_requests: u64,
    pub exceptions: u64,
    pub total_duration_ms: u64,
}

/// Shared telemetry sink.
#[derive(Debug)]
pub struct Telemetry {
    enabled: bool,
    requests: AtomicU64,
    failed_requests: AtomicU64,
    exceptions: AtomicU64,
    total_duration_ms: AtomicU64,
}

impl Telemetry {
    pub fn new(config: &TelemetryConfig) -> Self {
        let enabled = config
            .instrumentation_key
            .as_deref()
            .is_some_and(|k| !k.is_empty());

        if enabled {
            tracing::info!("Request telemetry enabled");
        } else {
            tracing::debug!("Request telemetry disabled (no instrumentation key)");
        }

        Self {
            enabled,
            requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            exceptions: AtomicU64::new(0),
            total_duration_ms: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            exceptions: self.exceptions.load(Ordering::Relaxed),
            total_duration_ms: self.total_duration_ms.load(Ordering::Relaxed),
        }
    }

    fn track_request(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.total_duration_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
        if status >= 400 {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        metrics::counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds", "method" => method.to_string())
            .record(elapsed.as_secs_f64());

        tracing::debug!(
            method,
            path,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request tracked"
        );
    }

    fn track_exception(&self, method: &str, path: &str, status: u16) {
        self.exceptions.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("http_exceptions_total", "status" => status.to_string()).increment(1);
        tracing::error!(method, path, status, "Request failed with server error");
    }
}

/// Records every request's outcome and latency.
pub async fn track_requests(
    State(telemetry): State<Arc<Telemetry>>,
    req: Request,
    next: Next,
) -> Response {
    if !telemetry.is_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    telemetry.track_request(&method, &path, response.status().as_u16(), start.elapsed());
    response
}

/// Records 5xx responses as exceptions and passes them on unchanged.
pub async fn track_errors(
    State(telemetry): State<Arc<Telemetry>>,
    req: Request,
    next: Next,
) -> Response {
    if !telemetry.is_enabled() {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        telemetry.track_exception(&method, &path, response.status().as_u16());
    }
    response
}

/// Telemetry middleware pair sharing one [`Telemetry`] instance.
///
/// Mount [`AppInsights::request_tracker`] outermost and
/// [`AppInsights::error_handler`] closest to the routes.
#[derive(Clone)]
pub struct AppInsights {
    telemetry: Arc<Telemetry>,
}

impl AppInsights {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            telemetry: Arc::new(Telemetry::new(config)),
        }
    }

    pub fn request_tracker(&self) -> MiddlewareLayer {
        MiddlewareLayer::new(from_fn_with_state(self.telemetry.clone(), track_requests))
    }

    pub fn error_handler(&self) -> MiddlewareLayer {
        MiddlewareLayer::new(from_fn_with_state(self.telemetry.clone(), track_errors))
    }

    pub fn telemetry(&self) -> Arc<Telemetry> {
        self.telemetry.clone()
    }
}
