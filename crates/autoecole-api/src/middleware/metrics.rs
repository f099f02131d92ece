//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Domain-level gauges (enrollments by status, users by role,
//! teachers, accepted documents) are updated on each `/metrics` scrape
//! (pull model) — see the metrics handler in `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    core::Collector, Encoder, GaugeVec, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics (push model) --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Domain gauges (pull model, updated on /metrics scrape) --
    enrollments_total: GaugeVec,
    users_total: GaugeVec,
    teachers_total: GaugeVec,
    schools_total: prometheus::Gauge,
    documents_accepted_total: prometheus::Gauge,
    active_sessions: prometheus::Gauge,
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
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("autoecole_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "autoecole_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new(
                "autoecole_http_errors_total",
                "Total HTTP errors (4xx and 5xx)",
            ),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let enrollments_total = GaugeVec::new(
            Opts::new("autoecole_enrollments_total", "Enrollments by status"),
            &["status"],
        )
        .expect("metric can be created");

        let users_total = GaugeVec::new(
            Opts::new("autoecole_users_total", "Registered users by role"),
            &["role"],
        )
        .expect("metric can be created");

        let teachers_total = GaugeVec::new(
            Opts::new("autoecole_teachers_total", "Teachers by approval state"),
            &["approved"],
        )
        .expect("metric can be created");

        let schools_total =
            prometheus::Gauge::new("autoecole_schools_total", "Registered driving schools")
                .expect("metric can be created");

        let documents_accepted_total = prometheus::Gauge::new(
            "autoecole_documents_accepted_total",
            "Accepted documents across all enrollments",
        )
        .expect("metric can be created");

        let active_sessions =
            prometheus::Gauge::new("autoecole_active_sessions", "Issued bearer sessions")
                .expect("metric can be created");

        // Register all metrics.
        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(enrollments_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(users_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(teachers_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(schools_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(documents_accepted_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(active_sessions.clone()))
            .expect("metric can be registered");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                enrollments_total,
                users_total,
                teachers_total,
                schools_total,
                documents_accepted_total,
                active_sessions,
            }),
        }
    }

    /// Return current total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_requests_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Return current total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_errors_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Record an HTTP request (called by the middleware).
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    // -- Domain gauge accessors (used by the /metrics handler) --

    /// Access the enrollments-by-status gauge for updating.
    pub fn enrollments_total(&self) -> &GaugeVec {
        &self.inner.enrollments_total
    }

    /// Access the users-by-role gauge for updating.
    pub fn users_total(&self) -> &GaugeVec {
        &self.inner.users_total
    }

    /// Access the teachers-by-approval gauge for updating.
    pub fn teachers_total(&self) -> &GaugeVec {
        &self.inner.teachers_total
    }

    /// Access the schools gauge for updating.
    pub fn schools_total(&self) -> &prometheus::Gauge {
        &self.inner.schools_total
    }

    /// Access the accepted-documents gauge for updating.
    pub fn documents_accepted_total(&self) -> &prometheus::Gauge {
        &self.inner.documents_accepted_total
    }

    /// Access the sessions gauge for updating.
    pub fn active_sessions(&self) -> &prometheus::Gauge {
        &self.inner.active_sessions
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a request path by replacing UUID segments with `{id}`.
///
/// Prevents cardinality explosion in Prometheus labels. UUIDs are detected
/// as 32-hex-char strings with optional hyphens (standard UUID format).
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            // Match standard UUID: 8-4-4-4-12 hex chars with hyphens
            if segment.len() == 36
                && segment.chars().enumerate().all(|(i, c)| {
                    if i == 8 || i == 13 || i == 18 || i == 23 {
                        c == '-'
                    } else {
                        c.is_ascii_hexdigit()
                    }
                })
            {
                "{id}"
            } else if segment.len() == 32 && segment.chars().all(|c| c.is_ascii_hexdigit()) {
                // UUID without hyphens
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_metrics_new_starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn requests_increments() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/test", 200, 0.01);
        assert_eq!(m.requests(), 1);
        m.record_request("POST", "/test", 201, 0.02);
        m.record_request("GET", "/other", 200, 0.005);
        assert_eq!(m.requests(), 3);
    }

    #[test]
    fn errors_increments() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/test", 500, 0.1);
        assert_eq!(m.errors(), 1);
        m.record_request("GET", "/test", 404, 0.05);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn request_and_error_counts_independent() {
        let m = ApiMetrics::new();
        for _ in 0..5 {
            m.record_request("GET", "/ok", 200, 0.01);
        }
        m.record_request("GET", "/fail", 500, 0.1);
        m.record_request("POST", "/fail", 422, 0.05);
        assert_eq!(m.requests(), 7);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn concurrent_increments_are_safe() {
        let m = ApiMetrics::new();
        let threads: Vec<_> = (0..10)
            .map(|_| {
                let m = m.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        m.record_request("GET", "/test", 200, 0.001);
                        m.record_request("GET", "/err", 500, 0.001);
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(m.requests(), 20_000);
        assert_eq!(m.errors(), 10_000);
    }

    #[test]
    fn clone_shares_underlying_counters() {
        let m = ApiMetrics::new();
        let clone = m.clone();

        m.record_request("GET", "/test", 200, 0.01);
        assert_eq!(clone.requests(), 1, "clone should see the same counter");

        clone.record_request("GET", "/err", 500, 0.01);
        assert_eq!(m.errors(), 1, "original should see clone's increment");
    }

    #[test]
    fn gather_and_encode_produces_text() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/test", 200, 0.01);
        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("autoecole_http_requests_total"));
        assert!(output.contains("autoecole_http_request_duration_seconds"));
    }

    #[test]
    fn normalize_path_replaces_uuid_with_hyphens() {
        let path = "/api/manager/enrollments/550e8400-e29b-41d4-a716-446655440000/accept";
        assert_eq!(
            normalize_path(path),
            "/api/manager/enrollments/{id}/accept"
        );
    }

    #[test]
    fn normalize_path_replaces_uuid_without_hyphens() {
        let path = "/api/documents/accept/550e8400e29b41d4a716446655440000";
        assert_eq!(normalize_path(path), "/api/documents/accept/{id}");
    }

    #[test]
    fn normalize_path_preserves_non_uuid_segments() {
        let path = "/api/driving-schools";
        assert_eq!(normalize_path(path), "/api/driving-schools");
    }

    #[test]
    fn domain_gauges_update() {
        let m = ApiMetrics::new();
        m.enrollments_total()
            .with_label_values(&["pending_documents"])
            .set(3.0);
        m.users_total().with_label_values(&["guest"]).set(2.0);
        m.schools_total().set(1.0);
        m.documents_accepted_total().set(4.0);

        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("autoecole_enrollments_total"));
        assert!(output.contains("autoecole_users_total"));
        assert!(output.contains("autoecole_schools_total"));
        assert!(output.contains("autoecole_documents_accepted_total"));
    }
}
