//! # autoecole-api — Axum API Services for the Autoecole Platform
//!
//! The HTTP boundary over the enrollment domain: registration and login,
//! the school directory, the document workflow, the manager console, and
//! the student dashboard.
//!
//! ## API Surface
//!
//! | Prefix                      | Module                  | Domain              |
//! |-----------------------------|-------------------------|---------------------|
//! | `/api/auth/*`               | [`routes::auth`]        | Accounts & sessions |
//! | `/api/states`               | [`routes::schools`]     | Wilaya reference    |
//! | `/api/driving-schools`      | [`routes::schools`]     | School directory    |
//! | `/api/enrollments`          | [`routes::enrollments`] | Applications        |
//! | `/api/documents/*`          | [`routes::documents`]   | Document workflow   |
//! | `/api/teachers/*`           | [`routes::teachers`]    | Teacher accounts    |
//! | `/api/manager/*`            | [`routes::manager`]     | Manager console     |
//! | `/api/dashboard`            | [`routes::dashboard`]   | Student dashboard   |
//! | `/health/*`, `/metrics`     | here                    | Probes & metrics    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! Authentication is handler-level: protected handlers take the
//! [`auth::CurrentUser`] extractor, which resolves the per-user bearer
//! token before the handler body runs. Health probes and `/metrics` are
//! mounted outside the API router and take no credentials.
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; lifecycle decisions live in
//!   `autoecole-enrollment` and handlers delegate to it.
//! - All errors map to structured HTTP responses via [`AppError`].
//! - Every mutation of an enrollment goes through its store's atomic
//!   `try_update`, the per-record writer boundary.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the API
/// router so they remain accessible without credentials and without
/// counting toward request metrics.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    // API routes.
    //
    // Body size limit: 2 MiB. This prevents OOM from oversized request
    // bodies; document content goes to the file store collaborator, not
    // through this API.
    let mut api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::schools::router())
        .merge(routes::enrollments::router())
        .merge(routes::documents::router())
        .merge(routes::teachers::router())
        .merge(routes::manager::router())
        .merge(routes::dashboard::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Unauthenticated health probes.
    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    // Mount /metrics when metrics are enabled (unauthenticated, like probes).
    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
///
/// Updates domain gauges from current `AppState` on each scrape (pull
/// model), then gathers and encodes all metrics in Prometheus text
/// exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    // -- Update domain gauges from AppState --

    // Enrollments by status, accepted documents in one pass.
    let enrollments = state.enrollments.list();
    let mut pending_documents = 0usize;
    let mut pending_approval = 0usize;
    let mut approved = 0usize;
    let mut rejected = 0usize;
    let mut accepted_documents = 0usize;
    for record in &enrollments {
        use autoecole_enrollment::EnrollmentStatus;
        match record.enrollment.status {
            EnrollmentStatus::PendingDocuments => pending_documents += 1,
            EnrollmentStatus::PendingApproval => pending_approval += 1,
            EnrollmentStatus::Approved => approved += 1,
            EnrollmentStatus::Rejected => rejected += 1,
        }
        accepted_documents += record
            .documents
            .documents()
            .iter()
            .filter(|d| d.accepted)
            .count();
    }
    metrics.enrollments_total().reset();
    metrics
        .enrollments_total()
        .with_label_values(&["pending_documents"])
        .set(pending_documents as f64);
    metrics
        .enrollments_total()
        .with_label_values(&["pending_approval"])
        .set(pending_approval as f64);
    metrics
        .enrollments_total()
        .with_label_values(&["approved"])
        .set(approved as f64);
    metrics
        .enrollments_total()
        .with_label_values(&["rejected"])
        .set(rejected as f64);
    metrics
        .documents_accepted_total()
        .set(accepted_documents as f64);

    // Users by role.
    metrics.users_total().reset();
    let mut by_role: std::collections::HashMap<&'static str, usize> =
        std::collections::HashMap::new();
    for user in state.users.list() {
        *by_role.entry(user.role.as_str()).or_default() += 1;
    }
    for (role, count) in &by_role {
        metrics
            .users_total()
            .with_label_values(&[role])
            .set(*count as f64);
    }

    // Teachers by approval state.
    metrics.teachers_total().reset();
    let teachers = state.teachers.list();
    let approved_teachers = teachers.iter().filter(|t| t.profile.approved).count();
    metrics
        .teachers_total()
        .with_label_values(&["true"])
        .set(approved_teachers as f64);
    metrics
        .teachers_total()
        .with_label_values(&["false"])
        .set((teachers.len() - approved_teachers) as f64);

    // Schools and sessions.
    metrics.schools_total().set(state.schools.len() as f64);
    metrics.active_sessions().set(state.sessions.len() as f64);

    // -- Gather and encode --
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application can serve traffic.
///
/// Checks that every store's lock is acquirable; a store that cannot be
/// read points at a deadlocked writer.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.users.len();
    let _ = state.schools.len();
    let _ = state.teachers.len();
    let _ = state.enrollments.len();
    let _ = state.sessions.len();
    (StatusCode::OK, "ready").into_response()
}
