//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec served
//! at `/openapi.json`, with a bearer security scheme covering the
//! authenticated surface.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Opaque bearer token issued by /api/auth/register and /api/auth/login.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Autoecole Platform API",
        version = "0.3.2",
        description = "Driving-school management platform.\n\nProvides:\n- **Accounts**: guest registration, login, current-user view\n- **Schools**: wilaya reference data, public directory, school creation (creator becomes manager)\n- **Enrollments**: application workflow from `pending_documents` through manager decision\n- **Documents**: upload and manager acceptance; accepting the final required type advances the enrollment\n- **Teachers**: account creation, approval, and gate-checked assignment to approved enrollments\n- **Dashboard**: the student's aggregated view including refusal reasons\n\nAuthentication: bearer token via `Authorization: Bearer <token>`. Registration, login, wilaya and school listings, health probes, and `/metrics` are public.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8001", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        // ── Auth ─────────────────────────────────────────────────────────
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        // ── Schools ──────────────────────────────────────────────────────
        crate::routes::schools::list_states,
        crate::routes::schools::list_schools,
        crate::routes::schools::create_school,
        // ── Enrollments ──────────────────────────────────────────────────
        crate::routes::enrollments::create_enrollment,
        // ── Documents ────────────────────────────────────────────────────
        crate::routes::documents::list_documents,
        crate::routes::documents::upload_document,
        crate::routes::documents::accept_document,
        // ── Teachers ─────────────────────────────────────────────────────
        crate::routes::teachers::add_teacher,
        crate::routes::teachers::approve_teacher,
        // ── Manager console ──────────────────────────────────────────────
        crate::routes::manager::list_enrollments,
        crate::routes::manager::accept_enrollment,
        crate::routes::manager::refuse_enrollment,
        crate::routes::manager::available_teachers,
        crate::routes::manager::assign_teacher,
        crate::routes::manager::unassign_teacher,
        // ── Dashboard ────────────────────────────────────────────────────
        crate::routes::dashboard::dashboard,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::auth::UserView,
        crate::routes::auth::RegisterRequest,
        crate::routes::auth::LoginRequest,
        crate::routes::auth::AuthResponse,
        crate::routes::auth::MeResponse,
        crate::routes::schools::StatesResponse,
        crate::routes::schools::SchoolView,
        crate::routes::schools::SchoolsResponse,
        crate::routes::schools::CreateSchoolRequest,
        crate::routes::enrollments::CreateEnrollmentRequest,
        crate::routes::enrollments::CreateEnrollmentResponse,
        crate::routes::documents::DocumentView,
        crate::routes::documents::DocumentsResponse,
        crate::routes::documents::UploadDocumentRequest,
        crate::routes::documents::UploadDocumentResponse,
        crate::routes::documents::AcceptDocumentResponse,
        crate::routes::teachers::TeacherView,
        crate::routes::teachers::AddTeacherRequest,
        crate::routes::teachers::AddTeacherResponse,
        crate::routes::teachers::ApproveTeacherResponse,
        crate::routes::manager::AssignedTeacherView,
        crate::routes::manager::EnrollmentSummary,
        crate::routes::manager::EnrollmentsResponse,
        crate::routes::manager::DecisionResponse,
        crate::routes::manager::RefuseEnrollmentRequest,
        crate::routes::manager::AvailableTeachersResponse,
        crate::routes::manager::AssignTeacherRequest,
        crate::routes::manager::AssignTeacherResponse,
        crate::routes::dashboard::DashboardEnrollment,
        crate::routes::dashboard::DashboardResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login, current user"),
        (name = "schools", description = "Wilaya data and school directory"),
        (name = "enrollments", description = "School applications"),
        (name = "documents", description = "Document workflow"),
        (name = "teachers", description = "Teacher accounts"),
        (name = "manager", description = "Manager console"),
        (name = "dashboard", description = "Student dashboard"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

/// GET /openapi.json — The assembled spec.
async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_all_route_groups() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.contains("/api/auth/register")));
        assert!(paths.iter().any(|p| p.contains("/api/driving-schools")));
        assert!(paths.iter().any(|p| p.contains("/api/enrollments")));
        assert!(paths.iter().any(|p| p.contains("/api/documents/upload")));
        assert!(paths.iter().any(|p| p.contains("/api/manager/enrollments")));
        assert!(paths.iter().any(|p| p.contains("/api/dashboard")));
    }

    #[test]
    fn spec_serializes_to_json() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("Autoecole Platform API"));
        assert!(json.contains("bearer_auth"));
    }
}
