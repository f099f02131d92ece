//! # Dashboard API
//!
//! The student's aggregated view: their account, each enrollment with its
//! status, document progress, refusal reason when rejected, and the
//! assigned teacher once one is set.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use autoecole_core::{EnrollmentId, SchoolId};
use autoecole_enrollment::EnrollmentStatus;

use crate::auth::CurrentUser;
use crate::routes::auth::UserView;
use crate::routes::documents::DocumentView;
use crate::routes::manager::AssignedTeacherView;
use crate::state::AppState;

/// One enrollment as the student's dashboard shows it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardEnrollment {
    #[schema(value_type = String)]
    pub id: EnrollmentId,
    #[schema(value_type = String)]
    pub school_id: SchoolId,
    pub school_name: String,
    #[schema(value_type = String)]
    pub enrollment_status: EnrollmentStatus,
    /// Present iff the enrollment was refused.
    pub refusal_reason: Option<String>,
    pub documents_complete: bool,
    pub documents: Vec<DocumentView>,
    pub assigned_teacher: Option<AssignedTeacherView>,
}

/// Dashboard response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub user: UserView,
    pub enrollments: Vec<DashboardEnrollment>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(dashboard))
}

/// GET /api/dashboard — The caller's aggregated view.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub(crate) async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<DashboardResponse> {
    let enrollments = state
        .enrollments_of(user.id)
        .iter()
        .map(|record| {
            let school_name = state
                .schools
                .get(&record.enrollment.school_id)
                .map(|s| s.name)
                .unwrap_or_else(|| "unknown".to_string());
            let assigned_teacher = record
                .enrollment
                .assigned_teacher_id
                .and_then(|id| state.teachers.get(&id))
                .map(|t| AssignedTeacherView {
                    id: t.profile.id,
                    name: t.full_name(),
                    email: t.email.clone(),
                });
            DashboardEnrollment {
                id: record.enrollment.id,
                school_id: record.enrollment.school_id,
                school_name,
                enrollment_status: record.enrollment.status,
                refusal_reason: record.enrollment.refusal_reason.clone(),
                documents_complete: record.documents.is_complete(),
                documents: record.documents.documents().iter().map(DocumentView::from).collect(),
                assigned_teacher,
            }
        })
        .collect();

    Json(DashboardResponse {
        user: UserView::from(&user),
        enrollments,
    })
}
