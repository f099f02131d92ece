//! # Enrollments API
//!
//! A guest or student applies to a driving school. The new enrollment
//! starts in `pending_documents`; everything after that is driven by the
//! document workflow and the manager console.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use autoecole_core::{EnrollmentId, Role, SchoolId, REQUIRED_DOCUMENTS};
use autoecole_enrollment::{DocumentRegistry, Enrollment, EnrollmentStatus};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, EnrollmentRecord};

/// Request to enroll in a school.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEnrollmentRequest {
    pub school_id: Uuid,
}

impl Validate for CreateEnrollmentRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Enrollment creation response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEnrollmentResponse {
    #[schema(value_type = String)]
    pub enrollment_id: EnrollmentId,
    #[schema(value_type = String)]
    pub status: EnrollmentStatus,
}

/// Build the enrollments router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/enrollments", post(create_enrollment))
}

/// POST /api/enrollments — Apply to a driving school.
///
/// Managers and teachers cannot enroll. A student with a live (non-rejected)
/// enrollment at the same school cannot open a second one; a rejected
/// enrollment does not block re-applying.
#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = CreateEnrollmentRequest,
    responses(
        (status = 201, description = "Enrollment created", body = CreateEnrollmentResponse),
        (status = 404, description = "School not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already enrolled", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "enrollments"
)]
pub(crate) async fn create_enrollment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CreateEnrollmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateEnrollmentResponse>), AppError> {
    let req = extract_validated_json(body)?;

    if matches!(user.role, Role::Manager | Role::Teacher) {
        return Err(AppError::Forbidden(
            "only guests and students can enroll".to_string(),
        ));
    }

    let school_id = SchoolId::from_uuid(req.school_id);
    if state.schools.get(&school_id).is_none() {
        return Err(AppError::NotFound(format!("school {school_id} not found")));
    }

    let duplicate = state
        .enrollments_of(user.id)
        .into_iter()
        .any(|r| {
            r.enrollment.school_id == school_id
                && r.enrollment.status != EnrollmentStatus::Rejected
        });
    if duplicate {
        return Err(AppError::Conflict(
            "an enrollment for this school already exists".to_string(),
        ));
    }

    let enrollment = Enrollment::new(user.id, school_id);
    let record = EnrollmentRecord {
        documents: DocumentRegistry::new(REQUIRED_DOCUMENTS),
        enrollment,
    };
    let enrollment_id = record.enrollment.id;
    let status = record.enrollment.status;
    state.enrollments.insert(enrollment_id, record);
    tracing::info!(%enrollment_id, student_id = %user.id, %school_id, "enrollment created");

    Ok((
        StatusCode::CREATED,
        Json(CreateEnrollmentResponse {
            enrollment_id,
            status,
        }),
    ))
}
