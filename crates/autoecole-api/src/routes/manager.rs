//! # Manager Console API
//!
//! Enrollment review for school managers: listing with document progress,
//! approve/refuse decisions, and teacher assignment through the gate.
//! Every mutation re-checks school ownership inside the enrollment's atomic
//! update, so a manager can never decide on another school's enrollment.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use autoecole_core::{EnrollmentId, Gender, SchoolId, TeacherId, UserId};
use autoecole_enrollment::{
    available_teachers as gate_available_teachers, promotion_on_approval, validate_assignment,
    EnrollmentStatus, TransitionEvidence,
};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::teachers::TeacherView;
use crate::state::{AppState, EnrollmentRecord};

/// Short teacher reference embedded in enrollment summaries.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignedTeacherView {
    #[schema(value_type = String)]
    pub id: TeacherId,
    pub name: String,
    pub email: String,
}

/// One enrollment as the manager console sees it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentSummary {
    #[schema(value_type = String)]
    pub id: EnrollmentId,
    #[schema(value_type = String)]
    pub student_id: UserId,
    pub student_name: String,
    #[schema(value_type = String)]
    pub school_id: SchoolId,
    #[schema(value_type = String)]
    pub enrollment_status: EnrollmentStatus,
    /// Whether every required document has an accepted upload.
    pub documents_verified: bool,
    pub refusal_reason: Option<String>,
    pub assigned_teacher: Option<AssignedTeacherView>,
    pub created_at: String,
}

/// Manager enrollment listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentsResponse {
    pub enrollments: Vec<EnrollmentSummary>,
}

/// Decision response for accept and refuse.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DecisionResponse {
    pub message: String,
    #[schema(value_type = String)]
    pub enrollment_status: EnrollmentStatus,
    pub refusal_reason: Option<String>,
}

/// Refusal request. The reason is mandatory and shown to the student.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefuseEnrollmentRequest {
    pub reason: String,
}

impl Validate for RefuseEnrollmentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".to_string());
        }
        Ok(())
    }
}

/// Available-teachers response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailableTeachersResponse {
    pub teachers: Vec<TeacherView>,
}

/// Assignment request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTeacherRequest {
    pub teacher_id: Uuid,
}

impl Validate for AssignTeacherRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Assignment and unassignment response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignTeacherResponse {
    pub message: String,
    #[schema(value_type = String)]
    pub teacher_id: TeacherId,
    pub teacher_name: String,
}

/// Build the manager router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/manager/enrollments", get(list_enrollments))
        .route("/api/manager/enrollments/:id/accept", post(accept_enrollment))
        .route("/api/manager/enrollments/:id/refuse", post(refuse_enrollment))
        .route(
            "/api/manager/enrollments/:id/available-teachers",
            get(available_teachers),
        )
        .route(
            "/api/manager/enrollments/:id/assign-teacher",
            post(assign_teacher),
        )
        .route(
            "/api/manager/enrollments/:id/unassign-teacher",
            delete(unassign_teacher),
        )
}

fn summarize(state: &AppState, record: &EnrollmentRecord) -> EnrollmentSummary {
    let student_name = state
        .users
        .get(&record.enrollment.student_id)
        .map(|u| u.full_name())
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
    EnrollmentSummary {
        id: record.enrollment.id,
        student_id: record.enrollment.student_id,
        student_name,
        school_id: record.enrollment.school_id,
        enrollment_status: record.enrollment.status,
        documents_verified: record.documents.is_complete(),
        refusal_reason: record.enrollment.refusal_reason.clone(),
        assigned_teacher,
        created_at: record.enrollment.created_at.to_rfc3339(),
    }
}

/// Load an enrollment and verify the caller manages its school.
fn load_managed_enrollment(
    state: &AppState,
    manager_id: UserId,
    id: Uuid,
) -> Result<EnrollmentRecord, AppError> {
    let enrollment_id = EnrollmentId::from_uuid(id);
    let record = state
        .enrollments
        .get(&enrollment_id)
        .ok_or_else(|| AppError::NotFound(format!("enrollment {enrollment_id} not found")))?;
    if !state.user_manages_school(manager_id, record.enrollment.school_id) {
        return Err(AppError::Forbidden(
            "not the manager of this enrollment's school".to_string(),
        ));
    }
    Ok(record)
}

fn student_gender(state: &AppState, student_id: UserId) -> Result<Gender, AppError> {
    state
        .users
        .get(&student_id)
        .map(|u| u.gender)
        .ok_or_else(|| AppError::NotFound(format!("student {student_id} not found")))
}

/// GET /api/manager/enrollments — Enrollments of the caller's schools.
#[utoipa::path(
    get,
    path = "/api/manager/enrollments",
    responses(
        (status = 200, description = "Enrollments of managed schools", body = EnrollmentsResponse),
        (status = 403, description = "Manager role required", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "manager"
)]
pub(crate) async fn list_enrollments(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<EnrollmentsResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;

    let managed: Vec<SchoolId> = state.managed_schools(manager.id).iter().map(|s| s.id).collect();
    let mut records: Vec<EnrollmentRecord> = state
        .enrollments
        .list()
        .into_iter()
        .filter(|r| managed.contains(&r.enrollment.school_id))
        .collect();
    records.sort_by(|a, b| a.enrollment.created_at.cmp(&b.enrollment.created_at));

    Ok(Json(EnrollmentsResponse {
        enrollments: records.iter().map(|r| summarize(&state, r)).collect(),
    }))
}

/// POST /api/manager/enrollments/:id/accept — Approve an enrollment.
///
/// The student's role flips from guest to student with this decision, and
/// only with this decision.
#[utoipa::path(
    post,
    path = "/api/manager/enrollments/{id}/accept",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment approved", body = DecisionResponse),
        (status = 403, description = "Not this school's manager", body = crate::error::ErrorBody),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorBody),
        (status = 409, description = "Not awaiting approval", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "manager"
)]
pub(crate) async fn accept_enrollment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DecisionResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    load_managed_enrollment(&state, manager.id, id)?;

    let enrollment_id = EnrollmentId::from_uuid(id);
    let manager_id = manager.id;
    let student_id = state
        .enrollments
        .try_update(&enrollment_id, |rec| {
            rec.enrollment
                .approve(TransitionEvidence::by(manager_id, "enrollment approved"))?;
            Ok::<_, AppError>(rec.enrollment.student_id)
        })
        .ok_or_else(|| AppError::NotFound(format!("enrollment {enrollment_id} not found")))??;

    // One-shot promotion, fired with the approval decision.
    let promoted = state.users.try_update(&student_id, |u| {
        if let Some(role) = promotion_on_approval(u.role) {
            u.role = role;
        }
        Ok::<_, std::convert::Infallible>(u.role)
    });
    if promoted.is_none() {
        tracing::warn!(%student_id, "approved enrollment for a missing user record");
    }

    tracing::info!(%enrollment_id, %student_id, "enrollment approved");
    Ok(Json(DecisionResponse {
        message: "enrollment approved".to_string(),
        enrollment_status: EnrollmentStatus::Approved,
        refusal_reason: None,
    }))
}

/// POST /api/manager/enrollments/:id/refuse — Reject with a reason.
#[utoipa::path(
    post,
    path = "/api/manager/enrollments/{id}/refuse",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = RefuseEnrollmentRequest,
    responses(
        (status = 200, description = "Enrollment refused", body = DecisionResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorBody),
        (status = 409, description = "Not awaiting approval", body = crate::error::ErrorBody),
        (status = 422, description = "Empty reason", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "manager"
)]
pub(crate) async fn refuse_enrollment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Result<Json<RefuseEnrollmentRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    let req = extract_validated_json(body)?;
    load_managed_enrollment(&state, manager.id, id)?;

    let enrollment_id = EnrollmentId::from_uuid(id);
    let manager_id = manager.id;
    let reason = req.reason;
    let refusal_reason = state
        .enrollments
        .try_update(&enrollment_id, |rec| {
            rec.enrollment
                .reject(TransitionEvidence::by(manager_id, reason.clone()))?;
            Ok::<_, AppError>(rec.enrollment.refusal_reason.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("enrollment {enrollment_id} not found")))??;

    tracing::info!(%enrollment_id, "enrollment refused");
    Ok(Json(DecisionResponse {
        message: "enrollment refused".to_string(),
        enrollment_status: EnrollmentStatus::Rejected,
        refusal_reason,
    }))
}

/// GET /api/manager/enrollments/:id/available-teachers — Assignable teachers.
///
/// Approved teachers of the enrollment's school whose capabilities cover
/// the student. An empty list is a normal answer; callers must not treat it
/// as a failure.
#[utoipa::path(
    get,
    path = "/api/manager/enrollments/{id}/available-teachers",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Assignable teachers", body = AvailableTeachersResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "manager"
)]
pub(crate) async fn available_teachers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailableTeachersResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    let record = load_managed_enrollment(&state, manager.id, id)?;
    let gender = student_gender(&state, record.enrollment.student_id)?;

    let roster = state.teachers.list();
    let allowed: Vec<TeacherId> =
        gate_available_teachers(&record.enrollment, gender, roster.iter().map(|t| &t.profile))
            .iter()
            .map(|p| p.id)
            .collect();

    let teachers = roster
        .iter()
        .filter(|t| allowed.contains(&t.profile.id))
        .map(TeacherView::from)
        .collect();

    Ok(Json(AvailableTeachersResponse { teachers }))
}

/// POST /api/manager/enrollments/:id/assign-teacher — Assign through the gate.
#[utoipa::path(
    post,
    path = "/api/manager/enrollments/{id}/assign-teacher",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = AssignTeacherRequest,
    responses(
        (status = 200, description = "Teacher assigned", body = AssignTeacherResponse),
        (status = 404, description = "Enrollment or teacher not found", body = crate::error::ErrorBody),
        (status = 409, description = "Gate rejected the assignment", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "manager"
)]
pub(crate) async fn assign_teacher(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Result<Json<AssignTeacherRequest>, JsonRejection>,
) -> Result<Json<AssignTeacherResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    let req = extract_validated_json(body)?;
    load_managed_enrollment(&state, manager.id, id)?;

    let enrollment_id = EnrollmentId::from_uuid(id);
    let teacher_id = TeacherId::from_uuid(req.teacher_id);
    let teacher = state
        .teachers
        .get(&teacher_id)
        .ok_or_else(|| AppError::NotFound(format!("teacher {teacher_id} not found")))?;
    let manager_id = manager.id;

    state
        .enrollments
        .try_update(&enrollment_id, |rec| {
            let gender = student_gender(&state, rec.enrollment.student_id)?;
            // Gate checks and the mutation commit under the same lock, so a
            // racing approve/refuse cannot slip between them.
            validate_assignment(&rec.enrollment, &teacher.profile, gender)?;
            rec.enrollment.assign_teacher(
                teacher_id,
                TransitionEvidence::by(manager_id, "teacher assigned"),
            )?;
            Ok::<_, AppError>(())
        })
        .ok_or_else(|| AppError::NotFound(format!("enrollment {enrollment_id} not found")))??;

    tracing::info!(%enrollment_id, %teacher_id, "teacher assigned");
    Ok(Json(AssignTeacherResponse {
        message: "teacher assigned".to_string(),
        teacher_id,
        teacher_name: teacher.full_name(),
    }))
}

/// DELETE /api/manager/enrollments/:id/unassign-teacher — Clear assignment.
#[utoipa::path(
    delete,
    path = "/api/manager/enrollments/{id}/unassign-teacher",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Teacher unassigned", body = AssignTeacherResponse),
        (status = 404, description = "Enrollment not found", body = crate::error::ErrorBody),
        (status = 409, description = "No teacher assigned", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "manager"
)]
pub(crate) async fn unassign_teacher(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AssignTeacherResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    load_managed_enrollment(&state, manager.id, id)?;

    let enrollment_id = EnrollmentId::from_uuid(id);
    let manager_id = manager.id;
    let removed = state
        .enrollments
        .try_update(&enrollment_id, |rec| {
            let removed = rec
                .enrollment
                .unassign_teacher(TransitionEvidence::by(manager_id, "teacher unassigned"))?;
            Ok::<_, AppError>(removed)
        })
        .ok_or_else(|| AppError::NotFound(format!("enrollment {enrollment_id} not found")))??;

    let teacher_name = state
        .teachers
        .get(&removed)
        .map(|t| t.full_name())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(%enrollment_id, teacher_id = %removed, "teacher unassigned");
    Ok(Json(AssignTeacherResponse {
        message: "teacher unassigned".to_string(),
        teacher_id: removed,
        teacher_name,
    }))
}
