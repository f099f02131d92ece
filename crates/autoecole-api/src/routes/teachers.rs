//! # Teachers API
//!
//! A manager creates teacher accounts for their school and approves them
//! for assignments. A teacher is both a login account (role `teacher`) and
//! an assignment-gate profile with capability flags.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use autoecole_core::error::{validate_email, validate_password};
use autoecole_core::{Gender, Role, SchoolId, TeacherId, UserId};
use autoecole_enrollment::TeacherProfile;

use crate::auth::{generate_salt, hash_password, CurrentUser};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, TeacherRecord, UserRecord};

/// Public view of a teacher.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeacherView {
    #[schema(value_type = String)]
    pub id: TeacherId,
    #[schema(value_type = String)]
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    #[schema(value_type = String)]
    pub gender: Gender,
    pub can_teach_male: bool,
    pub can_teach_female: bool,
    pub approved: bool,
}

impl From<&TeacherRecord> for TeacherView {
    fn from(teacher: &TeacherRecord) -> Self {
        Self {
            id: teacher.profile.id,
            school_id: teacher.profile.school_id,
            name: teacher.full_name(),
            email: teacher.email.clone(),
            gender: teacher.profile.gender,
            can_teach_male: teacher.profile.can_teach_male,
            can_teach_female: teacher.profile.can_teach_female,
            approved: teacher.profile.approved,
        }
    }
}

/// Request to create a teacher account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTeacherRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// ISO date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_of_birth: String,
    #[schema(value_type = String)]
    pub gender: Gender,
    pub can_teach_male: bool,
    pub can_teach_female: bool,
    /// The school to attach the teacher to. Defaults to the caller's only
    /// managed school; required when the caller manages several.
    pub school_id: Option<Uuid>,
}

impl Validate for AddTeacherRequest {
    fn validate(&self) -> Result<(), String> {
        validate_email(&self.email).map_err(|e| e.to_string())?;
        validate_password(&self.password).map_err(|e| e.to_string())?;
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("first_name and last_name must not be empty".to_string());
        }
        if !self.can_teach_male && !self.can_teach_female {
            return Err("a teacher must be able to teach at least one group".to_string());
        }
        Ok(())
    }
}

/// Teacher creation response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddTeacherResponse {
    pub teacher: TeacherView,
}

/// Teacher approval response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApproveTeacherResponse {
    pub message: String,
    pub teacher: TeacherView,
}

/// Build the teachers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/teachers/add", post(add_teacher))
        .route("/api/teachers/:id/approve", post(approve_teacher))
}

/// POST /api/teachers/add — Create a teacher account for a managed school.
#[utoipa::path(
    post,
    path = "/api/teachers/add",
    request_body = AddTeacherRequest,
    responses(
        (status = 201, description = "Teacher created", body = AddTeacherResponse),
        (status = 403, description = "Manager role required", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "teachers"
)]
pub(crate) async fn add_teacher(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: Result<Json<AddTeacherRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddTeacherResponse>), AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    let req = extract_validated_json(body)?;

    let school_id = resolve_school(&state, manager.id, req.school_id)?;

    if state.find_user_by_email(&req.email).is_some() {
        return Err(AppError::Conflict(format!(
            "email {} is already registered",
            req.email
        )));
    }

    // The teacher's login account.
    let salt = generate_salt();
    let user = UserRecord {
        id: UserId::new(),
        email: req.email.clone(),
        password_digest: hash_password(&salt, &req.password),
        password_salt: salt,
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        phone: req.phone,
        address: req.address,
        date_of_birth: req.date_of_birth,
        gender: req.gender,
        state: state
            .schools
            .get(&school_id)
            .map(|s| s.state)
            .unwrap_or_default(),
        role: Role::Teacher,
        created_at: Utc::now(),
    };
    state.users.insert(user.id, user.clone());

    // New teachers start unapproved and are invisible to the assignment
    // gate until the manager approves them.
    let teacher = TeacherRecord {
        profile: TeacherProfile {
            id: TeacherId::new(),
            user_id: user.id,
            school_id,
            gender: req.gender,
            can_teach_male: req.can_teach_male,
            can_teach_female: req.can_teach_female,
            approved: false,
        },
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        created_at: Utc::now(),
    };
    state.teachers.insert(teacher.profile.id, teacher.clone());
    tracing::info!(teacher_id = %teacher.profile.id, %school_id, "teacher created");

    Ok((
        StatusCode::CREATED,
        Json(AddTeacherResponse {
            teacher: TeacherView::from(&teacher),
        }),
    ))
}

/// POST /api/teachers/:id/approve — Approve a teacher for assignments.
///
/// Idempotent: approving an approved teacher is a no-op.
#[utoipa::path(
    post,
    path = "/api/teachers/{id}/approve",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher approved", body = ApproveTeacherResponse),
        (status = 403, description = "Not this school's manager", body = crate::error::ErrorBody),
        (status = 404, description = "Teacher not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "teachers"
)]
pub(crate) async fn approve_teacher(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApproveTeacherResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    let teacher_id = TeacherId::from_uuid(id);
    let manager_id = manager.id;

    let teacher = state
        .teachers
        .try_update(&teacher_id, |t| {
            if !state.user_manages_school(manager_id, t.profile.school_id) {
                return Err(AppError::Forbidden(
                    "not the manager of this teacher's school".to_string(),
                ));
            }
            t.profile.approved = true;
            Ok::<_, AppError>(t.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("teacher {teacher_id} not found")))??;

    tracing::info!(%teacher_id, "teacher approved");
    Ok(Json(ApproveTeacherResponse {
        message: "teacher approved".to_string(),
        teacher: TeacherView::from(&teacher),
    }))
}

fn resolve_school(
    state: &AppState,
    manager_id: UserId,
    requested: Option<Uuid>,
) -> Result<SchoolId, AppError> {
    match requested {
        Some(raw) => {
            let school_id = SchoolId::from_uuid(raw);
            if !state.user_manages_school(manager_id, school_id) {
                return Err(AppError::Forbidden(
                    "not the manager of this school".to_string(),
                ));
            }
            Ok(school_id)
        }
        None => {
            let managed = state.managed_schools(manager_id);
            match managed.as_slice() {
                [only] => Ok(only.id),
                [] => Err(AppError::Conflict(
                    "create a school before adding teachers".to_string(),
                )),
                _ => Err(AppError::Validation(
                    "school_id is required when managing several schools".to_string(),
                )),
            }
        }
    }
}
