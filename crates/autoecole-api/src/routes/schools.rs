//! # Driving Schools API
//!
//! Wilaya reference data and the school directory. Listing is public so
//! guests can browse before registering; creating a school is an
//! authenticated action that makes the creator the school's manager.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use autoecole_core::{domain::validate_state, Role, SchoolId, UserId, STATES};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, SchoolRecord};

/// Wilaya list response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatesResponse {
    pub states: Vec<String>,
}

/// Public view of a driving school.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchoolView {
    #[schema(value_type = String)]
    pub id: SchoolId,
    pub name: String,
    pub address: String,
    pub state: String,
    pub phone: String,
    pub email: String,
    pub description: String,
    pub price: f64,
}

impl From<&SchoolRecord> for SchoolView {
    fn from(school: &SchoolRecord) -> Self {
        Self {
            id: school.id,
            name: school.name.clone(),
            address: school.address.clone(),
            state: school.state.clone(),
            phone: school.phone.clone(),
            email: school.email.clone(),
            description: school.description.clone(),
            price: school.price,
        }
    }
}

/// School directory response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchoolsResponse {
    pub schools: Vec<SchoolView>,
}

/// Request to create a driving school.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSchoolRequest {
    pub name: String,
    pub address: String,
    /// Wilaya the school operates in.
    pub state: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub description: String,
    /// Enrollment price in DZD.
    pub price: f64,
}

impl Validate for CreateSchoolRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.name.len() > 255 {
            return Err("name must not exceed 255 characters".to_string());
        }
        validate_state(&self.state).map_err(|e| e.to_string())?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".to_string());
        }
        Ok(())
    }
}

/// Build the schools router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/states", get(list_states))
        .route("/api/driving-schools", get(list_schools).post(create_school))
}

/// GET /api/states — The wilayas accepted in registration and school forms.
#[utoipa::path(
    get,
    path = "/api/states",
    responses(
        (status = 200, description = "Wilaya list", body = StatesResponse),
    ),
    tag = "schools"
)]
pub(crate) async fn list_states() -> Json<StatesResponse> {
    Json(StatesResponse {
        states: STATES.iter().map(|s| s.to_string()).collect(),
    })
}

/// GET /api/driving-schools — Public school directory.
#[utoipa::path(
    get,
    path = "/api/driving-schools",
    responses(
        (status = 200, description = "School directory", body = SchoolsResponse),
    ),
    tag = "schools"
)]
pub(crate) async fn list_schools(State(state): State<AppState>) -> Json<SchoolsResponse> {
    let mut schools = state.schools.list();
    schools.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Json(SchoolsResponse {
        schools: schools.iter().map(SchoolView::from).collect(),
    })
}

/// POST /api/driving-schools — Create a school; the creator becomes its
/// manager.
#[utoipa::path(
    post,
    path = "/api/driving-schools",
    request_body = CreateSchoolRequest,
    responses(
        (status = 201, description = "School created", body = SchoolView),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "schools"
)]
pub(crate) async fn create_school(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CreateSchoolRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SchoolView>), AppError> {
    let req = extract_validated_json(body)?;

    let school = SchoolRecord {
        id: SchoolId::new(),
        name: req.name,
        address: req.address,
        state: req.state,
        phone: req.phone,
        email: req.email,
        description: req.description,
        price: req.price,
        manager_id: user.id,
        created_at: Utc::now(),
    };
    state.schools.insert(school.id, school.clone());

    // Creating a school is the admin action that grants the manager role.
    promote_to_manager(&state, user.id);
    tracing::info!(school_id = %school.id, manager_id = %user.id, "driving school created");

    Ok((StatusCode::CREATED, Json(SchoolView::from(&school))))
}

fn promote_to_manager(state: &AppState, user_id: UserId) {
    let _ = state.users.try_update(&user_id, |u| {
        u.role = Role::Manager;
        Ok::<_, std::convert::Infallible>(())
    });
}
