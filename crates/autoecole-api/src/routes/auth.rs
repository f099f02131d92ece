//! # Authentication API
//!
//! Registration, login, and the current-user view. Registration creates a
//! guest account and immediately issues a bearer token, so a fresh user can
//! enroll without a separate login round-trip.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use autoecole_core::error::{validate_email, validate_password};
use autoecole_core::{domain::validate_state, Gender, Role, UserId};

use crate::auth::{generate_salt, hash_password, issue_token, verify_password, CurrentUser};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, UserRecord};

/// Public view of a user account. Credential fields never leave the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    #[schema(value_type = String)]
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: String,
    #[schema(value_type = String)]
    pub gender: Gender,
    pub state: String,
    #[schema(value_type = String)]
    pub role: Role,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            date_of_birth: user.date_of_birth.clone(),
            gender: user.gender,
            state: user.state.clone(),
            role: user.role,
        }
    }
}

/// Registration request. New accounts always start as guests.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date_of_birth: String,
    #[schema(value_type = String)]
    pub gender: Gender,
    /// Wilaya of residence.
    pub state: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        validate_email(&self.email).map_err(|e| e.to_string())?;
        validate_password(&self.password).map_err(|e| e.to_string())?;
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("first_name and last_name must not be empty".to_string());
        }
        NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d")
            .map_err(|_| format!("date_of_birth must be YYYY-MM-DD, got {:?}", self.date_of_birth))?;
        validate_state(&self.state).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("email and password must not be empty".to_string());
        }
        Ok(())
    }
}

/// Token response shared by register and login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Opaque bearer token for subsequent requests.
    pub access_token: String,
    pub token_type: String,
    pub user: UserView,
}

/// Current-user response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: UserView,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

/// POST /api/auth/register — Create a guest account and issue a token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let req = extract_validated_json(body)?;

    if state.find_user_by_email(&req.email).is_some() {
        return Err(AppError::Conflict(format!(
            "email {} is already registered",
            req.email
        )));
    }

    let salt = generate_salt();
    let user = UserRecord {
        id: UserId::new(),
        email: req.email,
        password_digest: hash_password(&salt, &req.password),
        password_salt: salt,
        first_name: req.first_name,
        last_name: req.last_name,
        phone: req.phone,
        address: req.address,
        date_of_birth: req.date_of_birth,
        gender: req.gender,
        state: req.state,
        role: Role::Guest,
        created_at: Utc::now(),
    };
    state.users.insert(user.id, user.clone());
    tracing::info!(user_id = %user.id, "registered new guest account");

    let access_token = issue_token(&state, &user);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            token_type: "bearer".to_string(),
            user: UserView::from(&user),
        }),
    ))
}

/// POST /api/auth/login — Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = extract_validated_json(body)?;

    // A single failure message for both unknown email and wrong password,
    // so login attempts cannot probe which emails exist.
    let user = state
        .find_user_by_email(&req.email)
        .filter(|u| verify_password(&u.password_salt, &u.password_digest, &req.password))
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_string()))?;

    let access_token = issue_token(&state, &user);
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserView::from(&user),
    }))
}

/// GET /api/auth/me — The authenticated user's own record.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserView::from(&user),
    })
}
