//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from autoecole-enrollment and autoecole-core to HTTP
//! status codes. Returns JSON error bodies with a machine-readable code and
//! a human-readable message. Never exposes internal error details to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use autoecole_enrollment::{AssignmentError, EnrollmentError, RegistryError};

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422). Covers both JSON deserialization
    /// failures and business-rule violations on input values; only malformed
    /// HTTP framing is 400, and Axum handles that below this layer.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure: missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure: insufficient role or wrong school (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with the current resource state (409): illegal enrollment
    /// transitions, assignment-gate rejections, duplicate registrations.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to
    /// the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this
    /// error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        // Log server-side errors for operator visibility.
        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert core validation errors to API errors.
impl From<autoecole_core::ValidationError> for AppError {
    fn from(err: autoecole_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert enrollment state machine errors to API errors.
impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match &err {
            EnrollmentError::InvalidTransition { .. }
            | EnrollmentError::TerminalStatus { .. }
            | EnrollmentError::NotApproved { .. }
            | EnrollmentError::NoTeacherAssigned => Self::Conflict(err.to_string()),
            EnrollmentError::EmptyReason => Self::Validation(err.to_string()),
        }
    }
}

/// Convert document registry errors to API errors.
impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match &err {
            RegistryError::NotRequired { .. } => Self::Validation(err.to_string()),
            RegistryError::NotFound { .. } => Self::NotFound(err.to_string()),
        }
    }
}

/// Convert assignment gate errors to API errors.
///
/// A teacher from another school reads as "no such teacher here" (404); the
/// remaining rejections are state conflicts (409).
impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        match &err {
            AssignmentError::SchoolMismatch { .. } => Self::NotFound(err.to_string()),
            AssignmentError::EnrollmentNotApproved { .. }
            | AssignmentError::TeacherNotApproved { .. }
            | AssignmentError::CapabilityMismatch { .. } => Self::Conflict(err.to_string()),
        }
    }
}
