//! # Validated JSON Extraction
//!
//! Request bodies are extracted as `Result<Json<T>, JsonRejection>` so that
//! deserialization failures surface as structured 422 responses instead of
//! Axum's default plain-text rejection, then validated via the [`Validate`]
//! trait before the handler sees them.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request-level semantic validation, applied after deserialization.
pub trait Validate {
    /// Check the request's field values. The returned message becomes the
    /// client-visible validation error.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON extraction, then run semantic validation.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(req) = body.map_err(|e| AppError::Validation(format!("invalid request body: {e}")))?;
    req.validate().map_err(AppError::Validation)?;
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Probe {
        value: u32,
    }

    impl Validate for Probe {
        fn validate(&self) -> Result<(), String> {
            if self.value == 0 {
                return Err("value must be positive".to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn valid_body_passes() {
        let probe = extract_validated_json(Ok(Json(Probe { value: 3 }))).unwrap();
        assert_eq!(probe.value, 3);
    }

    #[test]
    fn semantic_failure_becomes_validation_error() {
        let err = extract_validated_json(Ok(Json(Probe { value: 0 }))).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("positive")),
            other => panic!("expected Validation, got: {other:?}"),
        }
    }
}
