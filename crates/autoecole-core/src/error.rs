//! # Validation Errors
//!
//! Field-level validation failures shared across the workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations,
//! and carry the offending value so callers can surface a usable message.

use thiserror::Error;

/// A malformed or disallowed input value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email address does not look like an email.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// Password does not meet the minimum length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Required minimum length.
        min: usize,
    },

    /// Unknown role name.
    #[error("unknown role: {0:?}")]
    InvalidRole(String),

    /// Unknown gender name.
    #[error("unknown gender: {0:?}")]
    InvalidGender(String),

    /// Unknown document type name.
    #[error("unknown document type: {0:?}")]
    InvalidDocumentType(String),

    /// `state` does not name a known wilaya.
    #[error("unknown wilaya: {0:?}")]
    UnknownState(String),

    /// Timestamp string could not be parsed.
    #[error("invalid RFC 3339 timestamp: {0}")]
    InvalidTimestamp(String),

    /// A required field was empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the empty field.
        field: &'static str,
    },
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate an email address. Deliberately shallow: the platform only needs
/// to reject obviously broken values, deliverability is the mail server's
/// problem.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Validate a password against the minimum length.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_email() {
        assert!(validate_email("guest@test.com").is_ok());
    }

    #[test]
    fn rejects_missing_at() {
        assert!(validate_email("guest.test.com").is_err());
    }

    #[test]
    fn rejects_empty_local_part() {
        assert!(validate_email("@test.com").is_err());
    }

    #[test]
    fn rejects_dotless_domain() {
        assert!(validate_email("guest@localhost").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("guest123").is_ok());
        assert!(validate_password("abc").is_err());
    }

    #[test]
    fn error_messages_carry_the_value() {
        let err = validate_email("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
