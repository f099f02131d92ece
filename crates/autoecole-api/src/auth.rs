//! # Authentication
//!
//! Per-user bearer sessions. Registration and login issue an opaque token
//! (a random UUID) mapped server-side to the user; the [`CurrentUser`]
//! extractor resolves the `Authorization: Bearer` header on every protected
//! handler. Passwords are stored as hex SHA-256 digests over a per-user
//! random salt; plaintext never leaves the register/login handlers.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, UserRecord};

/// Length of the random password salt, in bytes.
const SALT_LEN: usize = 16;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generate a fresh random password salt.
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    to_hex(&salt)
}

/// Hex SHA-256 digest of salt + password.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

/// Check a candidate password against a stored salt and digest.
pub fn verify_password(salt: &str, digest: &str, candidate: &str) -> bool {
    hash_password(salt, candidate) == digest
}

/// Issue a new bearer token for a user and record the session.
pub fn issue_token(state: &AppState, user: &UserRecord) -> String {
    let token = Uuid::new_v4().simple().to_string();
    state.sessions.insert(token.clone(), user.id);
    token
}

/// The authenticated caller, resolved from the bearer token.
///
/// Handlers that take `CurrentUser` are authenticated; the extractor
/// rejects missing, malformed, and unknown tokens with 401 before the
/// handler body runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl CurrentUser {
    /// Fail with 403 unless the caller has the manager role.
    pub fn require_manager(&self) -> Result<(), AppError> {
        if !self.0.role.is_manager() {
            return Err(AppError::Forbidden("manager role required".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_string()))?;

        let user_id = state
            .sessions
            .get(&token.to_string())
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))?;

        let user = state.users.get(&user_id).ok_or_else(|| {
            // A session pointing at a deleted user should not happen; treat
            // it as an expired token rather than a server fault.
            AppError::Unauthorized("invalid or expired token".to_string())
        })?;

        Ok(CurrentUser(user))
    }
}
