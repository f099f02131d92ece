//! # Application State
//!
//! Shared state for the Axum application: configuration, the in-memory
//! record stores, and the session table. Each store serializes writers per
//! record through [`Store::try_update`], which is what keeps racing document
//! acceptances from double-firing the completeness transition and makes
//! concurrent manager decisions on one enrollment mutually exclusive.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use autoecole_core::{EnrollmentId, Gender, Role, SchoolId, TeacherId, UserId};
use autoecole_enrollment::{DocumentRegistry, Enrollment, TeacherProfile};

// ─── Configuration ───────────────────────────────────────────────────

/// Application configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the server binds.
    pub port: u16,
    /// Whether the Prometheus middleware and `/metrics` endpoint are mounted.
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// Default port of the API service.
    pub const DEFAULT_PORT: u16 = 8001;

    /// Resolve configuration from environment variables.
    ///
    /// - `AUTOECOLE_PORT` — listen port (default 8001).
    /// - `AUTOECOLE_METRICS_ENABLED` — metrics on unless set to `"false"`.
    pub fn from_env() -> Self {
        let port = std::env::var("AUTOECOLE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_PORT);
        let metrics_enabled = std::env::var("AUTOECOLE_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);
        Self {
            port,
            metrics_enabled,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            metrics_enabled: true,
        }
    }
}

// ─── Generic store ───────────────────────────────────────────────────

/// A concurrent in-memory record store.
///
/// Readers take consistent snapshots; writers go through [`Store::insert`]
/// or the atomic read-validate-update of [`Store::try_update`], which holds
/// the write lock across the whole closure. That closure is the
/// at-most-one-writer boundary for a record: validation and mutation cannot
/// interleave with another writer.
#[derive(Debug)]
pub struct Store<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for Store<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Snapshot of a single record.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    /// Snapshot of all records, in no particular order.
    pub fn list(&self) -> Vec<V> {
        self.inner.read().values().cloned().collect()
    }

    /// Atomically read-validate-update a record under a single write lock.
    ///
    /// Returns `None` when the key is absent, otherwise the closure's
    /// result. When the closure fails, its partial mutations are discarded
    /// and the stored record is left unchanged.
    pub fn try_update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        let mut guard = self.inner.write();
        let current = guard.get_mut(key)?;
        let mut candidate = current.clone();
        match f(&mut candidate) {
            Ok(result) => {
                *current = candidate;
                Some(Ok(result))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    /// Per-user random salt for the password digest.
    pub password_salt: String,
    /// Hex SHA-256 of salt + password.
    pub password_digest: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: Gender,
    /// Wilaya of residence.
    pub state: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A driving school and its manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub id: SchoolId,
    pub name: String,
    pub address: String,
    /// Wilaya the school operates in.
    pub state: String,
    pub phone: String,
    pub email: String,
    pub description: String,
    /// Enrollment price in DZD.
    pub price: f64,
    pub manager_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A teacher: the assignment-gate profile plus display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub profile: TeacherProfile,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TeacherRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An enrollment with its document registry.
///
/// Kept as one record so that a document acceptance and the enrollment
/// transition it may trigger commit under the same `try_update` closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub enrollment: Enrollment,
    pub documents: DocumentRegistry,
}

// ─── App state ───────────────────────────────────────────────────────

/// Shared application state passed to all route handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub users: Store<UserId, UserRecord>,
    pub schools: Store<SchoolId, SchoolRecord>,
    pub teachers: Store<TeacherId, TeacherRecord>,
    pub enrollments: Store<EnrollmentId, EnrollmentRecord>,
    /// Bearer token -> user. Tokens are opaque and server-side only.
    pub sessions: Store<String, UserId>,
}

impl AppState {
    /// Create application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create application state with explicit configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            users: Store::new(),
            schools: Store::new(),
            teachers: Store::new(),
            enrollments: Store::new(),
            sessions: Store::new(),
        }
    }

    /// Find a user by email, case-insensitively.
    pub fn find_user_by_email(&self, email: &str) -> Option<UserRecord> {
        let needle = email.to_lowercase();
        self.users
            .list()
            .into_iter()
            .find(|u| u.email.to_lowercase() == needle)
    }

    /// Whether this user is the manager of the given school.
    pub fn user_manages_school(&self, user_id: UserId, school_id: SchoolId) -> bool {
        self.schools
            .get(&school_id)
            .is_some_and(|s| s.manager_id == user_id)
    }

    /// Schools managed by this user.
    pub fn managed_schools(&self, user_id: UserId) -> Vec<SchoolRecord> {
        self.schools
            .list()
            .into_iter()
            .filter(|s| s.manager_id == user_id)
            .collect()
    }

    /// All enrollments owned by this student, newest first.
    pub fn enrollments_of(&self, student_id: UserId) -> Vec<EnrollmentRecord> {
        let mut records: Vec<_> = self
            .enrollments
            .list()
            .into_iter()
            .filter(|r| r.enrollment.student_id == student_id)
            .collect();
        records.sort_by(|a, b| b.enrollment.created_at.cmp(&a.enrollment.created_at));
        records
    }

    /// The student's most recent non-terminal enrollment, if any.
    pub fn active_enrollment_of(&self, student_id: UserId) -> Option<EnrollmentRecord> {
        self.enrollments_of(student_id)
            .into_iter()
            .find(|r| !r.enrollment.is_terminal())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_insert_get_list() {
        let store: Store<u32, String> = Store::new();
        assert!(store.is_empty());
        store.insert(1, "one".to_string());
        store.insert(2, "two".to_string());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&1).as_deref(), Some("one"));
        assert!(store.get(&3).is_none());
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn try_update_missing_key_is_none() {
        let store: Store<u32, String> = Store::new();
        let result = store.try_update(&1, |_v| Ok::<_, ()>(()));
        assert!(result.is_none());
    }

    #[test]
    fn try_update_applies_on_ok() {
        let store: Store<u32, u32> = Store::new();
        store.insert(1, 10);
        let result = store.try_update(&1, |v| {
            *v += 1;
            Ok::<_, ()>(*v)
        });
        assert_eq!(result, Some(Ok(11)));
        assert_eq!(store.get(&1), Some(11));
    }

    #[test]
    fn try_update_discards_on_err() {
        let store: Store<u32, u32> = Store::new();
        store.insert(1, 10);
        let result = store.try_update(&1, |v| {
            *v += 1; // mutate, then fail
            Err::<(), _>("nope")
        });
        assert_eq!(result, Some(Err("nope")));
        assert_eq!(store.get(&1), Some(10), "failed update must not persist");
    }

    #[test]
    fn try_update_serializes_writers() {
        let store: Store<u32, u64> = Store::new();
        store.insert(1, 0);
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        store
                            .try_update(&1, |v| {
                                *v += 1;
                                Ok::<_, ()>(())
                            })
                            .unwrap()
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(store.get(&1), Some(8000));
    }

    #[test]
    fn config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, AppConfig::DEFAULT_PORT);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        let state = AppState::new();
        let id = UserId::new();
        state.users.insert(
            id,
            UserRecord {
                id,
                email: "Guest@Test.com".to_string(),
                password_salt: String::new(),
                password_digest: String::new(),
                first_name: "Test".to_string(),
                last_name: "Guest".to_string(),
                phone: String::new(),
                address: String::new(),
                date_of_birth: "1990-01-01".to_string(),
                gender: Gender::Male,
                state: "Alger".to_string(),
                role: Role::Guest,
                created_at: Utc::now(),
            },
        );
        assert!(state.find_user_by_email("guest@test.com").is_some());
        assert!(state.find_user_by_email("other@test.com").is_none());
    }
}
