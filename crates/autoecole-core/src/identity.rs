//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the autoecole platform. These
//! prevent accidental identifier confusion: you cannot pass a `TeacherId`
//! where an `EnrollmentId` is expected, even though both wrap a UUID.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registered user (guest, student, teacher, manager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

/// Unique identifier for a driving school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchoolId(pub Uuid);

/// Unique identifier for an enrollment of a student in a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentId(pub Uuid);

/// Unique identifier for an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

/// Unique identifier for a teacher profile at a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeacherId(pub Uuid);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_id!(UserId);
impl_id!(SchoolId);
impl_id!(EnrollmentId);
impl_id!(DocumentId);
impl_id!(TeacherId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
        assert_ne!(EnrollmentId::new(), EnrollmentId::new());
    }

    #[test]
    fn id_display_is_plain_uuid() {
        let id = SchoolId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn id_serializes_as_inner_uuid() {
        let id = DocumentId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));

        let parsed: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn from_uuid_round_trips() {
        let raw = Uuid::new_v4();
        let id = TeacherId::from_uuid(raw);
        assert_eq!(id.as_uuid(), &raw);
    }
}
