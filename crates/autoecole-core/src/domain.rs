//! # Domain Enums and Reference Data
//!
//! The closed vocabularies of the platform: user roles, genders, required
//! document types, and the Algerian wilayas accepted as a user's or school's
//! `state` field. All wire names are snake_case to match the public API.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ─── Role ────────────────────────────────────────────────────────────

/// Access role of a registered user.
///
/// `Guest` is the registration default. `Student` is derived exactly once,
/// when one of the user's enrollments is approved. `Teacher` accounts are
/// created by a school manager; `Manager` is acquired by creating a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Registered but without an approved enrollment.
    Guest,
    /// Holds at least one approved enrollment.
    Student,
    /// Teaches at a school.
    Teacher,
    /// Administers a school: approves documents, enrollments, and teachers.
    Manager,
}

impl Role {
    /// Whether this role can perform school-management actions.
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Manager)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Manager => "manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "manager" => Ok(Self::Manager),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

// ─── Gender ──────────────────────────────────────────────────────────

/// Declared gender of a user, consulted by the teacher assignment gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(ValidationError::InvalidGender(other.to_string())),
        }
    }
}

// ─── Document types ──────────────────────────────────────────────────

/// The document types an enrollment may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ProfilePhoto,
    IdCard,
    MedicalCertificate,
    ResidenceCertificate,
}

/// The document types required for every new enrollment.
pub const REQUIRED_DOCUMENTS: &[DocumentType] = &[
    DocumentType::ProfilePhoto,
    DocumentType::IdCard,
    DocumentType::MedicalCertificate,
    DocumentType::ResidenceCertificate,
];

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfilePhoto => "profile_photo",
            Self::IdCard => "id_card",
            Self::MedicalCertificate => "medical_certificate",
            Self::ResidenceCertificate => "residence_certificate",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile_photo" => Ok(Self::ProfilePhoto),
            "id_card" => Ok(Self::IdCard),
            "medical_certificate" => Ok(Self::MedicalCertificate),
            "residence_certificate" => Ok(Self::ResidenceCertificate),
            other => Err(ValidationError::InvalidDocumentType(other.to_string())),
        }
    }
}

// ─── Wilayas ─────────────────────────────────────────────────────────

/// The 48 Algerian wilayas accepted as the `state` of a user or school.
pub const STATES: &[&str] = &[
    "Adrar",
    "Chlef",
    "Laghouat",
    "Oum El Bouaghi",
    "Batna",
    "Béjaïa",
    "Biskra",
    "Béchar",
    "Blida",
    "Bouira",
    "Tamanrasset",
    "Tébessa",
    "Tlemcen",
    "Tiaret",
    "Tizi Ouzou",
    "Alger",
    "Djelfa",
    "Jijel",
    "Sétif",
    "Saïda",
    "Skikda",
    "Sidi Bel Abbès",
    "Annaba",
    "Guelma",
    "Constantine",
    "Médéa",
    "Mostaganem",
    "M'Sila",
    "Mascara",
    "Ouargla",
    "Oran",
    "El Bayadh",
    "Illizi",
    "Bordj Bou Arréridj",
    "Boumerdès",
    "El Tarf",
    "Tindouf",
    "Tissemsilt",
    "El Oued",
    "Khenchela",
    "Souk Ahras",
    "Tipaza",
    "Mila",
    "Aïn Defla",
    "Naâma",
    "Aïn Témouchent",
    "Ghardaïa",
    "Relizane",
];

/// Validate that `state` names a known wilaya.
pub fn validate_state(state: &str) -> Result<(), ValidationError> {
    if STATES.contains(&state) {
        Ok(())
    } else {
        Err(ValidationError::UnknownState(state.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Guest, Role::Student, Role::Teacher, Role::Manager] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn role_rejects_unknown() {
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn only_manager_is_manager() {
        assert!(Role::Manager.is_manager());
        assert!(!Role::Guest.is_manager());
        assert!(!Role::Student.is_manager());
        assert!(!Role::Teacher.is_manager());
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Guest).unwrap(), "\"guest\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"manager\"").unwrap(),
            Role::Manager
        );
    }

    #[test]
    fn gender_round_trips() {
        assert_eq!(Gender::from_str("male").unwrap(), Gender::Male);
        assert_eq!(Gender::from_str("female").unwrap(), Gender::Female);
        assert!(Gender::from_str("other").is_err());
    }

    #[test]
    fn document_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&DocumentType::MedicalCertificate).unwrap(),
            "\"medical_certificate\""
        );
        assert_eq!(
            DocumentType::from_str("residence_certificate").unwrap(),
            DocumentType::ResidenceCertificate
        );
    }

    #[test]
    fn required_documents_has_four_distinct_types() {
        assert_eq!(REQUIRED_DOCUMENTS.len(), 4);
        let mut sorted = REQUIRED_DOCUMENTS.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
    }

    #[test]
    fn forty_eight_wilayas() {
        assert_eq!(STATES.len(), 48);
    }

    #[test]
    fn validate_state_accepts_alger() {
        assert!(validate_state("Alger").is_ok());
        assert!(validate_state("Oran").is_ok());
    }

    #[test]
    fn validate_state_rejects_unknown() {
        assert!(validate_state("Atlantis").is_err());
        assert!(validate_state("alger").is_err());
    }
}
