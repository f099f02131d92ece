//! # Enrollment State Machine
//!
//! Models the lifecycle of a student's enrollment at a driving school.
//!
//! ## States
//!
//! ```text
//! PendingDocuments ──▶ PendingApproval ──▶ Approved (terminal)
//!                            │
//!                            └──▶ Rejected (terminal)
//! ```
//!
//! Transitions are driven by two distinct actors: the document registry
//! reports completeness (`PendingDocuments -> PendingApproval`), and a school
//! manager decides (`PendingApproval -> Approved | Rejected`). Uploading a
//! document is never a transition event.
//!
//! Teacher assignment mutates an `Approved` enrollment without leaving the
//! state; those mutations are still recorded in the transition log so the
//! full decision history of an enrollment stays auditable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use autoecole_core::{EnrollmentId, SchoolId, TeacherId, Timestamp, UserId};

// ─── Enrollment Status ───────────────────────────────────────────────

/// The lifecycle status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Waiting for the required document set to be uploaded and accepted.
    PendingDocuments,
    /// All required documents accepted; waiting for a manager decision.
    PendingApproval,
    /// Manager approved the enrollment (terminal).
    Approved,
    /// Manager rejected the enrollment (terminal, reason recorded).
    Rejected,
}

impl EnrollmentStatus {
    /// Whether this status admits no further document- or decision-driven
    /// transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingDocuments => "pending_documents",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during enrollment lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentError {
    /// Attempted transition is not valid from the current status.
    #[error("invalid enrollment transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: EnrollmentStatus,
        /// Attempted target status.
        to: EnrollmentStatus,
    },

    /// Enrollment is in a terminal status.
    #[error("enrollment is in terminal status {status}")]
    TerminalStatus {
        /// The terminal status.
        status: EnrollmentStatus,
    },

    /// Rejection requires a non-empty reason.
    #[error("rejection requires a non-empty reason")]
    EmptyReason,

    /// Teacher assignment operations require an approved enrollment.
    #[error("enrollment is {status}, teacher assignment requires approved")]
    NotApproved {
        /// The current status.
        status: EnrollmentStatus,
    },

    /// Unassign was called with no teacher assigned.
    #[error("no teacher assigned to this enrollment")]
    NoTeacherAssigned,
}

// ─── Transition Evidence ─────────────────────────────────────────────

/// Context for an enrollment transition.
#[derive(Debug, Clone)]
pub struct TransitionEvidence {
    /// Reason for the transition. For rejections this is the refusal reason
    /// shown to the student.
    pub reason: String,
    /// The user who initiated the transition, when one did (completeness
    /// transitions are system-driven).
    pub actor: Option<UserId>,
}

impl TransitionEvidence {
    /// System-driven transition with no acting user.
    pub fn system(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            actor: None,
        }
    }

    /// Transition initiated by a specific user.
    pub fn by(actor: UserId, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            actor: Some(actor),
        }
    }
}

/// Record of an enrollment transition or in-state mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Status before the transition.
    pub from_status: EnrollmentStatus,
    /// Status after the transition.
    pub to_status: EnrollmentStatus,
    /// When the transition occurred.
    pub timestamp: Timestamp,
    /// Reason for the transition.
    pub reason: String,
    /// The user who initiated the transition, if any.
    pub actor: Option<UserId>,
}

// ─── Enrollment ──────────────────────────────────────────────────────

/// An enrollment with its lifecycle status and transition history.
///
/// Enforces valid transitions with structured error reporting. Document
/// bookkeeping lives in [`crate::documents::DocumentRegistry`]; this type
/// only consumes the registry's completeness verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier.
    pub id: EnrollmentId,
    /// The student who applied.
    pub student_id: UserId,
    /// The school applied to.
    pub school_id: SchoolId,
    /// Current lifecycle status.
    pub status: EnrollmentStatus,
    /// Refusal reason, present iff status is `Rejected`.
    pub refusal_reason: Option<String>,
    /// Currently assigned teacher, only while `Approved`.
    pub assigned_teacher_id: Option<TeacherId>,
    /// When the enrollment was created.
    pub created_at: Timestamp,
    /// Ordered log of all transitions and assignment mutations.
    pub transitions: Vec<TransitionRecord>,
}

impl Enrollment {
    /// Create a new enrollment in `PendingDocuments`.
    pub fn new(student_id: UserId, school_id: SchoolId) -> Self {
        Self {
            id: EnrollmentId::new(),
            student_id,
            school_id,
            status: EnrollmentStatus::PendingDocuments,
            refusal_reason: None,
            assigned_teacher_id: None,
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        }
    }

    /// All required documents accepted (PendingDocuments -> PendingApproval).
    ///
    /// Driven by the document registry's completeness verdict, never by an
    /// upload on its own.
    pub fn mark_documents_complete(
        &mut self,
        evidence: TransitionEvidence,
    ) -> Result<(), EnrollmentError> {
        self.require_status(
            EnrollmentStatus::PendingDocuments,
            EnrollmentStatus::PendingApproval,
        )?;
        self.do_transition(EnrollmentStatus::PendingApproval, evidence);
        Ok(())
    }

    /// Manager approves the enrollment (PendingApproval -> Approved).
    pub fn approve(&mut self, evidence: TransitionEvidence) -> Result<(), EnrollmentError> {
        self.require_status(EnrollmentStatus::PendingApproval, EnrollmentStatus::Approved)?;
        self.do_transition(EnrollmentStatus::Approved, evidence);
        Ok(())
    }

    /// Manager rejects the enrollment (PendingApproval -> Rejected).
    ///
    /// The evidence reason is the refusal reason persisted for the student;
    /// it must be non-empty.
    pub fn reject(&mut self, evidence: TransitionEvidence) -> Result<(), EnrollmentError> {
        if evidence.reason.trim().is_empty() {
            return Err(EnrollmentError::EmptyReason);
        }
        self.require_status(EnrollmentStatus::PendingApproval, EnrollmentStatus::Rejected)?;
        self.refusal_reason = Some(evidence.reason.clone());
        self.do_transition(EnrollmentStatus::Rejected, evidence);
        Ok(())
    }

    /// Assign a teacher to an approved enrollment.
    ///
    /// Re-assignment overwrites the previous teacher; the replaced id is
    /// returned so callers can report it. Capability and school checks are
    /// the assignment gate's job ([`crate::assignment::validate_assignment`]).
    pub fn assign_teacher(
        &mut self,
        teacher_id: TeacherId,
        evidence: TransitionEvidence,
    ) -> Result<Option<TeacherId>, EnrollmentError> {
        self.require_approved()?;
        let previous = self.assigned_teacher_id.replace(teacher_id);
        self.do_transition(EnrollmentStatus::Approved, evidence);
        Ok(previous)
    }

    /// Clear the teacher assignment on an approved enrollment.
    pub fn unassign_teacher(
        &mut self,
        evidence: TransitionEvidence,
    ) -> Result<TeacherId, EnrollmentError> {
        self.require_approved()?;
        let teacher_id = self
            .assigned_teacher_id
            .take()
            .ok_or(EnrollmentError::NoTeacherAssigned)?;
        self.do_transition(EnrollmentStatus::Approved, evidence);
        Ok(teacher_id)
    }

    /// Whether the enrollment is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Validate that the enrollment is in the expected source status.
    fn require_status(
        &self,
        expected: EnrollmentStatus,
        target: EnrollmentStatus,
    ) -> Result<(), EnrollmentError> {
        if self.status == expected {
            return Ok(());
        }
        if self.status.is_terminal() {
            return Err(EnrollmentError::TerminalStatus {
                status: self.status,
            });
        }
        Err(EnrollmentError::InvalidTransition {
            from: self.status,
            to: target,
        })
    }

    /// Validate that teacher assignment mutations are legal right now.
    fn require_approved(&self) -> Result<(), EnrollmentError> {
        if self.status != EnrollmentStatus::Approved {
            return Err(EnrollmentError::NotApproved {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Record a transition and apply the new status.
    fn do_transition(&mut self, to: EnrollmentStatus, evidence: TransitionEvidence) {
        self.transitions.push(TransitionRecord {
            from_status: self.status,
            to_status: to,
            timestamp: Timestamp::now(),
            reason: evidence.reason,
            actor: evidence.actor,
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(reason: &str) -> TransitionEvidence {
        TransitionEvidence::by(UserId::new(), reason)
    }

    fn make_enrollment() -> Enrollment {
        Enrollment::new(UserId::new(), SchoolId::new())
    }

    fn make_pending_approval() -> Enrollment {
        let mut e = make_enrollment();
        e.mark_documents_complete(TransitionEvidence::system("all documents accepted"))
            .unwrap();
        e
    }

    fn make_approved() -> Enrollment {
        let mut e = make_pending_approval();
        e.approve(evidence("Dossier complete")).unwrap();
        e
    }

    // ── Happy-path lifecycle tests ───────────────────────────────────

    #[test]
    fn new_enrollment_is_pending_documents() {
        let e = make_enrollment();
        assert_eq!(e.status, EnrollmentStatus::PendingDocuments);
        assert!(!e.is_terminal());
        assert!(e.refusal_reason.is_none());
        assert!(e.assigned_teacher_id.is_none());
        assert!(e.transitions.is_empty());
    }

    #[test]
    fn documents_complete_moves_to_pending_approval() {
        let e = make_pending_approval();
        assert_eq!(e.status, EnrollmentStatus::PendingApproval);
        assert_eq!(e.transitions.len(), 1);
        assert_eq!(
            e.transitions[0].from_status,
            EnrollmentStatus::PendingDocuments
        );
    }

    #[test]
    fn approve_moves_to_approved() {
        let e = make_approved();
        assert_eq!(e.status, EnrollmentStatus::Approved);
        assert!(e.is_terminal());
    }

    #[test]
    fn reject_moves_to_rejected_and_stores_reason() {
        let mut e = make_pending_approval();
        e.reject(evidence("Documents unclear")).unwrap();
        assert_eq!(e.status, EnrollmentStatus::Rejected);
        assert!(e.is_terminal());
        assert_eq!(e.refusal_reason.as_deref(), Some("Documents unclear"));
    }

    #[test]
    fn full_lifecycle_is_logged() {
        let mut e = make_approved();
        let teacher = TeacherId::new();
        e.assign_teacher(teacher, evidence("assigned")).unwrap();
        e.unassign_teacher(evidence("unassigned")).unwrap();
        assert_eq!(e.transitions.len(), 4);
        assert!(e.transitions.iter().all(|t| !t.reason.is_empty()));
    }

    // ── Invalid transition tests ─────────────────────────────────────

    #[test]
    fn cannot_approve_while_pending_documents() {
        let mut e = make_enrollment();
        let err = e.approve(evidence("too early")).unwrap_err();
        assert_eq!(
            err,
            EnrollmentError::InvalidTransition {
                from: EnrollmentStatus::PendingDocuments,
                to: EnrollmentStatus::Approved,
            }
        );
        assert_eq!(e.status, EnrollmentStatus::PendingDocuments);
    }

    #[test]
    fn cannot_reject_while_pending_documents() {
        let mut e = make_enrollment();
        assert!(e.reject(evidence("too early")).is_err());
    }

    #[test]
    fn cannot_complete_documents_twice() {
        let mut e = make_pending_approval();
        let err = e
            .mark_documents_complete(TransitionEvidence::system("again"))
            .unwrap_err();
        assert!(matches!(err, EnrollmentError::InvalidTransition { .. }));
    }

    #[test]
    fn approved_is_terminal_for_document_flow() {
        let mut e = make_approved();
        let err = e
            .mark_documents_complete(TransitionEvidence::system("late accept"))
            .unwrap_err();
        assert_eq!(
            err,
            EnrollmentError::TerminalStatus {
                status: EnrollmentStatus::Approved,
            }
        );
    }

    #[test]
    fn rejected_is_terminal() {
        let mut e = make_pending_approval();
        e.reject(evidence("incomplete dossier")).unwrap();
        assert!(e.approve(evidence("changed my mind")).is_err());
        assert!(e
            .mark_documents_complete(TransitionEvidence::system("x"))
            .is_err());
    }

    #[test]
    fn reject_requires_non_empty_reason() {
        let mut e = make_pending_approval();
        assert_eq!(
            e.reject(evidence("   ")).unwrap_err(),
            EnrollmentError::EmptyReason
        );
        // The failed rejection must not have mutated anything.
        assert_eq!(e.status, EnrollmentStatus::PendingApproval);
        assert!(e.refusal_reason.is_none());
    }

    // ── Teacher assignment tests ─────────────────────────────────────

    #[test]
    fn assign_teacher_requires_approved() {
        let mut e = make_enrollment();
        let err = e
            .assign_teacher(TeacherId::new(), evidence("assign"))
            .unwrap_err();
        assert_eq!(
            err,
            EnrollmentError::NotApproved {
                status: EnrollmentStatus::PendingDocuments,
            }
        );
        assert!(e.assigned_teacher_id.is_none());
    }

    #[test]
    fn assign_teacher_sets_assignment() {
        let mut e = make_approved();
        let teacher = TeacherId::new();
        let previous = e.assign_teacher(teacher, evidence("assign")).unwrap();
        assert_eq!(previous, None);
        assert_eq!(e.assigned_teacher_id, Some(teacher));
        assert_eq!(e.status, EnrollmentStatus::Approved);
    }

    #[test]
    fn reassignment_overwrites_and_reports_previous() {
        let mut e = make_approved();
        let first = TeacherId::new();
        let second = TeacherId::new();
        e.assign_teacher(first, evidence("assign")).unwrap();
        let previous = e.assign_teacher(second, evidence("reassign")).unwrap();
        assert_eq!(previous, Some(first));
        assert_eq!(e.assigned_teacher_id, Some(second));
    }

    #[test]
    fn unassign_clears_and_returns_teacher() {
        let mut e = make_approved();
        let teacher = TeacherId::new();
        e.assign_teacher(teacher, evidence("assign")).unwrap();
        let removed = e.unassign_teacher(evidence("unassign")).unwrap();
        assert_eq!(removed, teacher);
        assert!(e.assigned_teacher_id.is_none());
    }

    #[test]
    fn unassign_without_assignment_fails() {
        let mut e = make_approved();
        assert_eq!(
            e.unassign_teacher(evidence("unassign")).unwrap_err(),
            EnrollmentError::NoTeacherAssigned
        );
    }

    #[test]
    fn unassign_on_pending_enrollment_fails_with_not_approved() {
        let mut e = make_pending_approval();
        assert!(matches!(
            e.unassign_teacher(evidence("unassign")).unwrap_err(),
            EnrollmentError::NotApproved { .. }
        ));
    }

    // ── Display and serialization tests ──────────────────────────────

    #[test]
    fn status_display_is_snake_case() {
        assert_eq!(
            EnrollmentStatus::PendingDocuments.to_string(),
            "pending_documents"
        );
        assert_eq!(
            EnrollmentStatus::PendingApproval.to_string(),
            "pending_approval"
        );
        assert_eq!(EnrollmentStatus::Approved.to_string(), "approved");
        assert_eq!(EnrollmentStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn status_serde_matches_display() {
        for status in [
            EnrollmentStatus::PendingDocuments,
            EnrollmentStatus::PendingApproval,
            EnrollmentStatus::Approved,
            EnrollmentStatus::Rejected,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn enrollment_serialization_round_trips() {
        let e = make_approved();
        let json = serde_json::to_string(&e).unwrap();
        let parsed: Enrollment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, e.status);
        assert_eq!(parsed.id, e.id);
        assert_eq!(parsed.transitions.len(), e.transitions.len());
    }
}
