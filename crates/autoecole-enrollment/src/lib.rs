//! # autoecole-enrollment — Enrollment Lifecycle State Machine
//!
//! Implements the enrollment workflow of the autoecole platform: a student's
//! application to a driving school moves through a fixed status graph, gated
//! by document completeness and manager decisions.
//!
//! ```text
//! PendingDocuments ──▶ PendingApproval ──▶ Approved (terminal)
//!        │ all required        │
//!        │ documents           └──▶ Rejected (terminal, reason required)
//!        │ accepted
//! ```
//!
//! ## Components
//!
//! - **Document registry** (`documents.rs`): per-enrollment tracking of the
//!   required document types and their acceptance state. Uploading alone
//!   never advances the enrollment; only acceptance of the complete required
//!   set does.
//!
//! - **Enrollment** (`enrollment.rs`): the status state machine with
//!   validated transitions and an ordered transition log. Invalid
//!   transitions are rejected at runtime with structured errors, the same
//!   enum-with-`Result` approach used for sequential lifecycles elsewhere in
//!   the workspace.
//!
//! - **Role promotion** (`promotion.rs`): `guest -> student` is a pure
//!   function of enrollment state, applied exactly once when an enrollment
//!   is approved and never reversed.
//!
//! - **Teacher assignment gate** (`assignment.rs`): teacher/enrollment
//!   pairing is only legal on approved enrollments, within the same school,
//!   and when the teacher's capability flags cover the student.

pub mod assignment;
pub mod documents;
pub mod enrollment;
pub mod promotion;

// ─── Document registry re-exports ───────────────────────────────────

pub use documents::{AcceptOutcome, Document, DocumentRegistry, RegistryError};

// ─── Enrollment re-exports ──────────────────────────────────────────

pub use enrollment::{
    Enrollment, EnrollmentError, EnrollmentStatus, TransitionEvidence, TransitionRecord,
};

// ─── Promotion re-exports ───────────────────────────────────────────

pub use promotion::{derived_role, promotion_on_approval};

// ─── Assignment re-exports ──────────────────────────────────────────

pub use assignment::{available_teachers, validate_assignment, AssignmentError, TeacherProfile};
