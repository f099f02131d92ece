//! # API Route Modules
//!
//! Route modules for the autoecole API surface:
//!
//! - `auth` — registration, login, and the current-user view.
//! - `schools` — wilaya reference data, public school listing, school
//!   creation (the creator becomes the school's manager).
//! - `enrollments` — a student's application to a school.
//! - `documents` — the student document workflow: listing, upload, and
//!   manager acceptance driving the completeness transition.
//! - `teachers` — teacher accounts: creation and manager approval.
//! - `manager` — the manager console: enrollment review, approve/refuse
//!   decisions, and the teacher assignment gate.
//! - `dashboard` — the student's aggregated view, including refusal
//!   reasons and the assigned teacher.

pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod enrollments;
pub mod manager;
pub mod schools;
pub mod teachers;
