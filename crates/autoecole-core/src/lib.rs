//! # autoecole-core — Foundational Types for the Autoecole Platform
//!
//! This crate is the bedrock of the autoecole workspace. It defines the
//! type-system primitives shared by the enrollment domain and the API layer.
//! Every other crate in the workspace depends on `autoecole-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `UserId`, `SchoolId`,
//!    `EnrollmentId`, `DocumentId`, `TeacherId` — all newtypes over UUIDs.
//!    No bare strings or loose UUIDs for identifiers, so a teacher id cannot
//!    be passed where an enrollment id is expected.
//!
//! 2. **Closed domain enums.** `Role`, `Gender`, and `DocumentType` are
//!    exhaustive enums with serde snake_case wire names. Adding a document
//!    type forces every consumer to handle it.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with
//!    seconds precision, so transition logs and API payloads agree on a
//!    single textual form.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `autoecole-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use domain::{DocumentType, Gender, Role, REQUIRED_DOCUMENTS, STATES};
pub use error::ValidationError;
pub use identity::{DocumentId, EnrollmentId, SchoolId, TeacherId, UserId};
pub use temporal::Timestamp;
