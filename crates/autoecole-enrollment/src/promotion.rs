//! # Role Promotion Policy
//!
//! `guest -> student` is a function of enrollment state: a user is a student
//! exactly when they own at least one approved enrollment. The promotion is
//! applied once, atomically with the approval decision, and is never
//! reversed; there is no demotion path.

use autoecole_core::Role;

use crate::enrollment::{Enrollment, EnrollmentStatus};

/// The role a user's enrollments imply.
///
/// Pure derivation used by tests and consistency checks. Roles granted by
/// admin actions (`teacher`, `manager`) are not enrollment-derived and pass
/// through unchanged.
pub fn derived_role<'a>(
    registered_role: Role,
    enrollments: impl IntoIterator<Item = &'a Enrollment>,
) -> Role {
    match registered_role {
        Role::Guest | Role::Student => {
            let approved = enrollments
                .into_iter()
                .any(|e| e.status == EnrollmentStatus::Approved);
            if approved {
                Role::Student
            } else {
                Role::Guest
            }
        }
        other => other,
    }
}

/// The one-shot promotion applied when an enrollment is approved.
///
/// Returns the new role, or `None` when the user's role must not change
/// (already a student, or holding an admin-granted role).
pub fn promotion_on_approval(current_role: Role) -> Option<Role> {
    match current_role {
        Role::Guest => Some(Role::Student),
        Role::Student | Role::Teacher | Role::Manager => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::TransitionEvidence;
    use autoecole_core::{SchoolId, UserId};

    fn pending_enrollment() -> Enrollment {
        Enrollment::new(UserId::new(), SchoolId::new())
    }

    fn approved_enrollment() -> Enrollment {
        let mut e = pending_enrollment();
        e.mark_documents_complete(TransitionEvidence::system("complete"))
            .unwrap();
        e.approve(TransitionEvidence::system("approved")).unwrap();
        e
    }

    fn rejected_enrollment() -> Enrollment {
        let mut e = pending_enrollment();
        e.mark_documents_complete(TransitionEvidence::system("complete"))
            .unwrap();
        e.reject(TransitionEvidence::system("incomplete dossier"))
            .unwrap();
        e
    }

    #[test]
    fn guest_without_enrollments_stays_guest() {
        assert_eq!(derived_role(Role::Guest, []), Role::Guest);
    }

    #[test]
    fn guest_stays_guest_through_every_pre_approval_state() {
        let pending_docs = pending_enrollment();
        assert_eq!(derived_role(Role::Guest, [&pending_docs]), Role::Guest);

        let mut pending_approval = pending_enrollment();
        pending_approval
            .mark_documents_complete(TransitionEvidence::system("complete"))
            .unwrap();
        assert_eq!(derived_role(Role::Guest, [&pending_approval]), Role::Guest);
    }

    #[test]
    fn approval_makes_student() {
        let e = approved_enrollment();
        assert_eq!(derived_role(Role::Guest, [&e]), Role::Student);
    }

    #[test]
    fn rejection_does_not_promote() {
        let e = rejected_enrollment();
        assert_eq!(derived_role(Role::Guest, [&e]), Role::Guest);
    }

    #[test]
    fn one_approved_among_many_is_enough() {
        let rejected = rejected_enrollment();
        let approved = approved_enrollment();
        assert_eq!(
            derived_role(Role::Guest, [&rejected, &approved]),
            Role::Student
        );
    }

    #[test]
    fn admin_roles_pass_through() {
        let e = approved_enrollment();
        assert_eq!(derived_role(Role::Manager, [&e]), Role::Manager);
        assert_eq!(derived_role(Role::Teacher, [&e]), Role::Teacher);
    }

    #[test]
    fn promotion_fires_only_for_guests() {
        assert_eq!(promotion_on_approval(Role::Guest), Some(Role::Student));
        assert_eq!(promotion_on_approval(Role::Student), None);
        assert_eq!(promotion_on_approval(Role::Teacher), None);
        assert_eq!(promotion_on_approval(Role::Manager), None);
    }
}
