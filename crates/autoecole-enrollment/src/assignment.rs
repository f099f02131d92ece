//! # Teacher Assignment Gate
//!
//! Restricts teacher assignment to valid enrollment/teacher pairs: the
//! enrollment must be approved, the teacher must belong to the enrollment's
//! school, be approved to teach, and their capability flags must cover the
//! student's gender.
//!
//! The companion query [`available_teachers`] applies the same filters to a
//! school's roster. An empty result is a valid answer that callers must
//! handle, not an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use autoecole_core::{Gender, SchoolId, TeacherId, UserId};

use crate::enrollment::{Enrollment, EnrollmentStatus};

// ─── Teacher profile ─────────────────────────────────────────────────

/// A teacher's standing at a school, as consulted by the assignment gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherProfile {
    /// Unique identifier.
    pub id: TeacherId,
    /// The teacher's login account.
    pub user_id: UserId,
    /// The school this teacher works at.
    pub school_id: SchoolId,
    /// The teacher's own gender.
    pub gender: Gender,
    /// Whether this teacher may teach male students.
    pub can_teach_male: bool,
    /// Whether this teacher may teach female students.
    pub can_teach_female: bool,
    /// Whether the school manager has approved this teacher for assignments.
    pub approved: bool,
}

impl TeacherProfile {
    /// Whether the capability flags cover a student of the given gender.
    pub fn can_teach(&self, student: Gender) -> bool {
        match student {
            Gender::Male => self.can_teach_male,
            Gender::Female => self.can_teach_female,
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Reasons an assignment is rejected by the gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    /// The enrollment is not in the `approved` status.
    #[error("enrollment is {status}, teacher assignment requires approved")]
    EnrollmentNotApproved {
        /// The current enrollment status.
        status: EnrollmentStatus,
    },

    /// The teacher works at a different school.
    #[error("teacher {teacher_id} does not belong to school {enrollment_school}")]
    SchoolMismatch {
        /// The offending teacher.
        teacher_id: TeacherId,
        /// The enrollment's school.
        enrollment_school: SchoolId,
    },

    /// The teacher has not been approved by the school manager.
    #[error("teacher {teacher_id} is not approved for assignments")]
    TeacherNotApproved {
        /// The offending teacher.
        teacher_id: TeacherId,
    },

    /// The teacher's capability flags do not cover the student.
    #[error("teacher {teacher_id} cannot teach {student_gender} students")]
    CapabilityMismatch {
        /// The offending teacher.
        teacher_id: TeacherId,
        /// The student's gender.
        student_gender: Gender,
    },
}

// ─── Gate ────────────────────────────────────────────────────────────

/// Validate a proposed teacher assignment.
///
/// Checks run in order: enrollment status, school membership, teacher
/// approval, capability coverage. The first failure is returned.
pub fn validate_assignment(
    enrollment: &Enrollment,
    teacher: &TeacherProfile,
    student_gender: Gender,
) -> Result<(), AssignmentError> {
    if enrollment.status != EnrollmentStatus::Approved {
        return Err(AssignmentError::EnrollmentNotApproved {
            status: enrollment.status,
        });
    }
    if teacher.school_id != enrollment.school_id {
        return Err(AssignmentError::SchoolMismatch {
            teacher_id: teacher.id,
            enrollment_school: enrollment.school_id,
        });
    }
    if !teacher.approved {
        return Err(AssignmentError::TeacherNotApproved {
            teacher_id: teacher.id,
        });
    }
    if !teacher.can_teach(student_gender) {
        return Err(AssignmentError::CapabilityMismatch {
            teacher_id: teacher.id,
            student_gender,
        });
    }
    Ok(())
}

/// Teachers of the enrollment's school who could be assigned to it.
///
/// Filters to approved teachers whose capabilities cover the student.
/// May be empty; that is a valid answer, not an error.
pub fn available_teachers<'a>(
    enrollment: &Enrollment,
    student_gender: Gender,
    teachers: impl IntoIterator<Item = &'a TeacherProfile>,
) -> Vec<&'a TeacherProfile> {
    teachers
        .into_iter()
        .filter(|t| {
            t.school_id == enrollment.school_id && t.approved && t.can_teach(student_gender)
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::TransitionEvidence;

    fn make_teacher(school_id: SchoolId) -> TeacherProfile {
        TeacherProfile {
            id: TeacherId::new(),
            user_id: UserId::new(),
            school_id,
            gender: Gender::Male,
            can_teach_male: true,
            can_teach_female: true,
            approved: true,
        }
    }

    fn make_approved_enrollment(school_id: SchoolId) -> Enrollment {
        let mut e = Enrollment::new(UserId::new(), school_id);
        e.mark_documents_complete(TransitionEvidence::system("complete"))
            .unwrap();
        e.approve(TransitionEvidence::system("approved")).unwrap();
        e
    }

    // ── validate_assignment ──────────────────────────────────────────

    #[test]
    fn valid_pair_passes() {
        let school = SchoolId::new();
        let enrollment = make_approved_enrollment(school);
        let teacher = make_teacher(school);
        assert!(validate_assignment(&enrollment, &teacher, Gender::Male).is_ok());
    }

    #[test]
    fn pending_documents_enrollment_is_rejected() {
        let school = SchoolId::new();
        let enrollment = Enrollment::new(UserId::new(), school);
        let teacher = make_teacher(school);
        assert_eq!(
            validate_assignment(&enrollment, &teacher, Gender::Male).unwrap_err(),
            AssignmentError::EnrollmentNotApproved {
                status: EnrollmentStatus::PendingDocuments,
            }
        );
    }

    #[test]
    fn pending_approval_enrollment_is_rejected() {
        let school = SchoolId::new();
        let mut enrollment = Enrollment::new(UserId::new(), school);
        enrollment
            .mark_documents_complete(TransitionEvidence::system("complete"))
            .unwrap();
        let teacher = make_teacher(school);
        assert!(matches!(
            validate_assignment(&enrollment, &teacher, Gender::Male).unwrap_err(),
            AssignmentError::EnrollmentNotApproved { .. }
        ));
    }

    #[test]
    fn wrong_school_is_rejected() {
        let enrollment = make_approved_enrollment(SchoolId::new());
        let teacher = make_teacher(SchoolId::new());
        assert!(matches!(
            validate_assignment(&enrollment, &teacher, Gender::Male).unwrap_err(),
            AssignmentError::SchoolMismatch { .. }
        ));
    }

    #[test]
    fn unapproved_teacher_is_rejected() {
        let school = SchoolId::new();
        let enrollment = make_approved_enrollment(school);
        let mut teacher = make_teacher(school);
        teacher.approved = false;
        assert_eq!(
            validate_assignment(&enrollment, &teacher, Gender::Male).unwrap_err(),
            AssignmentError::TeacherNotApproved {
                teacher_id: teacher.id,
            }
        );
    }

    #[test]
    fn capability_mismatch_is_rejected() {
        let school = SchoolId::new();
        let enrollment = make_approved_enrollment(school);
        let mut teacher = make_teacher(school);
        teacher.can_teach_female = false;
        assert_eq!(
            validate_assignment(&enrollment, &teacher, Gender::Female).unwrap_err(),
            AssignmentError::CapabilityMismatch {
                teacher_id: teacher.id,
                student_gender: Gender::Female,
            }
        );
        // The same teacher still covers male students.
        assert!(validate_assignment(&enrollment, &teacher, Gender::Male).is_ok());
    }

    #[test]
    fn status_check_runs_before_school_check() {
        // A pending enrollment with a wrong-school teacher reports the
        // status problem, matching the gate's documented check order.
        let enrollment = Enrollment::new(UserId::new(), SchoolId::new());
        let teacher = make_teacher(SchoolId::new());
        assert!(matches!(
            validate_assignment(&enrollment, &teacher, Gender::Male).unwrap_err(),
            AssignmentError::EnrollmentNotApproved { .. }
        ));
    }

    // ── available_teachers ───────────────────────────────────────────

    #[test]
    fn roster_filters_by_school_approval_and_capability() {
        let school = SchoolId::new();
        let enrollment = make_approved_enrollment(school);

        let good = make_teacher(school);
        let other_school = make_teacher(SchoolId::new());
        let mut unapproved = make_teacher(school);
        unapproved.approved = false;
        let mut males_only = make_teacher(school);
        males_only.can_teach_female = false;

        let roster = [&good, &other_school, &unapproved, &males_only];
        let available = available_teachers(&enrollment, Gender::Female, roster);

        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, good.id);
    }

    #[test]
    fn males_only_teacher_is_available_for_male_students() {
        let school = SchoolId::new();
        let enrollment = make_approved_enrollment(school);
        let mut males_only = make_teacher(school);
        males_only.can_teach_female = false;

        let available = available_teachers(&enrollment, Gender::Male, [&males_only]);
        assert_eq!(available.len(), 1);
    }

    #[test]
    fn empty_roster_is_a_valid_answer() {
        let enrollment = make_approved_enrollment(SchoolId::new());
        let available = available_teachers(&enrollment, Gender::Male, []);
        assert!(available.is_empty());
    }
}
