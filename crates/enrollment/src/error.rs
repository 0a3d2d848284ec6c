//! Enrollment error types.

use course_gateway::GatewayError;
use enrollment_store::{CourseId, EnrollmentId, EnrollmentStatus, StoreError, StudentId};
use thiserror::Error;

/// Caller-facing classification of an [`EnrollmentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unavailable,
    Validation,
    Internal,
}

/// Errors that can occur during enrollment operations.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// The student directory has no such student.
    #[error("Student not found: {0}")]
    StudentNotFound(StudentId),

    /// The catalog reported that the course does not exist.
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    /// No enrollment exists under the given key.
    #[error("Enrollment not found: {0}")]
    EnrollmentNotFound(String),

    /// The catalog's enrolled count has reached capacity.
    #[error("Course is full: {course_id} ({enrolled}/{capacity})")]
    CourseFull {
        course_id: CourseId,
        capacity: u32,
        enrolled: u32,
    },

    /// An ACTIVE enrollment already exists for the pair.
    #[error("Already enrolled in this course: student {student_id}, course {course_id}")]
    AlreadyEnrolled {
        course_id: CourseId,
        student_id: StudentId,
    },

    /// Only ACTIVE enrollments can be dropped.
    #[error("Enrollment {id} is {status}, only active enrollments can be dropped")]
    NotActive {
        id: EnrollmentId,
        status: EnrollmentStatus,
    },

    /// The catalog could not answer.
    #[error("Course service unavailable: {0}")]
    Unavailable(String),

    /// An identifier is malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The enrollment store failed.
    #[error("Store error: {0}")]
    Store(#[source] StoreError),
}

impl EnrollmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrollmentError::StudentNotFound(_)
            | EnrollmentError::CourseNotFound(_)
            | EnrollmentError::EnrollmentNotFound(_) => ErrorKind::NotFound,
            EnrollmentError::CourseFull { .. }
            | EnrollmentError::AlreadyEnrolled { .. }
            | EnrollmentError::NotActive { .. } => ErrorKind::Conflict,
            EnrollmentError::Unavailable(_) => ErrorKind::Unavailable,
            EnrollmentError::Validation(_) => ErrorKind::Validation,
            EnrollmentError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            EnrollmentError::StudentNotFound(_) => "student_not_found",
            EnrollmentError::CourseNotFound(_) => "course_not_found",
            EnrollmentError::EnrollmentNotFound(_) => "enrollment_not_found",
            EnrollmentError::CourseFull { .. } => "course_full",
            EnrollmentError::AlreadyEnrolled { .. } => "already_enrolled",
            EnrollmentError::NotActive { .. } => "not_active",
            EnrollmentError::Unavailable(_) => "unavailable",
            EnrollmentError::Validation(_) => "validation",
            EnrollmentError::Store(_) => "store",
        }
    }
}

impl From<GatewayError> for EnrollmentError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(course_id) => EnrollmentError::CourseNotFound(course_id),
            GatewayError::Unavailable(reason) => EnrollmentError::Unavailable(reason),
            GatewayError::Validation(reason) => EnrollmentError::Validation(reason),
        }
    }
}

// Constraint violations are business outcomes; everything else is infrastructure.
impl From<StoreError> for EnrollmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateActive {
                course_id,
                student_id,
            } => EnrollmentError::AlreadyEnrolled {
                course_id,
                student_id,
            },
            StoreError::NotFound(id) => EnrollmentError::EnrollmentNotFound(id.to_string()),
            StoreError::StatusMismatch { id, actual, .. } => {
                EnrollmentError::NotActive { id, status: actual }
            }
            other => EnrollmentError::Store(other),
        }
    }
}

/// Convenience type alias for enrollment results.
pub type Result<T> = std::result::Result<T, EnrollmentError>;
