use thiserror::Error;

use crate::{CourseId, EnrollmentId, EnrollmentStatus, StudentId};

/// Errors that can occur when interacting with the enrollment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An ACTIVE enrollment already exists for this course/student pair.
    /// Raised by the uniqueness constraint, not by a prior read.
    #[error("Active enrollment already exists for course {course_id} and student {student_id}")]
    DuplicateActive {
        course_id: CourseId,
        student_id: StudentId,
    },

    /// The enrollment was not found.
    #[error("Enrollment not found: {0}")]
    NotFound(EnrollmentId),

    /// A conditional status update found a different status than expected.
    #[error("Enrollment {id} has status {actual}, expected {expected}")]
    StatusMismatch {
        id: EnrollmentId,
        expected: EnrollmentStatus,
        actual: EnrollmentStatus,
    },

    /// A persisted status value could not be decoded.
    #[error("Unknown enrollment status: {0}")]
    UnknownStatus(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
