//! Enrollment record storage.
//!
//! The store is the only strongly-consistent state owned by the enrollment
//! service. Its uniqueness rule over `(course_id, student_id)` for ACTIVE rows
//! is the durable guarantee against duplicate enrollments; callers may check
//! first, but only the store can refuse a racing insert.

pub mod enrollment;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;
pub mod student;

pub use common::{CourseId, EnrollmentId, StudentId};
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use error::{Result, StoreError};
pub use memory::InMemoryEnrollmentStore;
pub use postgres::PostgresEnrollmentStore;
pub use query::EnrollmentQuery;
pub use store::{EnrollmentStore, EnrollmentStoreExt};
pub use student::{InMemoryStudentDirectory, PostgresStudentDirectory, Student, StudentDirectory};
