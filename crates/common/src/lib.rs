//! Shared types for the enrollment service crates.

pub mod identity;
pub mod types;

pub use identity::{CallerIdentity, Role};
pub use types::{CourseId, EnrollmentId, StudentId};
