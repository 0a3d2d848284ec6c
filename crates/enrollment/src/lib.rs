//! Enrollment orchestration core.
//!
//! Creates and drops enrollments while keeping the catalog service's
//! enrolled counter in step, without a transaction spanning the two:
//!
//! 1. Check the student exists
//! 2. Read the course's capacity and enrolled count from the catalog
//! 3. Refuse if full or already enrolled
//! 4. Commit the enrollment locally
//! 5. Overwrite the catalog's enrolled count
//!
//! A failure at step 5 is handed to a [`CompensationPolicy`] and the local
//! commit stands.

pub mod compensation;
pub mod coordinator;
pub mod error;
pub mod guard;
pub mod transition;

pub use compensation::{
    CompensationContext, CompensationOperation, CompensationPolicy, LogAndContinue,
    RecordingCompensation,
};
pub use coordinator::{CapacityDrift, EnrollmentCoordinator, parse_enrollment_id};
pub use error::{EnrollmentError, ErrorKind, Result};
pub use guard::DuplicateGuard;
pub use transition::{ActiveEnrollment, IllegalTransition, StatusChange, Transition, transition};
