//! Enrollment status transitions.
//!
//! ```text
//! ACTIVE ──┬──► DROPPED     (unenroll)
//!          └──► COMPLETED   (term close, not exposed yet)
//! ```
//!
//! DROPPED and COMPLETED are terminal. Nothing leads back to ACTIVE: a new
//! enrollment is a new record.

use enrollment_store::{Enrollment, EnrollmentId, EnrollmentStatus};
use thiserror::Error;

/// A status change the orchestrator may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Drop,
    Complete,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Drop => "drop",
            Transition::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {transition} an enrollment in status {from}")]
pub struct IllegalTransition {
    pub from: EnrollmentStatus,
    pub transition: Transition,
}

/// The transition table: the status reached by applying `t` to `from`.
pub fn transition(
    from: EnrollmentStatus,
    t: Transition,
) -> Result<EnrollmentStatus, IllegalTransition> {
    match (from, t) {
        (EnrollmentStatus::Active, Transition::Drop) => Ok(EnrollmentStatus::Dropped),
        (EnrollmentStatus::Active, Transition::Complete) => Ok(EnrollmentStatus::Completed),
        (EnrollmentStatus::Dropped | EnrollmentStatus::Completed, _) => Err(IllegalTransition {
            from,
            transition: t,
        }),
    }
}

/// A pending status write: move `id` from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub id: EnrollmentId,
    pub from: EnrollmentStatus,
    pub to: EnrollmentStatus,
}

/// An enrollment that was ACTIVE when loaded.
///
/// The only way to obtain one is from an ACTIVE record, and it is the only
/// value offering `drop` and `complete`. Both run through [`transition`].
#[derive(Debug, Clone)]
pub struct ActiveEnrollment(Enrollment);

impl ActiveEnrollment {
    pub fn enrollment(&self) -> &Enrollment {
        &self.0
    }

    pub fn drop(self) -> Result<StatusChange, IllegalTransition> {
        self.apply(Transition::Drop)
    }

    pub fn complete(self) -> Result<StatusChange, IllegalTransition> {
        self.apply(Transition::Complete)
    }

    fn apply(self, t: Transition) -> Result<StatusChange, IllegalTransition> {
        let from = self.0.status;
        let to = transition(from, t)?;
        Ok(StatusChange {
            id: self.0.id,
            from,
            to,
        })
    }
}

impl TryFrom<Enrollment> for ActiveEnrollment {
    type Error = Enrollment;

    /// Hands the record back unchanged if it is not ACTIVE.
    fn try_from(enrollment: Enrollment) -> Result<Self, Self::Error> {
        if enrollment.is_active() {
            Ok(Self(enrollment))
        } else {
            Err(enrollment)
        }
    }
}
