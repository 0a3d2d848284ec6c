//! The enrollment record and its status.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{CourseId, EnrollmentId, StoreError, StudentId};

/// Lifecycle status of an enrollment.
///
/// ```text
/// ACTIVE ──┬──► DROPPED
///          └──► COMPLETED
/// ```
///
/// Which transitions are legal is decided by the orchestrator, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    /// The student currently holds a seat.
    #[default]
    Active,

    /// The student dropped the course (terminal state).
    Dropped,

    /// The course was completed (terminal state). Reserved for a
    /// term-close workflow; nothing in this service produces it yet.
    Completed,
}

impl EnrollmentStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnrollmentStatus::Dropped | EnrollmentStatus::Completed)
    }

    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "ACTIVE",
            EnrollmentStatus::Dropped => "DROPPED",
            EnrollmentStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(EnrollmentStatus::Active),
            "DROPPED" => Ok(EnrollmentStatus::Dropped),
            "COMPLETED" => Ok(EnrollmentStatus::Completed),
            _ => Err(StoreError::UnknownStatus(s.to_string())),
        }
    }
}

/// A record linking one student to one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub course_id: CourseId,
    pub student_id: StudentId,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// Creates a new ACTIVE enrollment stamped with the current time.
    ///
    /// The timestamp is truncated to microseconds, the precision PostgreSQL
    /// stores, so the value returned by an insert equals every later read.
    pub fn new_active(course_id: CourseId, student_id: StudentId) -> Self {
        Self {
            id: EnrollmentId::new(),
            course_id,
            student_id,
            status: EnrollmentStatus::Active,
            enrolled_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}
