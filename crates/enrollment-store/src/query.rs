use crate::{CourseId, Enrollment, EnrollmentStatus, StudentId};

/// Builder for constructing enrollment queries.
///
/// Every filter is optional; an empty query matches all records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentQuery {
    /// Filter by course.
    pub course_id: Option<CourseId>,

    /// Filter by student.
    pub student_id: Option<StudentId>,

    /// Filter by status.
    pub status: Option<EnrollmentStatus>,

    /// Maximum number of records to return.
    pub limit: Option<usize>,

    /// Number of records to skip.
    pub offset: Option<usize>,
}

impl EnrollmentQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for all enrollments in a course.
    pub fn for_course(course_id: CourseId) -> Self {
        Self {
            course_id: Some(course_id),
            ..Default::default()
        }
    }

    /// Creates a query for all enrollments of a student.
    pub fn for_student(student_id: StudentId) -> Self {
        Self {
            student_id: Some(student_id),
            ..Default::default()
        }
    }

    pub fn course_id(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }

    pub fn student_id(mut self, student_id: StudentId) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn status(mut self, status: EnrollmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Limits the number of records returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` records.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the record satisfies every filter in this query.
    pub fn matches(&self, enrollment: &Enrollment) -> bool {
        if let Some(ref course_id) = self.course_id
            && &enrollment.course_id != course_id
        {
            return false;
        }
        if let Some(ref student_id) = self.student_id
            && &enrollment.student_id != student_id
        {
            return false;
        }
        if let Some(status) = self.status
            && enrollment.status != status
        {
            return false;
        }
        true
    }
}
