use async_trait::async_trait;

use crate::{
    CourseId, Enrollment, EnrollmentId, EnrollmentQuery, EnrollmentStatus, Result, StudentId,
};

/// Core trait for enrollment store implementations.
///
/// All implementations must be thread-safe (Send + Sync) and must enforce
/// that at most one ACTIVE record exists per `(course_id, student_id)`.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Persists a new enrollment.
    ///
    /// Fails with `DuplicateActive` if the record is ACTIVE and another ACTIVE
    /// record already exists for the same pair. The check happens at write
    /// time, so it holds even when two inserts race.
    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment>;

    /// Changes the status of an enrollment, provided it currently has
    /// `expected` status.
    ///
    /// Fails with `NotFound` if the record does not exist and with
    /// `StatusMismatch` if another writer changed the status first.
    async fn update_status(
        &self,
        id: EnrollmentId,
        expected: EnrollmentStatus,
        new_status: EnrollmentStatus,
    ) -> Result<Enrollment>;

    /// Retrieves an enrollment by ID.
    async fn get(&self, id: EnrollmentId) -> Result<Option<Enrollment>>;

    /// Retrieves enrollments matching a query, oldest first.
    async fn find(&self, query: EnrollmentQuery) -> Result<Vec<Enrollment>>;

    /// Returns true if an ACTIVE enrollment exists for the pair.
    async fn exists_active(&self, course_id: &CourseId, student_id: &StudentId) -> Result<bool>;

    /// Counts ACTIVE enrollments in a course.
    async fn count_active_by_course(&self, course_id: &CourseId) -> Result<u64>;
}

#[async_trait]
impl<T: EnrollmentStore + ?Sized> EnrollmentStore for std::sync::Arc<T> {
    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment> {
        (**self).insert(enrollment).await
    }

    async fn update_status(
        &self,
        id: EnrollmentId,
        expected: EnrollmentStatus,
        new_status: EnrollmentStatus,
    ) -> Result<Enrollment> {
        (**self).update_status(id, expected, new_status).await
    }

    async fn get(&self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        (**self).get(id).await
    }

    async fn find(&self, query: EnrollmentQuery) -> Result<Vec<Enrollment>> {
        (**self).find(query).await
    }

    async fn exists_active(&self, course_id: &CourseId, student_id: &StudentId) -> Result<bool> {
        (**self).exists_active(course_id, student_id).await
    }

    async fn count_active_by_course(&self, course_id: &CourseId) -> Result<u64> {
        (**self).count_active_by_course(course_id).await
    }
}

/// Extension trait providing convenience queries for enrollment stores.
#[async_trait]
pub trait EnrollmentStoreExt: EnrollmentStore {
    async fn list_all(&self) -> Result<Vec<Enrollment>> {
        self.find(EnrollmentQuery::new()).await
    }

    async fn list_by_course(&self, course_id: &CourseId) -> Result<Vec<Enrollment>> {
        self.find(EnrollmentQuery::for_course(course_id.clone()))
            .await
    }

    async fn list_by_student(&self, student_id: &StudentId) -> Result<Vec<Enrollment>> {
        self.find(EnrollmentQuery::for_student(student_id.clone()))
            .await
    }

    async fn list_by_course_and_status(
        &self,
        course_id: &CourseId,
        status: EnrollmentStatus,
    ) -> Result<Vec<Enrollment>> {
        self.find(EnrollmentQuery::for_course(course_id.clone()).status(status))
            .await
    }

    async fn list_by_student_and_status(
        &self,
        student_id: &StudentId,
        status: EnrollmentStatus,
    ) -> Result<Vec<Enrollment>> {
        self.find(EnrollmentQuery::for_student(student_id.clone()).status(status))
            .await
    }
}

// Blanket implementation for all EnrollmentStore implementations
impl<T: EnrollmentStore + ?Sized> EnrollmentStoreExt for T {}
