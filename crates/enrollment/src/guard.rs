//! Duplicate enrollment check.

use enrollment_store::{CourseId, EnrollmentStore, StudentId};

use crate::error::Result;

/// Answers whether a pair already holds an ACTIVE enrollment.
///
/// Advisory only. It is a read followed later by an insert with nothing held
/// in between, so two racing enrolls can both pass it. The store's
/// uniqueness rule is what refuses the second insert.
pub struct DuplicateGuard<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EnrollmentStore + ?Sized> DuplicateGuard<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn exists(&self, course_id: &CourseId, student_id: &StudentId) -> Result<bool> {
        Ok(self.store.exists_active(course_id, student_id).await?)
    }
}
