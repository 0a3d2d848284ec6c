use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    CourseId, Enrollment, EnrollmentId, EnrollmentQuery, EnrollmentStatus, Result, StoreError,
    StudentId, store::EnrollmentStore,
};

/// In-memory enrollment store implementation for testing.
///
/// Records are kept in insertion order. The ACTIVE uniqueness check runs
/// under the write lock, mirroring the partial unique index in PostgreSQL.
#[derive(Clone, Default)]
pub struct InMemoryEnrollmentStore {
    records: Arc<RwLock<Vec<Enrollment>>>,
}

impl InMemoryEnrollmentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment> {
        let mut records = self.records.write().await;

        if enrollment.is_active()
            && records.iter().any(|e| {
                e.is_active()
                    && e.course_id == enrollment.course_id
                    && e.student_id == enrollment.student_id
            })
        {
            return Err(StoreError::DuplicateActive {
                course_id: enrollment.course_id,
                student_id: enrollment.student_id,
            });
        }

        records.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn update_status(
        &self,
        id: EnrollmentId,
        expected: EnrollmentStatus,
        new_status: EnrollmentStatus,
    ) -> Result<Enrollment> {
        let mut records = self.records.write().await;

        let record = records
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if record.status != expected {
            return Err(StoreError::StatusMismatch {
                id,
                expected,
                actual: record.status,
            });
        }

        record.status = new_status;
        Ok(record.clone())
    }

    async fn get(&self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|e| e.id == id).cloned())
    }

    async fn find(&self, query: EnrollmentQuery) -> Result<Vec<Enrollment>> {
        let records = self.records.read().await;
        let mut matched: Vec<_> = records
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();

        matched.sort_by_key(|e| e.enrolled_at);

        let offset = query.offset.unwrap_or(0);
        let matched = matched.into_iter().skip(offset);

        let matched = if let Some(limit) = query.limit {
            matched.take(limit).collect()
        } else {
            matched.collect()
        };

        Ok(matched)
    }

    async fn exists_active(&self, course_id: &CourseId, student_id: &StudentId) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .any(|e| e.is_active() && &e.course_id == course_id && &e.student_id == student_id))
    }

    async fn count_active_by_course(&self, course_id: &CourseId) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|e| e.is_active() && &e.course_id == course_id)
            .count() as u64)
    }
}
