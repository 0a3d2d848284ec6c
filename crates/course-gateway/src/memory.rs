//! In-memory catalog for testing.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::{CourseGateway, CourseId, CourseIdFormat, CourseView, GatewayError, Result};

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    courses: HashMap<CourseId, CourseView>,
    id_format: CourseIdFormat,
    unreachable: bool,
    fail_on_update: bool,
    delay: Option<Duration>,
    fetch_calls: usize,
    update_calls: usize,
}

/// In-memory stand-in for the catalog service.
///
/// Clones share state, so a test can keep a handle while the orchestrator
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCourseCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, InMemoryCatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryCatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a course.
    pub fn add_course(&self, course: CourseView) {
        self.write().courses.insert(course.id.clone(), course);
    }

    /// Sets the identifier format the catalog accepts.
    pub fn set_id_format(&self, id_format: CourseIdFormat) {
        self.write().id_format = id_format;
    }

    /// Makes every call fail as if the catalog could not be reached.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.write().unreachable = unreachable;
    }

    /// Makes only `update_enrolled` fail; reads keep working.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.write().fail_on_update = fail;
    }

    /// Delays every response by the given duration.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.write().delay = delay;
    }

    /// Returns the catalog's enrolled counter for a course.
    pub fn enrolled(&self, course_id: &CourseId) -> Option<u32> {
        self.read().courses.get(course_id).map(|c| c.enrolled)
    }

    pub fn fetch_calls(&self) -> usize {
        self.read().fetch_calls
    }

    pub fn update_calls(&self) -> usize {
        self.read().update_calls
    }

    async fn pause(&self) {
        let delay = self.read().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CourseGateway for InMemoryCourseCatalog {
    async fn fetch(&self, course_id: &CourseId) -> Result<CourseView> {
        self.pause().await;

        let mut state = self.write();
        state.fetch_calls += 1;
        state.id_format.validate(course_id)?;

        if state.unreachable {
            return Err(GatewayError::unavailable("connection refused"));
        }

        state
            .courses
            .get(course_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(course_id.clone()))
    }

    async fn update_enrolled(&self, course_id: &CourseId, count: u32) -> Result<()> {
        self.pause().await;

        let mut state = self.write();
        state.update_calls += 1;
        state.id_format.validate(course_id)?;

        if state.unreachable || state.fail_on_update {
            return Err(GatewayError::unavailable("connection refused"));
        }

        let course = state
            .courses
            .get_mut(course_id)
            .ok_or_else(|| GatewayError::NotFound(course_id.clone()))?;
        course.enrolled = count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_and_update() {
        let catalog = InMemoryCourseCatalog::new();
        catalog.add_course(CourseView::new("C001", 30, 3));
        let id = CourseId::new("C001");

        let course = catalog.fetch(&id).await.unwrap();
        assert_eq!(course.enrolled, 3);

        catalog.update_enrolled(&id, 4).await.unwrap();
        assert_eq!(catalog.enrolled(&id), Some(4));
        assert_eq!(catalog.fetch_calls(), 1);
        assert_eq!(catalog.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let catalog = InMemoryCourseCatalog::new();
        let result = catalog.fetch(&CourseId::new("C404")).await;
        assert!(matches!(result, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fail_on_update_keeps_reads_working() {
        let catalog = InMemoryCourseCatalog::new();
        catalog.add_course(CourseView::new("C001", 30, 3));
        catalog.set_fail_on_update(true);
        let id = CourseId::new("C001");

        assert!(catalog.fetch(&id).await.is_ok());
        assert!(catalog.update_enrolled(&id, 4).await.unwrap_err().is_unavailable());
        assert_eq!(catalog.enrolled(&id), Some(3));
    }

    #[tokio::test]
    async fn test_numeric_id_format() {
        let catalog = InMemoryCourseCatalog::new();
        catalog.set_id_format(CourseIdFormat::Numeric);

        let result = catalog.fetch(&CourseId::new("C001")).await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
    }
}
