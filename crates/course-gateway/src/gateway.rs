use async_trait::async_trait;

use crate::{CourseId, CourseView, GatewayError, Result};

/// Read and write access to the catalog's course capacity counters.
#[async_trait]
pub trait CourseGateway: Send + Sync {
    /// Fetches the current view of a course.
    ///
    /// Returns `NotFound` if the catalog reports no such course and
    /// `Unavailable` if it cannot be asked.
    async fn fetch(&self, course_id: &CourseId) -> Result<CourseView>;

    /// Overwrites the catalog's enrolled count for a course.
    ///
    /// This is a blind write of a value the caller computed from an earlier
    /// read; there is no compare-and-set on the catalog side.
    async fn update_enrolled(&self, course_id: &CourseId, count: u32) -> Result<()>;
}

#[async_trait]
impl<G: CourseGateway + ?Sized> CourseGateway for std::sync::Arc<G> {
    async fn fetch(&self, course_id: &CourseId) -> Result<CourseView> {
        (**self).fetch(course_id).await
    }

    async fn update_enrolled(&self, course_id: &CourseId, count: u32) -> Result<()> {
        (**self).update_enrolled(course_id, count).await
    }
}

/// The course identifier format a catalog deployment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseIdFormat {
    /// Any non-blank string.
    #[default]
    Opaque,
    /// A positive integer key.
    Numeric,
}

impl CourseIdFormat {
    /// Checks that `course_id` can be sent to the catalog.
    pub fn validate(&self, course_id: &CourseId) -> Result<()> {
        if course_id.is_blank() {
            return Err(GatewayError::Validation(
                "course id must not be blank".to_string(),
            ));
        }

        if *self == CourseIdFormat::Numeric && course_id.as_str().trim().parse::<u64>().is_err() {
            return Err(GatewayError::Validation(format!(
                "course id '{course_id}' is not numeric"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_accepts_any_non_blank() {
        assert!(CourseIdFormat::Opaque.validate(&CourseId::new("C001")).is_ok());
        assert!(matches!(
            CourseIdFormat::Opaque.validate(&CourseId::new(" ")),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_numeric_rejects_codes() {
        assert!(CourseIdFormat::Numeric.validate(&CourseId::new("42")).is_ok());
        assert!(matches!(
            CourseIdFormat::Numeric.validate(&CourseId::new("C001")),
            Err(GatewayError::Validation(_))
        ));
        assert!(matches!(
            CourseIdFormat::Numeric.validate(&CourseId::new("-1")),
            Err(GatewayError::Validation(_))
        ));
    }
}
