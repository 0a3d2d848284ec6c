//! Gateway error types.

use thiserror::Error;

use crate::CourseId;

/// Errors surfaced by a [`crate::CourseGateway`].
///
/// Callers can tell "the course does not exist" from "the catalog cannot
/// answer right now", and nothing finer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The catalog answered and the course does not exist.
    #[error("Course not found: {0}")]
    NotFound(CourseId),

    /// The catalog could not be reached or failed at the transport level.
    #[error("Catalog service unavailable: {0}")]
    Unavailable(String),

    /// The course identifier is not in a form the catalog accepts.
    #[error("Invalid course identifier: {0}")]
    Validation(String),
}

impl GatewayError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        GatewayError::Unavailable(reason.into())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}

/// Convenience type alias for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;
