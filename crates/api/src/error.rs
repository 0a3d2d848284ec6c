//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use enrollment::{EnrollmentError, ErrorKind};

use crate::response::ApiResponse;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request from the client.
    #[error("{0}")]
    BadRequest(String),

    /// Error raised by the enrollment core.
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Enrollment(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        metrics::counter!("http_error_responses_total", "status" => status.as_u16().to_string())
            .increment(1);
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        }

        let body = ApiResponse::<()>::error(status, self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enrollment_store::{CourseId, EnrollmentId, EnrollmentStatus, StoreError, StudentId};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                EnrollmentError::StudentNotFound(StudentId::new("S1")),
                StatusCode::NOT_FOUND,
            ),
            (
                EnrollmentError::CourseFull {
                    course_id: CourseId::new("C1"),
                    capacity: 1,
                    enrolled: 1,
                },
                StatusCode::CONFLICT,
            ),
            (
                EnrollmentError::NotActive {
                    id: EnrollmentId::new(),
                    status: EnrollmentStatus::Dropped,
                },
                StatusCode::CONFLICT,
            ),
            (
                EnrollmentError::Unavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EnrollmentError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                EnrollmentError::Store(StoreError::UnknownStatus("X".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
        assert_eq!(
            ApiError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
