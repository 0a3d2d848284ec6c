//! Enrollment endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use enrollment::{CapacityDrift, parse_enrollment_id};
use enrollment_store::{CourseId, Enrollment, EnrollmentStatus, StudentId};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Caller;
use crate::response::ApiResponse;

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

impl StatusFilter {
    fn parse(&self) -> Result<Option<EnrollmentStatus>, ApiError> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                EnrollmentStatus::from_str(s)
                    .map_err(|_| ApiError::BadRequest(format!("Invalid status: {s}")))
            })
            .transpose()
    }
}

type Envelope<T> = Json<ApiResponse<T>>;

// -- Handlers --

/// POST /api/enrollments: enroll a student in a course.
#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    body: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<(StatusCode, Envelope<Enrollment>), ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let course_id = required(req.course_id, "courseId")?;
    let student_id = required(req.student_id, "studentId")?;

    let enrollment = state
        .coordinator
        .enroll(CourseId::new(course_id), StudentId::new(student_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(enrollment)),
    ))
}

/// GET /api/enrollments: every enrollment, any status.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Envelope<Vec<Enrollment>>, ApiError> {
    let enrollments = state.coordinator.list_all().await?;
    Ok(Json(ApiResponse::success(enrollments)))
}

/// GET /api/enrollments/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Envelope<Enrollment>, ApiError> {
    let enrollment_id = parse_enrollment_id(&id)?;
    let enrollment = state.coordinator.get_enrollment(enrollment_id).await?;
    Ok(Json(ApiResponse::success(enrollment)))
}

/// DELETE /api/enrollments/{id}: drop an active enrollment.
#[tracing::instrument(skip(state))]
pub async fn unenroll(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Envelope<()>, ApiError> {
    let enrollment_id = parse_enrollment_id(&id)?;
    state.coordinator.unenroll(enrollment_id).await?;
    Ok(Json(ApiResponse::with_status(
        StatusCode::OK,
        "Enrollment dropped",
        (),
    )))
}

/// GET /api/enrollments/course/{course_id}?status=
#[tracing::instrument(skip(state))]
pub async fn by_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    Query(filter): Query<StatusFilter>,
) -> Result<Envelope<Vec<Enrollment>>, ApiError> {
    let course_id = CourseId::new(course_id);
    let enrollments = match filter.parse()? {
        Some(status) => {
            state
                .coordinator
                .list_by_course_and_status(&course_id, status)
                .await?
        }
        None => state.coordinator.list_by_course(&course_id).await?,
    };
    Ok(Json(ApiResponse::success(enrollments)))
}

/// GET /api/enrollments/student/{student_id}?status=
#[tracing::instrument(skip(state))]
pub async fn by_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
    Query(filter): Query<StatusFilter>,
) -> Result<Envelope<Vec<Enrollment>>, ApiError> {
    let student_id = StudentId::new(student_id);
    let enrollments = match filter.parse()? {
        Some(status) => {
            state
                .coordinator
                .list_by_student_and_status(&student_id, status)
                .await?
        }
        None => state.coordinator.list_by_student(&student_id).await?,
    };
    Ok(Json(ApiResponse::success(enrollments)))
}

/// GET /api/enrollments/course/{course_id}/drift: catalog counter vs local rows.
#[tracing::instrument(skip(state))]
pub async fn drift(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<Envelope<CapacityDrift>, ApiError> {
    let report = state
        .coordinator
        .capacity_drift(&CourseId::new(course_id))
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}
