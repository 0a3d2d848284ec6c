//! Enrollment orchestration.

use std::time::Instant;

use course_gateway::CourseGateway;
use enrollment_store::{
    CourseId, Enrollment, EnrollmentId, EnrollmentStatus, EnrollmentStore, EnrollmentStoreExt,
    StudentDirectory, StudentId,
};
use serde::Serialize;

use crate::compensation::{
    CompensationContext, CompensationOperation, CompensationPolicy, LogAndContinue,
};
use crate::error::{EnrollmentError, Result};
use crate::guard::DuplicateGuard;
use crate::transition::ActiveEnrollment;

/// Comparison between the catalog's enrolled counter and the ACTIVE rows
/// held locally for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityDrift {
    pub course_id: CourseId,
    pub capacity: u32,
    pub catalog_enrolled: u32,
    pub active_enrollments: u64,
    /// `catalog_enrolled - active_enrollments`. Positive means the catalog
    /// over-counts.
    pub drift: i64,
}

impl CapacityDrift {
    pub fn is_consistent(&self) -> bool {
        self.drift == 0
    }
}

/// Parses an enrollment key received from a caller.
///
/// A key that is not a valid identifier cannot name an existing enrollment,
/// so it is reported as not found.
pub fn parse_enrollment_id(raw: &str) -> Result<EnrollmentId> {
    EnrollmentId::parse(raw.trim())
        .map_err(|_| EnrollmentError::EnrollmentNotFound(raw.to_string()))
}

/// Coordinates enroll and unenroll across the local store and the catalog.
///
/// There is no transaction spanning the two. The local write commits first;
/// the catalog's enrolled counter is then overwritten with a value computed
/// from the earlier read. A failure of that second write is handed to the
/// [`CompensationPolicy`] and does not fail the call.
///
/// Two check-then-act races remain:
/// - capacity: concurrent enrolls may all see a free seat, so the catalog's
///   counter can exceed capacity;
/// - duplicates: concurrent enrolls for the same pair may all pass the
///   [`DuplicateGuard`], but the store refuses every insert after the first.
pub struct EnrollmentCoordinator<S, D, G, C = LogAndContinue>
where
    S: EnrollmentStore,
    D: StudentDirectory,
    G: CourseGateway,
    C: CompensationPolicy,
{
    store: S,
    students: D,
    catalog: G,
    compensation: C,
}

impl<S, D, G> EnrollmentCoordinator<S, D, G, LogAndContinue>
where
    S: EnrollmentStore,
    D: StudentDirectory,
    G: CourseGateway,
{
    /// Creates a coordinator that logs remote update failures and continues.
    pub fn new(store: S, students: D, catalog: G) -> Self {
        Self {
            store,
            students,
            catalog,
            compensation: LogAndContinue,
        }
    }
}

impl<S, D, G, C> EnrollmentCoordinator<S, D, G, C>
where
    S: EnrollmentStore,
    D: StudentDirectory,
    G: CourseGateway,
    C: CompensationPolicy,
{
    /// Replaces the compensation policy.
    pub fn with_compensation<P: CompensationPolicy>(
        self,
        compensation: P,
    ) -> EnrollmentCoordinator<S, D, G, P> {
        EnrollmentCoordinator {
            store: self.store,
            students: self.students,
            catalog: self.catalog,
            compensation,
        }
    }

    /// Enrolls a student in a course.
    ///
    /// Succeeds even if the catalog's counter could not be updated afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn enroll(&self, course_id: CourseId, student_id: StudentId) -> Result<Enrollment> {
        let started = Instant::now();
        let result = self.try_enroll(course_id, student_id).await;
        record_duration("enroll", started);

        match &result {
            Ok(enrollment) => {
                metrics::counter!("enrollment_enroll_total").increment(1);
                tracing::info!(enrollment_id = %enrollment.id, "student enrolled");
            }
            Err(err) => {
                metrics::counter!("enrollment_enroll_rejected_total", "reason" => err.reason())
                    .increment(1);
                tracing::info!(reason = err.reason(), error = %err, "enrollment rejected");
            }
        }

        result
    }

    async fn try_enroll(&self, course_id: CourseId, student_id: StudentId) -> Result<Enrollment> {
        if course_id.is_blank() {
            return Err(EnrollmentError::Validation(
                "course id must not be blank".to_string(),
            ));
        }
        if student_id.is_blank() {
            return Err(EnrollmentError::Validation(
                "student id must not be blank".to_string(),
            ));
        }

        // 1. Student must exist
        self.require_student(&student_id).await?;

        // 2. Fresh course view; never cached
        let course = self.catalog.fetch(&course_id).await?;

        // 3. Capacity, as far as the catalog knows
        if course.is_full() {
            return Err(EnrollmentError::CourseFull {
                course_id,
                capacity: course.capacity,
                enrolled: course.enrolled,
            });
        }

        // 4. Fast duplicate check
        if DuplicateGuard::new(&self.store)
            .exists(&course_id, &student_id)
            .await?
        {
            return Err(EnrollmentError::AlreadyEnrolled {
                course_id,
                student_id,
            });
        }

        // 5. Local commit; a racing duplicate surfaces here as AlreadyEnrolled
        let enrollment = self
            .store
            .insert(Enrollment::new_active(course_id.clone(), student_id))
            .await?;

        // 6. Blind overwrite of the catalog counter
        let intended = course.enrolled.saturating_add(1);
        if let Err(error) = self.catalog.update_enrolled(&course_id, intended).await {
            self.compensation
                .on_remote_update_failed(&CompensationContext {
                    operation: CompensationOperation::Enroll,
                    enrollment_id: enrollment.id,
                    course_id,
                    intended_count: Some(intended),
                    error,
                })
                .await;
        }

        Ok(enrollment)
    }

    /// Drops an ACTIVE enrollment.
    ///
    /// Dropping twice is a Conflict, not a silent success. Releasing the seat
    /// in the catalog is best effort.
    #[tracing::instrument(skip(self))]
    pub async fn unenroll(&self, enrollment_id: EnrollmentId) -> Result<()> {
        let started = Instant::now();
        let result = self.try_unenroll(enrollment_id).await;
        record_duration("unenroll", started);

        match &result {
            Ok(()) => {
                metrics::counter!("enrollment_unenroll_total").increment(1);
                tracing::info!("enrollment dropped");
            }
            Err(err) => {
                metrics::counter!("enrollment_unenroll_rejected_total", "reason" => err.reason())
                    .increment(1);
                tracing::info!(reason = err.reason(), error = %err, "unenroll rejected");
            }
        }

        result
    }

    async fn try_unenroll(&self, enrollment_id: EnrollmentId) -> Result<()> {
        let record = self
            .store
            .get(enrollment_id)
            .await?
            .ok_or_else(|| EnrollmentError::EnrollmentNotFound(enrollment_id.to_string()))?;

        let active = ActiveEnrollment::try_from(record).map_err(|record| {
            EnrollmentError::NotActive {
                id: record.id,
                status: record.status,
            }
        })?;
        let course_id = active.enrollment().course_id.clone();

        let change = active
            .drop()
            .map_err(|illegal| EnrollmentError::NotActive {
                id: enrollment_id,
                status: illegal.from,
            })?;

        // Conditional write: a concurrent drop turns into NotActive here.
        self.store
            .update_status(change.id, change.from, change.to)
            .await?;

        self.release_seat(enrollment_id, &course_id).await;
        Ok(())
    }

    async fn release_seat(&self, enrollment_id: EnrollmentId, course_id: &CourseId) {
        let course = match self.catalog.fetch(course_id).await {
            Ok(course) => course,
            Err(error) => {
                self.compensate_unenroll(enrollment_id, course_id, None, error)
                    .await;
                return;
            }
        };

        if course.enrolled == 0 {
            tracing::debug!(%course_id, "catalog already reports zero enrolled");
            return;
        }

        let intended = course.enrolled - 1;
        if let Err(error) = self.catalog.update_enrolled(course_id, intended).await {
            self.compensate_unenroll(enrollment_id, course_id, Some(intended), error)
                .await;
        }
    }

    async fn compensate_unenroll(
        &self,
        enrollment_id: EnrollmentId,
        course_id: &CourseId,
        intended_count: Option<u32>,
        error: course_gateway::GatewayError,
    ) {
        self.compensation
            .on_remote_update_failed(&CompensationContext {
                operation: CompensationOperation::Unenroll,
                enrollment_id,
                course_id: course_id.clone(),
                intended_count,
                error,
            })
            .await;
    }

    /// Loads one enrollment.
    #[tracing::instrument(skip(self))]
    pub async fn get_enrollment(&self, enrollment_id: EnrollmentId) -> Result<Enrollment> {
        let started = Instant::now();
        let result = self.store.get(enrollment_id).await;
        record_duration("get_enrollment", started);

        result?.ok_or_else(|| EnrollmentError::EnrollmentNotFound(enrollment_id.to_string()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Enrollment>> {
        let started = Instant::now();
        let result = self.store.list_all().await;
        record_duration("list_all", started);
        Ok(result?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_by_course(&self, course_id: &CourseId) -> Result<Vec<Enrollment>> {
        let started = Instant::now();
        let result = self.store.list_by_course(course_id).await;
        record_duration("list_by_course", started);
        Ok(result?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_by_course_and_status(
        &self,
        course_id: &CourseId,
        status: EnrollmentStatus,
    ) -> Result<Vec<Enrollment>> {
        let started = Instant::now();
        let result = self.store.list_by_course_and_status(course_id, status).await;
        record_duration("list_by_course_and_status", started);
        Ok(result?)
    }

    /// Lists a student's enrollments. The student must exist.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_student(&self, student_id: &StudentId) -> Result<Vec<Enrollment>> {
        let started = Instant::now();
        let result = match self.require_student(student_id).await {
            Ok(()) => self
                .store
                .list_by_student(student_id)
                .await
                .map_err(EnrollmentError::from),
            Err(err) => Err(err),
        };
        record_duration("list_by_student", started);
        result
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_by_student_and_status(
        &self,
        student_id: &StudentId,
        status: EnrollmentStatus,
    ) -> Result<Vec<Enrollment>> {
        let started = Instant::now();
        let result = self
            .store
            .list_by_student_and_status(student_id, status)
            .await;
        record_duration("list_by_student_and_status", started);
        Ok(result?)
    }

    /// Counts ACTIVE enrollments held locally for a course.
    #[tracing::instrument(skip(self))]
    pub async fn count_active_by_course(&self, course_id: &CourseId) -> Result<u64> {
        let started = Instant::now();
        let result = self.store.count_active_by_course(course_id).await;
        record_duration("count_active_by_course", started);
        Ok(result?)
    }

    /// Compares the catalog's counter with the local ACTIVE count.
    ///
    /// Read-only: drift is reported, never corrected.
    #[tracing::instrument(skip(self))]
    pub async fn capacity_drift(&self, course_id: &CourseId) -> Result<CapacityDrift> {
        let started = Instant::now();
        let result = self.measure_drift(course_id).await;
        record_duration("capacity_drift", started);

        if let Ok(report) = &result
            && !report.is_consistent()
        {
            tracing::warn!(%course_id, drift = report.drift, "capacity drift detected");
        }
        result
    }

    async fn measure_drift(&self, course_id: &CourseId) -> Result<CapacityDrift> {
        let course = self.catalog.fetch(course_id).await?;
        let active = self.store.count_active_by_course(course_id).await?;
        Ok(CapacityDrift {
            course_id: course_id.clone(),
            capacity: course.capacity,
            catalog_enrolled: course.enrolled,
            active_enrollments: active,
            drift: i64::from(course.enrolled) - active as i64,
        })
    }

    async fn require_student(&self, student_id: &StudentId) -> Result<()> {
        match self.students.find_by_student_id(student_id).await? {
            Some(_) => Ok(()),
            None => Err(EnrollmentError::StudentNotFound(student_id.clone())),
        }
    }
}

fn record_duration(operation: &'static str, started: Instant) {
    metrics::histogram!("enrollment_operation_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}
