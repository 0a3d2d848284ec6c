//! Integration tests for enrollment orchestration.

use std::sync::Arc;
use std::time::Duration;

use course_gateway::{CourseView, FALLBACK_MESSAGE, FallbackGateway, InMemoryCourseCatalog};
use enrollment::{
    CompensationOperation, EnrollmentCoordinator, EnrollmentError, ErrorKind,
    RecordingCompensation, parse_enrollment_id,
};
use enrollment_store::{
    CourseId, EnrollmentStatus, EnrollmentStore, EnrollmentStoreExt, InMemoryEnrollmentStore,
    InMemoryStudentDirectory, StudentId,
};
use futures_util::future::join_all;

type TestCoordinator = EnrollmentCoordinator<
    InMemoryEnrollmentStore,
    InMemoryStudentDirectory,
    FallbackGateway<InMemoryCourseCatalog>,
    RecordingCompensation,
>;

struct TestHarness {
    coordinator: TestCoordinator,
    store: InMemoryEnrollmentStore,
    catalog: InMemoryCourseCatalog,
    compensation: RecordingCompensation,
}

impl TestHarness {
    async fn new() -> Self {
        let store = InMemoryEnrollmentStore::new();
        let students = InMemoryStudentDirectory::new();
        students.add_ids(["S1", "S2", "S3"]).await;
        let catalog = InMemoryCourseCatalog::new();
        let compensation = RecordingCompensation::new();

        let gateway = FallbackGateway::with_timeout(catalog.clone(), Duration::from_millis(200));
        let coordinator = EnrollmentCoordinator::new(store.clone(), students, gateway)
            .with_compensation(compensation.clone());

        Self {
            coordinator,
            store,
            catalog,
            compensation,
        }
    }

    fn course(&self, id: &str, capacity: u32, enrolled: u32) -> CourseId {
        self.catalog
            .add_course(CourseView::new(id, capacity, enrolled));
        CourseId::new(id)
    }
}

fn s(id: &str) -> StudentId {
    StudentId::new(id)
}

#[tokio::test]
async fn test_scenario_enroll_then_enroll_again() {
    let h = TestHarness::new().await;
    let course = h.course("C001", 2, 0);

    let enrollment = h.coordinator.enroll(course.clone(), s("S1")).await.unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Active);
    assert_eq!(enrollment.course_id, course);
    assert_eq!(h.catalog.enrolled(&course), Some(1));

    let err = h.coordinator.enroll(course.clone(), s("S1")).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::AlreadyEnrolled { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_scenario_course_full() {
    let h = TestHarness::new().await;
    let course = h.course("C001", 2, 2);

    let err = h.coordinator.enroll(course, s("S2")).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::CourseFull { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_scenario_catalog_unreachable() {
    let h = TestHarness::new().await;
    let course = h.course("C001", 2, 0);
    h.catalog.set_unreachable(true);

    let err = h.coordinator.enroll(course.clone(), s("S3")).await.unwrap_err();
    match &err {
        EnrollmentError::Unavailable(reason) => assert_eq!(reason, FALLBACK_MESSAGE),
        other => panic!("expected Unavailable, got {other:?}"),
    }

    let rows = h
        .store
        .find(
            enrollment_store::EnrollmentQuery::for_course(course).student_id(s("S3")),
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_scenario_catalog_too_slow() {
    let h = TestHarness::new().await;
    let course = h.course("C001", 2, 0);
    h.catalog.set_delay(Some(Duration::from_secs(5)));

    let err = h.coordinator.enroll(course, s("S3")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_scenario_unenroll_nonexistent() {
    let h = TestHarness::new().await;

    let err = parse_enrollment_id("nonexistent-id").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = h
        .coordinator
        .unenroll(enrollment_store::EnrollmentId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unenroll_is_not_idempotent() {
    let h = TestHarness::new().await;
    let course = h.course("C001", 2, 0);
    let enrollment = h.coordinator.enroll(course, s("S1")).await.unwrap();

    assert!(h.coordinator.unenroll(enrollment.id).await.is_ok());
    let err = h.coordinator.unenroll(enrollment.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_round_trip_enroll_unenroll_list() {
    let h = TestHarness::new().await;
    let course = h.course("C001", 2, 0);

    let enrollment = h.coordinator.enroll(course.clone(), s("S1")).await.unwrap();
    h.coordinator.unenroll(enrollment.id).await.unwrap();

    let records = h.coordinator.list_by_student(&s("S1")).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].course_id, course);
    assert_eq!(records[0].student_id, s("S1"));
    assert_eq!(records[0].status, EnrollmentStatus::Dropped);
    assert_eq!(h.catalog.enrolled(&course), Some(0));
}

#[tokio::test]
async fn test_failed_counter_update_keeps_enrollment_and_reports_drift() {
    let h = TestHarness::new().await;
    let course = h.course("C001", 2, 0);
    h.catalog.set_fail_on_update(true);

    let enrollment = h.coordinator.enroll(course.clone(), s("S1")).await.unwrap();
    assert!(h.store.get(enrollment.id).await.unwrap().is_some());

    let records = h.compensation.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation, CompensationOperation::Enroll);
    assert_eq!(
        records[0].error,
        course_gateway::GatewayError::unavailable(FALLBACK_MESSAGE)
    );

    h.catalog.set_fail_on_update(false);
    let drift = h.coordinator.capacity_drift(&course).await.unwrap();
    assert_eq!(drift.drift, -1);
}

#[tokio::test]
async fn test_concurrent_duplicate_enrolls() {
    let h = Arc::new(TestHarness::new().await);
    let course = h.course("C001", 50, 0);

    let attempts = (0..10).map(|_| {
        let h = Arc::clone(&h);
        let course = course.clone();
        async move { h.coordinator.enroll(course, s("S1")).await }
    });
    let results = join_all(attempts).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result,
            Err(EnrollmentError::AlreadyEnrolled { .. })
        ));
    }

    let active = h
        .store
        .list_by_course_and_status(&course, EnrollmentStatus::Active)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_enrollments_across_courses_and_students() {
    let h = TestHarness::new().await;
    let c1 = h.course("C001", 10, 0);
    let c2 = h.course("C002", 10, 0);

    for student in ["S1", "S2"] {
        h.coordinator.enroll(c1.clone(), s(student)).await.unwrap();
    }
    let dropped = h.coordinator.enroll(c2.clone(), s("S1")).await.unwrap();
    h.coordinator.unenroll(dropped.id).await.unwrap();

    assert_eq!(h.coordinator.list_all().await.unwrap().len(), 3);
    assert_eq!(h.coordinator.list_by_course(&c1).await.unwrap().len(), 2);
    assert_eq!(h.coordinator.count_active_by_course(&c1).await.unwrap(), 2);
    assert_eq!(h.coordinator.count_active_by_course(&c2).await.unwrap(), 0);
    assert_eq!(h.catalog.enrolled(&c1), Some(2));
    assert_eq!(h.catalog.enrolled(&c2), Some(0));

    let s1_dropped = h
        .coordinator
        .list_by_student_and_status(&s("S1"), EnrollmentStatus::Dropped)
        .await
        .unwrap();
    assert_eq!(s1_dropped.len(), 1);
    assert_eq!(s1_dropped[0].course_id, c2);
}
