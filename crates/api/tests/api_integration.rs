//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use course_gateway::{CourseView, FallbackGateway, InMemoryCourseCatalog};
use enrollment_store::{InMemoryEnrollmentStore, InMemoryStudentDirectory};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: axum::Router,
    catalog: InMemoryCourseCatalog,
}

async fn setup() -> TestApp {
    let students = InMemoryStudentDirectory::new();
    students.add_ids(["S1", "S2", "S3"]).await;
    let catalog = InMemoryCourseCatalog::new();
    catalog.add_course(CourseView::new("C001", 2, 0));

    let state = api::create_state(
        Arc::new(InMemoryEnrollmentStore::new()),
        Arc::new(students),
        Arc::new(FallbackGateway::new(catalog.clone())),
    );
    let app = api::create_app(state, get_metrics_handle());

    TestApp { app, catalog }
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("X-User-Id", "42")
        .header("X-User-Role", "student")
        .body(Body::empty())
        .unwrap()
}

fn enroll_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/enrollments")
        .header("content-type", "application/json")
        .header("X-User-Id", "42")
        .header("X-Username", "ada")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn enroll(app: &axum::Router, course: &str, student: &str) -> (StatusCode, Value) {
    send(
        app,
        enroll_request(serde_json::json!({"courseId": course, "studentId": student})),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let t = setup().await;
    let (status, json) = send(&t.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 200);
    assert_eq!(json["data"]["status"], "UP");
    assert_eq!(json["data"]["service"], "enrollment-service");
}

#[tokio::test]
async fn test_enroll_returns_created_envelope() {
    let t = setup().await;
    let (status, json) = enroll(&t.app, "C001", "S1").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["code"], 201);
    assert_eq!(json["data"]["courseId"], "C001");
    assert_eq!(json["data"]["studentId"], "S1");
    assert_eq!(json["data"]["status"], "ACTIVE");
    assert!(json["data"]["id"].as_str().is_some());
    assert!(json["data"]["enrolledAt"].as_str().is_some());
    assert_eq!(t.catalog.enrolled(&"C001".into()), Some(1));
}

#[tokio::test]
async fn test_duplicate_and_full_are_conflicts() {
    let t = setup().await;
    enroll(&t.app, "C001", "S1").await;

    let (status, json) = enroll(&t.app, "C001", "S1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], 409);
    assert!(json["data"].is_null());
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("Already enrolled")
    );

    enroll(&t.app, "C001", "S2").await;
    let (status, json) = enroll(&t.app, "C001", "S3").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"].as_str().unwrap().contains("Course is full"));
}

#[tokio::test]
async fn test_missing_fields_are_bad_requests() {
    let t = setup().await;

    let (status, json) = send(&t.app, enroll_request(serde_json::json!({"courseId": "C001"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
    assert_eq!(json["message"], "studentId is required");

    let (status, _) = send(&t.app, enroll_request(serde_json::json!({"studentId": "S1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = enroll(&t.app, "   ", "S1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_student_and_course_are_not_found() {
    let t = setup().await;

    let (status, _) = enroll(&t.app, "C001", "S404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = enroll(&t.app, "C404", "S1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_down_is_service_unavailable() {
    let t = setup().await;
    t.catalog.set_unreachable(true);

    let (status, json) = enroll(&t.app, "C001", "S1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], 503);

    let (_, json) = send(&t.app, get("/api/enrollments")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unenroll_flow() {
    let t = setup().await;
    let (_, created) = enroll(&t.app, "C001", "S1").await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = send(&t.app, delete(&format!("/api/enrollments/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 200);
    assert_eq!(t.catalog.enrolled(&"C001".into()), Some(0));

    let (status, _) = send(&t.app, delete(&format!("/api/enrollments/{id}"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(&t.app, get(&format!("/api/enrollments/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "DROPPED");
}

#[tokio::test]
async fn test_unenroll_nonexistent_is_not_found() {
    let t = setup().await;

    let (status, json) = send(&t.app, delete("/api/enrollments/nonexistent-id")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 404);

    let (status, _) = send(
        &t.app,
        get("/api/enrollments/00000000-0000-4000-8000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_by_course_and_student_with_status_filter() {
    let t = setup().await;
    let (_, first) = enroll(&t.app, "C001", "S1").await;
    enroll(&t.app, "C001", "S2").await;
    let id = first["data"]["id"].as_str().unwrap().to_string();
    send(&t.app, delete(&format!("/api/enrollments/{id}"))).await;

    let (status, json) = send(&t.app, get("/api/enrollments/course/C001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (_, json) = send(&t.app, get("/api/enrollments/course/C001?status=ACTIVE")).await;
    let active = json["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["studentId"], "S2");

    let (_, json) = send(&t.app, get("/api/enrollments/student/S1?status=dropped")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&t.app, get("/api/enrollments/course/C001?status=PENDING")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&t.app, get("/api/enrollments/student/S404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_drift_report() {
    let t = setup().await;
    t.catalog.set_fail_on_update(true);
    let (status, _) = enroll(&t.app, "C001", "S1").await;
    assert_eq!(status, StatusCode::CREATED);
    t.catalog.set_fail_on_update(false);

    let (status, json) = send(&t.app, get("/api/enrollments/course/C001/drift")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["catalogEnrolled"], 0);
    assert_eq!(json["data"]["activeEnrollments"], 1);
    assert_eq!(json["data"]["drift"], -1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let t = setup().await;
    enroll(&t.app, "C001", "S1").await;

    let response = t.app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("enrollment_enroll_total"));
}
