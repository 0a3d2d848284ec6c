//! HTTP API server for the enrollment service.
//!
//! Exposes enroll/unenroll and enrollment queries over REST, with structured
//! logging (tracing) and Prometheus metrics. Every JSON response uses the
//! `{code, message, data}` envelope.

pub mod config;
pub mod error;
pub mod identity;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use course_gateway::{
    CourseGateway, CourseIdFormat, DiscoveredEndpoints, FallbackGateway, GatewayError,
    HttpCourseGateway, StaticEndpoint,
};
use enrollment::EnrollmentCoordinator;
use enrollment_store::{
    EnrollmentStore, InMemoryEnrollmentStore, InMemoryStudentDirectory, PostgresEnrollmentStore,
    PostgresStudentDirectory, StoreError, StudentDirectory,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{CATALOG_SERVICE_NAME, CatalogConfig, Config};

/// The coordinator as wired by the server: storage and catalog chosen at
/// startup.
pub type AppCoordinator = EnrollmentCoordinator<
    Arc<dyn EnrollmentStore>,
    Arc<dyn StudentDirectory>,
    Arc<dyn CourseGateway>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub coordinator: AppCoordinator,
}

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid catalog configuration: {0}")]
    Catalog(#[from] GatewayError),

    #[error("HTTP client initialization failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store initialization failed: {0}")]
    Store(#[from] StoreError),
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    use routes::enrollments;

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/enrollments",
            get(enrollments::list).post(enrollments::create),
        )
        .route(
            "/api/enrollments/{id}",
            get(enrollments::get).delete(enrollments::unenroll),
        )
        .route(
            "/api/enrollments/course/{course_id}",
            get(enrollments::by_course),
        )
        .route(
            "/api/enrollments/course/{course_id}/drift",
            get(enrollments::drift),
        )
        .route(
            "/api/enrollments/student/{student_id}",
            get(enrollments::by_student),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the coordinator from its three collaborators.
pub fn create_state(
    store: Arc<dyn EnrollmentStore>,
    students: Arc<dyn StudentDirectory>,
    catalog: Arc<dyn CourseGateway>,
) -> Arc<AppState> {
    Arc::new(AppState {
        coordinator: EnrollmentCoordinator::new(store, students, catalog),
    })
}

/// Builds the catalog gateway: HTTP transport behind the fallback decorator.
///
/// A non-empty instance list selects round-robin over discovered instances;
/// otherwise the single base URL is used.
pub fn build_gateway(config: &CatalogConfig) -> Result<Arc<dyn CourseGateway>, StartupError> {
    let id_format = if config.numeric_ids {
        CourseIdFormat::Numeric
    } else {
        CourseIdFormat::Opaque
    };

    let gateway: Arc<dyn CourseGateway> = if config.instances.is_empty() {
        let resolver = StaticEndpoint::parse(&config.url)?;
        let http = HttpCourseGateway::new(resolver, config.timeout)?.with_id_format(id_format);
        Arc::new(FallbackGateway::with_timeout(http, config.timeout))
    } else {
        let resolver = DiscoveredEndpoints::parse(
            CATALOG_SERVICE_NAME,
            config.instances.iter().map(String::as_str),
        )?;
        let http = HttpCourseGateway::new(resolver, config.timeout)?.with_id_format(id_format);
        Arc::new(FallbackGateway::with_timeout(http, config.timeout))
    };

    Ok(gateway)
}

/// Enrollment storage and student directory, chosen by configuration.
pub struct Storage {
    pub store: Arc<dyn EnrollmentStore>,
    pub students: Arc<dyn StudentDirectory>,
}

/// Connects to PostgreSQL when `DATABASE_URL` is set, otherwise builds
/// in-memory storage seeded with `SEED_STUDENTS`.
pub async fn build_storage(config: &Config) -> Result<Storage, StartupError> {
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url).await?;
            let store = PostgresEnrollmentStore::new(pool.clone());
            store.run_migrations().await?;
            tracing::info!("using PostgreSQL enrollment store");
            Ok(Storage {
                store: Arc::new(store),
                students: Arc::new(PostgresStudentDirectory::new(pool)),
            })
        }
        None => {
            let students = InMemoryStudentDirectory::new();
            students
                .add_ids(config.seed_students.iter().map(String::as_str))
                .await;
            tracing::info!(
                seeded_students = config.seed_students.len(),
                "using in-memory enrollment store"
            );
            Ok(Storage {
                store: Arc::new(InMemoryEnrollmentStore::new()),
                students: Arc::new(students),
            })
        }
    }
}
