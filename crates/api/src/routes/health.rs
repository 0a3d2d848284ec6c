//! Health check endpoint.

use axum::Json;
use serde::Serialize;

use crate::response::ApiResponse;

pub const SERVICE_NAME: &str = "enrollment-service";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health: returns service liveness.
pub async fn check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "UP",
        service: SERVICE_NAME,
    }))
}
