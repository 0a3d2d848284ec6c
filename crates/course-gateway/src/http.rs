//! Reqwest-backed catalog transport.
//!
//! This adapter owns transport details only: URL building, request timeout,
//! HTTP status mapping, and decoding the catalog's response envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::{
    CatalogEnvelope, CourseGateway, CourseId, CourseIdFormat, CourseView, EndpointResolver,
    GatewayError, Result,
};

const COURSES_PATH: [&str; 2] = ["api", "courses"];
const BODY_PREVIEW_LIMIT: usize = 200;

/// Catalog gateway that calls the catalog's REST API.
pub struct HttpCourseGateway<R: EndpointResolver> {
    client: Client,
    resolver: R,
    id_format: CourseIdFormat,
}

impl<R: EndpointResolver> HttpCourseGateway<R> {
    /// Builds a gateway using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error when the client cannot be constructed
    /// (TLS backend or resolver initialization).
    pub fn new(resolver: R, timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            resolver,
            id_format: CourseIdFormat::default(),
        })
    }

    /// Sets the course identifier format the catalog expects.
    pub fn with_id_format(mut self, id_format: CourseIdFormat) -> Self {
        self.id_format = id_format;
        self
    }

    fn course_url(&self, course_id: &CourseId) -> Result<Url> {
        let mut url = self.resolver.resolve()?;
        if url.cannot_be_a_base() {
            return Err(GatewayError::Validation(format!(
                "catalog url cannot be a base: {url}"
            )));
        }
        url.path_segments_mut()
            .map_err(|()| GatewayError::Validation("catalog url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(COURSES_PATH)
            .push(course_id.as_str().trim());
        Ok(url)
    }
}

#[async_trait]
impl<R: EndpointResolver> CourseGateway for HttpCourseGateway<R> {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, course_id: &CourseId) -> Result<CourseView> {
        self.id_format.validate(course_id)?;
        let url = self.course_url(course_id)?;
        let started = std::time::Instant::now();

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        metrics::histogram!("catalog_request_duration_seconds", "operation" => "fetch")
            .record(started.elapsed().as_secs_f64());

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(course_id.clone()));
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let envelope: CatalogEnvelope<CourseView> = serde_json::from_slice(body.as_ref())
            .map_err(|e| GatewayError::unavailable(format!("invalid catalog payload: {e}")))?;

        envelope
            .data
            .ok_or_else(|| GatewayError::NotFound(course_id.clone()))
    }

    #[tracing::instrument(skip(self))]
    async fn update_enrolled(&self, course_id: &CourseId, count: u32) -> Result<()> {
        self.id_format.validate(course_id)?;
        let url = self.course_url(course_id)?;
        let started = std::time::Instant::now();

        let response = self
            .client
            .put(url)
            .json(&serde_json::json!({ "enrolled": count }))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        metrics::histogram!("catalog_request_duration_seconds", "operation" => "update_enrolled")
            .record(started.elapsed().as_secs_f64());

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(course_id.clone()));
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::unavailable(format!("request timed out: {error}"))
    } else if error.is_connect() {
        GatewayError::unavailable(format!("connection failed: {error}"))
    } else {
        GatewayError::unavailable(error.to_string())
    }
}

// Anything other than 404 is something the enrollment core cannot act on,
// so 4xx and 5xx alike become Unavailable with the status preserved.
fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let preview = body_preview(body);
    if preview.is_empty() {
        GatewayError::unavailable(format!("status {}", status.as_u16()))
    } else {
        GatewayError::unavailable(format!("status {}: {}", status.as_u16(), preview))
    }
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    trimmed.chars().take(BODY_PREVIEW_LIMIT).collect()
}
