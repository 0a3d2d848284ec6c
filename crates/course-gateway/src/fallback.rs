//! Fail-fast fallback decorator.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::{CourseGateway, CourseId, CourseView, GatewayError, Result};

/// The fixed reason carried by every fallback response.
pub const FALLBACK_MESSAGE: &str = "catalog service temporarily unavailable, please retry later";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Wraps a gateway with a per-call timeout and a fixed fallback response.
///
/// When the inner gateway times out or reports `Unavailable`, the call
/// returns `Unavailable(FALLBACK_MESSAGE)` instead. `NotFound` and
/// `Validation` are answers, not failures, and pass through untouched.
/// Nothing is retried.
#[derive(Debug, Clone)]
pub struct FallbackGateway<G> {
    inner: G,
    timeout: Duration,
}

impl<G: CourseGateway> FallbackGateway<G> {
    pub fn new(inner: G) -> Self {
        Self::with_timeout(inner, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn guarded<T>(
        &self,
        operation: &'static str,
        course_id: &CourseId,
        call: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(GatewayError::Unavailable(reason))) => {
                Err(self.fallback(operation, course_id, &reason))
            }
            Ok(Err(other)) => Err(other),
            Err(_elapsed) => {
                let reason = format!("no response within {:?}", self.timeout);
                Err(self.fallback(operation, course_id, &reason))
            }
        }
    }

    fn fallback(&self, operation: &'static str, course_id: &CourseId, reason: &str) -> GatewayError {
        metrics::counter!("catalog_fallback_total", "operation" => operation).increment(1);
        tracing::warn!(
            operation,
            %course_id,
            reason,
            "catalog call failed, returning fallback response"
        );
        GatewayError::unavailable(FALLBACK_MESSAGE)
    }
}

#[async_trait]
impl<G: CourseGateway> CourseGateway for FallbackGateway<G> {
    async fn fetch(&self, course_id: &CourseId) -> Result<CourseView> {
        self.guarded("fetch", course_id, self.inner.fetch(course_id))
            .await
    }

    async fn update_enrolled(&self, course_id: &CourseId, count: u32) -> Result<()> {
        self.guarded(
            "update_enrolled",
            course_id,
            self.inner.update_enrolled(course_id, count),
        )
        .await
    }
}
