//! What to do when the catalog's counter could not be updated after a local
//! commit.
//!
//! The local record is already durable at that point and is never rolled
//! back, so every policy here is best effort. Nothing a policy does is
//! surfaced to the caller of `enroll`/`unenroll`.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use course_gateway::GatewayError;
use enrollment_store::{CourseId, EnrollmentId};

/// The orchestrator operation whose remote update failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompensationOperation {
    Enroll,
    Unenroll,
}

impl CompensationOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationOperation::Enroll => "enroll",
            CompensationOperation::Unenroll => "unenroll",
        }
    }
}

impl std::fmt::Display for CompensationOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything known about a failed remote update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationContext {
    pub operation: CompensationOperation,
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    /// The count that should have been written. `None` when the failure
    /// happened before it could be computed (the unenroll re-fetch).
    pub intended_count: Option<u32>,
    pub error: GatewayError,
}

/// Hook invoked after a local commit when the catalog update fails.
#[async_trait]
pub trait CompensationPolicy: Send + Sync {
    async fn on_remote_update_failed(&self, ctx: &CompensationContext);
}

#[async_trait]
impl<C: CompensationPolicy + ?Sized> CompensationPolicy for Arc<C> {
    async fn on_remote_update_failed(&self, ctx: &CompensationContext) {
        (**self).on_remote_update_failed(ctx).await
    }
}

/// Logs the drift and moves on. No retry queue, no reconciliation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndContinue;

#[async_trait]
impl CompensationPolicy for LogAndContinue {
    async fn on_remote_update_failed(&self, ctx: &CompensationContext) {
        metrics::counter!(
            "enrollment_capacity_drift_total",
            "operation" => ctx.operation.as_str()
        )
        .increment(1);
        tracing::warn!(
            operation = %ctx.operation,
            enrollment_id = %ctx.enrollment_id,
            course_id = %ctx.course_id,
            intended_count = ?ctx.intended_count,
            error = %ctx.error,
            "catalog enrolled count not updated, capacity may drift"
        );
    }
}

/// Keeps every context it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingCompensation {
    records: Arc<Mutex<Vec<CompensationContext>>>,
}

impl RecordingCompensation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CompensationContext> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CompensationPolicy for RecordingCompensation {
    async fn on_remote_update_failed(&self, ctx: &CompensationContext) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ctx.clone());
    }
}
