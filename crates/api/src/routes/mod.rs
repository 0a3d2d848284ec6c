pub mod enrollments;
pub mod health;
pub mod metrics;
