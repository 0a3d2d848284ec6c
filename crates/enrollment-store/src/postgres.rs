use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CourseId, Enrollment, EnrollmentId, EnrollmentQuery, EnrollmentStatus, Result, StoreError,
    StudentId, store::EnrollmentStore,
};

/// Name of the partial unique index over ACTIVE `(course_id, student_id)`.
pub const ACTIVE_PAIR_CONSTRAINT: &str = "uk_active_course_student";

const SELECT_COLUMNS: &str = "SELECT id, course_id, student_id, status, enrolled_at FROM enrollments";

/// PostgreSQL-backed enrollment store implementation.
#[derive(Clone)]
pub struct PostgresEnrollmentStore {
    pool: PgPool,
}

impl PostgresEnrollmentStore {
    /// Creates a new PostgreSQL enrollment store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_enrollment(row: PgRow) -> Result<Enrollment> {
        let status: String = row.try_get("status")?;

        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            course_id: CourseId::new(row.try_get::<String, _>("course_id")?),
            student_id: StudentId::new(row.try_get::<String, _>("student_id")?),
            status: status.parse()?,
            enrolled_at: row.try_get("enrolled_at")?,
        })
    }
}

#[async_trait]
impl EnrollmentStore for PostgresEnrollmentStore {
    #[tracing::instrument(
        skip(self, enrollment),
        fields(enrollment_id = %enrollment.id, course_id = %enrollment.course_id)
    )]
    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (id, course_id, student_id, status, enrolled_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.course_id.as_str())
        .bind(enrollment.student_id.as_str())
        .bind(enrollment.status.as_str())
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The partial unique index is the real duplicate guard
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(ACTIVE_PAIR_CONSTRAINT)
            {
                metrics::counter!("enrollment_store_duplicate_rejected_total").increment(1);
                tracing::debug!("insert rejected by {ACTIVE_PAIR_CONSTRAINT}");
                return StoreError::DuplicateActive {
                    course_id: enrollment.course_id.clone(),
                    student_id: enrollment.student_id.clone(),
                };
            }
            StoreError::Database(e)
        })?;

        Ok(enrollment)
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(
        &self,
        id: EnrollmentId,
        expected: EnrollmentStatus,
        new_status: EnrollmentStatus,
    ) -> Result<Enrollment> {
        let updated: Option<PgRow> = sqlx::query(
            r#"
            UPDATE enrollments SET status = $1
            WHERE id = $2 AND status = $3
            RETURNING id, course_id, student_id, status, enrolled_at
            "#,
        )
        .bind(new_status.as_str())
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Self::row_to_enrollment(row);
        }

        // Nothing matched: either the row is gone or someone else moved it.
        match self.get(id).await? {
            Some(current) => Err(StoreError::StatusMismatch {
                id,
                expected,
                actual: current.status,
            }),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn get(&self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        let row: Option<PgRow> = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_enrollment).transpose()
    }

    async fn find(&self, query: EnrollmentQuery) -> Result<Vec<Enrollment>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.course_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND course_id = ${param_count}"));
        }
        if query.student_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND student_id = ${param_count}"));
        }
        if query.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }

        sql.push_str(" ORDER BY enrolled_at ASC, id ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(ref course_id) = query.course_id {
            sqlx_query = sqlx_query.bind(course_id.as_str());
        }
        if let Some(ref student_id) = query.student_id {
            sqlx_query = sqlx_query.bind(student_id.as_str());
        }
        if let Some(status) = query.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_enrollment).collect()
    }

    async fn exists_active(&self, course_id: &CourseId, student_id: &StudentId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM enrollments
                WHERE course_id = $1 AND student_id = $2 AND status = 'ACTIVE'
            )
            "#,
        )
        .bind(course_id.as_str())
        .bind(student_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_active_by_course(&self, course_id: &CourseId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND status = 'ACTIVE'",
        )
        .bind(course_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}
