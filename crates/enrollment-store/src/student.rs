//! Read-only student lookup.
//!
//! Student records are maintained by the student-management side of the
//! platform. The enrollment core only needs to know whether a student number
//! exists, so this module exposes a narrow lookup port.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row, postgres::PgRow};
use tokio::sync::RwLock;

use crate::{Result, StudentId};

/// A student as seen by the enrollment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub student_id: StudentId,
    pub name: String,
    pub major: String,
    pub grade: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Creates a student with placeholder profile fields.
    pub fn with_student_id(student_id: impl Into<StudentId>) -> Self {
        let student_id = student_id.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: student_id.to_string(),
            email: format!("{student_id}@example.edu"),
            student_id,
            major: String::new(),
            grade: 1,
            created_at: Utc::now(),
        }
    }
}

/// Lookup port for student existence checks.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Finds a student by business key. Returns None if unknown.
    async fn find_by_student_id(&self, student_id: &StudentId) -> Result<Option<Student>>;
}

#[async_trait]
impl<T: StudentDirectory + ?Sized> StudentDirectory for Arc<T> {
    async fn find_by_student_id(&self, student_id: &StudentId) -> Result<Option<Student>> {
        (**self).find_by_student_id(student_id).await
    }
}

/// In-memory student directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStudentDirectory {
    students: Arc<RwLock<HashMap<StudentId, Student>>>,
}

impl InMemoryStudentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a student, replacing any previous record with the same key.
    pub async fn add(&self, student: Student) {
        self.students
            .write()
            .await
            .insert(student.student_id.clone(), student);
    }

    /// Registers placeholder students for each key.
    pub async fn add_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<StudentId>,
    {
        let mut students = self.students.write().await;
        for id in ids {
            let student = Student::with_student_id(id);
            students.insert(student.student_id.clone(), student);
        }
    }
}

#[async_trait]
impl StudentDirectory for InMemoryStudentDirectory {
    async fn find_by_student_id(&self, student_id: &StudentId) -> Result<Option<Student>> {
        Ok(self.students.read().await.get(student_id).cloned())
    }
}

/// PostgreSQL-backed student directory reading the `students` table.
#[derive(Clone)]
pub struct PostgresStudentDirectory {
    pool: PgPool,
}

impl PostgresStudentDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_student(row: PgRow) -> Result<Student> {
        Ok(Student {
            id: row.try_get("id")?,
            student_id: StudentId::new(row.try_get::<String, _>("student_id")?),
            name: row.try_get("name")?,
            major: row.try_get("major")?,
            grade: row.try_get("grade")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl StudentDirectory for PostgresStudentDirectory {
    async fn find_by_student_id(&self, student_id: &StudentId) -> Result<Option<Student>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, student_id, name, major, grade, email, created_at
            FROM students
            WHERE student_id = $1
            "#,
        )
        .bind(student_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_student).transpose()
    }
}
