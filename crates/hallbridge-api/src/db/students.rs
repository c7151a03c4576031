//! Student directory persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::StudentRecord;

/// Insert a new directory entry.
pub async fn insert(pool: &PgPool, record: &StudentRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO students (id, name, student_code, email, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.student_code)
    .bind(&record.email)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every directory entry on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<StudentRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StudentRow>(
        "SELECT id, name, student_code, email, created_at FROM students ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(StudentRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    student_code: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

impl StudentRow {
    fn into_record(self) -> StudentRecord {
        StudentRecord {
            id: self.id,
            name: self.name,
            student_code: self.student_code,
            email: self.email,
            created_at: self.created_at,
        }
    }
}
