use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobDescription;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_by_id(&self, job_id: Uuid) -> Result<Option<JobDescription>, AppError>;
    /// Returns true if a row was deleted. Candidate cascade is the caller's
    /// responsibility (see the job delete handler).
    async fn delete(&self, job_id: Uuid) -> Result<bool, AppError>;
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    requirements: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for JobDescription {
    fn from(row: JobRow) -> Self {
        JobDescription {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            requirements: row.requirements,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn get_by_id(&self, job_id: Uuid) -> Result<Option<JobDescription>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            "SELECT id, owner_id, title, description, requirements, created_at, updated_at \
             FROM jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(JobDescription::from))
    }

    async fn delete(&self, job_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
