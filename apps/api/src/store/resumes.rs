use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;

/// Read-only access to the pool of previously parsed resumes. The upload and
/// extraction pipeline owns writes; the matching core only ever reads.
#[async_trait]
pub trait ResumePool: Send + Sync {
    async fn get_all(&self) -> Result<Vec<ResumeRecord>, AppError>;
    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<ResumeRecord>, AppError>;
}

pub struct PgResumePool {
    pool: PgPool,
}

impl PgResumePool {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ResumeRow {
    filename: String,
    owner_id: Uuid,
    owner_email: String,
    name: Option<String>,
    email: Option<String>,
    skills: Vec<String>,
    education_details: Value,
    work_experience_details: Value,
}

impl ResumeRow {
    fn into_record(self) -> Result<ResumeRecord, AppError> {
        let education_details = serde_json::from_value(self.education_details)
            .map_err(|e| AppError::Internal(anyhow!("bad education for {}: {e}", self.filename)))?;
        let work_experience_details = serde_json::from_value(self.work_experience_details)
            .map_err(|e| AppError::Internal(anyhow!("bad experience for {}: {e}", self.filename)))?;

        Ok(ResumeRecord {
            filename: self.filename,
            owner_id: self.owner_id,
            owner_email: self.owner_email,
            name: self.name,
            email: self.email,
            skills: self.skills,
            education_details,
            work_experience_details,
        })
    }
}

const SELECT_COLUMNS: &str = "filename, owner_id, owner_email, name, email, skills, \
     education_details, work_experience_details";

#[async_trait]
impl ResumePool for PgResumePool {
    async fn get_all(&self) -> Result<Vec<ResumeRecord>, AppError> {
        let rows = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM resumes ORDER BY filename ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResumeRow::into_record).collect()
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<ResumeRecord>, AppError> {
        let rows = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM resumes WHERE owner_id = $1 ORDER BY filename ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResumeRow::into_record).collect()
    }
}
