use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;

/// Key-value store of candidate records keyed by `(job_id, filename)`.
///
/// `upsert` writes the whole record, including the `tracking` document, as
/// one unit: that row is the concurrency boundary. Concurrent writers to
/// the same key race at last-write-wins granularity.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get_candidates(&self, job_id: Uuid) -> Result<Vec<CandidateRecord>, AppError>;
    async fn get(&self, job_id: Uuid, filename: &str)
        -> Result<Option<CandidateRecord>, AppError>;
    async fn upsert(&self, record: &CandidateRecord) -> Result<(), AppError>;
    /// Cascade target for job deletion. Returns the number of rows removed.
    async fn delete_all_for_job(&self, job_id: Uuid) -> Result<u64, AppError>;
}

pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape: nested documents live in JSONB columns and are mapped into
/// typed models after the fetch.
#[derive(Debug, FromRow)]
struct CandidateRow {
    job_id: Uuid,
    filename: String,
    name: String,
    email: String,
    match_analysis: Value,
    analysis: Value,
    tracking: Option<Value>,
    owner_id: Uuid,
    owner_email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CandidateRow {
    fn into_record(self) -> Result<CandidateRecord, AppError> {
        let match_analysis = serde_json::from_value(self.match_analysis)
            .map_err(|e| AppError::Internal(anyhow!("bad match_analysis for {}: {e}", self.filename)))?;
        let analysis = serde_json::from_value(self.analysis)
            .map_err(|e| AppError::Internal(anyhow!("bad analysis for {}: {e}", self.filename)))?;
        let tracking = self
            .tracking
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::Internal(anyhow!("bad tracking for {}: {e}", self.filename)))?;

        Ok(CandidateRecord {
            job_id: self.job_id,
            filename: self.filename,
            name: self.name,
            email: self.email,
            match_analysis,
            analysis,
            tracking,
            owner_id: self.owner_id,
            owner_email: self.owner_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "job_id, filename, name, email, match_analysis, analysis, \
     tracking, owner_id, owner_email, created_at, updated_at";

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn get_candidates(&self, job_id: Uuid) -> Result<Vec<CandidateRecord>, AppError> {
        let rows = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM candidates WHERE job_id = $1 \
             ORDER BY (match_analysis->>'match_percentage')::float8 DESC"
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CandidateRow::into_record).collect()
    }

    async fn get(
        &self,
        job_id: Uuid,
        filename: &str,
    ) -> Result<Option<CandidateRecord>, AppError> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM candidates WHERE job_id = $1 AND filename = $2"
        ))
        .bind(job_id)
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CandidateRow::into_record).transpose()
    }

    async fn upsert(&self, record: &CandidateRecord) -> Result<(), AppError> {
        let match_analysis = serde_json::to_value(&record.match_analysis)
            .map_err(|e| AppError::Internal(anyhow!("serialize match_analysis: {e}")))?;
        let analysis = serde_json::to_value(&record.analysis)
            .map_err(|e| AppError::Internal(anyhow!("serialize analysis: {e}")))?;
        let tracking = record
            .tracking
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(anyhow!("serialize tracking: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO candidates
                (job_id, filename, name, email, match_analysis, analysis,
                 tracking, owner_id, owner_email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (job_id, filename) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                match_analysis = EXCLUDED.match_analysis,
                analysis = EXCLUDED.analysis,
                tracking = EXCLUDED.tracking,
                owner_email = EXCLUDED.owner_email,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.job_id)
        .bind(&record.filename)
        .bind(&record.name)
        .bind(&record.email)
        .bind(match_analysis)
        .bind(analysis)
        .bind(tracking)
        .bind(record.owner_id)
        .bind(&record.owner_email)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all_for_job(&self, job_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM candidates WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
