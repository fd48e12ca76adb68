use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::pipeline::{sort_by_percentage, BatchOutcome};
use crate::models::candidate::CandidateRecord;
use crate::models::resume::ResumeRecord;
use crate::models::user::Actor;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RunMatchRequest {
    pub actor: Actor,
    /// Re-score every pool resume, superseding persisted analyses while
    /// carrying their tracking forward.
    #[serde(default)]
    pub force: bool,
}

/// POST /api/v1/jobs/:job_id/match
pub async fn handle_run_match(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<RunMatchRequest>,
) -> Result<Json<BatchOutcome>, AppError> {
    let outcome = state
        .pipeline
        .run_batch_match(job_id, &req.actor, req.force)
        .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/jobs/:job_id/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<CandidateRecord>>, AppError> {
    state
        .jobs
        .get_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let mut candidates = state.candidates.get_candidates(job_id).await?;
    sort_by_percentage(&mut candidates);
    Ok(Json(candidates))
}

/// DELETE /api/v1/jobs/:job_id
/// Removes the job's candidate records first, then the job itself.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .jobs
        .get_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let removed = state.candidates.delete_all_for_job(job_id).await?;
    state.jobs.delete(job_id).await?;

    info!("Deleted job {job_id} and {removed} candidate records");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Uuid,
}

/// GET /api/v1/resumes?owner_id=...
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    Ok(Json(state.resumes.get_by_owner(params.owner_id).await?))
}
