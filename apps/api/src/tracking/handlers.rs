use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateRecord, CandidateStatus, StatusUpdate};
use crate::models::user::Actor;
use crate::state::AppState;
use crate::tracking::apply_candidate_status;

#[derive(Deserialize)]
pub struct StatusChangeRequest {
    pub status: CandidateStatus,
    pub actor: Actor,
    #[serde(default)]
    pub rate_confirmed: Option<String>,
    #[serde(default)]
    pub interview_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub contacted_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StatusChangeRequest {
    /// The additional-data payload, or None when the request carried none.
    fn additional_data(&self) -> Option<StatusUpdate> {
        if self.rate_confirmed.is_none()
            && self.interview_date.is_none()
            && self.contacted_date.is_none()
            && self.notes.is_none()
        {
            return None;
        }
        Some(StatusUpdate {
            rate_confirmed: self.rate_confirmed.clone(),
            interview_date: self.interview_date,
            contacted_date: self.contacted_date,
            notes: self.notes.clone(),
        })
    }
}

/// PATCH /api/v1/jobs/:job_id/candidates/:filename/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path((job_id, filename)): Path<(Uuid, String)>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<CandidateRecord>, AppError> {
    let update = req.additional_data();
    let updated = apply_candidate_status(
        state.candidates.as_ref(),
        job_id,
        &filename,
        req.status,
        &req.actor,
        update,
    )
    .await?;
    Ok(Json(updated))
}
