//! Candidate Tracking State Machine — records status progressions for a
//! candidate within one job's pipeline.
//!
//! This is an annotation layer, not a workflow enforcer: no transition is
//! ever rejected, so recruiters can correct or roll back a status freely.
//! The `stage()` ordering on `CandidateStatus` exists only for rendering
//! progress. History is append-only: every change appends exactly one
//! entry and never touches earlier ones.
//!
//! Concurrency caveat: the store writes the whole `tracking` document as one
//! unit, so two fully concurrent transitions on the same candidate race at
//! last-write-wins granularity and one history entry can be lost. Accepted
//! at this layer; an atomic array-append would need store support.

pub mod handlers;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{
    CandidateRecord, CandidateStatus, StatusHistoryEntry, StatusUpdate, Tracking,
};
use crate::models::user::Actor;
use crate::store::CandidateStore;

/// Applies a status change to a candidate. Pure with respect to storage:
/// the caller persists the returned record.
///
/// Side-channel fields are sticky: set only on their matching status, never
/// cleared by later transitions. Notes overwrite on any transition.
pub fn apply_status(
    mut candidate: CandidateRecord,
    new_status: CandidateStatus,
    actor: &Actor,
    update: Option<StatusUpdate>,
) -> CandidateRecord {
    let now = Utc::now();

    // Missing tracking is initialized on the spot; a transition is never
    // rejected for lack of it. The fresh object starts with an empty
    // history; the applied transition becomes its first entry.
    let mut tracking = candidate.tracking.take().unwrap_or_else(|| Tracking {
        status: CandidateStatus::Pending,
        status_history: vec![],
        last_updated: now,
        updated_by: actor.email.clone(),
        rate_confirmed: None,
        interview_date: None,
        contacted_date: None,
        notes: None,
    });

    tracking.status_history.push(StatusHistoryEntry {
        status: new_status,
        timestamp: now,
        updated_by: actor.email.clone(),
        additional_data: update.clone(),
    });
    tracking.status = new_status;
    tracking.last_updated = now;
    tracking.updated_by = actor.email.clone();

    if let Some(update) = update {
        match new_status {
            CandidateStatus::RateConfirmed => {
                if let Some(rate) = update.rate_confirmed {
                    tracking.rate_confirmed = Some(rate);
                }
            }
            CandidateStatus::InterviewScheduled => {
                if let Some(date) = update.interview_date {
                    tracking.interview_date = Some(date);
                }
            }
            CandidateStatus::Contacted => {
                if let Some(date) = update.contacted_date {
                    tracking.contacted_date = Some(date);
                }
            }
            _ => {}
        }
        if let Some(notes) = update.notes {
            tracking.notes = Some(notes);
        }
    }

    candidate.tracking = Some(tracking);
    candidate.updated_at = now;
    candidate
}

/// Persisted variant: load, apply, upsert, return the updated record.
pub async fn apply_candidate_status(
    store: &dyn CandidateStore,
    job_id: Uuid,
    filename: &str,
    new_status: CandidateStatus,
    actor: &Actor,
    update: Option<StatusUpdate>,
) -> Result<CandidateRecord, AppError> {
    let candidate = store.get(job_id, filename).await?.ok_or_else(|| {
        AppError::NotFound(format!("Candidate {filename} not found for job {job_id}"))
    })?;

    let updated = apply_status(candidate, new_status, actor, update);
    store.upsert(&updated).await?;

    info!(
        "Candidate {} in job {} moved to {} by {}",
        filename,
        job_id,
        new_status.as_str(),
        actor.email
    );

    Ok(updated)
}
