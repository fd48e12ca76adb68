use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::resume::{Education, WorkExperience};

/// Hiring-pipeline status of a candidate within one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Pending,
    Shortlisted,
    Contacted,
    Interested,
    NotInterested,
    RateConfirmed,
    InterviewScheduled,
    Approved,
    Disapproved,
}

impl CandidateStatus {
    /// Display-ordering stage. This drives "completed / current / upcoming"
    /// rendering only, NOT a transition gate. Recruiters may move a
    /// candidate to any status from any status.
    pub fn stage(&self) -> u8 {
        match self {
            CandidateStatus::Pending => 0,
            CandidateStatus::Shortlisted => 1,
            CandidateStatus::Contacted => 2,
            CandidateStatus::Interested | CandidateStatus::NotInterested => 3,
            CandidateStatus::RateConfirmed => 4,
            CandidateStatus::InterviewScheduled => 5,
            CandidateStatus::Approved | CandidateStatus::Disapproved => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Contacted => "contacted",
            CandidateStatus::Interested => "interested",
            CandidateStatus::NotInterested => "not_interested",
            CandidateStatus::RateConfirmed => "rate_confirmed",
            CandidateStatus::InterviewScheduled => "interview_scheduled",
            CandidateStatus::Approved => "approved",
            CandidateStatus::Disapproved => "disapproved",
        }
    }
}

/// Optional payload accompanying a status change. Fields land in the
/// matching sticky slot on `Tracking` (see `tracking::apply_status`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub rate_confirmed: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub contacted_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// One entry in a candidate's status history. Entries are append-only:
/// nothing ever mutates or removes an existing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: CandidateStatus,
    pub timestamp: DateTime<Utc>,
    pub updated_by: String,
    pub additional_data: Option<StatusUpdate>,
}

/// Pipeline tracking attached to a candidate, independent of match score.
///
/// The persistence layer writes this object as a single unit (one JSONB
/// column), so concurrent status changes on the same candidate race at
/// last-write-wins granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracking {
    pub status: CandidateStatus,
    pub status_history: Vec<StatusHistoryEntry>,
    pub last_updated: DateTime<Utc>,
    pub updated_by: String,
    pub rate_confirmed: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub contacted_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Tracking {
    /// Fresh tracking for a newly matched candidate: `pending` with a single
    /// history entry recording who initiated the match.
    pub fn initial(actor_email: &str, now: DateTime<Utc>) -> Self {
        Tracking {
            status: CandidateStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: CandidateStatus::Pending,
                timestamp: now,
                updated_by: actor_email.to_string(),
                additional_data: None,
            }],
            last_updated: now,
            updated_by: actor_email.to_string(),
            rate_confirmed: None,
            interview_date: None,
            contacted_date: None,
            notes: None,
        }
    }
}

/// The match-relevant slice of the parsed resume, denormalized onto the
/// candidate so the UI never has to join back to the pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default)]
    pub education_details: Vec<Education>,
    #[serde(default)]
    pub work_experience_details: Vec<WorkExperience>,
}

/// Scorer verdict for one (job, resume) pair. Immutable once computed;
/// re-analysis overwrites it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub match_percentage: f64,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_requirements: Vec<String>,
    pub experience_match: bool,
    pub education_match: bool,
    pub overall_assessment: String,
}

/// The core aggregate: a resume matched against a specific job.
/// Identity is `(job_id, filename)`, unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub job_id: Uuid,
    pub filename: String,
    pub name: String,
    pub email: String,
    pub match_analysis: MatchAnalysis,
    pub analysis: CandidateAnalysis,
    pub tracking: Option<Tracking>,
    pub owner_id: Uuid,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CandidateRecord {
    /// Rejects malformed payloads before they enter a merge: a candidate
    /// without a filename has no identity, and a percentage outside 0–100
    /// means the scorer response was garbage.
    pub fn validate(&self) -> Result<(), String> {
        if self.filename.trim().is_empty() {
            return Err("candidate is missing a filename".to_string());
        }
        let pct = self.match_analysis.match_percentage;
        if !(0.0..=100.0).contains(&pct) || pct.is_nan() {
            return Err(format!("match percentage {pct} is out of range"));
        }
        Ok(())
    }

    pub fn match_percentage(&self) -> f64 {
        self.match_analysis.match_percentage
    }
}
