//! Batch Match Orchestrator — matches one job against the resume pool while
//! never re-scoring a `(job, filename)` pair that already has a persisted
//! candidate, unless the caller explicitly forces re-analysis.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::dedup::{dedupe, DedupOutcome};
use crate::matching::scorer::MatchScorer;
use crate::models::candidate::{CandidateAnalysis, CandidateRecord, MatchAnalysis, Tracking};
use crate::models::job::JobDescription;
use crate::models::resume::ResumeRecord;
use crate::models::user::Actor;
use crate::store::{CandidateStore, JobStore, ResumePool};

/// Scorer results at or below this percentage are discarded: not persisted,
/// not returned.
pub const MATCH_THRESHOLD: f64 = 50.0;

/// A per-record failure inside an otherwise successful batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRecordError {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Batch ran to completion; everything returned is persisted.
    Completed,
    /// The resume pool was empty. Not an error: there was nothing to match.
    NoResumes,
    /// Scoring succeeded but at least one record failed to save. The
    /// in-memory results are still returned so the work is not lost.
    SaveFailed,
}

/// What one batch produced. Successes and failures travel together; a bad
/// resume or a transient save error never discards the rest of the batch.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub candidates: Vec<CandidateRecord>,
    pub removed_duplicates: usize,
    /// Successful scorer invocations in this batch (zero on the fast path).
    pub newly_analyzed: usize,
    pub errors: Vec<BatchRecordError>,
    pub status: BatchStatus,
}

impl BatchOutcome {
    fn empty(status: BatchStatus) -> Self {
        BatchOutcome {
            candidates: vec![],
            removed_duplicates: 0,
            newly_analyzed: 0,
            errors: vec![],
            status,
        }
    }
}

/// The orchestrator. All collaborators are injected trait objects, so tests
/// run the full pipeline over in-memory fakes.
pub struct MatchPipeline {
    jobs: Arc<dyn JobStore>,
    candidates: Arc<dyn CandidateStore>,
    resumes: Arc<dyn ResumePool>,
    scorer: Arc<dyn MatchScorer>,
    scorer_concurrency: usize,
}

impl MatchPipeline {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        candidates: Arc<dyn CandidateStore>,
        resumes: Arc<dyn ResumePool>,
        scorer: Arc<dyn MatchScorer>,
        scorer_concurrency: usize,
    ) -> Self {
        Self {
            jobs,
            candidates,
            resumes,
            scorer,
            scorer_concurrency: scorer_concurrency.max(1),
        }
    }

    /// Runs one batch for `job_id`. A missing job is fatal and aborts before
    /// any scoring work; per-resume failures are collected, never thrown.
    pub async fn run_batch_match(
        &self,
        job_id: Uuid,
        actor: &Actor,
        force: bool,
    ) -> Result<BatchOutcome, AppError> {
        let job = self
            .jobs
            .get_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

        let existing = self.candidates.get_candidates(job_id).await?;
        let pool = self.resumes.get_all().await?;

        if pool.is_empty() {
            info!("No resumes in pool; nothing to match for job {job_id}");
            return Ok(BatchOutcome::empty(BatchStatus::NoResumes));
        }

        let analyzed: HashSet<&str> = existing.iter().map(|c| c.filename.as_str()).collect();
        let new_resumes: Vec<ResumeRecord> = pool
            .into_iter()
            .filter(|r| force || !analyzed.contains(r.filename.as_str()))
            .collect();

        if new_resumes.is_empty() {
            // Fast path: every pool entry already has a candidate. Zero
            // scorer calls, zero writes.
            let DedupOutcome {
                mut unique,
                removed_count,
            } = dedupe(existing);
            sort_by_percentage(&mut unique);
            return Ok(BatchOutcome {
                candidates: unique,
                removed_duplicates: removed_count,
                newly_analyzed: 0,
                errors: vec![],
                status: BatchStatus::Completed,
            });
        }

        info!(
            "Scoring {} resumes against job {} ({})",
            new_resumes.len(),
            job.id,
            job.title
        );

        let (scored, mut errors) = self.score_all(&job, new_resumes).await;
        let newly_analyzed = scored.len();

        // Superseded records keyed by filename, so re-analysis can reattach
        // tracking verbatim and keep the original created_at.
        let prior: HashMap<String, CandidateRecord> = existing
            .iter()
            .map(|c| (c.filename.clone(), c.clone()))
            .collect();

        let now = Utc::now();
        let mut merged = existing;
        for (resume, analysis) in scored {
            if analysis.match_percentage <= MATCH_THRESHOLD {
                continue;
            }
            merged.push(build_candidate(
                &job,
                &resume,
                analysis,
                prior.get(&resume.filename),
                actor,
                now,
            ));
        }

        // Malformed records are skipped, not batch-fatal.
        let mut valid = Vec::with_capacity(merged.len());
        for record in merged {
            match record.validate() {
                Ok(()) => valid.push(record),
                Err(reason) => {
                    warn!("Skipping malformed candidate {:?}: {reason}", record.filename);
                    errors.push(BatchRecordError {
                        filename: record.filename,
                        error: reason,
                    });
                }
            }
        }

        let DedupOutcome {
            mut unique,
            removed_count,
        } = dedupe(valid);

        let mut status = BatchStatus::Completed;
        for record in &unique {
            if let Err(e) = self.candidates.upsert(record).await {
                warn!("Failed to save candidate {}: {e}", record.filename);
                errors.push(BatchRecordError {
                    filename: record.filename.clone(),
                    error: format!("computed but not saved: {e}"),
                });
                status = BatchStatus::SaveFailed;
            }
        }

        sort_by_percentage(&mut unique);

        info!(
            "Batch for job {} done: {} candidates, {} newly analyzed, {} duplicates removed, {} errors",
            job_id,
            unique.len(),
            newly_analyzed,
            removed_count,
            errors.len()
        );

        Ok(BatchOutcome {
            candidates: unique,
            removed_duplicates: removed_count,
            newly_analyzed,
            errors,
            status,
        })
    }

    /// Fan-out/fan-in over the scorer: concurrent, bounded, settle-all.
    /// Completion order is irrelevant; results carry their resume.
    async fn score_all(
        &self,
        job: &JobDescription,
        resumes: Vec<ResumeRecord>,
    ) -> (Vec<(ResumeRecord, MatchAnalysis)>, Vec<BatchRecordError>) {
        let semaphore = Arc::new(Semaphore::new(self.scorer_concurrency));
        let mut tasks = JoinSet::new();

        for resume in resumes {
            let scorer = Arc::clone(&self.scorer);
            let semaphore = Arc::clone(&semaphore);
            let job = job.clone();
            tasks.spawn(async move {
                // The semaphore lives for the whole fan-out; acquire cannot
                // observe it closed.
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let result = scorer.score(&job, &resume).await;
                (resume, result)
            });
        }

        let mut scored = Vec::new();
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((resume, Ok(analysis))) => scored.push((resume, analysis)),
                Ok((resume, Err(e))) => {
                    warn!("Scorer failed for {}: {e}", resume.filename);
                    errors.push(BatchRecordError {
                        filename: resume.filename,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Scorer task aborted: {e}");
                    errors.push(BatchRecordError {
                        filename: "unknown".to_string(),
                        error: format!("scorer task aborted: {e}"),
                    });
                }
            }
        }

        (scored, errors)
    }
}

/// Sorts by match percentage descending. Deterministic for a given survivor
/// set; completion order of scorer calls never shows through.
pub fn sort_by_percentage(records: &mut [CandidateRecord]) {
    records.sort_by(|a, b| {
        b.match_percentage()
            .partial_cmp(&a.match_percentage())
            .unwrap_or(Ordering::Equal)
    });
}

fn build_candidate(
    job: &JobDescription,
    resume: &ResumeRecord,
    analysis: MatchAnalysis,
    prior: Option<&CandidateRecord>,
    actor: &Actor,
    now: DateTime<Utc>,
) -> CandidateRecord {
    // Reattach prior tracking verbatim; a candidate's pipeline history must
    // survive re-analysis.
    let tracking = prior
        .and_then(|p| p.tracking.clone())
        .unwrap_or_else(|| Tracking::initial(&actor.email, now));

    CandidateRecord {
        job_id: job.id,
        filename: resume.filename.clone(),
        name: resume.display_name(),
        email: resume.contact_email(),
        match_analysis: analysis,
        analysis: CandidateAnalysis {
            key_skills: resume.skills.clone(),
            education_details: resume.education_details.clone(),
            work_experience_details: resume.work_experience_details.clone(),
        },
        tracking: Some(tracking),
        owner_id: resume.owner_id,
        owner_email: resume.owner_email.clone(),
        created_at: prior.map(|p| p.created_at).unwrap_or(now),
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Mutex;

    use anyhow::anyhow;
    use async_trait::async_trait;

    use crate::models::candidate::CandidateStatus;

    // ── fakes ──────────────────────────────────────────────────────────

    struct FakeJobs {
        job: Option<JobDescription>,
    }

    #[async_trait]
    impl JobStore for FakeJobs {
        async fn get_by_id(&self, job_id: Uuid) -> Result<Option<JobDescription>, AppError> {
            Ok(self.job.clone().filter(|j| j.id == job_id))
        }

        async fn delete(&self, _job_id: Uuid) -> Result<bool, AppError> {
            Ok(false)
        }
    }

    struct FakeCandidates {
        rows: Mutex<Vec<CandidateRecord>>,
        fail_upserts: bool,
    }

    impl FakeCandidates {
        fn seeded(rows: Vec<CandidateRecord>) -> Self {
            Self {
                rows: Mutex::new(rows),
                fail_upserts: false,
            }
        }

        fn stored_filenames(&self) -> Vec<String> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.filename.clone())
                .collect()
        }
    }

    #[async_trait]
    impl CandidateStore for FakeCandidates {
        async fn get_candidates(&self, job_id: Uuid) -> Result<Vec<CandidateRecord>, AppError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.job_id == job_id)
                .cloned()
                .collect())
        }

        async fn get(
            &self,
            job_id: Uuid,
            filename: &str,
        ) -> Result<Option<CandidateRecord>, AppError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.job_id == job_id && r.filename == filename)
                .cloned())
        }

        async fn upsert(&self, record: &CandidateRecord) -> Result<(), AppError> {
            if self.fail_upserts {
                return Err(AppError::Internal(anyhow!("store unavailable")));
            }
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|r| r.job_id == record.job_id && r.filename == record.filename)
            {
                Some(slot) => *slot = record.clone(),
                None => rows.push(record.clone()),
            }
            Ok(())
        }

        async fn delete_all_for_job(&self, job_id: Uuid) -> Result<u64, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.job_id != job_id);
            Ok((before - rows.len()) as u64)
        }
    }

    struct FakePool {
        resumes: Vec<ResumeRecord>,
    }

    #[async_trait]
    impl ResumePool for FakePool {
        async fn get_all(&self) -> Result<Vec<ResumeRecord>, AppError> {
            Ok(self.resumes.clone())
        }

        async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<ResumeRecord>, AppError> {
            Ok(self
                .resumes
                .iter()
                .filter(|r| r.owner_id == owner_id)
                .cloned()
                .collect())
        }
    }

    /// Counts calls; per-filename score overrides and injected failures.
    struct FakeScorer {
        calls: AtomicUsize,
        scores: HashMap<String, f64>,
        failing: HashSet<String>,
    }

    impl FakeScorer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                scores: HashMap::new(),
                failing: HashSet::new(),
            }
        }

        fn with_score(mut self, filename: &str, pct: f64) -> Self {
            self.scores.insert(filename.to_string(), pct);
            self
        }

        fn with_failure(mut self, filename: &str) -> Self {
            self.failing.insert(filename.to_string());
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(AtomicOrdering::SeqCst)
        }
    }

    #[async_trait]
    impl MatchScorer for FakeScorer {
        async fn score(
            &self,
            _job: &JobDescription,
            resume: &ResumeRecord,
        ) -> Result<MatchAnalysis, AppError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            if self.failing.contains(&resume.filename) {
                return Err(AppError::Scorer(format!("scoring {} failed", resume.filename)));
            }
            let pct = self.scores.get(&resume.filename).copied().unwrap_or(80.0);
            Ok(MatchAnalysis {
                match_percentage: pct,
                matching_skills: resume.skills.clone(),
                missing_requirements: vec![],
                experience_match: true,
                education_match: true,
                overall_assessment: "fits".to_string(),
            })
        }
    }

    // ── fixtures ───────────────────────────────────────────────────────

    fn job() -> JobDescription {
        let now = Utc::now();
        JobDescription {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            description: "Rust services".to_string(),
            requirements: vec!["Rust".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    fn actor() -> Actor {
        Actor::new(Uuid::new_v4(), "recruiter@example.com", "recruiter")
    }

    fn resume(filename: &str) -> ResumeRecord {
        ResumeRecord {
            filename: filename.to_string(),
            owner_id: Uuid::new_v4(),
            owner_email: "owner@example.com".to_string(),
            name: Some("Jane Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            skills: vec!["Rust".to_string()],
            education_details: vec![],
            work_experience_details: vec![],
        }
    }

    fn persisted_candidate(job: &JobDescription, filename: &str, pct: f64) -> CandidateRecord {
        let now = Utc::now();
        CandidateRecord {
            job_id: job.id,
            filename: filename.to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            match_analysis: MatchAnalysis {
                match_percentage: pct,
                matching_skills: vec![],
                missing_requirements: vec![],
                experience_match: true,
                education_match: true,
                overall_assessment: String::new(),
            },
            analysis: CandidateAnalysis::default(),
            tracking: Some(Tracking::initial("recruiter@example.com", now)),
            owner_id: Uuid::new_v4(),
            owner_email: "owner@example.com".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn pipeline(
        job: Option<JobDescription>,
        candidates: Arc<FakeCandidates>,
        resumes: Vec<ResumeRecord>,
        scorer: Arc<FakeScorer>,
    ) -> MatchPipeline {
        MatchPipeline::new(
            Arc::new(FakeJobs { job }),
            candidates,
            Arc::new(FakePool { resumes }),
            scorer,
            2,
        )
    }

    // ── tests ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_fast_path_scores_nothing_and_writes_nothing() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![
            persisted_candidate(&job, "a.pdf", 88.0),
            persisted_candidate(&job, "b.pdf", 64.0),
        ]));
        let scorer = Arc::new(FakeScorer::new());
        let p = pipeline(
            Some(job.clone()),
            store.clone(),
            vec![resume("a.pdf"), resume("b.pdf")],
            scorer.clone(),
        );

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        assert_eq!(scorer.call_count(), 0);
        assert_eq!(outcome.newly_analyzed, 0);
        assert_eq!(outcome.status, BatchStatus::Completed);
        assert_eq!(outcome.candidates.len(), 2);
        // sorted by percentage descending
        assert_eq!(outcome.candidates[0].filename, "a.pdf");
        assert_eq!(outcome.candidates[1].filename, "b.pdf");
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent_fast_path() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![]));
        let scorer = Arc::new(FakeScorer::new().with_score("a.pdf", 72.0));
        let p = pipeline(
            Some(job.clone()),
            store.clone(),
            vec![resume("a.pdf")],
            scorer.clone(),
        );

        let first = p.run_batch_match(job.id, &actor(), false).await.unwrap();
        assert_eq!(first.newly_analyzed, 1);
        assert_eq!(scorer.call_count(), 1);

        let second = p.run_batch_match(job.id, &actor(), false).await.unwrap();
        assert_eq!(second.newly_analyzed, 0);
        assert_eq!(scorer.call_count(), 1, "second run must not re-score");
        assert_eq!(second.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_new_resume_gets_scored_and_fresh_pending_tracking() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![
            persisted_candidate(&job, "a.pdf", 88.0),
            persisted_candidate(&job, "b.pdf", 64.0),
        ]));
        let scorer = Arc::new(FakeScorer::new().with_score("c.pdf", 72.0));
        let p = pipeline(
            Some(job.clone()),
            store.clone(),
            vec![resume("a.pdf"), resume("b.pdf"), resume("c.pdf")],
            scorer.clone(),
        );

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        assert_eq!(scorer.call_count(), 1);
        assert_eq!(outcome.newly_analyzed, 1);
        assert_eq!(outcome.candidates.len(), 3);

        let c = outcome
            .candidates
            .iter()
            .find(|r| r.filename == "c.pdf")
            .unwrap();
        let tracking = c.tracking.as_ref().unwrap();
        assert_eq!(tracking.status, CandidateStatus::Pending);
        assert_eq!(tracking.status_history.len(), 1);
        assert!(store.stored_filenames().contains(&"c.pdf".to_string()));
    }

    #[tokio::test]
    async fn test_below_threshold_dropped_and_not_persisted() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![]));
        let scorer = Arc::new(FakeScorer::new().with_score("d.pdf", 45.0));
        let p = pipeline(
            Some(job.clone()),
            store.clone(),
            vec![resume("d.pdf")],
            scorer.clone(),
        );

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        assert_eq!(outcome.newly_analyzed, 1);
        assert!(outcome.candidates.is_empty());
        assert!(outcome.errors.is_empty());
        assert!(store.stored_filenames().is_empty());
    }

    #[tokio::test]
    async fn test_exactly_threshold_is_dropped() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![]));
        let scorer = Arc::new(FakeScorer::new().with_score("e.pdf", 50.0));
        let p = pipeline(Some(job.clone()), store.clone(), vec![resume("e.pdf")], scorer);

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();
        assert!(outcome.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_missing_job_aborts_before_scoring() {
        let store = Arc::new(FakeCandidates::seeded(vec![]));
        let scorer = Arc::new(FakeScorer::new());
        let p = pipeline(None, store, vec![resume("a.pdf")], scorer.clone());

        let err = p
            .run_batch_match(Uuid::new_v4(), &actor(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(scorer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_pool_signals_no_resumes() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![]));
        let scorer = Arc::new(FakeScorer::new());
        let p = pipeline(Some(job.clone()), store, vec![], scorer);

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        assert_eq!(outcome.status, BatchStatus::NoResumes);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.newly_analyzed, 0);
    }

    #[tokio::test]
    async fn test_one_scorer_failure_does_not_abort_batch() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![]));
        let scorer = Arc::new(
            FakeScorer::new()
                .with_score("good.pdf", 75.0)
                .with_failure("bad.pdf"),
        );
        let p = pipeline(
            Some(job.clone()),
            store.clone(),
            vec![resume("good.pdf"), resume("bad.pdf")],
            scorer.clone(),
        );

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        assert_eq!(outcome.status, BatchStatus::Completed);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].filename, "good.pdf");
        assert_eq!(outcome.newly_analyzed, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].filename, "bad.pdf");
    }

    #[tokio::test]
    async fn test_save_failure_still_returns_computed_results() {
        let job = job();
        let store = Arc::new(FakeCandidates {
            rows: Mutex::new(vec![]),
            fail_upserts: true,
        });
        let scorer = Arc::new(FakeScorer::new().with_score("a.pdf", 82.0));
        let p = pipeline(Some(job.clone()), store, vec![resume("a.pdf")], scorer);

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        assert_eq!(outcome.status, BatchStatus::SaveFailed);
        assert_eq!(outcome.candidates.len(), 1);
        assert!(outcome.errors[0].error.contains("not saved"));
    }

    #[tokio::test]
    async fn test_force_reanalysis_reattaches_tracking_verbatim() {
        let job = job();
        let mut existing = persisted_candidate(&job, "a.pdf", 60.0);
        {
            let tracking = existing.tracking.as_mut().unwrap();
            tracking.status = CandidateStatus::Shortlisted;
            tracking.status_history.push(crate::models::candidate::StatusHistoryEntry {
                status: CandidateStatus::Shortlisted,
                timestamp: Utc::now(),
                updated_by: "recruiter@example.com".to_string(),
                additional_data: None,
            });
        }
        let history_len = existing.tracking.as_ref().unwrap().status_history.len();

        let store = Arc::new(FakeCandidates::seeded(vec![existing]));
        let scorer = Arc::new(FakeScorer::new().with_score("a.pdf", 91.0));
        let p = pipeline(
            Some(job.clone()),
            store.clone(),
            vec![resume("a.pdf")],
            scorer.clone(),
        );

        let outcome = p.run_batch_match(job.id, &actor(), true).await.unwrap();

        assert_eq!(scorer.call_count(), 1);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.removed_duplicates, 1);

        let survivor = &outcome.candidates[0];
        assert!((survivor.match_analysis.match_percentage - 91.0).abs() < f64::EPSILON);
        let tracking = survivor.tracking.as_ref().unwrap();
        assert_eq!(tracking.status, CandidateStatus::Shortlisted);
        assert_eq!(tracking.status_history.len(), history_len);
    }

    #[tokio::test]
    async fn test_duplicate_existing_records_collapse() {
        let job = job();
        let mut untracked = persisted_candidate(&job, "a.pdf", 70.0);
        untracked.tracking = None;
        let shortlisted = {
            let mut r = persisted_candidate(&job, "a.pdf", 70.0);
            r.tracking.as_mut().unwrap().status = CandidateStatus::Shortlisted;
            r
        };

        let store = Arc::new(FakeCandidates::seeded(vec![untracked, shortlisted]));
        let scorer = Arc::new(FakeScorer::new());
        let p = pipeline(
            Some(job.clone()),
            store,
            vec![resume("a.pdf")],
            scorer.clone(),
        );

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        assert_eq!(scorer.call_count(), 0);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.removed_duplicates, 1);
        assert_eq!(
            outcome.candidates[0].tracking.as_ref().unwrap().status,
            CandidateStatus::Shortlisted
        );
    }

    #[tokio::test]
    async fn test_output_sorted_by_percentage_descending() {
        let job = job();
        let store = Arc::new(FakeCandidates::seeded(vec![]));
        let scorer = Arc::new(
            FakeScorer::new()
                .with_score("low.pdf", 55.0)
                .with_score("high.pdf", 95.0)
                .with_score("mid.pdf", 75.0),
        );
        let p = pipeline(
            Some(job.clone()),
            store,
            vec![resume("low.pdf"), resume("high.pdf"), resume("mid.pdf")],
            scorer,
        );

        let outcome = p.run_batch_match(job.id, &actor(), false).await.unwrap();

        let order: Vec<&str> = outcome
            .candidates
            .iter()
            .map(|c| c.filename.as_str())
            .collect();
        assert_eq!(order, vec!["high.pdf", "mid.pdf", "low.pdf"]);
    }
}
