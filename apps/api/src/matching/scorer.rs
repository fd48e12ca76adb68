//! Match Scorer — compares one resume's structured data against one job and
//! returns a `MatchAnalysis`. The pipeline treats implementations as a black
//! box with no determinism guarantee across calls.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::prompts::{build_scoring_prompt, scoring_system};
use crate::models::candidate::MatchAnalysis;
use crate::models::job::JobDescription;
use crate::models::resume::ResumeRecord;

/// Carried in `MatchPipeline` as `Arc<dyn MatchScorer>`; tests substitute
/// counting/failing fakes without touching the pipeline.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(
        &self,
        job: &JobDescription,
        resume: &ResumeRecord,
    ) -> Result<MatchAnalysis, AppError>;
}

/// Default scorer, backed by the Claude Messages API.
pub struct LlmMatchScorer {
    llm: LlmClient,
}

impl LlmMatchScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(
        &self,
        job: &JobDescription,
        resume: &ResumeRecord,
    ) -> Result<MatchAnalysis, AppError> {
        let prompt = build_scoring_prompt(job, resume);
        let system = scoring_system();

        let mut analysis: MatchAnalysis = self
            .llm
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Scorer(format!("scoring {} failed: {e}", resume.filename)))?;

        // Models occasionally return 100.0001 or -1; keep the contract.
        if analysis.match_percentage.is_nan() {
            return Err(AppError::Scorer(format!(
                "scoring {} returned a non-numeric percentage",
                resume.filename
            )));
        }
        analysis.match_percentage = analysis.match_percentage.clamp(0.0, 100.0);

        Ok(analysis)
    }
}
