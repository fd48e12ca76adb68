use std::sync::Arc;

use crate::matching::pipeline::MatchPipeline;
use crate::store::{CandidateStore, JobStore, ResumePool};

/// Shared application state injected into all route handlers via Axum
/// extractors. Every collaborator is a trait object so tests (and future
/// backends) swap implementations without touching handlers.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobStore>,
    pub candidates: Arc<dyn CandidateStore>,
    pub resumes: Arc<dyn ResumePool>,
    pub pipeline: Arc<MatchPipeline>,
}
