pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::matching::handlers as match_handlers;
use crate::state::AppState;
use crate::tracking::handlers as tracking_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching
        .route(
            "/api/v1/jobs/:job_id/match",
            post(match_handlers::handle_run_match),
        )
        .route(
            "/api/v1/jobs/:job_id/candidates",
            get(match_handlers::handle_list_candidates),
        )
        .route(
            "/api/v1/jobs/:job_id",
            delete(match_handlers::handle_delete_job),
        )
        .route("/api/v1/resumes", get(match_handlers::handle_list_resumes))
        // Tracking
        .route(
            "/api/v1/jobs/:job_id/candidates/:filename/status",
            patch(tracking_handlers::handle_update_status),
        )
        .with_state(state)
}
