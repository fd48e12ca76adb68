mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
mod store;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::matching::pipeline::MatchPipeline;
use crate::matching::scorer::{LlmMatchScorer, MatchScorer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{
    CandidateStore, JobStore, PgCandidateStore, PgJobStore, PgResumePool, ResumePool,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hireflow API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;
    info!("Database migrations applied");

    // Initialize LLM client and the match scorer on top of it
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Store accessors: explicitly constructed, injected everywhere
    let jobs: Arc<dyn JobStore> = Arc::new(PgJobStore::new(pool.clone()));
    let candidates: Arc<dyn CandidateStore> = Arc::new(PgCandidateStore::new(pool.clone()));
    let resumes: Arc<dyn ResumePool> = Arc::new(PgResumePool::new(pool.clone()));
    let scorer: Arc<dyn MatchScorer> = Arc::new(LlmMatchScorer::new(llm));

    let pipeline = Arc::new(MatchPipeline::new(
        Arc::clone(&jobs),
        Arc::clone(&candidates),
        Arc::clone(&resumes),
        scorer,
        config.scorer_concurrency,
    ));
    info!(
        "Match pipeline ready (scorer concurrency: {})",
        config.scorer_concurrency
    );

    let state = AppState {
        jobs,
        candidates,
        resumes,
        pipeline,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
