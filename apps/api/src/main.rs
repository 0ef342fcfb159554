mod config;
mod errors;
mod extraction;
mod ingest;
mod llm_client;
mod proposal;
mod render;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::transcriber::UnconfiguredTranscriber;
use crate::llm_client::LlmClient;
use crate::render::PptxTemplateRenderer;
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting Autodoc API v{}", env!("CARGO_PKG_VERSION"));

    // Working directories for uploads and generated artifacts
    storage::ensure_directories(&config).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.groq_api_key.clone(), config.groq_model.clone());
    info!("LLM client initialized (model: {})", llm.model());

    // Build app state. Transcription ships unconfigured; deployments that
    // need audio/video swap in a real backend here.
    let state = AppState {
        llm,
        config: config.clone(),
        transcriber: Arc::new(UnconfiguredTranscriber),
        renderer: Arc::new(PptxTemplateRenderer),
        last_deck: Arc::new(RwLock::new(None)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
