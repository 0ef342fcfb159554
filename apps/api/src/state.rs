use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::ingest::transcriber::MediaTranscriber;
use crate::llm_client::LlmClient;
use crate::render::DeckRenderer;

/// The deck produced by the most recent submission, ready for retrieval.
/// Cleared at the start of each new submission and set again on success.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub proposal_id: Uuid,
    pub path: PathBuf,
    // Recorded for an eventual artifacts listing; not surfaced yet.
    #[allow(dead_code)]
    pub generated_at: DateTime<Utc>,
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Audio/video transcription backend. Default: unconfigured (media
    /// uploads report the capability as unavailable).
    pub transcriber: Arc<dyn MediaTranscriber>,
    pub renderer: Arc<dyn DeckRenderer>,
    /// Which deck, if any, is ready for download after the last submission.
    pub last_deck: Arc<RwLock<Option<GeneratedDeck>>>,
}
