//! Axum route handlers for the Proposal API.
//!
//! Flow: upload or raw text → ingest to text → extract_entities →
//!       refine_extraction → operator review (client side) → assemble →
//!       persist JSON → render deck → deck download.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::entities::extract_entities;
use crate::extraction::refine::refine_extraction;
use crate::ingest::doc_extractor::{
    extract_text_from_docx, extract_text_from_pdf, extract_text_from_plain,
};
use crate::ingest::transcriber::MediaTranscriber;
use crate::ingest::{detect_kind, FileKind, IngestError};
use crate::proposal::assembler::assemble;
use crate::proposal::record::{FinalProposalRecord, PartialRecord};
use crate::state::{AppState, GeneratedDeck};
use crate::storage;

const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractTextRequest {
    pub text: String,
}

/// The refinement side of an extraction response. `fallback` tells the
/// review UI whether `fields` carries the full schema or only the looser
/// deterministic extraction.
#[derive(Debug, Serialize)]
pub struct RefinedView {
    pub fallback: bool,
    pub fields: Value,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub extracted_text: String,
    pub initial: PartialRecord,
    pub refined: RefinedView,
}

/// One submission from the review form. `prefill` is whatever field map the
/// extract step returned (refined or fallback); manual entry sends none.
/// Edited fields always win over pre-fill values.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub prefill: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub proposal_id: Uuid,
    pub record_path: String,
    pub deck_path: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/proposals/extract
///
/// Runs the two-stage pipeline over raw text (the manual-entry flow).
pub async fn handle_extract_text(
    State(state): State<AppState>,
    Json(request): Json<ExtractTextRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    Ok(Json(run_extraction(request.text, &state).await))
}

/// POST /api/v1/proposals/extract/upload
///
/// Accepts one multipart `file` part (audio, video, PDF, DOCX, or text),
/// ingests it to raw text, then runs the same pipeline as the text flow.
pub async fn handle_extract_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let mut saved = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(|n| n.to_string())
            .ok_or_else(|| AppError::Validation("file part is missing a filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        let path = storage::save_upload(&state.config.upload_dir, &file_name, &bytes)
            .await
            .map_err(AppError::Internal)?;
        saved = Some(path);
    }

    let path = saved
        .ok_or_else(|| AppError::Validation("multipart body has no 'file' part".to_string()))?;
    info!("Upload saved to {}", path.display());

    let text = ingest_to_text(&path, state.transcriber.as_ref()).await?;
    if text.trim().is_empty() {
        return Err(AppError::Ingest(
            "no text could be extracted from the uploaded file".to_string(),
        ));
    }

    Ok(Json(run_extraction(text, &state).await))
}

/// POST /api/v1/proposals
///
/// Assembles the final record from pre-fill + operator edits, persists it as
/// JSON, and renders the deck from the template. A render failure is blocking
/// for this submission; the persisted JSON remains.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let prefill = request.prefill.unwrap_or_default();
    let record = assemble(&prefill, &request.fields);
    finalize_submission(&state, record).await.map(Json)
}

/// GET /api/v1/proposals/latest/deck
///
/// Downloads the deck generated by the most recent submission.
pub async fn handle_latest_deck(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let deck = state
        .last_deck
        .read()
        .await
        .clone()
        .ok_or_else(|| AppError::NotFound("no deck has been generated yet".to_string()))?;

    let bytes = read_deck(&deck.path).await?;
    let disposition = format!(
        "attachment; filename=\"propuesta_{}.pptx\"",
        deck.proposal_id
    );

    Ok((
        [
            (header::CONTENT_TYPE, PPTX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Two-stage extraction over raw text. Stage failures never surface as
/// errors here: refinement degrades to the initial extraction on its own.
async fn run_extraction(text: String, state: &AppState) -> ExtractResponse {
    let initial = extract_entities(&text);
    if initial.is_empty() {
        info!("Initial extraction found no fields; refinement works from raw text alone");
    }
    let outcome = refine_extraction(&text, initial.clone(), &state.llm).await;

    ExtractResponse {
        refined: RefinedView {
            fallback: outcome.is_fallback(),
            fields: Value::Object(outcome.field_map()),
        },
        initial,
        extracted_text: text,
    }
}

/// Reads a recorded deck, answering 404 when the file is gone from disk.
async fn read_deck(path: &Path) -> Result<Vec<u8>, AppError> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound("the generated deck is no longer on disk".to_string())
        } else {
            AppError::Io(e)
        }
    })
}

/// Dispatches an uploaded artifact to the right text source by file kind.
async fn ingest_to_text(
    path: &Path,
    transcriber: &dyn MediaTranscriber,
) -> Result<String, AppError> {
    let result = match detect_kind(path) {
        FileKind::Audio => transcriber.transcribe(path).await,
        FileKind::Video => transcriber.process_video(path).await,
        FileKind::Pdf => run_blocking(path, extract_text_from_pdf).await?,
        FileKind::Docx => run_blocking(path, extract_text_from_docx).await?,
        FileKind::Text => run_blocking(path, extract_text_from_plain).await?,
        FileKind::Unsupported => {
            return Err(AppError::Validation(format!(
                "unsupported file type: {}",
                path.display()
            )))
        }
    };

    result.map_err(|e| match e {
        IngestError::BackendUnavailable(capability) => {
            AppError::UnsupportedMedia(format!("no {capability} backend is configured"))
        }
        other => AppError::Ingest(other.to_string()),
    })
}

/// Runs a blocking document extractor off the async runtime.
async fn run_blocking(
    path: &Path,
    extract: fn(&Path) -> Result<String, IngestError>,
) -> Result<Result<String, IngestError>, AppError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || extract(&path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task panicked: {e}")))
}

/// Persists the record and renders the deck. The session's deck slot is
/// cleared up front so a failed render never leaves a stale download.
async fn finalize_submission(
    state: &AppState,
    record: FinalProposalRecord,
) -> Result<SubmitResponse, AppError> {
    *state.last_deck.write().await = None;

    let proposal_id = Uuid::new_v4();
    let record_path =
        storage::save_proposal_json(&state.config.processed_dir, proposal_id, &record)
            .await
            .map_err(AppError::Internal)?;
    info!("Proposal {proposal_id} persisted to {}", record_path.display());

    let deck_path = storage::deck_path(&state.config.processed_dir, proposal_id);
    let renderer = state.renderer.clone();
    let template = std::path::PathBuf::from(&state.config.template_path);
    let output = deck_path.clone();
    tokio::task::spawn_blocking(move || renderer.render(&record, &template, &output))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task panicked: {e}")))??;

    info!("Deck rendered to {}", deck_path.display());
    *state.last_deck.write().await = Some(GeneratedDeck {
        proposal_id,
        path: deck_path.clone(),
        generated_at: chrono::Utc::now(),
    });

    Ok(SubmitResponse {
        proposal_id,
        record_path: record_path.display().to_string(),
        deck_path: deck_path.display().to_string(),
    })
}
