//! Ingestion boundary — turns uploaded meeting artifacts into raw text.
//!
//! Document formats are extracted in-process; audio and video transcription
//! are external capabilities behind the `MediaTranscriber` trait.

pub mod doc_extractor;
pub mod transcriber;

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("No {0} backend is configured")]
    BackendUnavailable(&'static str),
}

/// Artifact kinds accepted by the upload flow, detected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Audio,
    Video,
    Pdf,
    Docx,
    Text,
    Unsupported,
}

/// Detect the artifact kind from a file extension.
pub fn detect_kind(path: &Path) -> FileKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "mp3" | "wav" => FileKind::Audio,
        "mp4" | "mov" | "avi" => FileKind::Video,
        "pdf" => FileKind::Pdf,
        "docx" => FileKind::Docx,
        "txt" | "md" => FileKind::Text,
        _ => FileKind::Unsupported,
    }
}
