//! Filesystem persistence: uploaded artifacts and per-submission proposal
//! records. One JSON document and one deck file per submission, nothing else.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::proposal::record::FinalProposalRecord;

/// Creates the working directories at startup.
pub async fn ensure_directories(config: &Config) -> Result<()> {
    for dir in [&config.upload_dir, &config.processed_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory '{dir}'"))?;
    }
    info!(
        "Working directories ready: uploads={}, processed={}",
        config.upload_dir, config.processed_dir
    );
    Ok(())
}

/// Saves an uploaded artifact under the upload directory, stripping any path
/// components from the client-supplied file name.
pub async fn save_upload(upload_dir: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let safe_name = sanitize_file_name(file_name);
    let path = Path::new(upload_dir).join(safe_name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to save upload '{}'", path.display()))?;
    Ok(path)
}

/// Persists the final proposal record as a pretty-printed JSON document.
pub async fn save_proposal_json(
    processed_dir: &str,
    proposal_id: Uuid,
    record: &FinalProposalRecord,
) -> Result<PathBuf> {
    let path = Path::new(processed_dir).join(format!("propuesta_{proposal_id}.json"));
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to persist proposal '{}'", path.display()))?;
    Ok(path)
}

/// Output path for a submission's rendered deck.
pub fn deck_path(processed_dir: &str, proposal_id: Uuid) -> PathBuf {
    Path::new(processed_dir).join(format!("propuesta_{proposal_id}.pptx"))
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    base.to_string()
}
