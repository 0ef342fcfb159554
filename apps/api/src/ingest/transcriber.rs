//! Media transcription boundary. Speech-to-text itself lives outside this
//! service; deployments wire in a backend, tests wire in a fake.

use async_trait::async_trait;
use std::path::Path;

use crate::ingest::IngestError;

/// External transcription capability: audio transcription and video
/// processing (audio transcript plus slide text).
#[async_trait]
pub trait MediaTranscriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, IngestError>;

    async fn process_video(&self, video_path: &Path) -> Result<String, IngestError>;
}

/// Default backend when no transcription service is configured. Audio and
/// video uploads fail with a clear capability error; document and text
/// flows are unaffected.
pub struct UnconfiguredTranscriber;

#[async_trait]
impl MediaTranscriber for UnconfiguredTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String, IngestError> {
        Err(IngestError::BackendUnavailable("transcription"))
    }

    async fn process_video(&self, _video_path: &Path) -> Result<String, IngestError> {
        Err(IngestError::BackendUnavailable("video processing"))
    }
}
