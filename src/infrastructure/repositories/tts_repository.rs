use crate::domain::tts::BackendResponse;
use async_trait::async_trait;

/// Errors at the TTS backend boundary.
#[derive(Debug, thiserror::Error)]
pub enum TtsBackendError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Repository for the remote TTS backend.
/// Abstracts the HTTP service that renders one chunk of text at a time.
///
/// Implementations are responsible for:
/// - Submitting a single chunk and classifying the response strictly as
///   accepted or rejected (anything else is a protocol violation)
/// - Retrieving the rendered audio bytes for an accepted chunk
///
/// They are NOT responsible for splitting: rejection handling belongs to the
/// splice service, which recursively subdivides the text.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Submit one chunk of text for synthesis.
    ///
    /// # Errors
    /// Returns `Transport` on network failure, `Protocol` when the response
    /// payload carries neither a success nor an error marker.
    async fn submit_chunk(
        &self,
        text: &str,
        language: &str,
    ) -> Result<BackendResponse, TtsBackendError>;

    /// Download the rendered WAV bytes for an accepted chunk.
    async fn fetch_audio(&self, remote_ref: &str) -> Result<Vec<u8>, TtsBackendError>;
}
