use super::assembler::AudioAssembler;
use super::error::TtsServiceError;
use super::segmenter::segment;
use super::{BackendResponse, RemoteAudioRef};
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::path::PathBuf;
use std::sync::Arc;

pub struct SpliceService {
    tts_repo: Arc<dyn TtsRepository>,
    assembler: AudioAssembler,
    output_path: PathBuf,
    max_split_depth: u32,
}

impl SpliceService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        assembler: AudioAssembler,
        output_path: PathBuf,
        max_split_depth: u32,
    ) -> Self {
        Self {
            tts_repo,
            assembler,
            output_path,
            max_split_depth,
        }
    }
}

#[async_trait]
pub trait SpliceServiceApi: Send + Sync {
    /// Turn a block of text into one assembled WAV file.
    ///
    /// This operation:
    /// - Recursively submits text chunks to the TTS backend, splitting on
    ///   rejection until every chunk is accepted
    /// - Downloads the per-chunk audio and concatenates it in reading order
    /// - Publishes the result at the configured output path
    ///
    /// Returns the path of the assembled output file.
    async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf, TtsServiceError>;
}

#[async_trait]
impl SpliceServiceApi for SpliceService {
    async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf, TtsServiceError> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            language = language,
            text_length = text.len(),
            "TTS splice request"
        );

        // 1. Validate: an empty chunk must never reach the backend
        if text.trim().is_empty() {
            return Err(TtsServiceError::Invalid("Text cannot be empty".to_string()));
        }

        // 2. Drive the adaptive chunking recursion
        let refs = self.submit(text, language, 0).await?;

        tracing::info!(
            chunk_count = refs.len(),
            "All chunks accepted by backend"
        );

        // 3. Download, concatenate and clean up
        self.assembler.assemble(&refs, &self.output_path).await?;

        let duration = start_time.elapsed();
        tracing::info!(
            latency_ms = duration.as_millis(),
            chunk_count = refs.len(),
            text_length = text.len(),
            output_path = %self.output_path.display(),
            "TTS splice completed"
        );

        Ok(self.output_path.clone())
    }
}

impl SpliceService {
    /// Submit one chunk, splitting recursively while the backend rejects it.
    ///
    /// Depth-first and left-to-right: sibling sub-chunks run concurrently,
    /// but results are merged by sub-chunk index, so the returned refs are
    /// always in the reading order of the original text. Rejection is never
    /// retried with the same text; the only recovery path is splitting.
    fn submit<'a>(
        &'a self,
        text: &'a str,
        language: &'a str,
        depth: u32,
    ) -> BoxFuture<'a, Result<Vec<RemoteAudioRef>, TtsServiceError>> {
        async move {
            match self.tts_repo.submit_chunk(text, language).await? {
                BackendResponse::Accepted { remote_ref } => Ok(vec![remote_ref]),
                BackendResponse::Rejected { reason } => {
                    tracing::info!(
                        depth = depth,
                        text_length = text.len(),
                        reason = %reason,
                        "Chunk rejected, splitting"
                    );

                    if depth >= self.max_split_depth {
                        return Err(TtsServiceError::UnsplittableChunk(format!(
                            "split depth {} exhausted for chunk of {} bytes",
                            self.max_split_depth,
                            text.len()
                        )));
                    }

                    let parts = segment(text);

                    // A lone part that equals the input cannot shrink, so a
                    // further rejection would recurse forever.
                    let unsplittable = parts.is_empty()
                        || (parts.len() == 1 && parts[0] == text.trim());
                    if unsplittable {
                        return Err(TtsServiceError::UnsplittableChunk(text.to_string()));
                    }

                    let children = parts
                        .iter()
                        .map(|part| self.submit(part, language, depth + 1));
                    let results = try_join_all(children).await?;

                    Ok(results.into_iter().flatten().collect())
                }
            }
        }
        .boxed()
    }
}
