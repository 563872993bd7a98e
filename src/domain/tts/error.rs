use std::path::PathBuf;

use crate::error::AppError;
use crate::infrastructure::repositories::TtsBackendError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("backend protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("chunk rejected by backend and cannot be split further: {0:?}")]
    UnsplittableChunk(String),
    #[error("downloaded segment missing: {}", .0.display())]
    MissingSegment(PathBuf),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TtsBackendError> for TtsServiceError {
    fn from(err: TtsBackendError) -> Self {
        match err {
            TtsBackendError::Transport(e) => TtsServiceError::Transport(e.to_string()),
            TtsBackendError::Protocol(msg) => TtsServiceError::ProtocolViolation(msg),
        }
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::UnsplittableChunk(msg) => AppError::Unprocessable(msg),
            TtsServiceError::ProtocolViolation(msg) | TtsServiceError::Transport(msg) => {
                AppError::ExternalService(msg)
            }
            TtsServiceError::MissingSegment(path) => {
                AppError::Internal(format!("segment file missing: {}", path.display()))
            }
            TtsServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
