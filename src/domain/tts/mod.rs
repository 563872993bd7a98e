pub mod assembler;
pub mod error;
pub mod segmenter;
pub mod service;

pub use assembler::AudioAssembler;
pub use error::TtsServiceError;
pub use segmenter::segment;
pub use service::{SpliceService, SpliceServiceApi};

use serde::{Deserialize, Serialize};

/// Opaque backend-side identifier for one accepted chunk's rendered audio.
///
/// The ordered sequence of these is the only contract between the submitter
/// and the assembler; the order must equal the reading order of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAudioRef(pub String);

impl RemoteAudioRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteAudioRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classified TTS backend response for one submitted chunk.
///
/// The wire payload must carry either a `data` key (accepted, with the remote
/// file name) or an `error` key (rejected). Anything else is a protocol
/// violation and is never treated as implicit success; that classification
/// happens at the repository boundary, so this enum has exactly two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResponse {
    Accepted { remote_ref: RemoteAudioRef },
    Rejected { reason: String },
}
