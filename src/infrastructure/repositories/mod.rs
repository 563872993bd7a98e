pub mod gradio_tts_repository;
pub mod tts_repository;

pub use gradio_tts_repository::GradioTtsRepository;
pub use tts_repository::{TtsBackendError, TtsRepository};
