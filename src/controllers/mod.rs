pub mod health;
pub mod tts;

pub use tts::TtsController;
