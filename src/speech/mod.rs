pub mod output;
pub mod input;
pub mod command;

pub use output::*;
pub use input::*;
pub use command::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Speech capability not available")]
    Unavailable,
    #[error("Speech engine failed: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, SpeechError>;

/// One request to the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

/// A voice-synthesis backend. Implementations accept one utterance at a time.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, utterance: &Utterance) -> Result<()>;

    /// Stop whatever is currently being spoken. A no-op when idle.
    fn cancel(&self) -> Result<()>;
}

/// A speech-recognition backend producing one best transcript per utterance.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Listen for a single utterance. `Ok(None)` means nothing was heard.
    async fn recognize(&self) -> Result<Option<String>>;
}
