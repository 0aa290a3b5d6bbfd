use std::sync::Arc;
use async_trait::async_trait;
use log::{info, warn};
use tokio::process::Command;

use super::{Result, SpeechError, SpeechRecognizer};

/// Optional voice capture for answers.
#[derive(Clone, Default)]
pub struct VoiceInput {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
}

impl VoiceInput {
    pub fn new(recognizer: Option<Arc<dyn SpeechRecognizer>>) -> Self {
        Self { recognizer }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Listen for one utterance. Engine failures are logged and treated as
    /// silence; callers check [`VoiceInput::is_available`] to tell the user
    /// voice input is unsupported.
    pub async fn capture(&self) -> Option<String> {
        let recognizer = self.recognizer.as_ref()?;

        match recognizer.recognize().await {
            Ok(Some(text)) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    info!("🎙️ Voice captured ({} chars)", text.len());
                    Some(text)
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Voice error: {}", e);
                None
            }
        }
    }
}

/// Recognizer backed by an external command that records one utterance and
/// prints its transcript on stdout.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// Build from a whitespace-separated command line. Blank input yields `None`.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn recognize(&self) -> Result<Option<String>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| SpeechError::Runtime(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Runtime(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(String::from))
    }
}
