use std::process::{Child, Command, Stdio};
use log::debug;
use parking_lot::Mutex;

use super::{Result, SpeechError, SpeechSynthesizer, Utterance};

/// eSpeak's default speed in words per minute, used as rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
/// eSpeak's default pitch on its 0-99 scale, used as pitch 1.0.
const BASE_PITCH: f32 = 50.0;

/// Synthesizer that shells out to an eSpeak-compatible TTS command.
///
/// Each utterance runs as its own child process; cancelling kills the child.
#[derive(Debug)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    /// Build from a whitespace-separated command line. Blank input yields `None`.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            current: Mutex::new(None),
        })
    }

    fn voice_args(utterance: &Utterance) -> [String; 4] {
        let speed = (BASE_WORDS_PER_MINUTE * utterance.rate).round().max(1.0) as u32;
        let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0) as u32;
        ["-s".to_string(), speed.to_string(), "-p".to_string(), pitch.to_string()]
    }

    /// Full invocation for one utterance. The text follows `--` so a leading
    /// hyphen is never read as an option.
    fn command(&self, utterance: &Utterance) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(Self::voice_args(utterance))
            .arg("--")
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, utterance: &Utterance) -> Result<()> {
        let child = self.command(utterance).spawn().map_err(|e| {
            SpeechError::Runtime(format!("failed to start {}: {}", self.program, e))
        })?;

        debug!(
            "🔊 Speaking {} chars via {} (pid {})",
            utterance.text.len(),
            self.program,
            child.id()
        );

        let previous = self.current.lock().replace(child);
        if let Some(mut previous) = previous {
            // Already finished or cancelled; reap it
            let _ = previous.try_wait();
        }
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        let Some(mut child) = self.current.lock().take() else {
            return Ok(());
        };

        match child.try_wait() {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                child.kill().map_err(|e| {
                    SpeechError::Runtime(format!("failed to stop {}: {}", self.program, e))
                })?;
                let _ = child.wait();
                Ok(())
            }
            Err(e) => Err(SpeechError::Runtime(e.to_string())),
        }
    }
}

impl Drop for CommandSynthesizer {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}
