use std::sync::Arc;
use log::{debug, warn};

use super::{SpeechSynthesizer, Utterance};
use crate::sanitize::sanitize;

pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;

/// Reads bot text aloud through an optional synthesizer.
///
/// Speech is an enhancement: when no synthesizer is configured every call is a
/// no-op, and engine failures are logged rather than returned.
#[derive(Clone)]
pub struct SpeechOutput {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    rate: f32,
    pitch: f32,
}

impl SpeechOutput {
    pub fn new(synthesizer: Option<Arc<dyn SpeechSynthesizer>>) -> Self {
        Self {
            synthesizer,
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn with_voice(mut self, rate: f32, pitch: f32) -> Self {
        self.rate = rate;
        self.pitch = pitch;
        self
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Sanitize `text`, cut off any utterance still playing, then speak it.
    ///
    /// Returns whether an utterance was handed to the synthesizer.
    pub fn speak(&self, text: &str) -> bool {
        let Some(synthesizer) = &self.synthesizer else {
            return false;
        };

        let cleaned = sanitize(text);

        if let Err(e) = synthesizer.cancel() {
            warn!("TTS cancel failed: {}", e);
        }

        if cleaned.is_empty() {
            debug!("Nothing left to speak after sanitizing");
            return false;
        }

        let utterance = Utterance {
            text: cleaned,
            rate: self.rate,
            pitch: self.pitch,
        };

        match synthesizer.speak(&utterance) {
            Ok(()) => true,
            Err(e) => {
                warn!("TTS failed: {}", e);
                false
            }
        }
    }

    pub fn cancel(&self) {
        if let Some(synthesizer) = &self.synthesizer {
            if let Err(e) = synthesizer.cancel() {
                warn!("TTS cancel failed: {}", e);
            }
        }
    }
}

impl Default for SpeechOutput {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SpeechError;
    use parking_lot::Mutex;

    #[derive(Debug, PartialEq)]
    enum Call {
        Cancel,
        Speak(Utterance),
    }

    #[derive(Default)]
    struct RecordingSynth {
        calls: Mutex<Vec<Call>>,
        fail_speak: bool,
    }

    impl SpeechSynthesizer for RecordingSynth {
        fn speak(&self, utterance: &Utterance) -> crate::speech::Result<()> {
            if self.fail_speak {
                return Err(SpeechError::Runtime("device busy".to_string()));
            }
            self.calls.lock().push(Call::Speak(utterance.clone()));
            Ok(())
        }

        fn cancel(&self) -> crate::speech::Result<()> {
            self.calls.lock().push(Call::Cancel);
            Ok(())
        }
    }

    #[test]
    fn test_speak_cancels_then_submits_sanitized_text() {
        let synth = Arc::new(RecordingSynth::default());
        let output = SpeechOutput::new(Some(synth.clone())).with_voice(1.2, 0.9);

        assert!(output.speak("\"Session started — 12:00:01 Tell me about yourself\""));

        let calls = synth.calls.lock();
        assert_eq!(
            *calls,
            vec![
                Call::Cancel,
                Call::Speak(Utterance {
                    text: "Tell me about yourself".to_string(),
                    rate: 1.2,
                    pitch: 0.9,
                }),
            ]
        );
    }

    #[test]
    fn test_newest_utterance_wins() {
        let synth = Arc::new(RecordingSynth::default());
        let output = SpeechOutput::new(Some(synth.clone()));

        output.speak("first");
        output.speak("second");

        let calls = synth.calls.lock();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[2], Call::Cancel);
        assert!(matches!(&calls[3], Call::Speak(u) if u.text == "second"));
    }

    #[test]
    fn test_absent_synthesizer_is_noop() {
        let output = SpeechOutput::disabled();
        assert!(!output.is_available());
        assert!(!output.speak("Hello"));
        output.cancel();
    }

    #[test]
    fn test_runtime_failure_is_swallowed() {
        let synth = Arc::new(RecordingSynth {
            fail_speak: true,
            ..Default::default()
        });
        let output = SpeechOutput::new(Some(synth.clone()));

        assert!(!output.speak("Hello"));
        assert_eq!(*synth.calls.lock(), vec![Call::Cancel]);
    }
}
