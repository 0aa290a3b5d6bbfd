pub mod api;
pub mod cli;
pub mod config;
pub mod interview;
pub mod sanitize;
pub mod session;
pub mod speech;

use std::sync::Arc;
use anyhow::Context;
use log::{info, warn};

use crate::api::HttpInterviewApi;
use crate::config::AppConfig;
use crate::session::SessionController;
use crate::speech::{
    CommandRecognizer, CommandSynthesizer, SpeechOutput, SpeechRecognizer, SpeechSynthesizer,
    VoiceInput,
};

/// Speech output as configured; absent or disabled means silent.
pub fn speech_output(config: &AppConfig) -> SpeechOutput {
    let synthesizer = config
        .speech_command()
        .and_then(CommandSynthesizer::from_command_line)
        .map(|s| Arc::new(s) as Arc<dyn SpeechSynthesizer>);

    if synthesizer.is_none() {
        info!("🔇 Speech output disabled");
    }
    SpeechOutput::new(synthesizer).with_voice(config.speech.rate, config.speech.pitch)
}

pub fn voice_input(config: &AppConfig) -> VoiceInput {
    let recognizer = config
        .voice
        .command
        .as_deref()
        .and_then(CommandRecognizer::from_command_line)
        .map(|r| Arc::new(r) as Arc<dyn SpeechRecognizer>);
    VoiceInput::new(recognizer)
}

pub fn build_controller(config: &AppConfig) -> anyhow::Result<SessionController> {
    let api = HttpInterviewApi::new(&config.api_base)
        .with_context(|| format!("Invalid interview service URL {}", config.api_base))?;
    Ok(SessionController::new(Arc::new(api), speech_output(config)))
}

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    info!("🚀 MockPrep using interview service at {}", config.api_base);

    let controller = build_controller(&config)?;
    let voice = voice_input(&config);
    if !voice.is_available() {
        warn!("Voice input not configured; answers must be typed");
    }

    let mut repl = cli::Repl::new(controller, voice, config.transcript_path.clone());
    repl.run().await
}
