use std::path::PathBuf;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

/// Compile-time default, overridable by `MOCKPREP_API_BASE` in `.env` at build time.
pub const DEFAULT_API_BASE: &str = match option_env!("MOCKPREP_API_BASE") {
    Some(base) => base,
    None => "http://127.0.0.1:8000",
};
pub const CONFIG_FILE: &str = "mockprep";
pub const ENV_PREFIX: &str = "MOCKPREP";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// TTS command line, e.g. `espeak -v en-us`. No command means no voice output.
    #[serde(default)]
    pub command: Option<String>,
    #[validate(range(min = 0.1, max = 10.0))]
    pub rate: f32,
    #[validate(range(min = 0.0, max = 2.0))]
    pub pitch: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceConfig {
    /// Speech-to-text command printing one transcript line on stdout.
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(url)]
    pub api_base: String,
    #[validate]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    pub transcript_path: PathBuf,
}

impl AppConfig {
    /// Load defaults, then `mockprep.toml` if present, then `MOCKPREP_*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Don't fail if .env doesn't exist

        let builder = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::build(Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("speech.enabled", true)?
            .set_default("speech.rate", 1.0)?
            .set_default("speech.pitch", 1.0)?
            .set_default("transcript_path", "transcript.txt")
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The TTS command to use, if speech output is both enabled and configured.
    pub fn speech_command(&self) -> Option<&str> {
        if !self.speech.enabled {
            return None;
        }
        self.speech
            .command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
