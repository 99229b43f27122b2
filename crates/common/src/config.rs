//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External engine binaries.
    pub engine: EngineConfig,

    /// Defaults applied to merge requests that leave a value unset.
    pub merge: MergeDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Settings for the third-party integrations (music, transcription).
    pub integrations: IntegrationConfig,
}

/// Paths of the external media-compositing engine and its probe companion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine binary (looked up on `PATH` when relative).
    pub ffmpeg: PathBuf,

    /// Probe binary.
    pub ffprobe: PathBuf,
}

/// Merge parameters used when a request does not specify them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeDefaults {
    /// Linear gain applied to narration.
    pub narration_volume: f64,

    /// Linear gain applied to background music.
    pub background_volume: f64,

    /// Trailing fade-out length in seconds.
    pub fade_duration_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "storyreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

/// Settings for the generative integrations that sit outside the core.
///
/// Built once at startup and passed to whoever needs it; nothing in the
/// workspace reads these variables on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Token for the music generation API.
    #[serde(skip_serializing)]
    pub music_api_token: Option<String>,

    /// Music model identifier.
    pub music_model_version: String,

    /// Speech-to-text model size.
    pub transcription_model: String,
}

pub const DEFAULT_MUSIC_MODEL: &str =
    "meta/musicgen:671ac645ce5e552cc63a54a2bbff63fcf798043055d2dac5fc9e36a837eedcfb";

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl Default for MergeDefaults {
    fn default() -> Self {
        Self {
            narration_volume: 1.0,
            background_volume: 0.2,
            fade_duration_secs: 0.5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            music_api_token: None,
            music_model_version: DEFAULT_MUSIC_MODEL.to_string(),
            transcription_model: "medium".to_string(),
        }
    }
}

impl IntegrationConfig {
    /// Build integration settings from a key lookup (usually the process
    /// environment).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            music_api_token: non_empty("MUSIC_API_TOKEN")
                .or_else(|| non_empty("REPLICATE_API_TOKEN")),
            music_model_version: non_empty("MUSIC_MODEL_VERSION")
                .unwrap_or(defaults.music_model_version),
            transcription_model: non_empty("TRANSCRIPTION_MODEL")
                .unwrap_or(defaults.transcription_model),
        }
    }

    /// Whether the music integration has credentials.
    pub fn music_configured(&self) -> bool {
        self.music_api_token.is_some()
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let mut config = Self::default();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(parsed) => config = parsed,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `STORYREEL_*` overrides and integration settings from a lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ffmpeg) = lookup("STORYREEL_FFMPEG") {
            self.engine.ffmpeg = PathBuf::from(ffmpeg);
        }
        if let Some(ffprobe) = lookup("STORYREEL_FFPROBE") {
            self.engine.ffprobe = PathBuf::from(ffprobe);
        }
        let integrations = IntegrationConfig::from_lookup(&lookup);
        if integrations.music_api_token.is_some() {
            self.integrations.music_api_token = integrations.music_api_token;
        }
        if lookup("MUSIC_MODEL_VERSION").is_some() {
            self.integrations.music_model_version = integrations.music_model_version;
        }
        if lookup("TRANSCRIPTION_MODEL").is_some() {
            self.integrations.transcription_model = integrations.transcription_model;
        }
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("storyreel").join("config.json")
}
