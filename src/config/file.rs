//! Configuration file management for voxkiosk.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::synthesis::{TtsModel, TtsVoice};
use crate::transcription::SttModel;

/// Audio recording and silence detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `voxkiosk list-devices`
    /// - device name from `voxkiosk list-devices`
    pub device: String,
    /// Recording sample rate in Hz (16000 recommended for speech recognition)
    pub sample_rate: u32,
    /// Maximum normalized amplitude deviation from center still classified as
    /// silence (0.0 - 1.0)
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f32,
    /// How long the input must stay continuously silent before recording stops
    #[serde(default = "default_silence_duration_ms")]
    pub silence_duration_ms: u64,
    /// Interval between silence checks while recording
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_silence_threshold() -> f32 {
    0.05
}

fn default_silence_duration_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    50
}

/// Speech-to-text and text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Transcription model used to turn questions into text
    #[serde(default)]
    pub stt_model: SttModel,
    /// Synthesis model used to voice the answer scripts
    #[serde(default)]
    pub tts_model: TtsModel,
    /// Voice used for synthesized answers
    #[serde(default)]
    pub voice: TtsVoice,
    /// Playback speed multiplier passed to the synthesis API
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_model: SttModel::default(),
            tts_model: TtsModel::default(),
            voice: TtsVoice::default(),
            speed: default_speed(),
        }
    }
}

/// Firebase project configuration.
///
/// The web API key identifies the Firebase project and is not a secret; it is
/// safe to keep in the config file. User credentials are never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// Firebase web API key used for the Identity Toolkit endpoints
    pub api_key: String,
    /// Cloud Storage bucket that caches synthesized answers, e.g. "myapp.appspot.com"
    pub storage_bucket: String,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    pub audio: AudioConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    pub firebase: FirebaseConfig,
}

impl KioskConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: KioskConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file.
///
/// Assumes the config file exists (created by setup if needed).
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let config_dir = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_dir = config_dir.join(".config").join("voxkiosk");

    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("voxkiosk.toml"))
}
