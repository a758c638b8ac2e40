//! Persisted settings with environment-variable overrides.
//!
//! Settings live in `~/.config/cue/settings.json` and are written by
//! `cue config`. Secrets can instead come from the environment (or a
//! `.env` file via dotenvy): env vars always win over the file, so a
//! checked-in settings file never needs to hold credentials.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{Credentials, MatcherConfig};

/// Env var overriding the whisper model path.
pub const WHISPER_MODEL_ENV: &str = "CUE_WHISPER_MODEL";
/// Env var overriding the TTS voice model path.
pub const TTS_VOICE_ENV: &str = "CUE_TTS_VOICE";
/// Env vars for the Spotify credentials.
pub const SPOTIFY_CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";
pub const SPOTIFY_REFRESH_TOKEN_ENV: &str = "SPOTIFY_REFRESH_TOKEN";

fn default_shortcut() -> String {
    "ctrl+alt+k".to_string()
}

fn default_queue_recommendations() -> u32 {
    3
}

/// Spotify application credentials as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifySettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

/// Spoken-feedback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Whether the assistant speaks at all
    pub enabled: bool,
    /// Path to a piper voice model (.onnx)
    pub voice_model_path: Option<String>,
    /// Speaker id for multi-speaker voice models
    pub speaker_id: Option<u32>,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            voice_model_path: None,
            speaker_id: None,
        }
    }
}

/// All persisted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Global shortcut toggling recording
    #[serde(default = "default_shortcut")]
    pub shortcut: String,

    /// Capture device name (None = system default)
    pub microphone_device: Option<String>,

    /// Path to the whisper GGML model
    pub whisper_model_path: Option<String>,

    /// Language hint for transcription (None = autodetect)
    pub language: Option<String>,

    pub spotify: SpotifySettings,
    pub tts: TtsSettings,

    /// Song-matching tunables
    pub matcher: MatcherConfig,

    /// Recommendation tracks queued after a match (0 disables queueing)
    #[serde(default = "default_queue_recommendations")]
    pub queue_recommendations: u32,

    /// Directory for capture files (None = data dir)
    pub recordings_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shortcut: default_shortcut(),
            microphone_device: None,
            whisper_model_path: None,
            language: None,
            spotify: SpotifySettings::default(),
            tts: TtsSettings::default(),
            matcher: MatcherConfig::default(),
            queue_recommendations: default_queue_recommendations(),
            recordings_dir: None,
        }
    }
}

impl Settings {
    /// Location of the settings file.
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cue")
            .join("settings.json")
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    crate::verbose!("Could not parse {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write settings back to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Whisper model path, env override first.
    pub fn resolved_whisper_model(&self) -> Option<String> {
        std::env::var(WHISPER_MODEL_ENV)
            .ok()
            .or_else(|| self.whisper_model_path.clone())
    }

    /// TTS voice model path, env override first.
    pub fn resolved_tts_voice(&self) -> Option<String> {
        std::env::var(TTS_VOICE_ENV)
            .ok()
            .or_else(|| self.tts.voice_model_path.clone())
    }

    /// Assemble Spotify credentials, env overrides first. None if any of
    /// the three pieces is missing.
    pub fn resolved_credentials(&self) -> Option<Credentials> {
        let client_id = std::env::var(SPOTIFY_CLIENT_ID_ENV)
            .ok()
            .or_else(|| self.spotify.client_id.clone())?;
        let client_secret = std::env::var(SPOTIFY_CLIENT_SECRET_ENV)
            .ok()
            .or_else(|| self.spotify.client_secret.clone())?;
        let refresh_token = std::env::var(SPOTIFY_REFRESH_TOKEN_ENV)
            .ok()
            .or_else(|| self.spotify.refresh_token.clone())?;
        Some(Credentials {
            client_id,
            client_secret,
            refresh_token,
        })
    }

    /// Directory holding capture files.
    pub fn resolved_recordings_dir(&self) -> PathBuf {
        self.recordings_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cue")
                .join("recordings")
        })
    }

    /// Fixed capture path, overwritten on every recording.
    pub fn capture_path(&self) -> PathBuf {
        self.resolved_recordings_dir().join("cue_capture.flac")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.shortcut, "ctrl+alt+k");
        assert_eq!(settings.queue_recommendations, 3);
        assert!(settings.tts.enabled);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.shortcut = "ctrl+shift+m".to_string();
        settings.matcher.artist_floor = 55.0;
        settings.spotify.client_id = Some("abc123".to_string());

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn partial_credentials_resolve_to_none() {
        let mut settings = Settings::default();
        settings.spotify.client_id = Some("id".to_string());
        // secret and refresh token missing (and no env in tests)
        assert!(settings.resolved_credentials().is_none());
    }
}
