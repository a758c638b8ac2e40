//! Shared startup helpers: tool preflight and settings resolution.

use anyhow::Result;
use cue_core::{Settings, Speaker, SpotifyClient, Transcriber};
use std::path::Path;

pub fn ensure_ffmpeg_installed() -> Result<()> {
    if std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .is_err()
    {
        eprintln!("Error: FFmpeg is not installed or not in PATH.");
        eprintln!("\ncue requires FFmpeg for audio capture and decoding.");
        eprintln!("Please install FFmpeg:");
        eprintln!("  - Ubuntu/Debian: sudo apt install ffmpeg");
        eprintln!("  - macOS: brew install ffmpeg");
        eprintln!("  - Windows: choco install ffmpeg or download from ffmpeg.org\n");
        std::process::exit(1);
    }
    Ok(())
}

/// Load the whisper model, or exit with configuration hints.
pub fn load_transcriber(settings: &Settings) -> Result<Transcriber> {
    let model_path = match settings.resolved_whisper_model() {
        Some(path) => path,
        None => {
            eprintln!("Error: No whisper model path configured.");
            eprintln!("\nSet the model path with:");
            eprintln!("  cue config --whisper-model-path ~/.local/share/cue/models/ggml-base.bin\n");
            eprintln!(
                "Or set the {} environment variable.",
                cue_core::settings::WHISPER_MODEL_ENV
            );
            std::process::exit(1);
        }
    };

    println!("Loading whisper model…");
    Transcriber::load(Path::new(&model_path), settings.language.clone())
}

/// Build the Spotify client, or exit with configuration hints.
pub fn spotify_client(settings: &Settings) -> Result<SpotifyClient> {
    let creds = match settings.resolved_credentials() {
        Some(creds) => creds,
        None => {
            eprintln!("Error: Spotify credentials not configured.");
            eprintln!("\nSet them with:");
            eprintln!("  cue config --spotify-client-id ID \\");
            eprintln!("             --spotify-client-secret SECRET \\");
            eprintln!("             --spotify-refresh-token TOKEN\n");
            eprintln!(
                "Or set the {}, {} and {} environment variables (a .env file works too).",
                cue_core::settings::SPOTIFY_CLIENT_ID_ENV,
                cue_core::settings::SPOTIFY_CLIENT_SECRET_ENV,
                cue_core::settings::SPOTIFY_REFRESH_TOKEN_ENV
            );
            std::process::exit(1);
        }
    };

    Ok(SpotifyClient::new(creds)?)
}

/// Build a speaker when TTS is enabled and a voice is configured.
pub fn speaker(settings: &Settings) -> Option<Speaker> {
    if !settings.tts.enabled {
        return None;
    }
    match settings.resolved_tts_voice() {
        Some(voice) => Some(Speaker::new(voice.into(), settings.tts.speaker_id)),
        None => {
            cue_core::verbose!("No TTS voice configured; feedback will be text only");
            None
        }
    }
}
