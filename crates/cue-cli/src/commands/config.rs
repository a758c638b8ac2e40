//! Show or update persisted settings.

use anyhow::Result;
use clap::Args;
use cue_core::Settings;

#[derive(Args)]
pub struct ConfigArgs {
    /// Global shortcut, e.g. "ctrl+alt+k"
    #[arg(long)]
    shortcut: Option<String>,

    /// Capture device name (see `cue devices`)
    #[arg(long)]
    microphone: Option<String>,

    /// Path to a whisper GGML model
    #[arg(long)]
    whisper_model_path: Option<String>,

    /// Language hint for transcription, e.g. "en"
    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    spotify_client_id: Option<String>,

    #[arg(long)]
    spotify_client_secret: Option<String>,

    #[arg(long)]
    spotify_refresh_token: Option<String>,

    /// Path to a piper voice model (.onnx)
    #[arg(long)]
    tts_voice: Option<String>,

    /// Speaker id for multi-speaker voice models
    #[arg(long)]
    tts_speaker: Option<u32>,

    /// Enable or disable spoken feedback
    #[arg(long)]
    tts: Option<bool>,

    /// Recommendation tracks queued after each match (0 disables)
    #[arg(long)]
    queue_recommendations: Option<u32>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut settings = Settings::load();
    let mut changed = false;

    macro_rules! set {
        ($field:expr, $value:expr) => {
            if let Some(value) = $value {
                $field = value;
                changed = true;
            }
        };
    }

    set!(settings.shortcut, args.shortcut);
    set!(settings.microphone_device, args.microphone.map(Some));
    set!(
        settings.whisper_model_path,
        args.whisper_model_path.map(Some)
    );
    set!(settings.language, args.language.map(Some));
    set!(settings.spotify.client_id, args.spotify_client_id.map(Some));
    set!(
        settings.spotify.client_secret,
        args.spotify_client_secret.map(Some)
    );
    set!(
        settings.spotify.refresh_token,
        args.spotify_refresh_token.map(Some)
    );
    set!(settings.tts.voice_model_path, args.tts_voice.map(Some));
    set!(settings.tts.speaker_id, args.tts_speaker.map(Some));
    set!(settings.tts.enabled, args.tts);
    set!(settings.queue_recommendations, args.queue_recommendations);

    if changed {
        settings.save()?;
        println!("Settings saved to {}", Settings::path().display());
    } else {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        println!("\nConfig file: {}", Settings::path().display());
    }

    Ok(())
}
