//! The hotkey loop: toggle recording, then transcribe → normalize → play.

use anyhow::{Context, Result};
use cue_core::{
    RecorderConfig, RecorderSession, Settings, Speaker, SpotifyClient, Transcriber,
    normalize_utterance, say_or_log,
};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};

const GREETING: &str = "Hello! I'm Cue, your music assistant.";

pub fn run(settings: &Settings) -> Result<()> {
    crate::app::ensure_ffmpeg_installed()?;
    let transcriber = crate::app::load_transcriber(settings)?;
    let mut client = crate::app::spotify_client(settings)?;
    let speaker = crate::app::speaker(settings);

    let manager = GlobalHotKeyManager::new().context("Failed to initialize global hotkeys")?;
    let hotkey: HotKey = settings
        .shortcut
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid shortcut '{}': {e}", settings.shortcut))?;
    manager
        .register(hotkey)
        .with_context(|| format!("Failed to register shortcut {}", settings.shortcut))?;

    println!("Press {} to start/stop recording.", settings.shortcut);
    println!("Press Ctrl+C in the terminal to quit.");
    say_or_log(speaker.as_ref(), GREETING);

    let recorder_config = recorder_config(settings);
    let receiver = GlobalHotKeyEvent::receiver();
    let mut session: Option<RecorderSession> = None;

    loop {
        let event = receiver.recv().context("Hotkey channel closed")?;
        if event.id != hotkey.id() || event.state != HotKeyState::Pressed {
            continue;
        }

        session = match session.take() {
            None => match RecorderSession::spawn(&recorder_config) {
                Ok(started) => {
                    println!("Recording… press {} again to stop.", settings.shortcut);
                    Some(started)
                }
                Err(e) => {
                    eprintln!("Could not start recording: {e:#}");
                    say_or_log(speaker.as_ref(), "Sorry, I couldn't start recording.");
                    None
                }
            },
            Some(active) => {
                println!("Stopping recording ({}s)…", active.elapsed().as_secs());
                // Every cycle is independent: report the failure and wait
                // for the next press.
                if let Err(e) =
                    run_cycle(active, &transcriber, &mut client, settings, speaker.as_ref())
                {
                    eprintln!("Error: {e:#}");
                    say_or_log(speaker.as_ref(), "Sorry, something went wrong.");
                }
                None
            }
        };
    }
}

fn recorder_config(settings: &Settings) -> RecorderConfig {
    let mut config = RecorderConfig::new(settings.capture_path());
    if let Some(ref device) = settings.microphone_device {
        config = config.with_device(device.clone());
    }
    config
}

fn run_cycle(
    session: RecorderSession,
    transcriber: &Transcriber,
    client: &mut SpotifyClient,
    settings: &Settings,
    speaker: Option<&Speaker>,
) -> Result<()> {
    let capture = session.stop()?;
    let raw = transcriber.transcribe_file(&capture)?;
    println!("Heard: {raw}");

    let utterance = normalize_utterance(&raw);
    if utterance.is_empty() {
        say_or_log(speaker, "Sorry! Haven't quite caught that.");
        return Ok(());
    }

    super::play::dispatch_playback(client, settings, &utterance, speaker)
}
