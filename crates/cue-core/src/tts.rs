//! Spoken feedback via a local piper voice.
//!
//! Text is piped to the `piper` binary's stdin, the synthesized WAV is
//! played through rodio, and the scratch file is reused across utterances.
//! TTS is cosmetic: callers route through [`say_or_log`] so a broken voice
//! setup never aborts a cycle.

use anyhow::{Context, Result};
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A configured local voice.
pub struct Speaker {
    voice_model: PathBuf,
    speaker_id: Option<u32>,
    scratch_wav: PathBuf,
}

impl Speaker {
    /// Build a speaker for a piper voice model. Multi-speaker models take a
    /// speaker id; single-speaker models ignore it.
    pub fn new(voice_model: PathBuf, speaker_id: Option<u32>) -> Self {
        let scratch_wav = std::env::temp_dir().join(format!("cue_tts_{}.wav", std::process::id()));
        Self {
            voice_model,
            speaker_id,
            scratch_wav,
        }
    }

    /// Synthesize `text` and play it, blocking until playback finishes.
    pub fn say(&self, text: &str) -> Result<()> {
        self.synthesize(text)?;
        play_wav(&self.scratch_wav)
    }

    fn synthesize(&self, text: &str) -> Result<()> {
        let mut cmd = Command::new("piper");
        cmd.arg("--model")
            .arg(&self.voice_model)
            .arg("--output_file")
            .arg(&self.scratch_wav);
        if let Some(id) = self.speaker_id {
            cmd.arg("--speaker").arg(id.to_string());
        }

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn piper. Make sure piper is installed.")?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .context("Failed to write text to piper")?;
        }

        let status = child.wait().context("Failed to wait for piper")?;
        if !status.success() {
            anyhow::bail!("piper exited with non-zero status");
        }

        Ok(())
    }
}

/// Play a WAV file to the default output device, blocking until done.
fn play_wav(path: &std::path::Path) -> Result<()> {
    let (_stream, handle) =
        rodio::OutputStream::try_default().context("Failed to open audio output")?;
    let sink = rodio::Sink::try_new(&handle).context("Failed to create audio sink")?;

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let source = rodio::Decoder::new(BufReader::new(file)).context("Failed to decode WAV")?;

    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

/// Speak through the speaker if one is configured; log and carry on if the
/// speaker is missing or fails.
pub fn say_or_log(speaker: Option<&Speaker>, text: &str) {
    match speaker {
        Some(s) => {
            if let Err(e) = s.say(text) {
                crate::verbose!("TTS failed: {e:#}");
            }
        }
        None => crate::verbose!("TTS not configured, skipping: {text}"),
    }
}
