//! Local speech-to-text via whisper.cpp.
//!
//! The model is loaded once at startup and reused across recording cycles;
//! loading dominates per-cycle latency otherwise. The FLAC capture is
//! decoded through an FFmpeg hop to WAV and read with hound, which keeps the
//! decode path identical for anything FFmpeg understands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Sample rate whisper expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// A loaded whisper model, reusable across transcriptions.
pub struct Transcriber {
    ctx: WhisperContext,
    language: Option<String>,
}

impl Transcriber {
    /// Load a whisper.cpp GGML model from disk.
    ///
    /// # Errors
    /// Fails if the model file is missing or cannot be parsed.
    pub fn load(model_path: &Path, language: Option<String>) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!(
                "Whisper model not found at: {}\n\
                 Download a model from: https://huggingface.co/ggerganov/whisper.cpp/tree/main",
                model_path.display()
            );
        }

        // Silence whisper.cpp's own logging.
        whisper_rs::install_logging_hooks();

        let path = model_path
            .to_str()
            .context("Model path is not valid UTF-8")?;
        let ctx = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .context("Failed to load whisper model")?;

        Ok(Self { ctx, language })
    }

    /// Transcribe an audio file and return the trimmed transcript.
    pub fn transcribe_file(&self, audio: &Path) -> Result<String> {
        let samples = decode_capture(audio)?;
        if samples.is_empty() {
            anyhow::bail!("No audio decoded from {}", audio.display());
        }
        crate::verbose!(
            "Transcribing {} ({:.1}s of audio)",
            audio.display(),
            samples.len() as f64 / WHISPER_SAMPLE_RATE as f64
        );
        self.transcribe_samples(&samples)
    }

    /// Run whisper over 16 kHz mono f32 samples.
    pub fn transcribe_samples(&self, pcm: &[f32]) -> Result<String> {
        let mut state = self
            .ctx
            .create_state()
            .context("Failed to create whisper state")?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        if let Some(ref lang) = self.language {
            params.set_language(Some(lang));
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state.full(params, pcm).context("Transcription failed")?;

        let num_segments = state.full_n_segments();
        let mut text = String::new();
        for i in 0..num_segments {
            if let Some(segment) = state.get_segment(i) {
                if let Ok(segment_text) = segment.to_str() {
                    text.push_str(segment_text);
                }
            }
        }

        Ok(text.trim().to_string())
    }
}

/// Decode a capture file to 16 kHz mono f32 samples via an FFmpeg WAV hop.
fn decode_capture(input: &Path) -> Result<Vec<f32>> {
    let wav_path = scratch_wav_path();

    let output = std::process::Command::new("ffmpeg")
        .args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            input.to_str().context("Audio path is not valid UTF-8")?,
            "-ar",
            "16000",
            "-ac",
            "1",
            "-f",
            "wav",
            "-y",
            wav_path.to_str().context("Scratch path is not valid UTF-8")?,
        ])
        .output()
        .context("Failed to execute ffmpeg. Make sure ffmpeg is installed.")?;

    if !output.status.success() {
        let _ = std::fs::remove_file(&wav_path);
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("FFmpeg decode failed: {stderr}");
    }

    let samples = read_wav_samples(&wav_path);
    let _ = std::fs::remove_file(&wav_path);
    samples
}

/// Unique scratch path so concurrent invocations never collide.
fn scratch_wav_path() -> PathBuf {
    let unique = format!(
        "cue_decode_{}_{}.wav",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    std::env::temp_dir().join(unique)
}

/// Read a WAV file into f32 samples, normalizing integer formats.
fn read_wav_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path).context("Failed to open WAV file")?;
    let spec = reader.spec();

    if spec.sample_rate != WHISPER_SAMPLE_RATE || spec.channels != 1 {
        anyhow::bail!(
            "Expected 16 kHz mono WAV, got {} Hz / {} channel(s)",
            spec.sample_rate,
            spec.channels
        );
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read float samples")?,
        hound::SampleFormat::Int => {
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read int samples")?
        }
    };

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_int_wav_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: WHISPER_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(i16::MAX).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.write_sample(i16::MIN).unwrap();
        writer.finalize().unwrap();

        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples.len(), 3);
        assert!(samples[0] > 0.99 && samples[0] <= 1.0);
        assert_eq!(samples[1], 0.0);
        assert!((samples[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hi.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        assert!(read_wav_samples(&path).is_err());
    }
}
