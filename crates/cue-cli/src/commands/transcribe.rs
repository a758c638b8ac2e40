//! Transcribe an audio file without touching the catalog.

use anyhow::Result;
use cue_core::Settings;
use std::path::Path;

pub fn run(settings: &Settings, file: &Path) -> Result<()> {
    crate::app::ensure_ffmpeg_installed()?;
    let transcriber = crate::app::load_transcriber(settings)?;
    let text = transcriber.transcribe_file(file)?;
    println!("{text}");
    Ok(())
}
