//! One-shot playback from a typed query, and the playback dispatch shared
//! with the listen loop.

use anyhow::Result;
use cue_core::{CatalogError, Settings, Speaker, SpotifyClient, say_or_log};
use cue_core::{normalize_utterance, play_best_match};

pub fn run(settings: &Settings, query: &str) -> Result<()> {
    let utterance = normalize_utterance(query);
    if utterance.is_empty() {
        anyhow::bail!(
            "Nothing to search for. Try: cue play yesterday by the beatles"
        );
    }

    let mut client = crate::app::spotify_client(settings)?;
    let speaker = crate::app::speaker(settings);
    dispatch_playback(&mut client, settings, &utterance, speaker.as_ref())
}

/// Match the utterance and play it, translating the expected catalog
/// failures into user feedback instead of errors. Each cycle is
/// independent; only unexpected API trouble propagates.
pub fn dispatch_playback(
    client: &mut SpotifyClient,
    settings: &Settings,
    utterance: &str,
    speaker: Option<&Speaker>,
) -> Result<()> {
    match play_best_match(
        client,
        &settings.matcher,
        utterance,
        settings.queue_recommendations,
    ) {
        Ok(outcome) => {
            println!(
                "Playing \"{}\" by {} on {} (score {:.1}, {} queued)",
                outcome.track.name,
                outcome.track.artist,
                outcome.device_name,
                outcome.track.score,
                outcome.queued
            );
            say_or_log(
                speaker,
                &format!("Playing {} by {}.", outcome.track.name, outcome.track.artist),
            );
        }
        Err(CatalogError::NotFound) => {
            println!("No track matched \"{utterance}\".");
            say_or_log(speaker, "Sorry, I couldn't find that song.");
        }
        Err(CatalogError::NoActiveDevice) => {
            println!("No playback device available. Open your player and try again.");
            say_or_log(speaker, "I couldn't find an active playback device.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
