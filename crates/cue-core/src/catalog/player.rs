//! Playback orchestration: match an utterance, pick a device, start the
//! track, queue recommendations.

use super::client::SpotifyClient;
use super::matcher::{MatcherConfig, TrackMatch, find_best_match};
use super::CatalogError;

/// What a successful cycle did.
#[derive(Debug, Clone)]
pub struct PlaybackOutcome {
    pub track: TrackMatch,
    pub device_name: String,
    /// Recommendation tracks appended to the queue (best effort).
    pub queued: usize,
}

/// Match `utterance` against the catalog and start playback on the active
/// device, then queue up to `queue_count` recommendation tracks seeded by
/// the winner.
///
/// Queueing is best effort: a recommendation or queue failure is logged and
/// the cycle still counts as a success. Matching and playback failures
/// propagate.
pub fn play_best_match(
    client: &mut SpotifyClient,
    config: &MatcherConfig,
    utterance: &str,
    queue_count: u32,
) -> Result<PlaybackOutcome, CatalogError> {
    let track = find_best_match(client, config, utterance)?;
    crate::verbose!(
        "Matched \"{}\" by {} (score {:.1})",
        track.name,
        track.artist,
        track.score
    );

    let devices = client.devices()?;
    let device = devices
        .iter()
        .find(|d| d.is_active)
        .or_else(|| devices.first())
        .filter(|d| d.id.is_some())
        .ok_or(CatalogError::NoActiveDevice)?;
    let device_id = device.id.clone().unwrap_or_default();
    let device_name = device.name.clone();

    client.start_playback(&device_id, &[track.uri.clone()])?;

    let queued = if queue_count > 0 {
        queue_recommendations(client, &device_id, &track.id, queue_count)
    } else {
        0
    };

    Ok(PlaybackOutcome {
        track,
        device_name,
        queued,
    })
}

fn queue_recommendations(
    client: &mut SpotifyClient,
    device_id: &str,
    seed_track_id: &str,
    count: u32,
) -> usize {
    let related = match client.recommendations(seed_track_id, count) {
        Ok(tracks) => tracks,
        Err(e) => {
            crate::verbose!("Recommendation lookup failed: {e}");
            return 0;
        }
    };

    let mut queued = 0;
    for track in &related {
        match client.queue(device_id, &track.uri) {
            Ok(()) => {
                crate::verbose!("Queued \"{}\" by {}", track.name, track.artist);
                queued += 1;
            }
            Err(e) => {
                crate::verbose!("Could not queue \"{}\": {e}", track.name);
            }
        }
    }
    queued
}
