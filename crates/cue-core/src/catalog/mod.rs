//! Spotify catalog integration: OAuth, the Web API client, fuzzy song
//! matching and playback orchestration.

pub mod auth;
pub mod client;
pub mod matcher;
pub mod player;

pub use auth::Credentials;
pub use client::{PlaybackDevice, SpotifyClient};
pub use matcher::{CatalogSearch, MatcherConfig, TrackCandidate, TrackMatch, find_best_match};
pub use player::{PlaybackOutcome, play_best_match};

use thiserror::Error;

/// Failures at the catalog boundary. Everything above this layer treats a
/// cycle as abandonable: the CLI reports the error (spoken where possible)
/// and waits for the next hotkey press.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Token exchange failed or the API refused our credentials twice.
    #[error("catalog authentication failed: {0}")]
    Auth(String),

    /// Neither search strategy produced a candidate.
    #[error("no track matched the query")]
    NotFound,

    /// The account has no device available for playback.
    #[error("no active playback device")]
    NoActiveDevice,

    /// The API answered with a non-success status.
    #[error("catalog API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
