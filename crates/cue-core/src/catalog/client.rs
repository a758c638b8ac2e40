//! Spotify Web API client.
//!
//! Blocking reqwest with rustls; bearer auth; serde structs for the handful
//! of response shapes we touch. A 401 triggers exactly one token refresh and
//! retry, anything else non-2xx surfaces as [`CatalogError::Api`].

use serde::Deserialize;
use std::time::Duration;

use super::auth::{Credentials, fetch_access_token};
use super::matcher::{CatalogSearch, TrackCandidate};
use super::CatalogError;

const API_BASE: &str = "https://api.spotify.com/v1";

/// Request timeout for all catalog calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A playback target known to the account (desktop app, phone, speaker…).
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackDevice {
    pub id: Option<String>,
    pub name: String,
    pub is_active: bool,
}

#[derive(Deserialize)]
struct DevicesResponse {
    devices: Vec<PlaybackDevice>,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Deserialize)]
struct TrackPage {
    items: Vec<TrackObject>,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    tracks: Vec<TrackObject>,
}

#[derive(Deserialize)]
struct TrackObject {
    id: String,
    uri: String,
    name: String,
    artists: Vec<ArtistObject>,
}

#[derive(Deserialize)]
struct ArtistObject {
    name: String,
}

impl From<TrackObject> for TrackCandidate {
    fn from(t: TrackObject) -> Self {
        let artist = t
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default();
        TrackCandidate {
            id: t.id,
            uri: t.uri,
            name: t.name,
            artist,
        }
    }
}

/// Authenticated Spotify Web API client. The bearer token is fetched lazily
/// and cached for the process lifetime.
pub struct SpotifyClient {
    http: reqwest::blocking::Client,
    creds: Credentials,
    token: Option<String>,
}

impl SpotifyClient {
    /// Build a client from credentials. No network traffic happens until the
    /// first call.
    pub fn new(creds: Credentials) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            creds,
            token: None,
        })
    }

    fn token(&mut self) -> Result<String, CatalogError> {
        if let Some(ref token) = self.token {
            return Ok(token.clone());
        }
        let token = fetch_access_token(&self.http, &self.creds)?;
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Send a request, refreshing the token and retrying once on 401.
    fn send<F>(&mut self, build: F) -> Result<reqwest::blocking::Response, CatalogError>
    where
        F: Fn(&reqwest::blocking::Client, &str) -> reqwest::blocking::RequestBuilder,
    {
        let token = self.token()?;
        let response = build(&self.http, &token).send()?;

        let response = if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            crate::verbose!("Access token expired, refreshing");
            self.token = None;
            let token = self.token()?;
            build(&self.http, &token).send()?
        } else {
            response
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_else(|_| "unknown error".to_string());
            return Err(CatalogError::Api { status, body });
        }

        Ok(response)
    }

    /// Search the track catalog. One page per call; the matcher drives
    /// pagination.
    pub fn search_tracks(
        &mut self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackCandidate>, CatalogError> {
        let url = format!("{API_BASE}/search");
        let query = query.to_string();
        let limit = limit.to_string();
        let offset = offset.to_string();
        let response = self.send(move |http, token| {
            http.get(&url).bearer_auth(token).query(&[
                ("q", query.as_str()),
                ("type", "track"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
        })?;

        let parsed: SearchResponse = response.json()?;
        Ok(parsed.tracks.items.into_iter().map(Into::into).collect())
    }

    /// List the account's playback devices.
    pub fn devices(&mut self) -> Result<Vec<PlaybackDevice>, CatalogError> {
        let url = format!("{API_BASE}/me/player/devices");
        let response = self.send(move |http, token| http.get(&url).bearer_auth(token))?;
        let parsed: DevicesResponse = response.json()?;
        Ok(parsed.devices)
    }

    /// Start playing the given track URIs on a device.
    pub fn start_playback(
        &mut self,
        device_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        let url = format!("{API_BASE}/me/player/play");
        let device_id = device_id.to_string();
        let body = serde_json::json!({ "uris": uris });
        self.send(move |http, token| {
            http.put(&url)
                .bearer_auth(token)
                .query(&[("device_id", device_id.as_str())])
                .json(&body)
        })?;
        Ok(())
    }

    /// Append a track to the device's playback queue.
    pub fn queue(&mut self, device_id: &str, uri: &str) -> Result<(), CatalogError> {
        let url = format!("{API_BASE}/me/player/queue");
        let device_id = device_id.to_string();
        let uri = uri.to_string();
        self.send(move |http, token| {
            http.post(&url).bearer_auth(token).query(&[
                ("uri", uri.as_str()),
                ("device_id", device_id.as_str()),
            ])
        })?;
        Ok(())
    }

    /// Fetch recommendation tracks seeded by one track id.
    pub fn recommendations(
        &mut self,
        seed_track_id: &str,
        limit: u32,
    ) -> Result<Vec<TrackCandidate>, CatalogError> {
        let url = format!("{API_BASE}/recommendations");
        let seed = seed_track_id.to_string();
        let limit = limit.to_string();
        let response = self.send(move |http, token| {
            http.get(&url).bearer_auth(token).query(&[
                ("seed_tracks", seed.as_str()),
                ("limit", limit.as_str()),
            ])
        })?;
        let parsed: RecommendationsResponse = response.json()?;
        Ok(parsed.tracks.into_iter().map(Into::into).collect())
    }
}

impl CatalogSearch for SpotifyClient {
    fn search(
        &mut self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackCandidate>, CatalogError> {
        self.search_tracks(query, limit, offset)
    }
}
