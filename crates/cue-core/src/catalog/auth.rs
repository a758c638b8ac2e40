//! OAuth token handling for the Spotify Web API.
//!
//! Playback control needs a user-scoped token, so the client authenticates
//! with the refresh-token grant: a long-lived refresh token (obtained once,
//! out of band) is exchanged for a short-lived bearer token whenever the
//! client needs one.

use serde::Deserialize;

use super::CatalogError;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Spotify application credentials plus the user's refresh token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange the refresh token for a bearer access token.
pub(crate) fn fetch_access_token(
    http: &reqwest::blocking::Client,
    creds: &Credentials,
) -> Result<String, CatalogError> {
    let response = http
        .post(TOKEN_URL)
        .basic_auth(&creds.client_id, Some(&creds.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", creds.refresh_token.as_str()),
        ])
        .send()?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().unwrap_or_else(|_| "unknown error".to_string());
        return Err(CatalogError::Auth(format!("{status}: {body}")));
    }

    let token: TokenResponse = response
        .json()
        .map_err(|e| CatalogError::Auth(format!("malformed token response: {e}")))?;

    crate::verbose!("Obtained catalog access token");
    Ok(token.access_token)
}
