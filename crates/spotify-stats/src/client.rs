//! Authenticated Web API client
//!
//! Every call is a direct pass-through to one documented endpoint with the
//! stored token as a Bearer header. No retries, no backoff, no caching —
//! a rejected token maps to `Error::Unauthorized` and the caller tears the
//! session down.

use serde::de::DeserializeOwned;
use spotify_auth::Secret;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Artist, Page, PlayHistory, Track, UserProfile};

/// Web API base for authenticated calls (distinct from the accounts host).
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// The API caps list endpoints at 50 items per request.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Time window for the top-items endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// ~4 weeks
    Short,
    /// ~6 months
    #[default]
    Medium,
    /// several years
    Long,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Short => "short_term",
            TimeRange::Medium => "medium_term",
            TimeRange::Long => "long_term",
        }
    }

    /// Accepts both the query shorthand (`short`) and the API spelling
    /// (`short_term`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "short" | "short_term" => Some(TimeRange::Short),
            "medium" | "medium_term" => Some(TimeRange::Medium),
            "long" | "long_term" => Some(TimeRange::Long),
            _ => None,
        }
    }
}

/// Client bound to one user's access token.
pub struct StatsClient {
    http: reqwest::Client,
    api_base: String,
    token: Secret,
}

impl StatsClient {
    pub fn new(http: reqwest::Client, token: Secret) -> Self {
        Self {
            http,
            api_base: SPOTIFY_API_BASE.to_string(),
            token,
        }
    }

    /// Point the client at a different API base (tests use a local mock).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// `GET /me`
    pub async fn profile(&self) -> Result<UserProfile> {
        self.get_json("/me").await
    }

    /// `GET /me/top/artists`
    pub async fn top_artists(&self, range: TimeRange, limit: u32) -> Result<Page<Artist>> {
        self.get_json(&format!(
            "/me/top/artists?limit={}&time_range={}",
            limit.min(MAX_PAGE_SIZE),
            range.as_str()
        ))
        .await
    }

    /// `GET /me/top/tracks`
    pub async fn top_tracks(&self, range: TimeRange, limit: u32) -> Result<Page<Track>> {
        self.get_json(&format!(
            "/me/top/tracks?limit={}&time_range={}",
            limit.min(MAX_PAGE_SIZE),
            range.as_str()
        ))
        .await
    }

    /// `GET /me/player/recently-played` — cursor-paged by the API but the
    /// dashboard only ever reads the first page.
    pub async fn recently_played(&self, limit: u32) -> Result<Page<PlayHistory>> {
        self.get_json(&format!(
            "/me/player/recently-played?limit={}",
            limit.min(MAX_PAGE_SIZE)
        ))
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, path_and_query);
        debug!(%url, "api request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {path_and_query} failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(format!("decoding {path_and_query}: {e}")))
    }
}

/// Extract the API's `error.message` from a failure body, falling back to
/// the raw body. Spotify wraps errors as `{"error": {"status": ..., "message": ...}}`.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}
