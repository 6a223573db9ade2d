//! Serde mirrors of the Web API payloads the dashboard consumes
//!
//! Only the fields actually rendered are modeled; unknown fields are
//! ignored on deserialize. Everything derives `Serialize` too because the
//! dashboard re-emits these objects as JSON panels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

/// `GET /me`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub product: Option<String>,
}

/// Full artist object from `GET /me/top/artists`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub popularity: u32,
}

/// Reduced artist object as embedded in tracks and albums.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
    pub album: Album,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// One entry from `GET /me/player/recently-played`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayHistory {
    pub track: Track,
    /// RFC 3339 timestamp as reported by the API; passed through verbatim.
    pub played_at: String,
}

/// Paged wrapper around every list endpoint's response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}
