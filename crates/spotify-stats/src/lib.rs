//! Spotify listening-stats retrieval and aggregation
//!
//! Thin authenticated client over the Web API endpoints the dashboard
//! consumes (profile, top artists, top tracks, recently played) plus the
//! bounded in-memory aggregations derived from them: a top-albums ranking
//! counted out of the top tracks, a normalized top-genres ranking counted
//! out of the top artists, and a duration/popularity summary. Result sets
//! are capped at 50 items by the API, so every aggregation is a small
//! count-and-sort.
//!
//! A 401/403 from any call maps to `Error::Unauthorized` — the signal for
//! the caller to clear the stored session and force a re-login.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod models;

pub use aggregate::{ListeningSummary, format_duration_ms, normalize_genre, summarize, top_albums, top_genres};
pub use client::{MAX_PAGE_SIZE, SPOTIFY_API_BASE, StatsClient, TimeRange};
pub use error::{Error, Result};
pub use models::{Album, Artist, Image, Page, PlayHistory, SimplifiedArtist, Track, UserProfile};
