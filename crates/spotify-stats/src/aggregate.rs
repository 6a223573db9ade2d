//! In-memory aggregations over the top-item result sets
//!
//! The API has no top-albums or top-genres endpoint, so both rankings are
//! derived: albums counted out of the top tracks, genres counted out of the
//! top artists. Inputs are capped at 50 items, so everything here is a
//! bounded count-and-sort. All sorts are stable with first-seen order
//! breaking ties, which keeps the ranking faithful to the underlying
//! top-items order.

use std::collections::HashMap;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::models::{Album, Artist, Track};

/// Rank albums by how many of the user's top tracks they contain.
pub fn top_albums(tracks: &[Track], limit: usize) -> Vec<Album> {
    let mut ranked: Vec<(Album, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for track in tracks {
        match index.get(track.album.id.as_str()) {
            Some(&i) => ranked[i].1 += 1,
            None => {
                index.insert(&track.album.id, ranked.len());
                ranked.push((track.album.clone(), 1));
            }
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(album, _)| album).collect()
}

/// Rank normalized genre labels by how many of the user's top artists
/// carry them.
pub fn top_genres(artists: &[Artist], limit: usize) -> Vec<String> {
    let mut ranked: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for artist in artists {
        for genre in &artist.genres {
            let normalized = normalize_genre(genre);
            match index.get(&normalized) {
                Some(&i) => ranked[i].1 += 1,
                None => {
                    index.insert(normalized.clone(), ranked.len());
                    ranked.push((normalized, 1));
                }
            }
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(genre, _)| genre).collect()
}

/// Normalize a genre label: lowercase, fold diacritics, and map the local
/// spellings Spotify uses for Czech/Slovak genres onto their English
/// labels so e.g. "Český pop" and "czech pop" count as one genre.
pub fn normalize_genre(genre: &str) -> String {
    let folded = fold_diacritics(&genre.to_lowercase());
    match folded.as_str() {
        "cesky pop" => "czech pop".to_string(),
        "cesky rock" => "czech rock".to_string(),
        "slovensky hip hop" => "slovak hip hop".to_string(),
        _ => folded,
    }
}

/// NFD-decompose and drop combining marks ("český" → "cesky").
fn fold_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Duration/popularity aggregate over a track list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListeningSummary {
    pub track_count: usize,
    pub total_duration_ms: u64,
    pub average_duration_ms: u64,
    pub average_popularity: f64,
}

/// Compute the summary panel. An empty input yields all zeroes.
pub fn summarize(tracks: &[Track]) -> ListeningSummary {
    if tracks.is_empty() {
        return ListeningSummary {
            track_count: 0,
            total_duration_ms: 0,
            average_duration_ms: 0,
            average_popularity: 0.0,
        };
    }

    let total_duration_ms: u64 = tracks.iter().map(|t| t.duration_ms).sum();
    let total_popularity: u64 = tracks.iter().map(|t| u64::from(t.popularity)).sum();
    let count = tracks.len() as u64;

    ListeningSummary {
        track_count: tracks.len(),
        total_duration_ms,
        average_duration_ms: total_duration_ms / count,
        average_popularity: total_popularity as f64 / count as f64,
    }
}

/// Render milliseconds as `m:ss` the way track lengths are displayed.
pub fn format_duration_ms(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{minutes}:{seconds:02}")
}
