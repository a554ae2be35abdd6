//! Text normalisers shared by the CSV, Apple Music and Spotify imports.

use crate::models::Genre;
use once_cell::sync::Lazy;
use regex::Regex;

/// Genre/name markers of a cortina (pause track) between tandas.
/// Apple Music libraries use labels like "4 Pausen & Cortinas".
const CORTINA_MARKERS: [&str; 3] = ["pausen", "cortina", "pause"];

/// Trailing search token every query ends with.
const SEARCH_SUFFIX: &str = "tango";

/// "Carlos Di Sarli y su Orquesta Típica" style ensemble suffixes.
static ENSEMBLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+y\s+su\s+.+$").expect("valid ensemble regex"));

/// Formats: "1 Tango", "2 Milonga", "3 Vals", ...
pub fn classify_genre(text: &str) -> Genre {
    let lower = text.to_lowercase();
    if lower.contains("milonga") {
        Genre::Milonga
    } else if lower.contains("vals") {
        Genre::Vals
    } else {
        Genre::Tango
    }
}

/// Empty and "instrumental" mean no singer.
pub fn normalize_singer(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("instrumental") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn is_cortina_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    CORTINA_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Builds the video search query: title, orchestra, singer, year, then "tango".
/// The downstream search relies on this exact order.
pub fn build_search_query(
    title: &str,
    orchestra: &str,
    singer: Option<&str>,
    year: Option<i32>,
) -> String {
    let mut parts = vec![title.to_string(), orchestra.to_string()];
    if let Some(singer) = singer.filter(|s| !s.is_empty()) {
        parts.push(singer.to_string());
    }
    if let Some(year) = year.filter(|y| *y != 0) {
        parts.push(year.to_string());
    }
    parts.push(SEARCH_SUFFIX.to_string());
    parts.join(" ")
}

/// Returns the most frequent key. On a tie the key seen first wins.
///
/// Counts are kept in first-seen order and only a strictly greater count
/// replaces the current leader, so the result never depends on sort stability.
pub fn majority_vote<T, K, F>(items: &[T], key_fn: F) -> Option<K>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut counts: Vec<(K, usize)> = Vec::new();
    for item in items {
        let key = key_fn(item);
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }

    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        let replace = match &best {
            Some((_, best_count)) => count > *best_count,
            None => true,
        };
        if replace {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

/// Orchestra from an Apple Music artist field.
/// "Di Sarli, Carlos" → "Di Sarli"
pub fn parse_orchestra(artist: &str) -> String {
    match artist.split_once(',') {
        Some((surname, _)) => surname.trim().to_string(),
        None => artist.trim().to_string(),
    }
}

/// Core orchestra name from a Spotify artist credit.
///
/// "Carlos Di Sarli y su Orquesta Típica" → "Carlos Di Sarli"
/// "Carlos di Sarli, Roberto Florio" → "Carlos di Sarli"
pub fn normalize_artist(artist: &str) -> String {
    let trimmed = artist.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let stripped = ENSEMBLE_SUFFIX.replace(trimmed, "");
    let primary = stripped.split(',').next().unwrap_or_default();
    primary.trim().to_string()
}
