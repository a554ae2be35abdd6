//! Hand-off between imported songs and the video search that fills them in.
//!
//! The search itself lives elsewhere; this module only knows which songs still need a
//! video, how a search outcome is written back, and how to read YouTube links.

use crate::models::{ImportResult, ImportedSong, SearchStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

static VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid video id regex"));
static VIDEO_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(embed|shorts|v)/([a-zA-Z0-9_-]{11})").expect("valid video path regex")
});

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VideoMatch {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: String,
}

/// Which search found the video.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Channel,
    General,
    NotFound,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub tanda_index: usize,
    pub song_index: usize,
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub tanda_index: usize,
    pub song_index: usize,
    pub result: Option<VideoMatch>,
    pub source: MatchSource,
}

impl SearchOutcome {
    /// The matched video. A `NotFound` source wins over any stray result.
    pub fn video(&self) -> Option<&VideoMatch> {
        match self.source {
            MatchSource::NotFound => None,
            MatchSource::Channel | MatchSource::General => self.result.as_ref(),
        }
    }
}

/// Medium quality thumbnail, used when the search result carries none.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/mqdefault.jpg", video_id)
}

/// Video id from a bare id or a watch, youtu.be, embed, shorts or /v/ link.
pub fn extract_video_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if VIDEO_ID.is_match(trimmed) {
        return Some(trimmed.to_string());
    }

    let url = Url::parse(trimmed).ok()?;
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        return Some(v.into_owned());
    }
    if url.host_str() == Some("youtu.be") {
        return url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }
    VIDEO_PATH
        .captures(url.path())
        .map(|caps| caps[2].to_string())
}

impl ImportedSong {
    pub fn mark_searching(&mut self) {
        self.search_status = SearchStatus::Searching;
    }

    /// Writes the video fields, or marks the song as not found.
    pub fn apply_match(&mut self, found: Option<&VideoMatch>) {
        match found {
            Some(video) => {
                self.video_id = video.video_id.clone();
                self.video_title = video.title.clone();
                self.thumbnail = if video.thumbnail.is_empty() {
                    thumbnail_url(&video.video_id)
                } else {
                    video.thumbnail.clone()
                };
                self.search_status = SearchStatus::Found;
            }
            None => self.search_status = SearchStatus::NotFound,
        }
    }

    pub fn mark_error(&mut self) {
        self.search_status = SearchStatus::Error;
    }
}

impl ImportResult {
    /// Songs still waiting for a video, in tanda and song order.
    pub fn search_items(&self) -> Vec<SearchItem> {
        self.tandas
            .iter()
            .enumerate()
            .flat_map(|(tanda_index, tanda)| {
                tanda
                    .songs
                    .iter()
                    .enumerate()
                    .filter(|(_, song)| song.search_status == SearchStatus::Pending)
                    .map(move |(song_index, song)| SearchItem {
                        tanda_index,
                        song_index,
                        query: song.search_query.clone(),
                    })
            })
            .collect()
    }

    /// Applies a batch of search outcomes. Returns how many songs were updated.
    pub fn apply_outcomes(&mut self, outcomes: &[SearchOutcome]) -> usize {
        let mut applied = 0;
        for outcome in outcomes {
            let song = self
                .tandas
                .get_mut(outcome.tanda_index)
                .and_then(|t| t.songs.get_mut(outcome.song_index));
            match song {
                Some(song) => {
                    debug!(
                        "Search outcome {:?} for '{}'",
                        outcome.source, song.search_query
                    );
                    song.apply_match(outcome.video());
                    applied += 1;
                }
                None => warn!(
                    "Search outcome for missing song {}/{}",
                    outcome.tanda_index, outcome.song_index
                ),
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_import::{parse_csv_to_tandas, CSV_EXAMPLE};

    #[test]
    fn video_id_forms() {
        let id = "dQw4w9WgXcQ";
        assert_eq!(extract_video_id(id).as_deref(), Some(id));
        assert_eq!(
            extract_video_id(&format!("https://www.youtube.com/watch?v={}&t=10", id)).as_deref(),
            Some(id)
        );
        assert_eq!(
            extract_video_id(&format!("https://youtu.be/{}", id)).as_deref(),
            Some(id)
        );
        assert_eq!(
            extract_video_id(&format!("https://www.youtube.com/embed/{}", id)).as_deref(),
            Some(id)
        );
        assert_eq!(
            extract_video_id(&format!("https://www.youtube.com/shorts/{}", id)).as_deref(),
            Some(id)
        );
        assert_eq!(extract_video_id("https://youtu.be/"), None);
        assert_eq!(extract_video_id("hello world"), None);
    }

    #[test]
    fn search_items_cover_pending_songs() {
        let mut result = parse_csv_to_tandas(CSV_EXAMPLE).unwrap();
        assert_eq!(result.search_items().len(), 15);

        result.tandas[0].songs[0].mark_searching();
        let items = result.search_items();
        assert_eq!(items.len(), 14);
        assert_eq!((items[0].tanda_index, items[0].song_index), (0, 1));
    }

    #[test]
    fn outcomes_update_status_and_fields() {
        let mut result = parse_csv_to_tandas(CSV_EXAMPLE).unwrap();
        let outcomes = vec![
            SearchOutcome {
                tanda_index: 0,
                song_index: 0,
                result: Some(VideoMatch {
                    video_id: "abcdefghijk".into(),
                    title: "Bahía Blanca - Carlos Di Sarli".into(),
                    channel: "Tango Time Travel".into(),
                    thumbnail: String::new(),
                }),
                source: MatchSource::Channel,
            },
            SearchOutcome {
                tanda_index: 0,
                song_index: 1,
                result: None,
                source: MatchSource::NotFound,
            },
            SearchOutcome {
                tanda_index: 9,
                song_index: 0,
                result: None,
                source: MatchSource::NotFound,
            },
        ];

        assert_eq!(result.apply_outcomes(&outcomes), 2);

        let found = &result.tandas[0].songs[0];
        assert_eq!(found.search_status, SearchStatus::Found);
        assert_eq!(found.video_id, "abcdefghijk");
        assert_eq!(found.thumbnail, thumbnail_url("abcdefghijk"));
        assert_eq!(result.tandas[0].songs[1].search_status, SearchStatus::NotFound);
        assert_eq!(result.tandas[0].songs[2].search_status, SearchStatus::Pending);
    }

    #[test]
    fn not_found_source_ignores_stray_result() {
        let mut result = parse_csv_to_tandas(CSV_EXAMPLE).unwrap();
        let stray = VideoMatch {
            video_id: "abcdefghijk".into(),
            title: "Unrelated upload".into(),
            channel: "Someone".into(),
            thumbnail: String::new(),
        };
        let outcomes = vec![
            SearchOutcome {
                tanda_index: 1,
                song_index: 0,
                result: Some(stray.clone()),
                source: MatchSource::NotFound,
            },
            SearchOutcome {
                tanda_index: 1,
                song_index: 1,
                result: Some(stray),
                source: MatchSource::General,
            },
        ];

        assert_eq!(result.apply_outcomes(&outcomes), 2);

        let missed = &result.tandas[1].songs[0];
        assert_eq!(missed.search_status, SearchStatus::NotFound);
        assert!(missed.video_id.is_empty());
        assert_eq!(result.tandas[1].songs[1].search_status, SearchStatus::Found);
    }
}
