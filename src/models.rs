use serde::{Deserialize, Serialize};
use std::fmt;

/// Dance genre of a tanda. Anything unrecognised is a Tango.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Genre {
    #[default]
    Tango,
    Milonga,
    Vals,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Genre::Tango => "Tango",
            Genre::Milonga => "Milonga",
            Genre::Vals => "Vals",
        };
        f.write_str(name)
    }
}

/// Where a song is in the video lookup lifecycle.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Pending,
    Searching,
    Found,
    NotFound,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ImportedSong {
    pub title: String,
    pub artist: String, // Orchestra as credited by the source
    pub singer: Option<String>,
    pub year: Option<i32>,
    pub composer: String,
    #[serde(rename = "searchQuery")]
    pub search_query: String,
    // Filled in by the video search
    pub video_id: String,
    pub video_title: String,
    pub thumbnail: String,
    #[serde(rename = "searchStatus")]
    pub search_status: SearchStatus,
}

impl ImportedSong {
    /// New song with empty video fields and a `pending` status.
    pub fn new(
        title: String,
        artist: String,
        singer: Option<String>,
        year: Option<i32>,
        composer: String,
        search_query: String,
    ) -> Self {
        Self {
            title,
            artist,
            singer,
            year,
            composer,
            search_query,
            video_id: String::new(),
            video_title: String::new(),
            thumbnail: String::new(),
            search_status: SearchStatus::Pending,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImportedTanda {
    pub num: usize, // 1-based, contiguous
    pub orchestra: String,
    pub genre: Genre,
    pub songs: Vec<ImportedSong>,
}

/// A source track as it looked before normalisation. Only used for diagnostics.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawTrack {
    pub track_id: Option<i64>,
    pub title: String,
    pub artist: String,
    pub composer: String,
    pub album: String,
    pub genre: String,
    pub year: Option<i32>,
    pub comments: String,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub playlist_name: String,
    pub tandas: Vec<ImportedTanda>,
    pub cortinas: Vec<RawTrack>,
    pub skipped_tracks: Vec<RawTrack>,
}

impl ImportResult {
    pub fn song_count(&self) -> usize {
        self.tandas.iter().map(|t| t.songs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tandas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_serializes_with_contract_field_names() {
        let song = ImportedSong::new(
            "La yumba".into(),
            "Pugliese".into(),
            None,
            Some(1946),
            String::new(),
            "La yumba Pugliese 1946 tango".into(),
        );
        let json = serde_json::to_value(&song).unwrap();

        assert_eq!(json["searchQuery"], "La yumba Pugliese 1946 tango");
        assert_eq!(json["searchStatus"], "pending");
        assert_eq!(json["video_id"], "");
        assert_eq!(json["video_title"], "");
        assert_eq!(json["thumbnail"], "");
        assert!(json["singer"].is_null());
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = ImportResult {
            playlist_name: "Milonga Night".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["playlistName"], "Milonga Night");
        assert!(json["skippedTracks"].as_array().unwrap().is_empty());
        assert!(json["cortinas"].as_array().unwrap().is_empty());
    }

    #[test]
    fn status_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&SearchStatus::NotFound).unwrap(),
            "\"not_found\""
        );
        assert_eq!(serde_json::to_string(&Genre::Vals).unwrap(), "\"Vals\"");
    }
}
