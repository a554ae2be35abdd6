//! Converts Spotify playlist data into tandas.
//!
//! - If any track title looks like a cortina, cortinas split the tandas (as in the
//!   Apple Music import) and are dropped from the result.
//! - Otherwise consecutive tracks by the same primary artist form a tanda.
//!
//! The first artist is the orchestra; everything after it is treated as singers.

use crate::error::{ImportError, Result};
use crate::grouping::{assemble_tandas, split_on_key_change, split_on_separators, TandaParts};
use crate::models::{Genre, ImportResult, ImportedSong, ImportedTanda};
use crate::normalize::{
    build_search_query, classify_genre, is_cortina_label, majority_vote, normalize_artist,
    normalize_singer,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use url::Url;

static PLAYLIST_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{22}$").expect("valid playlist id regex"));
static PLAYLIST_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"spotify:playlist:([a-zA-Z0-9]+)").expect("valid playlist uri regex"));
static PLAYLIST_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/playlist/([a-zA-Z0-9]+)").expect("valid playlist path regex"));

/// `null` reads as the type's default, like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Artist names with `null` entries dropped.
fn artist_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(names.into_iter().flatten().flatten().collect())
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SpotifyTrack {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "artist_names")]
    pub artists: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub album: String,
    pub year: Option<i32>,
    #[serde(deserialize_with = "null_as_default")]
    pub duration_ms: i64,
}

impl SpotifyTrack {
    fn first_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or_default()
    }

    fn orchestra(&self) -> String {
        normalize_artist(self.first_artist())
    }

    /// Names after a comma in the first artist, then every further artist.
    fn singers(&self) -> Option<String> {
        let mut singers: Vec<&str> = self
            .first_artist()
            .split(',')
            .skip(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        singers.extend(
            self.artists
                .iter()
                .skip(1)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty()),
        );
        normalize_singer(&singers.join(", "))
    }

    /// No genre field on Spotify; title and album text stand in for it.
    fn genre(&self) -> Genre {
        classify_genre(&format!("{} {}", self.name, self.album))
    }

    fn is_cortina(&self) -> bool {
        is_cortina_label(&self.name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SpotifyPlaylistData {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tracks: Vec<SpotifyTrack>,
}

impl SpotifyPlaylistData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpotifyOptions {
    /// Treat a playlist that yields no tandas as an error.
    pub fail_on_empty: bool,
}

/// Converts Spotify playlist data into tandas with the default options.
///
/// An empty track list is a valid, empty result. Callers decide what "nothing to
/// import" means for them.
pub fn spotify_to_import_result(data: &SpotifyPlaylistData) -> ImportResult {
    let tandas = build_tandas(data);
    info!("Spotify import '{}': {} tandas", data.name, tandas.len());

    ImportResult {
        playlist_name: data.name.clone(),
        tandas,
        cortinas: Vec::new(),
        skipped_tracks: Vec::new(),
    }
}

pub fn spotify_to_import_result_with(
    data: &SpotifyPlaylistData,
    options: &SpotifyOptions,
) -> Result<ImportResult> {
    let result = spotify_to_import_result(data);
    if result.is_empty() && options.fail_on_empty {
        return Err(ImportError::NothingImportable(data.name.clone()));
    }
    Ok(result)
}

fn build_tandas(data: &SpotifyPlaylistData) -> Vec<ImportedTanda> {
    let tracks: Vec<&SpotifyTrack> = data.tracks.iter().collect();

    let groups = if tracks.iter().any(|t| t.is_cortina()) {
        split_on_separators(tracks, |t| t.is_cortina()).0
    } else {
        split_on_key_change(tracks, |t| t.orchestra())
    };

    assemble_tandas(&groups, |run| reduce_tracks(run))
}

fn reduce_tracks(tracks: &[&SpotifyTrack]) -> TandaParts {
    let orchestra = majority_vote(tracks, |t| t.orchestra()).unwrap_or_default();
    let genre = majority_vote(tracks, |t| t.genre()).unwrap_or(Genre::Tango);

    let songs = tracks
        .iter()
        .map(|t| {
            let singer = t.singers();
            let year = t.year.filter(|y| *y != 0);
            let search_query = build_search_query(&t.name, &orchestra, singer.as_deref(), year);
            ImportedSong::new(
                t.name.clone(),
                t.orchestra(),
                singer,
                year,
                String::new(),
                search_query,
            )
        })
        .collect();

    TandaParts {
        orchestra,
        genre,
        songs,
    }
}

/// Playlist id from a bare id, a `spotify:playlist:` URI or an open.spotify.com URL.
pub fn extract_playlist_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if PLAYLIST_ID.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    if let Some(caps) = PLAYLIST_URI.captures(trimmed) {
        return Some(caps[1].to_string());
    }
    let url = Url::parse(trimmed).ok()?;
    PLAYLIST_PATH
        .captures(url.path())
        .map(|caps| caps[1].to_string())
}

pub fn is_valid_spotify_url(input: &str) -> bool {
    extract_playlist_id(input).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, artists: &[&str], album: &str) -> SpotifyTrack {
        SpotifyTrack {
            name: name.into(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album: album.into(),
            year: None,
            duration_ms: 180_000,
        }
    }

    #[test]
    fn singers_from_comma_and_extra_artists() {
        let t = track(
            "Bahía Blanca",
            &["Carlos di Sarli, Roberto Florio", "Jorge Durán"],
            "",
        );
        assert_eq!(t.singers().as_deref(), Some("Roberto Florio, Jorge Durán"));
        assert_eq!(t.orchestra(), "Carlos di Sarli");

        let solo = track("La yumba", &["Osvaldo Pugliese"], "");
        assert_eq!(solo.singers(), None);

        let instrumental = track("Loca", &["Juan D'Arienzo", "Instrumental"], "");
        assert_eq!(instrumental.singers(), None);
    }

    #[test]
    fn genre_from_name_and_album() {
        assert_eq!(track("Poema", &["Canaro"], "Grandes éxitos").genre(), Genre::Tango);
        assert_eq!(track("Desde el alma", &["Canaro"], "Valses de oro").genre(), Genre::Vals);
        assert_eq!(track("Desde el alma (Vals)", &["Canaro"], "").genre(), Genre::Vals);
        assert_eq!(track("Reliquias", &["Canaro"], "Milongas 1938").genre(), Genre::Milonga);
    }

    #[test]
    fn artist_runs_without_cortinas() {
        let data = SpotifyPlaylistData {
            name: "Sunday".into(),
            description: String::new(),
            tracks: vec![
                track("A", &["Carlos Di Sarli y su Orquesta Típica"], ""),
                track("B", &["Carlos di Sarli, Roberto Florio"], ""),
                track("C", &["Aníbal Troilo"], ""),
            ],
        };
        let result = spotify_to_import_result(&data);

        assert_eq!(result.tandas.len(), 2);
        assert_eq!(result.tandas[0].songs.len(), 2);
        // Tie between spellings: first seen wins
        assert_eq!(result.tandas[0].orchestra, "Carlos Di Sarli");
        assert_eq!(result.tandas[1].orchestra, "Aníbal Troilo");
        assert_eq!(result.tandas[1].num, 2);
    }

    #[test]
    fn cortinas_split_and_disappear() {
        let data = SpotifyPlaylistData {
            name: "Milonga".into(),
            description: String::new(),
            tracks: vec![
                track("A", &["Troilo"], ""),
                track("B", &["Biagi"], ""),
                track("Cortina - Fly me to the moon", &["Sinatra"], ""),
                track("C", &["Troilo"], ""),
            ],
        };
        let result = spotify_to_import_result(&data);

        assert_eq!(result.tandas.len(), 2);
        // Mixed artists stay together when cortinas decide the boundaries
        assert_eq!(result.tandas[0].songs.len(), 2);
        assert!(result.cortinas.is_empty());
        assert!(result
            .tandas
            .iter()
            .flat_map(|t| &t.songs)
            .all(|s| !s.title.contains("Cortina")));
    }

    #[test]
    fn empty_playlist_is_not_an_error() {
        let data = SpotifyPlaylistData::default();
        let result = spotify_to_import_result(&data);
        assert!(result.tandas.is_empty());

        let strict = SpotifyOptions { fail_on_empty: true };
        assert!(spotify_to_import_result_with(&data, &strict).is_err());
    }

    #[test]
    fn playlist_id_forms() {
        let id = "37i9dQZF1DXcBWIGoYBM5M";
        assert_eq!(extract_playlist_id(id).as_deref(), Some(id));
        assert_eq!(
            extract_playlist_id(&format!("spotify:playlist:{}", id)).as_deref(),
            Some(id)
        );
        assert_eq!(
            extract_playlist_id(&format!("https://open.spotify.com/playlist/{}?si=abc", id))
                .as_deref(),
            Some(id)
        );
        assert_eq!(extract_playlist_id("not a playlist"), None);
        assert!(!is_valid_spotify_url("https://open.spotify.com/album/xyz"));
    }

    #[test]
    fn null_fields_read_as_empty() {
        let json = r#"{
            "name": null,
            "description": null,
            "tracks": [
                { "name": "La cumparsita", "artists": ["Juan D'Arienzo", null], "album": null, "year": null, "duration_ms": null },
                { "name": null, "artists": null, "album": "Milongas" }
            ]
        }"#;
        let data = SpotifyPlaylistData::from_json(json).unwrap();

        assert_eq!(data.name, "");
        assert_eq!(data.tracks.len(), 2);
        assert_eq!(data.tracks[0].artists, vec!["Juan D'Arienzo"]);
        assert_eq!(data.tracks[0].album, "");
        assert_eq!(data.tracks[0].duration_ms, 0);
        assert!(data.tracks[1].artists.is_empty());

        let result = spotify_to_import_result(&data);
        assert_eq!(result.tandas[0].orchestra, "Juan D'Arienzo");
        assert_eq!(result.tandas[0].songs[0].singer, None);
    }

    #[test]
    fn null_track_list_is_empty() {
        let data = SpotifyPlaylistData::from_json(r#"{"name": "Nada", "tracks": null}"#).unwrap();
        assert!(data.tracks.is_empty());
    }
}
