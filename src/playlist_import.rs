//! Converts an Apple Music playlist into tandas.
//! Cortina tracks (genre like "4 Pausen & Cortinas") mark the tanda boundaries.

use crate::error::{ImportError, Result};
use crate::grouping::{assemble_tandas, split_on_separators, TandaParts};
use crate::library_parser::{Library, LibraryPlaylist, LibraryTrack};
use crate::models::{Genre, ImportResult, ImportedSong, RawTrack};
use crate::normalize::{
    build_search_query, classify_genre, is_cortina_label, majority_vote, normalize_singer,
    parse_orchestra,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppleOptions {
    /// List playlist entries missing from the library under `skippedTracks`.
    pub report_missing_tracks: bool,
    /// Treat a playlist that yields no tandas as an error.
    pub fail_on_empty: bool,
}

impl Default for AppleOptions {
    fn default() -> Self {
        Self {
            report_missing_tracks: true,
            fail_on_empty: false,
        }
    }
}

pub fn import_playlist(library: &Library, playlist: &LibraryPlaylist) -> Result<ImportResult> {
    import_playlist_with(library, playlist, &AppleOptions::default())
}

pub fn import_playlist_with(
    library: &Library,
    playlist: &LibraryPlaylist,
    options: &AppleOptions,
) -> Result<ImportResult> {
    let mut skipped_tracks = Vec::new();

    // Resolve ids in playlist order
    let mut ordered: Vec<&LibraryTrack> = Vec::with_capacity(playlist.track_ids.len());
    for track_id in &playlist.track_ids {
        match library.tracks.get(track_id) {
            Some(track) => ordered.push(track),
            None => {
                debug!("Track {} of '{}' is not in the library", track_id, playlist.name);
                if options.report_missing_tracks {
                    skipped_tracks.push(RawTrack {
                        track_id: Some(*track_id),
                        ..Default::default()
                    });
                }
            }
        }
    }

    let (groups, cortinas) = split_on_separators(ordered, |t| is_cortina_label(&t.genre));
    let tandas = assemble_tandas(&groups, |tracks| reduce_tracks(tracks));

    if tandas.is_empty() && options.fail_on_empty {
        return Err(ImportError::NothingImportable(playlist.name.clone()));
    }

    info!(
        "Imported '{}': {} tandas, {} cortinas, {} skipped",
        playlist.name,
        tandas.len(),
        cortinas.len(),
        skipped_tracks.len()
    );

    Ok(ImportResult {
        playlist_name: playlist.name.clone(),
        tandas,
        cortinas: cortinas.into_iter().map(RawTrack::from).collect(),
        skipped_tracks,
    })
}

fn reduce_tracks(tracks: &[&LibraryTrack]) -> TandaParts {
    let orchestra = majority_vote(tracks, |t| parse_orchestra(&t.artist)).unwrap_or_default();
    let genre = majority_vote(tracks, |t| classify_genre(&t.genre)).unwrap_or(Genre::Tango);

    let songs = tracks
        .iter()
        .map(|t| {
            let singer = normalize_singer(&t.comments);
            let year = t.year.filter(|y| *y != 0);
            let search_query = build_search_query(&t.name, &orchestra, singer.as_deref(), year);
            ImportedSong::new(
                t.name.clone(),
                t.artist.clone(),
                singer,
                year,
                t.composer.clone(),
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
