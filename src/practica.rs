//! The practice-set shape handed to persistence once an import has been reviewed.

use crate::models::{Genre, ImportResult, ImportedSong, ImportedTanda};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub singer: Option<String>,
    pub year: Option<i32>,
    pub video_id: String,
    pub video_title: String,
    pub thumbnail: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tanda {
    pub id: String,
    pub num: usize,
    pub orchestra: String,
    pub genre: Genre,
    pub songs: Vec<Song>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SetSummary {
    pub genre_summary: Vec<Genre>, // Distinct, first-seen order
    pub tanda_count: usize,
    pub song_count: usize,
}

impl SetSummary {
    pub fn from_tandas(tandas: &[Tanda]) -> Self {
        let mut genre_summary = Vec::new();
        for tanda in tandas {
            if !genre_summary.contains(&tanda.genre) {
                genre_summary.push(tanda.genre);
            }
        }
        Self {
            genre_summary,
            tanda_count: tandas.len(),
            song_count: tandas.iter().map(|t| t.songs.len()).sum(),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl From<&ImportedSong> for Song {
    fn from(song: &ImportedSong) -> Self {
        Song {
            id: new_id(),
            title: song.title.clone(),
            singer: song.singer.clone(),
            year: song.year,
            video_id: song.video_id.clone(),
            video_title: song.video_title.clone(),
            thumbnail: song.thumbnail.clone(),
        }
    }
}

fn tanda_from_import(num: usize, tanda: &ImportedTanda) -> Tanda {
    Tanda {
        id: new_id(),
        num,
        orchestra: tanda.orchestra.clone(),
        genre: tanda.genre,
        songs: tanda.songs.iter().map(Song::from).collect(),
    }
}

/// Persisted tandas for an import, renumbered 1..N in their current order.
pub fn tandas_from_import(result: &ImportResult) -> Vec<Tanda> {
    result
        .tandas
        .iter()
        .enumerate()
        .map(|(i, tanda)| tanda_from_import(i + 1, tanda))
        .collect()
}
