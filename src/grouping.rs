//! Splitting ordered track lists into contiguous runs, one run per tanda.

use crate::models::{Genre, ImportedSong, ImportedTanda};

/// Splits `items` into runs separated by the items for which `is_separator` holds.
///
/// Separators never end up in a run; they are returned separately, in order.
/// Empty runs (two separators in a row, leading/trailing separators) are dropped.
pub fn split_on_separators<T, F>(items: Vec<T>, is_separator: F) -> (Vec<Vec<T>>, Vec<T>)
where
    F: Fn(&T) -> bool,
{
    let mut groups = Vec::new();
    let mut separators = Vec::new();
    let mut current = Vec::new();

    for item in items {
        if is_separator(&item) {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            separators.push(item);
        } else {
            current.push(item);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    (groups, separators)
}

/// Starts a new run whenever `key` changes (case-insensitively) from the previous item.
///
/// While the current key is empty, no item closes the run.
pub fn split_on_key_change<T, F>(items: Vec<T>, key: F) -> Vec<Vec<T>>
where
    F: Fn(&T) -> String,
{
    let mut groups = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_key = String::new();

    for item in items {
        let item_key = key(&item);
        if !current_key.is_empty() && item_key.to_lowercase() != current_key.to_lowercase() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        }
        current_key = item_key;
        current.push(item);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Orchestra, genre and songs reduced from one run of tracks.
pub struct TandaParts {
    pub orchestra: String,
    pub genre: Genre,
    pub songs: Vec<ImportedSong>,
}

/// Turns runs into tandas numbered 1..N. Runs that reduce to no songs are skipped
/// without leaving a gap in the numbering.
pub fn assemble_tandas<T, F>(groups: &[Vec<T>], mut reduce: F) -> Vec<ImportedTanda>
where
    F: FnMut(&[T]) -> TandaParts,
{
    let mut tandas = Vec::with_capacity(groups.len());
    for group in groups {
        if group.is_empty() {
            continue;
        }
        let parts = reduce(group);
        if parts.songs.is_empty() {
            continue;
        }
        tandas.push(ImportedTanda {
            num: tandas.len() + 1,
            orchestra: parts.orchestra,
            genre: parts.genre,
            songs: parts.songs,
        });
    }
    tandas
}
