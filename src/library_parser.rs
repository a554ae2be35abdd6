//! Apple Music / iTunes XML library parsing.
//!
//! The XML is walked into a [`plist::Value`] tree first, then tracks and playlists are
//! pulled out of the root dictionary. The walk is lenient: a `<key>` without a value
//! ends its dictionary instead of failing the whole document.

use crate::error::{ImportError, Result};
use crate::models::RawTrack;
use base64::Engine;
use chrono::DateTime;
use plist::{Dictionary, Value};
use roxmltree::{Document, Node, ParsingOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTrack {
    pub track_id: i64, // "Track ID", never 0
    pub name: String,
    pub artist: String,
    pub composer: String,
    pub album: String,
    pub genre: String,
    pub year: Option<i32>,
    pub comments: String, // Tango DJs keep the singer here
    pub total_time_ms: Option<i64>,
    pub bpm: Option<i64>,
}

impl From<&LibraryTrack> for RawTrack {
    fn from(track: &LibraryTrack) -> Self {
        RawTrack {
            track_id: Some(track.track_id),
            title: track.name.clone(),
            artist: track.artist.clone(),
            composer: track.composer.clone(),
            album: track.album.clone(),
            genre: track.genre.clone(),
            year: track.year,
            comments: track.comments.clone(),
            duration_ms: track.total_time_ms,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPlaylist {
    pub name: String,
    pub description: String,
    pub persistent_id: Option<String>,
    pub parent_persistent_id: Option<String>,
    pub is_folder: bool,
    pub track_ids: Vec<i64>, // In playlist order
}

#[derive(Debug, Clone, Default)]
pub struct Library {
    pub tracks: HashMap<i64, LibraryTrack>,
    pub playlists: Vec<LibraryPlaylist>,
}

impl Library {
    /// Case-insensitive lookup by playlist name. The first match wins.
    pub fn find_playlist(&self, name: &str) -> Option<&LibraryPlaylist> {
        let wanted = name.trim().to_lowercase();
        self.playlists
            .iter()
            .find(|p| p.name.trim().to_lowercase() == wanted)
    }

    /// Playlists worth offering for import: no folders, no empty lists.
    pub fn importable_playlists(&self) -> impl Iterator<Item = &LibraryPlaylist> {
        self.playlists
            .iter()
            .filter(|p| !p.is_folder && !p.track_ids.is_empty())
    }
}

pub fn parse_library_file<P: AsRef<Path>>(path: P) -> Result<Library> {
    let xml = std::fs::read_to_string(path.as_ref())?;
    parse_plist_xml(&xml)
}

/// Parses an Apple Music XML export into tracks and playlists.
///
/// Fails when the text is not well-formed XML or has no `<plist><dict>` root.
pub fn parse_plist_xml(xml: &str) -> Result<Library> {
    let root = parse_plist_tree(xml)?;

    let mut tracks = HashMap::new();
    if let Some(tracks_dict) = root.get("Tracks").and_then(Value::as_dictionary) {
        for (_key, track_value) in tracks_dict {
            let Some(track_info) = track_value.as_dictionary() else {
                continue;
            };
            let track = track_from_dict(track_info);
            if track.track_id == 0 {
                debug!("Dropping library track without an id: {:?}", track.name);
                continue;
            }
            tracks.insert(track.track_id, track);
        }
    }

    let playlists: Vec<LibraryPlaylist> = root
        .get("Playlists")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_dictionary)
                .map(playlist_from_dict)
                .collect()
        })
        .unwrap_or_default();

    info!(
        "Parsed library: {} tracks, {} playlists",
        tracks.len(),
        playlists.len()
    );

    Ok(Library { tracks, playlists })
}

/// Generic XML → value tree step. Returns the root dictionary.
pub fn parse_plist_tree(xml: &str) -> Result<Dictionary> {
    // Apple exports always carry a DOCTYPE
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(xml, options)?;

    let root = doc.root_element();
    if root.tag_name().name() != "plist" {
        return Err(ImportError::MissingRootDict);
    }
    let dict = element_children(root)
        .find(|n| n.tag_name().name() == "dict")
        .ok_or(ImportError::MissingRootDict)?;

    Ok(parse_dict_node(dict))
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Pairs every `<key>` with the element right after it.
fn parse_dict_node(node: Node) -> Dictionary {
    let mut dict = Dictionary::new();
    let children: Vec<Node> = element_children(node).collect();

    let mut i = 0;
    while i < children.len() {
        let child = children[i];
        if child.tag_name().name() != "key" {
            i += 1;
            continue;
        }
        let key = child.text().unwrap_or_default().to_string();
        let Some(value_node) = children.get(i + 1) else {
            debug!("plist key {:?} has no value, truncating dict", key);
            break;
        };
        if let Some(value) = parse_value(*value_node) {
            dict.insert(key, value);
        }
        i += 2;
    }
    dict
}

fn parse_value(node: Node) -> Option<Value> {
    let text = node.text().unwrap_or_default();
    let value = match node.tag_name().name() {
        "string" => Value::String(text.to_string()),
        "integer" => parse_integer(text),
        "real" => text
            .trim()
            .parse::<f64>()
            .map(Value::Real)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "date" => DateTime::parse_from_rfc3339(text.trim())
            .map(|date| Value::Date(SystemTime::from(date).into()))
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "data" => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact.as_bytes())
                .map(Value::Data)
                .unwrap_or_else(|_| Value::String(text.to_string()))
        }
        "dict" => Value::Dictionary(parse_dict_node(node)),
        "array" => Value::Array(element_children(node).filter_map(parse_value).collect()),
        _ => return None,
    };
    Some(value)
}

/// Unparseable integers stay strings so numeric lookups skip them.
fn parse_integer(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        Value::Integer(n.into())
    } else if let Ok(n) = trimmed.parse::<u64>() {
        Value::Integer(n.into())
    } else {
        Value::String(text.to_string())
    }
}

fn get_string(dict: &Dictionary, key: &str) -> String {
    dict.get(key)
        .and_then(Value::as_string)
        .unwrap_or_default()
        .to_string()
}

fn get_optional_string(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key).and_then(Value::as_string).map(str::to_string)
}

fn get_int(dict: &Dictionary, key: &str) -> Option<i64> {
    dict.get(key).and_then(Value::as_signed_integer)
}

fn track_from_dict(dict: &Dictionary) -> LibraryTrack {
    LibraryTrack {
        track_id: get_int(dict, "Track ID").unwrap_or(0),
        name: get_string(dict, "Name"),
        artist: get_string(dict, "Artist"),
        composer: get_string(dict, "Composer"),
        album: get_string(dict, "Album"),
        genre: get_string(dict, "Genre"),
        year: get_int(dict, "Year").and_then(|y| i32::try_from(y).ok()),
        comments: get_string(dict, "Comments"),
        total_time_ms: get_int(dict, "Total Time"),
        bpm: get_int(dict, "BPM"),
    }
}

fn playlist_from_dict(dict: &Dictionary) -> LibraryPlaylist {
    let track_ids = dict
        .get("Playlist Items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_dictionary)
                .filter_map(|item| get_int(item, "Track ID"))
                .collect()
        })
        .unwrap_or_default();

    LibraryPlaylist {
        name: get_string(dict, "Name"),
        description: get_string(dict, "Description"),
        persistent_id: get_optional_string(dict, "Playlist Persistent ID"),
        parent_persistent_id: get_optional_string(dict, "Parent Persistent ID"),
        is_folder: dict
            .get("Folder")
            .and_then(Value::as_boolean)
            .unwrap_or(false),
        track_ids,
    }
}
