//! CSV import.
//!
//! Expected columns: orchestra, title, year, singer, genre.
//! - Consecutive rows with the same orchestra form one tanda.
//! - A blank row, or a row without orchestra or title, ends the current tanda.
//! - Singer may be empty, "instrumental" or missing.
//! - Genre defaults to Tango when missing or unrecognised.

use crate::error::{ImportError, Result};
use crate::models::{Genre, ImportResult, ImportedSong, ImportedTanda};
use crate::normalize::{build_search_query, classify_genre, normalize_singer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CSV_EXAMPLE: &str = "orchestra,title,year,singer,genre
Di Sarli,Bahía Blanca,1957,,Tango
Di Sarli,A la gran muñeca,1951,,Tango
Di Sarli,Milonguero viejo,1956,,Tango
Di Sarli,Sans Souci,1954,,Tango

D'Arienzo,El flete,1937,,Tango
D'Arienzo,La bruja,1938,,Tango
D'Arienzo,Pensalo bien,1938,,Tango
D'Arienzo,Loca,1938,,Tango

Canaro,Desde el alma,1952,Nelly Omar,Vals
Canaro,Corazón de oro,1945,Eduardo Adrián,Vals
Canaro,Yo no sé por qué razón,1953,Carlos Roldán,Vals

Pugliese,La yumba,1946,,Tango
Pugliese,Recuerdo,1956,,Tango
Pugliese,Gallo ciego,1959,,Tango
Pugliese,La mariposa,1952,,Tango";

const HEADER_CELLS: [&str; 3] = ["orchestra", "title", "song"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Treat an import that yields no tandas as an error.
    pub fail_on_empty: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { fail_on_empty: true }
    }
}

/// Parses CSV text into tandas with the default options.
///
/// Fails on input without rows and on input that yields no tandas.
pub fn parse_csv_to_tandas(csv_text: &str) -> Result<ImportResult> {
    parse_csv_to_tandas_with(csv_text, &CsvOptions::default())
}

pub fn parse_csv_to_tandas_with(csv_text: &str, options: &CsvOptions) -> Result<ImportResult> {
    let rows = parse_rows(csv_text);
    if rows.is_empty() {
        return Err(ImportError::EmptyCsv);
    }

    let start = if is_header(&rows[0]) { 1 } else { 0 };
    let tandas = rows[start..]
        .iter()
        .fold(TandaAccumulator::default(), TandaAccumulator::accept)
        .finish();

    // Nothing importable is a user error for CSV, unlike Spotify.
    if tandas.is_empty() && options.fail_on_empty {
        return Err(ImportError::NoTandas);
    }

    info!(
        "CSV import: {} rows, {} tandas",
        rows.len() - start,
        tandas.len()
    );

    Ok(ImportResult {
        playlist_name: String::new(),
        tandas,
        cortinas: Vec::new(),
        skipped_tracks: Vec::new(),
    })
}

/// Splits text into rows of trimmed cells.
/// Commas inside double quotes do not split; `""` inside quotes is a literal quote.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    text.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> Vec<String> {
    let mut cols = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quote {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quote = false,
                _ => current.push(ch),
            }
        } else {
            match ch {
                '"' => in_quote = true,
                ',' => {
                    cols.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(ch),
            }
        }
    }
    cols.push(current.trim().to_string());
    cols
}

fn is_header(row: &[String]) -> bool {
    row.iter()
        .any(|cell| HEADER_CELLS.contains(&cell.to_lowercase().as_str()))
}

#[derive(Debug, PartialEq)]
enum Row {
    Blank,
    Incomplete,
    Song(SongRow),
}

#[derive(Debug, PartialEq)]
struct SongRow {
    orchestra: String,
    title: String,
    year: Option<i32>,
    singer: Option<String>,
    genre: Genre,
}

fn classify_row(cols: &[String]) -> Row {
    if cols.iter().all(|c| c.is_empty()) {
        return Row::Blank;
    }

    let cell = |i: usize| cols.get(i).map(|c| c.trim()).unwrap_or("");
    let orchestra = cell(0);
    let title = cell(1);
    if orchestra.is_empty() || title.is_empty() {
        return Row::Incomplete;
    }

    let genre_raw = cell(4);
    Row::Song(SongRow {
        orchestra: orchestra.to_string(),
        title: title.to_string(),
        year: parse_year(cell(2)),
        singer: normalize_singer(cell(3)),
        genre: if genre_raw.is_empty() {
            Genre::Tango
        } else {
            classify_genre(genre_raw)
        },
    })
}

/// Leading integer of the cell ("1957", "1957?" → 1957). Zero and garbage are no year.
fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i32>()
        .ok()
        .map(|year| sign * year)
        .filter(|year| *year != 0)
}

/// Mutable state of the top-to-bottom walk: the tanda being filled and the finished ones.
#[derive(Debug, Default)]
struct TandaAccumulator {
    tandas: Vec<ImportedTanda>,
    orchestra: String,
    genre: Genre,
    songs: Vec<ImportedSong>,
}

impl TandaAccumulator {
    fn accept(self, cols: &Vec<String>) -> Self {
        match classify_row(cols) {
            Row::Blank => self.flush(),
            Row::Incomplete => {
                debug!("CSV row without orchestra or title: {:?}", cols);
                self.flush()
            }
            Row::Song(row) => {
                let mut state = if !self.orchestra.is_empty()
                    && row.orchestra.to_lowercase() != self.orchestra.to_lowercase()
                {
                    self.flush()
                } else {
                    self
                };
                state.push(row);
                state
            }
        }
    }

    fn push(&mut self, row: SongRow) {
        let search_query =
            build_search_query(&row.title, &row.orchestra, row.singer.as_deref(), row.year);
        self.songs.push(ImportedSong::new(
            row.title,
            row.orchestra.clone(),
            row.singer,
            row.year,
            String::new(),
            search_query,
        ));
        self.orchestra = row.orchestra;
        self.genre = row.genre;
    }

    /// Closes the current tanda. A flush with no songs is a no-op.
    fn flush(mut self) -> Self {
        if self.songs.is_empty() {
            return self;
        }
        let num = self.tandas.len() + 1;
        self.tandas.push(ImportedTanda {
            num,
            orchestra: std::mem::take(&mut self.orchestra),
            genre: std::mem::take(&mut self.genre),
            songs: std::mem::take(&mut self.songs),
        });
        self
    }

    fn finish(self) -> Vec<ImportedTanda> {
        self.flush().tandas
    }
}
