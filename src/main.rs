use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tandaset::config::ImportConfig;
use tandaset::csv_import::{parse_csv_to_tandas_with, CSV_EXAMPLE};
use tandaset::library_parser::parse_library_file;
use tandaset::logging::init_logging;
use tandaset::playlist_import::import_playlist_with;
use tandaset::spotify_import::{spotify_to_import_result_with, SpotifyPlaylistData};
use tandaset::ImportError;
use tracing::info;

#[derive(Parser)]
#[command(name = "tandaset", version, about = "Import playlists as tango practice sets")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "TANDASET_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a CSV file (orchestra,title,year,singer,genre)
    Csv { file: PathBuf },
    /// List the playlists of an Apple Music XML export, or import one of them
    Apple {
        file: PathBuf,
        #[arg(long)]
        playlist: Option<String>,
    },
    /// Import a Spotify playlist JSON document
    Spotify { file: PathBuf },
    /// Import the built-in CSV example
    Example,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistEntry<'a> {
    name: &'a str,
    item_count: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ImportConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if cli.debug {
        config.logging.debug = true;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Command::Csv { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read CSV {:?}", file))?;
            print_json(&parse_csv_to_tandas_with(&text, &config.csv)?)
        }
        Command::Apple { file, playlist } => {
            let library = parse_library_file(&file)
                .with_context(|| format!("Failed to read Apple Music library {:?}", file))?;
            match playlist {
                Some(name) => {
                    let playlist = library
                        .find_playlist(&name)
                        .ok_or_else(|| ImportError::PlaylistNotFound(name.clone()))?;
                    print_json(&import_playlist_with(&library, playlist, &config.apple)?)
                }
                None => {
                    let entries: Vec<PlaylistEntry> = library
                        .importable_playlists()
                        .map(|p| PlaylistEntry {
                            name: &p.name,
                            item_count: p.track_ids.len(),
                        })
                        .collect();
                    info!("{} importable playlists", entries.len());
                    print_json(&entries)
                }
            }
        }
        Command::Spotify { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read Spotify playlist {:?}", file))?;
            let data = SpotifyPlaylistData::from_json(&json)?;
            print_json(&spotify_to_import_result_with(&data, &config.spotify)?)
        }
        Command::Example => print_json(&parse_csv_to_tandas_with(CSV_EXAMPLE, &config.csv)?),
    }
}
