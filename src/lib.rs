pub mod config;
pub mod csv_import;
pub mod error;
pub mod grouping;
pub mod library_parser;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod playlist_import;
pub mod practica;
pub mod spotify_import;
pub mod video;

pub use csv_import::{parse_csv_to_tandas, CSV_EXAMPLE};
pub use error::{ImportError, Result};
pub use library_parser::{parse_plist_xml, Library, LibraryPlaylist, LibraryTrack};
pub use models::{Genre, ImportResult, ImportedSong, ImportedTanda, RawTrack, SearchStatus};
pub use playlist_import::import_playlist;
pub use spotify_import::{spotify_to_import_result, SpotifyPlaylistData, SpotifyTrack};
