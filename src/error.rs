use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV is empty")]
    EmptyCsv,

    #[error("No tandas found. Check that your CSV has at least orchestra and title columns.")]
    NoTandas,

    #[error("Invalid XML: {0}")]
    InvalidXml(#[from] roxmltree::Error),

    #[error("No root dict found in plist")]
    MissingRootDict,

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("Nothing importable in playlist '{0}'")]
    NothingImportable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid playlist JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
