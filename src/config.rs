use crate::csv_import::CsvOptions;
use crate::error::ConfigError;
use crate::playlist_import::AppleOptions;
use crate::spotify_import::SpotifyOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset.
    pub level: String,
    pub debug: bool,
    /// Also log to a rotating file.
    pub to_file: bool,
    /// Log file directory; the platform default is used when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug: false,
            to_file: false,
            dir: None,
        }
    }
}

/// Import settings, usually read from `tandaset.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImportConfig {
    pub csv: CsvOptions,
    pub spotify: SpotifyOptions,
    pub apple: AppleOptions,
    pub logging: LoggingConfig,
}

impl ImportConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_pipeline_asymmetry() {
        let config = ImportConfig::default();
        assert!(config.csv.fail_on_empty);
        assert!(!config.spotify.fail_on_empty);
        assert!(config.apple.report_missing_tracks);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = ImportConfig::from_toml("[spotify]\nfail_on_empty = true\n").unwrap();
        assert!(config.spotify.fail_on_empty);
        assert!(config.csv.fail_on_empty);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = ImportConfig::from_toml("[csv\nfail_on_empty = maybe").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
