use std::io::Write;
use std::path::Path;
use tandaset::config::ImportConfig;
use tandaset::csv_import::parse_csv_to_tandas_with;
use tandaset::error::ConfigError;

const FULL_CONFIG: &str = r#"
[csv]
fail_on_empty = false

[spotify]
fail_on_empty = true

[apple]
report_missing_tracks = false

[logging]
level = "tandaset=debug"
debug = true
to_file = true
dir = "/tmp/tandaset-logs"
"#;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();

    let config = ImportConfig::load(file.path()).unwrap();
    assert!(!config.csv.fail_on_empty);
    assert!(config.spotify.fail_on_empty);
    assert!(!config.apple.report_missing_tracks);
    assert_eq!(config.logging.level, "tandaset=debug");
    assert!(config.logging.debug);
    assert!(config.logging.to_file);
    assert_eq!(
        config.logging.dir.as_deref(),
        Some(Path::new("/tmp/tandaset-logs"))
    );
}

#[test]
fn test_load_or_default() {
    let config = ImportConfig::load_or_default(None).unwrap();
    assert!(config.csv.fail_on_empty);
    assert!(!config.logging.to_file);

    let dir = tempfile::tempdir().unwrap();
    let missing = ImportConfig::load_or_default(Some(&dir.path().join("tandaset.toml")));
    assert!(matches!(missing, Err(ConfigError::Io(_))));
}

#[test]
fn test_unknown_type_is_parse_error() {
    let err = ImportConfig::from_toml("[csv]\nfail_on_empty = \"sometimes\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("Configuration parse error"));
}

#[test]
fn test_csv_options_from_config() {
    let config = ImportConfig::from_toml("[csv]\nfail_on_empty = false\n").unwrap();
    let result = parse_csv_to_tandas_with("orchestra,title\n", &config.csv).unwrap();
    assert!(result.tandas.is_empty());

    let strict = ImportConfig::default();
    assert!(parse_csv_to_tandas_with("orchestra,title\n", &strict.csv).is_err());
}
