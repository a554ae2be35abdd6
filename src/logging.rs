use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Maximum size per log file before rotation (~5 MB)
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// Number of rotated log files to keep
const MAX_LOG_FILES: usize = 5;
const LOG_NAME: &str = "tandaset";

/// Append-only log file that rotates by size:
/// tandaset.log → tandaset.1.log → tandaset.2.log → …
pub struct RotatingLogFile {
    dir: PathBuf,
    max_size: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RotatingLogFile {
    pub fn open<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        Self::with_limits(dir, MAX_LOG_FILE_SIZE, MAX_LOG_FILES)
    }

    pub fn with_limits<P: AsRef<Path>>(dir: P, max_size: u64, max_files: usize) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.log", LOG_NAME));
        let written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let file = open_append(&path)?;

        let mut log = Self {
            dir,
            max_size,
            max_files,
            file,
            written,
        };
        let marker = format!(
            "=== tandaset session started at {} ===\n",
            Local::now().format("%Y-%m-%d %H:%M:%S %Z")
        );
        log.write_all(marker.as_bytes())?;
        Ok(log)
    }

    pub fn current_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", LOG_NAME))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}.log", LOG_NAME, index))
    }

    fn rotate_if_needed(&mut self) -> io::Result<()> {
        if self.written < self.max_size {
            return Ok(());
        }

        // Shift existing rotated files, the oldest falls off
        for i in (1..self.max_files).rev() {
            let from = self.rotated_path(i);
            if from.exists() {
                let _ = fs::rename(&from, self.rotated_path(i + 1));
            }
        }
        fs::rename(self.current_path(), self.rotated_path(1))?;

        self.file = open_append(&self.current_path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.rotate_if_needed()?;
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Platform default: <local data dir>/tandaset/logs
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(LOG_NAME).join("logs"))
}

/// Log directory when file logging is on: the configured one, else the platform default.
pub fn resolve_log_dir(config: &LoggingConfig) -> Option<PathBuf> {
    if !config.to_file {
        return None;
    }
    config.dir.clone().or_else(default_log_dir)
}

fn filter_for(config: &LoggingConfig) -> EnvFilter {
    if config.debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global subscriber: stderr always, plus the rotating file when configured.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_layer = match resolve_log_dir(config) {
        Some(dir) => {
            let file = RotatingLogFile::open(&dir)
                .with_context(|| format!("Failed to open log directory {:?}", dir))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter_for(config))
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}
