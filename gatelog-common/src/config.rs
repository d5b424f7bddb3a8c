//! Configuration loading and data folder resolution
//!
//! Resolution follows a 4-tier priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: the service logs a
//! warning and starts with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default service port
pub const DEFAULT_PORT: u16 = 5780;

/// Default reader poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default post-scan debounce delay in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Which clock backs scan timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockKind {
    /// Seconds since process start (original demo behavior)
    Uptime,
    /// Unix wall-clock seconds
    Wall,
}

impl Default for ClockKind {
    fn default() -> Self {
        ClockKind::Uptime
    }
}

/// Optional settings read from the TOML config file
///
/// Every field is optional; absent fields fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub data_dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub reader_path: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub clock: Option<ClockKind>,
}

impl TomlConfig {
    /// Parse a config file, tolerating absence.
    ///
    /// Returns defaults (all None) if the file does not exist. A file that
    /// exists but fails to parse is reported as a Config error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root data folder; users dir and attendance CSV live under it
    pub data_dir: PathBuf,
    /// Service port
    pub port: u16,
    /// Device or FIFO path the token reader emits UIDs on (None = web-only)
    pub reader_path: Option<PathBuf>,
    /// Reader poll interval
    pub poll_interval_ms: u64,
    /// Delay after a completed scan before polling resumes
    pub debounce_ms: u64,
    /// Timestamp source
    pub clock: ClockKind,
}

impl Config {
    /// Resolve the full configuration from CLI arguments, environment,
    /// config file, and compiled defaults.
    ///
    /// `cli_data_dir` and `cli_port` come from clap; the `GATELOG_DATA_DIR`
    /// environment variable is consulted for the data folder.
    pub fn resolve(
        cli_data_dir: Option<PathBuf>,
        cli_port: Option<u16>,
        config_path: Option<PathBuf>,
    ) -> Config {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let toml = match TomlConfig::load(&config_path) {
            Ok(toml) => toml,
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                TomlConfig::default()
            }
        };

        let data_dir = cli_data_dir
            .or_else(|| std::env::var("GATELOG_DATA_DIR").ok().map(PathBuf::from))
            .or_else(|| toml.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        Config {
            data_dir,
            port: cli_port.or(toml.port).unwrap_or(DEFAULT_PORT),
            reader_path: toml.reader_path,
            poll_interval_ms: toml.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            debounce_ms: toml.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            clock: toml.clock.unwrap_or_default(),
        }
    }

    /// Directory holding one JSON record per identity
    pub fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    /// Attendance CSV path
    pub fn attendance_csv(&self) -> PathBuf {
        self.data_dir.join("attendance.csv")
    }

    /// Create the data and users directories if absent
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(self.users_dir())?;
        Ok(())
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("gatelog").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("/etc/gatelog/config.toml"))
}

/// OS-dependent default data folder path
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("gatelog"))
        .unwrap_or_else(|| PathBuf::from("./gatelog_data"))
}
