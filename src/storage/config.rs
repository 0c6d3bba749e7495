//! Rider settings and application configuration.
//!
//! Stored as TOML at `<data_dir>/config.toml`. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const FTP_RANGE_ERROR: &str = "FTP must be between 50 and 600 watts";

/// Rider physiology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiderSettings {
    /// Functional Threshold Power in watts (50-600)
    pub ftp: u16,
}

impl Default for RiderSettings {
    fn default() -> Self {
        Self { ftp: 200 }
    }
}

impl RiderSettings {
    /// Update FTP after range validation.
    pub fn set_ftp(&mut self, ftp: u16) -> Result<(), &'static str> {
        if !Self::validate_ftp(ftp) {
            return Err(FTP_RANGE_ERROR);
        }

        self.ftp = ftp;
        Ok(())
    }

    /// Validate FTP value (50-600 watts).
    pub fn validate_ftp(ftp: u16) -> bool {
        (50..=600).contains(&ftp)
    }
}

/// Playback loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Clock polls per second
    pub tick_hz: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { tick_hz: 60 }
    }
}

impl PlaybackSettings {
    /// Time between polls. A rate of 0 is treated as 1 Hz.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Draw the target band under the status line
    pub show_band: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { show_band: true }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path (not serialized)
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Rider settings
    pub rider: RiderSettings,
    /// Playback settings
    pub playback: PlaybackSettings,
    /// Display settings
    pub display: DisplaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            rider: RiderSettings::default(),
            playback: PlaybackSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "cycletraining", "CycleTraining")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from `path`, falling back to defaults when it does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(get_data_dir);

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig {
            data_dir,
            ..Default::default()
        });
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    if !RiderSettings::validate_ftp(config.rider.ftp) {
        return Err(ConfigError::ParseError(FTP_RANGE_ERROR.to_string()));
    }

    config.data_dir = data_dir;

    Ok(config)
}

/// Save configuration to `path`, creating its directory if needed.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
