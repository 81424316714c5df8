//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/almanac/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/almanac/` (~/.config/almanac/)
//! - Data: `$XDG_DATA_HOME/almanac/` (~/.local/share/almanac/)
//! - State/Logs: `$XDG_STATE_HOME/almanac/` (~/.local/state/almanac/)

use crate::error::{Error, Result};
use crate::render::RenderPolicy;
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Calendar and panel formatting
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Calendar and panel formatting
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// chrono format for dates in the upcoming panel
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// chrono format for times in the upcoming panel
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Characters per wrapped description line
    #[serde(default = "default_description_width")]
    pub description_width: usize,

    /// Description cap is `2 * description_width - description_margin`
    #[serde(default = "default_description_margin")]
    pub description_margin: usize,

    /// Spaces between the calendar and the upcoming panel
    #[serde(default = "default_panel_gap")]
    pub panel_gap: usize,

    /// Upcoming entries shown next to a single month
    #[serde(default = "default_single_month_entries")]
    pub single_month_entries: usize,

    /// Months shown by `show` when `--months` is not given
    #[serde(default = "default_months")]
    pub months: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            time_format: default_time_format(),
            description_width: default_description_width(),
            description_margin: default_description_margin(),
            panel_gap: default_panel_gap(),
            single_month_entries: default_single_month_entries(),
            months: default_months(),
        }
    }
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

fn default_description_width() -> usize {
    30
}

fn default_description_margin() -> usize {
    3
}

fn default_panel_gap() -> usize {
    10
}

fn default_single_month_entries() -> usize {
    2
}

fn default_months() -> u32 {
    1
}

/// Reject format strings chrono would fail on at display time.
fn check_format(key: &str, format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Config(format!(
            "display.{} is not a valid format string: {:?}",
            key, format
        )));
    }
    Ok(())
}

impl DisplayConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        check_format("date_format", &self.date_format)?;
        check_format("time_format", &self.time_format)?;

        if self.description_width == 0 {
            return Err(Error::Config(
                "display.description_width must be at least 1".to_string(),
            ));
        }
        if self.description_margin >= 2 * self.description_width {
            return Err(Error::Config(
                "display.description_margin must be smaller than twice description_width"
                    .to_string(),
            ));
        }
        if self.months == 0 {
            return Err(Error::Config(
                "display.months must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The formatting policy handed to the renderer.
    pub fn render_policy(&self) -> RenderPolicy {
        RenderPolicy {
            date_format: self.date_format.clone(),
            time_format: self.time_format.clone(),
            description_width: self.description_width,
            description_margin: self.description_margin,
            panel_gap: self.panel_gap,
            single_month_entries: self.single_month_entries,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.display.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/almanac/config.toml` (~/.config/almanac/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("almanac").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/almanac/` (~/.local/share/almanac/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("almanac")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/almanac/` (~/.local/state/almanac/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("almanac")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/almanac/data.db` (~/.local/share/almanac/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/almanac/almanac.log` (~/.local/state/almanac/almanac.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("almanac.log")
    }
}
