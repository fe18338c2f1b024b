//! Configuration module for the serial plotter
//!
//! This module handles application configuration including:
//! - The TOML configuration file (serial port, framing, filters, follow window)
//! - Application state persistence (last used port and baud rate)
//!
//! # App Data Location
//!
//! Application state is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/serial-plotter/`
//! - **macOS**: `~/Library/Application Support/serial-plotter/`
//! - **Windows**: `%APPDATA%\serial-plotter\`
//!
//! # Example
//!
//! ```ignore
//! use serial_plotter::config::{AppConfig, AppState};
//!
//! let mut config = AppConfig::load_or_default("serial-plotter.toml");
//! let state = AppState::load_or_default();
//! state.apply_to(&mut config.serial);
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{PlotterError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "serial-plotter";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Default I/O time slice per frame in milliseconds
pub const DEFAULT_POLL_BUDGET_MS: u64 = 4;

/// Default size of a single serial read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 32;

/// Default interval between headless summaries in milliseconds
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 1000;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        PlotterError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            PlotterError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub data: DataConfig,

    /// Time slice spent draining serial reads per frame
    #[serde(default = "default_poll_budget_ms")]
    pub poll_budget_ms: u64,

    /// Bytes requested per read
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Interval between headless summaries
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

fn default_poll_budget_ms() -> u64 {
    DEFAULT_POLL_BUDGET_MS
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

fn default_report_interval_ms() -> u64 {
    DEFAULT_REPORT_INTERVAL_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            data: DataConfig::default(),
            poll_budget_ms: DEFAULT_POLL_BUDGET_MS,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(PlotterError::from)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        toml::from_str(&content).map_err(|e| {
            PlotterError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Load a configuration file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| PlotterError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(PlotterError::from)
            .with_context(|| format!("Failed to write config file {:?}", path))
    }

    /// Validate everything a session needs before it can be constructed
    pub fn validate(&self) -> Result<()> {
        self.serial.validate()?;
        self.data.validate()?;
        if self.read_buffer_size == 0 {
            return Err(PlotterError::Config(
                "read buffer size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== App State ====================

/// Persistent application state
///
/// Remembers the last successfully opened port between launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Last port that was opened successfully
    #[serde(default)]
    pub last_port: Option<String>,

    /// Baud rate used with `last_port`
    #[serde(default)]
    pub last_baud_rate: Option<u32>,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_port: None,
            last_baud_rate: None,
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            PlotterError::Config("Could not determine app state path".to_string())
        })?;
        Self::load_from(path)
    }

    /// Load app state from a specific file; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(PlotterError::from)
            .context("Failed to read app state")?;

        serde_json::from_str(&content)
            .map_err(|e| PlotterError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(APP_STATE_FILE))
    }

    /// Save app state to a specific file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PlotterError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(PlotterError::from)
            .context("Failed to write app state")
    }

    /// Remember a successful connection
    pub fn update_last_connection(&mut self, port: &str, baud_rate: u32) {
        self.last_port = Some(port.to_string());
        self.last_baud_rate = Some(baud_rate);
    }

    /// Fill an unset port (and its baud rate) from the remembered connection
    pub fn apply_to(&self, serial: &mut SerialConfig) {
        if !serial.port.is_empty() {
            return;
        }
        if let Some(port) = &self.last_port {
            serial.port = port.clone();
            if let Some(baud) = self.last_baud_rate {
                serial.baud_rate = baud;
            }
        }
    }
}
