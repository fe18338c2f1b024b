//! Serial and plot settings
//!
//! These are the values the core consumes: which port to open and how to
//! frame its output ([`SerialConfig`]), and how to filter and window the
//! plotted series ([`DataConfig`]).

use crate::error::{PlotterError, Result};
use crate::filter::MATCH_ALL_PATTERN;
use crate::input::separator::{BaudRatePicker, LineSeparator};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Default baud rate (common Arduino default)
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default follow window in samples
pub const DEFAULT_FOLLOW_WINDOW: usize = 300;

/// Range offered by the follow-window drag control
pub const FOLLOW_WINDOW_UI_RANGE: RangeInclusive<usize> = 100..=50_000;

/// Serial port settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port name; empty means "do not auto-start"
    #[serde(default)]
    pub port: String,

    /// Baud rate, must be one of [`BaudRatePicker::RATES`]
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Echo every received byte to stdout
    #[serde(default)]
    pub mirror: bool,

    /// Line separator: `nl`, `cr`, `nlcr`, `crnl` or an escaped literal
    #[serde(default = "default_line_separator")]
    pub line_separator: String,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_line_separator() -> String {
    "nl".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            mirror: false,
            line_separator: default_line_separator(),
        }
    }
}

impl SerialConfig {
    /// Check the baud rate and separator against the supported sets
    pub fn validate(&self) -> Result<()> {
        BaudRatePicker::new().set_selection(self.baud_rate)?;
        self.separator()?;
        Ok(())
    }

    /// The decoded line separator
    pub fn separator(&self) -> Result<LineSeparator> {
        self.line_separator.parse()
    }

    /// Whether the session should open the port on startup
    pub fn auto_start(&self) -> bool {
        !self.port.is_empty()
    }
}

/// Plot data settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Names that are stored at all
    ///
    /// Searched anywhere in the name; use `^name$` for an exact match
    #[serde(default = "default_filter")]
    pub name_filter: String,

    /// Stored series that are displayed, searched the same way as
    /// `name_filter`
    #[serde(default = "default_filter")]
    pub graph_filter: String,

    /// Show only the most recent `follow_window` samples
    #[serde(default = "default_true")]
    pub follow: bool,

    /// Number of samples in the follow window
    #[serde(default = "default_follow_window")]
    pub follow_window: usize,
}

fn default_filter() -> String {
    MATCH_ALL_PATTERN.to_string()
}

fn default_true() -> bool {
    true
}

fn default_follow_window() -> usize {
    DEFAULT_FOLLOW_WINDOW
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            name_filter: default_filter(),
            graph_filter: default_filter(),
            follow: true,
            follow_window: DEFAULT_FOLLOW_WINDOW,
        }
    }
}

impl DataConfig {
    pub fn validate(&self) -> Result<()> {
        validate_follow_window(self.follow_window)
    }
}

/// The core accepts any positive window
pub fn validate_follow_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(PlotterError::Config(
            "follow window must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Clamp a window to the range the UI control offers
pub fn clamp_follow_window_for_ui(window: usize) -> usize {
    window.clamp(*FOLLOW_WINDOW_UI_RANGE.start(), *FOLLOW_WINDOW_UI_RANGE.end())
}
