//! Error handling for the serial plotter
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for serial plotter operations
#[derive(Error, Debug)]
pub enum PlotterError {
    /// Baud rate outside the supported enumeration
    #[error("Baud Rate out of range: {0}")]
    InvalidBaudRate(u32),

    /// Line separator that cannot be used for framing
    #[error("Invalid line separator: {0:?}")]
    InvalidSeparator(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors reported by the serial transport
    #[error("Serial port error: {0}")]
    Transport(String),

    /// A name or graph filter failed to compile
    #[error("Invalid filter {pattern:?}: {message}")]
    Filter { pattern: String, message: String },

    /// A telemetry value could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PlotterError>,
    },
}

impl PlotterError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PlotterError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error must prevent a session from being constructed
    ///
    /// A filter error only counts here when it comes from the initial
    /// configuration; edits at runtime keep the previous pattern instead.
    pub fn is_configuration(&self) -> bool {
        match self {
            PlotterError::InvalidBaudRate(_)
            | PlotterError::InvalidSeparator(_)
            | PlotterError::Filter { .. }
            | PlotterError::Config(_) => true,
            PlotterError::WithContext { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

impl From<serialport::Error> for PlotterError {
    fn from(err: serialport::Error) -> Self {
        PlotterError::Transport(err.description)
    }
}

/// Result type alias for serial plotter operations
pub type Result<T> = std::result::Result<T, PlotterError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
