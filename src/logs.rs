//! User-facing log panels
//!
//! The session reports parse failures, transport errors and raw input lines
//! through a [`LogSink`]. [`MessageLog`] is the in-memory implementation the
//! application displays; every entry is also forwarded to `tracing`.

use std::fmt;

/// Destination for user-visible log entries
pub trait LogSink {
    /// Append one complete entry
    fn add_entry(&mut self, entry: String);

    /// Format and append an entry
    ///
    /// ```ignore
    /// logs.add(format_args!("Error parsing a value ({}): {}", err, value));
    /// ```
    fn add(&mut self, args: fmt::Arguments<'_>) {
        self.add_entry(args.to_string());
    }
}

/// Severity used when mirroring entries into `tracing`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Raw device input
    Debug,
    /// Errors and status messages
    Warn,
}

/// An in-memory, append-only log panel
#[derive(Debug, Clone)]
pub struct MessageLog {
    name: String,
    level: LogLevel,
    entries: Vec<String>,
    /// Whether the panel keeps scrolled to the newest entry
    pub auto_scroll: bool,
}

impl MessageLog {
    /// Create a new, empty log panel
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            level,
            entries: Vec::new(),
            auto_scroll: true,
        }
    }

    /// The "Messages" panel
    pub fn messages() -> Self {
        Self::new("Messages", LogLevel::Warn)
    }

    /// The "RAW" panel
    pub fn raw() -> Self {
        Self::new("RAW", LogLevel::Debug)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries joined by newlines, as copied to the clipboard
    pub fn to_clipboard_text(&self) -> String {
        self.entries.join("\n")
    }
}

impl LogSink for MessageLog {
    fn add_entry(&mut self, entry: String) {
        match self.level {
            LogLevel::Debug => tracing::debug!(target: "serial_plotter::logs", panel = %self.name, "{}", entry),
            LogLevel::Warn => tracing::warn!(target: "serial_plotter::logs", panel = %self.name, "{}", entry),
        }
        self.entries.push(entry);
    }
}
