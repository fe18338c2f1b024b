//! Core data types for the serial plotter
//!
//! # Main Types
//!
//! - [`ConnectionStatus`] - Lifecycle state of the serial session
//! - [`XWindow`] - X-axis range the renderer should show this frame
//! - [`IncrementalStats`] - O(1) running min/max/average per series

use serde::{Deserialize, Serialize};

/// Connection status of the serial session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Port closed
    #[default]
    Disconnected,
    /// Opening and configuring the port
    Connecting,
    /// Port open, read chain armed
    Connected,
}

impl ConnectionStatus {
    /// Check if the session is connected
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
        }
    }
}

/// X-axis range for the current frame
///
/// Sample indices are the time axis, so both bounds are sample counts.
/// `Range` is half-open: `[min_x, max_x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XWindow {
    /// Follow mode is off, the full history is shown
    Unbounded,
    /// Follow mode is on
    Range { min_x: usize, max_x: usize },
}

impl XWindow {
    /// Compute the follow window from the longest series length
    pub fn follow(max_len: usize, window_size: usize) -> Self {
        let min_x = if max_len < window_size {
            0
        } else {
            max_len - window_size
        };
        XWindow::Range {
            min_x,
            max_x: max_len,
        }
    }

    /// Bounds as a tuple, `None` when unbounded
    pub fn bounds(&self) -> Option<(usize, usize)> {
        match *self {
            XWindow::Unbounded => None,
            XWindow::Range { min_x, max_x } => Some((min_x, max_x)),
        }
    }

    /// Slice of `values` that falls inside the window
    pub fn slice<'a>(&self, values: &'a [f64]) -> &'a [f64] {
        match *self {
            XWindow::Unbounded => values,
            XWindow::Range { min_x, max_x } => {
                let end = max_x.min(values.len());
                let start = min_x.min(end);
                &values[start..end]
            }
        }
    }
}

/// Incremental statistics tracker
/// This allows O(1) updates for mean, min, and max without iterating all data
#[derive(Debug, Clone)]
pub struct IncrementalStats {
    /// Current count of values
    pub count: u64,
    /// Running sum for average calculation
    pub sum: f64,
    /// Current minimum value
    pub min: f64,
    /// Current maximum value
    pub max: f64,
}

impl Default for IncrementalStats {
    fn default() -> Self {
        Self::new()
    }
}

impl IncrementalStats {
    /// Create a new empty stats tracker
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    /// Add a new value to the statistics
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Get the current average
    #[inline]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Get statistics as (min, max, avg) tuple
    #[inline]
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        if self.count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            (self.min, self.max, self.average())
        }
    }

    /// Build statistics over a slice
    pub fn from_slice(values: &[f64]) -> Self {
        let mut stats = Self::new();
        for &v in values {
            stats.push(v);
        }
        stats
    }
}
