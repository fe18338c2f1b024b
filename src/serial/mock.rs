//! Mock Serial Transport for Running Without Hardware
//!
//! This module provides a transport that emits `name:value,...` telemetry
//! lines generated from configurable patterns, the way a sketch on a
//! development board would print them.
//!
//! # Data Patterns
//!
//! - [`MockDataPattern::Constant`] - Fixed value
//! - [`MockDataPattern::Sine`] - Sinusoidal wave with configurable frequency/amplitude
//! - [`MockDataPattern::Counter`] - Incrementing counter with wrap-around
//! - [`MockDataPattern::Square`] - Square wave alternating between two values
//!
//! # Example
//!
//! ```ignore
//! use serial_plotter::serial::mock::{MockDataPattern, SimulatedTransport};
//!
//! let transport = SimulatedTransport::new()
//!     .with_series("sine", MockDataPattern::Sine { frequency: 0.5, amplitude: 10.0, offset: 0.0 })
//!     .with_series("count", MockDataPattern::Counter { step: 1.0, min: 0.0, max: 100.0 });
//! ```
//!
//! # Enabling
//!
//! ```bash
//! cargo run --features mock-serial -- --mock
//! ```

use super::transport::{ReadStatus, SerialTransport};
use crate::error::{PlotterError, Result};
use std::time::{Duration, Instant};

/// Port name that always fails to open
pub const FAILING_PORT: &str = "fail";

/// Pattern for generating mock data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockDataPattern {
    /// Constant value
    Constant(f64),
    /// Sine wave with frequency (Hz) and amplitude
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Counter that increments and wraps from `max` back to `min`
    Counter { step: f64, min: f64, max: f64 },
    /// Square wave with period in seconds
    Square { period: f64, amplitude: f64 },
}

impl Default for MockDataPattern {
    fn default() -> Self {
        MockDataPattern::Sine {
            frequency: 1.0,
            amplitude: 100.0,
            offset: 0.0,
        }
    }
}

impl MockDataPattern {
    /// Value of the pattern for sample `n` taken at time `t` seconds
    pub fn value_at(&self, n: u64, t: f64) -> f64 {
        match *self {
            MockDataPattern::Constant(v) => v,
            MockDataPattern::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin(),
            MockDataPattern::Counter { step, min, max } => {
                let span = max - min;
                if span <= 0.0 {
                    min
                } else {
                    min + (n as f64 * step) % span
                }
            }
            MockDataPattern::Square { period, amplitude } => {
                if period <= 0.0 || (t % period) < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
        }
    }
}

/// Transport that generates telemetry lines on a fixed interval
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    series: Vec<(String, MockDataPattern)>,
    separator: Vec<u8>,
    line_interval: Duration,
    open: bool,
    baud_rate: Option<u32>,
    sample: u64,
    last_emit: Option<Instant>,
    pending: Vec<u8>,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTransport {
    /// Create a transport with no series, emitting every 20 ms with `\r\n`
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            separator: b"\r\n".to_vec(),
            line_interval: Duration::from_millis(20),
            open: false,
            baud_rate: None,
            sample: 0,
            last_emit: None,
            pending: Vec::new(),
        }
    }

    /// A sine, a counter and a square wave
    pub fn demo() -> Self {
        Self::new()
            .with_series("sine", MockDataPattern::default())
            .with_series(
                "counter",
                MockDataPattern::Counter {
                    step: 1.0,
                    min: 0.0,
                    max: 100.0,
                },
            )
            .with_series(
                "square",
                MockDataPattern::Square {
                    period: 2.0,
                    amplitude: 50.0,
                },
            )
    }

    pub fn with_series(mut self, name: impl Into<String>, pattern: MockDataPattern) -> Self {
        self.series.push((name.into(), pattern));
        self
    }

    pub fn with_separator(mut self, separator: &[u8]) -> Self {
        self.separator = separator.to_vec();
        self
    }

    pub fn with_line_interval(mut self, interval: Duration) -> Self {
        self.line_interval = interval;
        self
    }

    /// Baud rate applied by the last `configure`
    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    /// Render the next line, including the separator
    pub fn next_line(&mut self) -> Vec<u8> {
        let t = self.sample as f64 * self.line_interval.as_secs_f64();
        let line = self
            .series
            .iter()
            .map(|(name, pattern)| format!("{}:{:.3}", name, pattern.value_at(self.sample, t)))
            .collect::<Vec<_>>()
            .join(",");
        self.sample += 1;

        let mut bytes = line.into_bytes();
        bytes.extend_from_slice(&self.separator);
        bytes
    }
}

impl SerialTransport for SimulatedTransport {
    fn open(&mut self, port: &str) -> Result<()> {
        if port == FAILING_PORT {
            return Err(PlotterError::Transport(format!(
                "No such file or directory: {}",
                port
            )));
        }
        self.open = true;
        self.sample = 0;
        self.last_emit = None;
        self.pending.clear();
        Ok(())
    }

    fn configure(&mut self, baud_rate: u32) -> Result<()> {
        if !self.open {
            return Err(PlotterError::Transport("Port is not open".to_string()));
        }
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        if !self.open {
            return Err(PlotterError::Transport("Operation canceled".to_string()));
        }

        if self.pending.is_empty() {
            let due = self
                .last_emit
                .map_or(true, |last| last.elapsed() >= self.line_interval);
            if !due || self.series.is_empty() {
                return Ok(ReadStatus::Pending);
            }
            self.pending = self.next_line();
            self.last_emit = Some(Instant::now());
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(ReadStatus::Data(n))
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        self.pending.clear();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns() {
        assert_eq!(MockDataPattern::Constant(4.0).value_at(10, 1.0), 4.0);

        let counter = MockDataPattern::Counter {
            step: 1.0,
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(counter.value_at(3, 0.0), 3.0);
        assert_eq!(counter.value_at(12, 0.0), 2.0);

        let square = MockDataPattern::Square {
            period: 2.0,
            amplitude: 1.0,
        };
        assert_eq!(square.value_at(0, 0.5), 1.0);
        assert_eq!(square.value_at(0, 1.5), -1.0);

        let sine = MockDataPattern::default();
        assert!(sine.value_at(0, 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_lines_are_chunked_into_reads() {
        let mut transport = SimulatedTransport::new()
            .with_series("a", MockDataPattern::Constant(1.0))
            .with_line_interval(Duration::ZERO);
        transport.open("mock").unwrap();
        transport.configure(115200).unwrap();
        assert_eq!(transport.baud_rate(), Some(115200));

        let mut collected = Vec::new();
        let mut buf = [0u8; 4];
        while !collected.ends_with(b"\r\n") {
            match transport.read(&mut buf).unwrap() {
                ReadStatus::Data(n) => collected.extend_from_slice(&buf[..n]),
                ReadStatus::Pending => {}
            }
        }
        assert_eq!(collected, b"a:1.000\r\n");
    }

    #[test]
    fn test_failing_port_and_closed_reads() {
        let mut transport = SimulatedTransport::demo();
        assert!(transport.open(FAILING_PORT).is_err());
        assert!(!transport.is_open());

        let mut buf = [0u8; 4];
        assert!(transport.read(&mut buf).is_err());
    }
}
