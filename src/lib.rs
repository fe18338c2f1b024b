//! # Serial Plotter
//!
//! Live plotting of `name:value` telemetry printed over a serial port by a
//! microcontroller.
//!
//! ## Architecture
//!
//! - **Serial**: a [`SerialSession`] owns the port, frames the byte stream
//!   into lines and drives a self-re-arming, non-blocking read chain
//! - **Input**: [`input::LineFramer`] splits bytes on the configured
//!   separator, [`input::EntryParser`] turns `a:1,b:2` lines into samples
//! - **Plot**: [`PlotStore`] keeps every accepted sample per series name,
//!   [`PlotView`] selects what is drawn and the X window
//! - **App**: [`Application`] is the single-threaded reactor fed by
//!   [`UiCommand`]s over a crossbeam channel
//!
//! ## Configuration
//!
//! Settings live in a TOML file (see [`AppConfig`]). The last port that
//! opened successfully is remembered in the platform data directory under
//! `serial-plotter`:
//!
//! - **Linux**: `~/.local/share/serial-plotter/`
//! - **macOS**: `~/Library/Application Support/serial-plotter/`
//! - **Windows**: `%APPDATA%\serial-plotter\`
//!
//! ## Example
//!
//! ```ignore
//! use serial_plotter::{AppConfig, Application, SerialPortTransport};
//!
//! let mut config = AppConfig::default();
//! config.serial.port = "/dev/ttyACM0".to_string();
//! config.serial.baud_rate = 115200;
//!
//! let (_tx, rx) = crossbeam_channel::unbounded();
//! let mut app = Application::new(&config, Box::new(SerialPortTransport::new()), rx)?;
//! loop {
//!     let frame = app.run_frame();
//!     for series in &frame.series {
//!         println!("{}: {:?}", series.name, series.visible.last());
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod input;
pub mod logs;
pub mod plot;
pub mod serial;
pub mod types;

// Re-export commonly used types
pub use app::{Application, UiCommand};
pub use config::{AppConfig, AppState, DataConfig, SerialConfig};
pub use error::{PlotterError, Result, ResultExt};
pub use filter::PatternFilter;
pub use input::{EntryParser, LineFramer, LineSeparator};
pub use logs::{LogSink, MessageLog};
pub use plot::{PlotFrame, PlotStore, PlotView};
pub use serial::{SerialPortTransport, SerialSession, SerialTransport, SessionStats};
pub use types::{ConnectionStatus, IncrementalStats, XWindow};
