//! Serial Plotter - Main Entry Point
//!
//! Headless runner: opens the port, feeds console commands to the reactor
//! and prints a summary of the visible series at a fixed interval.
//!
//! ## Usage
//!
//! ```bash
//! # Plot what an Arduino prints at 115200 baud
//! serial-plotter -p /dev/ttyACM0 -b 115200
//!
//! # Echo raw input and only keep names starting with "temp"
//! serial-plotter -p COM3 --mirror --name-filter '^temp'
//!
//! # List available ports
//! serial-plotter --list-ports
//! ```
//!
//! While running, commands such as `baud 57600`, `sep crnl`, `filter ^a$`,
//! `window 1000`, `close`, `open` and `quit` are read from stdin.

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::Sender;
use serial_plotter::{
    config::{AppConfig, AppState},
    serial::{list_ports, SerialPortTransport, SerialTransport},
    Application, UiCommand,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Time between frames
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Serial Plotter - live plots of `name:value` serial telemetry
#[derive(Parser)]
#[command(name = "serial-plotter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial port to open on startup (e.g. /dev/ttyACM0, COM3)
    #[arg(short = 'p', long)]
    serial_port: Option<String>,

    /// Baud rate
    #[arg(short = 'b', long)]
    baud_rate: Option<u32>,

    /// Echo raw input to stdout
    #[arg(short = 'm', long)]
    mirror: bool,

    /// Line separator: nl, cr, nlcr, crnl or an escaped literal
    #[arg(short = 's', long)]
    line_separator: Option<String>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Regex selecting which names are stored
    #[arg(long)]
    name_filter: Option<String>,

    /// Regex selecting which series are shown
    #[arg(long)]
    graph_filter: Option<String>,

    /// Show the full history instead of following the newest samples
    #[arg(long)]
    no_follow: bool,

    /// Number of samples shown while following
    #[arg(long)]
    follow_window: Option<usize>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Use the simulated transport instead of a real port
    #[cfg(feature = "mock-serial")]
    #[arg(long)]
    mock: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(port) = &self.serial_port {
            config.serial.port = port.clone();
        }
        if let Some(baud) = self.baud_rate {
            config.serial.baud_rate = baud;
        }
        if self.mirror {
            config.serial.mirror = true;
        }
        if let Some(separator) = &self.line_separator {
            config.serial.line_separator = separator.clone();
        }
        if let Some(filter) = &self.name_filter {
            config.data.name_filter = filter.clone();
        }
        if let Some(filter) = &self.graph_filter {
            config.data.graph_filter = filter.clone();
        }
        if self.no_follow {
            config.data.follow = false;
        }
        if let Some(window) = self.follow_window {
            config.data.follow_window = window;
        }
    }

    #[cfg(feature = "mock-serial")]
    fn use_mock(&self) -> bool {
        self.mock
    }

    #[cfg(not(feature = "mock-serial"))]
    fn use_mock(&self) -> bool {
        false
    }
}

/// Install the tracing subscriber; the returned guard flushes the log file
fn init_logging(
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,serial_plotter=debug"))
    };

    // stdout carries the mirror echo and summaries, so logs go to stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path {:?}", path))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Forward console commands to the reactor until stdin closes
fn spawn_command_reader(tx: Sender<UiCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<UiCommand>() {
                Ok(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        tracing::debug!("Command reader finished");
    });
}

#[cfg(feature = "mock-serial")]
fn make_transport(cli: &Cli, config: &mut AppConfig) -> Box<dyn SerialTransport> {
    if !cli.mock {
        return Box::new(SerialPortTransport::new());
    }
    if config.serial.port.is_empty() {
        config.serial.port = "mock".to_string();
    }
    tracing::info!("Using simulated serial transport");
    Box::new(serial_plotter::serial::SimulatedTransport::demo())
}

#[cfg(not(feature = "mock-serial"))]
fn make_transport(_cli: &Cli, _config: &mut AppConfig) -> Box<dyn SerialTransport> {
    Box::new(SerialPortTransport::new())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_ref())?;

    if cli.list_ports {
        let ports = list_ports();
        if ports.is_empty() {
            println!("No serial ports found");
        }
        for port in ports {
            println!("{}", port);
        }
        return Ok(());
    }

    tracing::info!("Starting Serial Plotter");

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => AppConfig::default(),
    };
    cli.apply_to(&mut config);

    // Reuse the last port that opened when none was given
    let mut app_state = AppState::load_or_default();
    if !cli.use_mock() {
        app_state.apply_to(&mut config.serial);
    }

    let transport = make_transport(&cli, &mut config);

    let (tx, rx) = crossbeam_channel::unbounded();
    spawn_command_reader(tx);

    let mut app = match Application::new(&config, transport, rx) {
        Ok(app) => app,
        Err(e) if e.is_configuration() => {
            tracing::error!("Refusing to start: {}", e);
            anyhow::bail!("Invalid configuration: {}", e);
        }
        Err(e) => return Err(e).context("Failed to start the application"),
    };

    let report_interval = Duration::from_millis(config.report_interval_ms);
    let mut last_report = Instant::now();
    let mut was_connected = false;

    while app.is_running() {
        let started = Instant::now();
        app.run_frame();

        let connected = app.session().is_connected();
        if connected && !was_connected && !cli.use_mock() {
            let serial = app.session().config();
            app_state.update_last_connection(&serial.port, serial.baud_rate);
            if let Err(e) = app_state.save() {
                tracing::warn!("Failed to save app state: {}", e);
            }
        }
        was_connected = connected;

        if last_report.elapsed() >= report_interval {
            last_report = Instant::now();
            let stats = app.session().stats();
            println!(
                "[{}] {} bytes, {} lines, {} samples",
                app.session().status(),
                stats.bytes_received,
                stats.lines_framed,
                stats.samples_accepted
            );
            for line in app.summary() {
                println!("  {}", line);
            }
            if let Some(error) = app.pending_error() {
                println!("  error: {}", error);
            }
        }

        if let Some(rest) = FRAME_INTERVAL.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    tracing::info!("Shutting down...");
    Ok(())
}
