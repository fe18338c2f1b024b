//! Application reactor
//!
//! [`Application`] ties the serial session to the plot view and is driven
//! one frame at a time from a single thread. Each [`Application::run_frame`]
//! applies the user commands queued since the last frame, gives the read
//! chain a bounded slice of time, and returns the [`PlotFrame`] to draw.
//!
//! Commands arrive on a `crossbeam_channel` so that an input source running
//! on another thread (stdin in the binary) never touches session state.

use crate::config::AppConfig;
use crate::error::{PlotterError, Result, ResultExt};
use crate::input::LineSeparator;
use crate::logs::LogSink;
use crate::plot::{PlotFrame, PlotView};
use crate::serial::{SerialSession, SerialTransport};
use crossbeam_channel::{Receiver, TryRecvError};
use std::str::FromStr;
use std::time::Duration;

/// User actions from the serial and data panels
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Open the configured port
    Open,
    /// Close the port
    Close,
    /// Port for the next open
    SetPort(String),
    /// Baud rate for the next open
    SetBaudRate(u32),
    /// Change the line separator, re-framing buffered input
    SetSeparator(LineSeparator),
    /// Echo raw input to the mirror output
    SetMirror(bool),
    /// Regex selecting which names are stored
    SetNameFilter(String),
    /// Regex selecting which series are drawn
    SetGraphFilter(String),
    /// Keep the X axis on the newest samples
    SetFollow(bool),
    /// Number of samples shown while following
    SetFollowWindow(usize),
    /// Drop all plotted data
    ClearData,
    /// Close the port and stop the reactor
    Quit,
}

fn parse_switch(arg: &str) -> Result<bool> {
    match arg {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(PlotterError::Parse(format!("expected on/off, got {:?}", other))),
    }
}

impl FromStr for UiCommand {
    type Err = PlotterError;

    /// Parse a console command such as `baud 115200` or `filter ^temp`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (verb, arg) = match s.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (s, ""),
        };
        let missing = || PlotterError::Parse(format!("{} needs an argument", verb));

        let command = match verb {
            "open" => UiCommand::Open,
            "close" => UiCommand::Close,
            "clear" => UiCommand::ClearData,
            "quit" | "exit" => UiCommand::Quit,
            "port" if !arg.is_empty() => UiCommand::SetPort(arg.to_string()),
            "baud" => UiCommand::SetBaudRate(
                arg.parse()
                    .map_err(|_| PlotterError::Parse(format!("invalid baud rate {:?}", arg)))?,
            ),
            "sep" | "separator" if !arg.is_empty() => UiCommand::SetSeparator(arg.parse()?),
            "mirror" => UiCommand::SetMirror(parse_switch(arg)?),
            // An empty filter is a valid (match-everything) regex
            "filter" => UiCommand::SetNameFilter(arg.to_string()),
            "graph" => UiCommand::SetGraphFilter(arg.to_string()),
            "follow" => UiCommand::SetFollow(parse_switch(arg)?),
            "window" => UiCommand::SetFollowWindow(
                arg.parse()
                    .map_err(|_| PlotterError::Parse(format!("invalid window size {:?}", arg)))?,
            ),
            "port" | "sep" | "separator" => return Err(missing()),
            other => return Err(PlotterError::Parse(format!("unknown command {:?}", other))),
        };
        Ok(command)
    }
}

/// Single-threaded reactor owning the session and the plot view
pub struct Application {
    session: SerialSession,
    view: PlotView,
    commands: Receiver<UiCommand>,
    poll_budget: Duration,
    running: bool,
}

impl Application {
    /// Build the session and view from `config`; starts the session when a
    /// port is configured
    pub fn new(
        config: &AppConfig,
        transport: Box<dyn SerialTransport>,
        commands: Receiver<UiCommand>,
    ) -> Result<Self> {
        let session = SerialSession::new(config, transport)?;
        Self::with_session(config, session, commands)
    }

    /// Wrap an already constructed session
    pub fn with_session(
        config: &AppConfig,
        mut session: SerialSession,
        commands: Receiver<UiCommand>,
    ) -> Result<Self> {
        let view = PlotView::from_config(&config.data).context("Invalid plot settings")?;

        if config.serial.auto_start() {
            session.start();
        }

        Ok(Self {
            session,
            view,
            commands,
            poll_budget: Duration::from_millis(config.poll_budget_ms),
            running: true,
        })
    }

    /// Apply queued commands, service the read chain, and build the frame
    pub fn run_frame(&mut self) -> PlotFrame<'_> {
        self.drain_commands();
        if self.running {
            self.session.poll(self.poll_budget);
        }
        self.view.frame(self.session.store())
    }

    fn drain_commands(&mut self) {
        while self.running {
            match self.commands.try_recv() {
                Ok(command) => self.handle_command(command),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Apply one command immediately
    pub fn handle_command(&mut self, command: UiCommand) {
        tracing::debug!("Command: {:?}", command);
        let result = match command {
            UiCommand::Open => {
                self.session.start();
                Ok(())
            }
            UiCommand::Close => {
                self.session.close();
                Ok(())
            }
            UiCommand::SetPort(port) => {
                self.session.set_port(port);
                Ok(())
            }
            UiCommand::SetBaudRate(rate) => self.session.set_baud_rate(rate),
            UiCommand::SetSeparator(separator) => self.session.set_separator(separator),
            UiCommand::SetMirror(mirror) => {
                self.session.set_mirror(mirror);
                Ok(())
            }
            // Filter errors stay visible through pending_error()
            UiCommand::SetNameFilter(text) => {
                let _ = self.session.set_name_filter(&text);
                Ok(())
            }
            UiCommand::SetGraphFilter(text) => {
                let _ = self.view.set_graph_filter(&text);
                Ok(())
            }
            UiCommand::SetFollow(follow) => {
                self.view.set_follow(follow);
                Ok(())
            }
            UiCommand::SetFollowWindow(window) => self.view.set_follow_window(window),
            UiCommand::ClearData => {
                self.session.clear_data();
                Ok(())
            }
            UiCommand::Quit => {
                self.session.close();
                self.running = false;
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!("Command rejected: {}", e);
            self.session.messages_mut().add(format_args!("{}", e));
        }
    }

    /// One line per drawn series: last value and min/max/avg inside the window
    pub fn summary(&self) -> Vec<String> {
        let frame = self.view.frame(self.session.store());
        frame
            .series
            .iter()
            .map(|series| {
                let stats = series.visible_stats();
                let last = series.values.last().copied().unwrap_or(f64::NAN);
                if stats.count == 0 {
                    format!("{}: {} (no samples in window)", series.name, last)
                } else {
                    let (min, max, avg) = stats.as_tuple();
                    format!(
                        "{}: last={} min={} max={} avg={:.3} n={}",
                        series.name,
                        last,
                        min,
                        max,
                        avg,
                        series.values.len()
                    )
                }
            })
            .collect()
    }

    /// Error to show next to the serial and data panels, if any
    pub fn pending_error(&self) -> Option<&str> {
        self.session
            .pending_error()
            .or_else(|| self.view.graph_filter().pending_error())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session(&self) -> &SerialSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SerialSession {
        &mut self.session
    }

    pub fn view(&self) -> &PlotView {
        &self.view
    }

    pub fn poll_budget(&self) -> Duration {
        self.poll_budget
    }
}
