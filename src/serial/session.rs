//! Serial session: connection lifecycle and the read chain
//!
//! A [`SerialSession`] owns the transport, the framing state and the plot
//! data it produces. It is driven from a single thread: [`SerialSession::poll`]
//! performs the pending read, hands the bytes to the framer and parser, and
//! re-arms the read for the next call. Nothing in here is shared across
//! threads, so no locking is involved.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected --start()--> Connecting --open+configure ok--> Connected
//!      ^                        |                                 |
//!      +------ open/configure error                               |
//!      +------------------ read error / close() ------------------+
//! ```
//!
//! Transport errors never escape: they are written to the message log, kept
//! as the status string, and the session falls back to `Disconnected`.
//! Only an invalid configuration fails [`SerialSession::new`].

use crate::config::{AppConfig, SerialConfig};
use crate::error::{PlotterError, Result, ResultExt};
use crate::filter::PatternFilter;
use crate::input::{
    BaudRatePicker, EntryParser, LineFramer, LineSeparator, SeparatorPicker,
};
use crate::logs::{LogSink, MessageLog};
use crate::plot::PlotStore;
use crate::types::ConnectionStatus;
use std::io::Write;
use std::time::{Duration, Instant};

use super::transport::{ReadStatus, SerialTransport};

/// Callback fired once per line that stored at least one sample
pub type DataChangedCallback = Box<dyn FnMut(&PlotStore)>;

/// Counters for the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub bytes_received: u64,
    pub lines_framed: u64,
    pub samples_accepted: u64,
    pub parse_errors: u64,
}

/// Everything a framed line flows into
struct Telemetry {
    parser: EntryParser,
    store: PlotStore,
    messages: MessageLog,
    raw: MessageLog,
    on_data_changed: Option<DataChangedCallback>,
    stats: SessionStats,
}

impl Telemetry {
    fn handle_line(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        tracing::trace!("Framed line {:?}", line);
        self.raw.add_entry(line.to_string());
        self.stats.lines_framed += 1;

        let outcome = self
            .parser
            .parse_line(&line, &mut self.store, &mut self.messages);
        self.stats.samples_accepted += outcome.accepted as u64;
        self.stats.parse_errors += outcome.errors as u64;

        if outcome.changed() {
            if let Some(cb) = self.on_data_changed.as_mut() {
                cb(&self.store);
            }
        }
    }
}

/// Serial port session feeding the plot store
pub struct SerialSession {
    config: SerialConfig,
    transport: Box<dyn SerialTransport>,
    status: ConnectionStatus,
    error: Option<String>,
    baud_picker: BaudRatePicker,
    separator_picker: SeparatorPicker,
    framer: LineFramer,
    telemetry: Telemetry,
    read_buffer: Vec<u8>,
    mirror_out: Box<dyn Write>,
}

impl SerialSession {
    /// Create a session; fails if the baud rate, separator or name filter is invalid
    pub fn new(config: &AppConfig, transport: Box<dyn SerialTransport>) -> Result<Self> {
        config.validate().context("Invalid serial session configuration")?;

        let mut baud_picker = BaudRatePicker::new();
        baud_picker.set_selection(config.serial.baud_rate)?;

        let separator = config.serial.separator()?;
        let mut separator_picker = SeparatorPicker::new();
        separator_picker.set_selection(&separator)?;

        let name_filter =
            PatternFilter::new(&config.data.name_filter).context("Invalid name filter")?;

        Ok(Self {
            config: config.serial.clone(),
            transport,
            status: ConnectionStatus::Disconnected,
            error: None,
            baud_picker,
            separator_picker,
            framer: LineFramer::new(separator),
            telemetry: Telemetry {
                parser: EntryParser::new(name_filter),
                store: PlotStore::new(),
                messages: MessageLog::messages(),
                raw: MessageLog::raw(),
                on_data_changed: None,
                stats: SessionStats::default(),
            },
            read_buffer: vec![0; config.read_buffer_size],
            mirror_out: Box::new(std::io::stdout()),
        })
    }

    /// Redirect the mirror echo (stdout by default)
    pub fn with_mirror_output(mut self, out: Box<dyn Write>) -> Self {
        self.mirror_out = out;
        self
    }

    /// Register the data-changed callback, replacing any previous one
    pub fn set_data_changed_callback(&mut self, cb: DataChangedCallback) {
        self.telemetry.on_data_changed = Some(cb);
    }

    // ==================== Lifecycle ====================

    /// Open and configure the port, then arm the read chain
    ///
    /// Returns whether the session is connected afterwards. Failures are
    /// reported through the message log and the status string.
    pub fn start(&mut self) -> bool {
        if self.status.is_connected() {
            tracing::warn!("start() while already connected to {}", self.config.port);
            return true;
        }

        self.status = ConnectionStatus::Connecting;
        self.error = None;
        tracing::info!(
            "Opening {} at {} baud",
            self.config.port,
            self.config.baud_rate
        );

        if let Err(e) = self.transport.open(&self.config.port) {
            self.set_error(&e);
            self.status = ConnectionStatus::Disconnected;
            return false;
        }

        if let Err(e) = self.transport.configure(self.config.baud_rate) {
            self.set_error(&e);
            self.close_transport();
            self.status = ConnectionStatus::Disconnected;
            return false;
        }

        self.framer.reset();
        self.status = ConnectionStatus::Connected;
        tracing::info!("Connected to {}", self.config.port);
        true
    }

    /// Close the port; the session is `Disconnected` afterwards regardless
    /// of whether the transport reported an error
    pub fn close(&mut self) {
        if self.status != ConnectionStatus::Disconnected {
            tracing::info!("Closing {}", self.config.port);
        }
        self.close_transport();
        self.status = ConnectionStatus::Disconnected;
    }

    fn close_transport(&mut self) {
        if let Err(e) = self.transport.close() {
            self.set_error(&e);
        }
    }

    fn set_error(&mut self, err: &PlotterError) {
        let message = match err {
            PlotterError::Transport(message) => message.clone(),
            other => other.to_string(),
        };
        tracing::warn!("Serial port error: {}", message);
        self.telemetry
            .messages
            .add(format_args!("Serial port error: {}", message));
        self.error = Some(message);
    }

    // ==================== Read chain ====================

    /// Service the read chain for at most `budget`
    ///
    /// Each completed read is mirrored, framed and parsed, then the next
    /// read is issued immediately. The loop returns when the transport has
    /// nothing more, the budget is spent, or the read fails. At least one
    /// read is attempted while connected. Returns the number of bytes
    /// processed.
    pub fn poll(&mut self, budget: Duration) -> usize {
        let started = Instant::now();
        let mut processed = 0;

        while self.status.is_connected() {
            match self.transport.read(&mut self.read_buffer) {
                Ok(ReadStatus::Data(n)) => {
                    let bytes = &self.read_buffer[..n];
                    if self.config.mirror {
                        mirror(&mut self.mirror_out, bytes);
                    }
                    self.telemetry.stats.bytes_received += n as u64;
                    let telemetry = &mut self.telemetry;
                    self.framer.feed(bytes, |line| telemetry.handle_line(line));
                    processed += n;
                }
                Ok(ReadStatus::Pending) => break,
                Err(e) => {
                    self.set_error(&e);
                    self.close_transport();
                    self.status = ConnectionStatus::Disconnected;
                    break;
                }
            }

            if started.elapsed() >= budget {
                break;
            }
        }

        processed
    }

    // ==================== Settings ====================

    /// Change the separator, re-framing any buffered partial line
    pub fn set_separator(&mut self, separator: LineSeparator) -> Result<()> {
        self.separator_picker.set_selection(&separator)?;
        self.apply_separator(separator);
        Ok(())
    }

    /// Change the separator by picker index; returns false for a bad index
    pub fn select_separator_index(&mut self, index: usize) -> bool {
        if !self.separator_picker.select_index(index) {
            return false;
        }
        let separator = self.separator_picker.selected().clone();
        self.apply_separator(separator);
        true
    }

    fn apply_separator(&mut self, separator: LineSeparator) {
        if &separator == self.framer.separator() {
            return;
        }
        tracing::debug!("Line separator set to {}", separator);
        self.config.line_separator = separator.escaped();
        let telemetry = &mut self.telemetry;
        self.framer
            .set_separator(separator, |line| telemetry.handle_line(line));
    }

    /// Select a baud rate for the next `start()`
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.baud_picker.set_selection(baud_rate)?;
        self.config.baud_rate = baud_rate;
        Ok(())
    }

    /// Select a baud rate by picker index; returns false for a bad index
    pub fn select_baud_rate_index(&mut self, index: usize) -> bool {
        if !self.baud_picker.select_index(index) {
            return false;
        }
        self.config.baud_rate = self.baud_picker.selected();
        true
    }

    /// Set the port used by the next `start()`
    pub fn set_port(&mut self, port: impl Into<String>) {
        self.config.port = port.into();
    }

    pub fn set_mirror(&mut self, mirror: bool) {
        self.config.mirror = mirror;
    }

    /// Replace the name filter; on error the previous filter stays active
    pub fn set_name_filter(&mut self, text: &str) -> Result<()> {
        self.telemetry.parser.name_filter_mut().set_text(text)
    }

    /// Drop all plotted data
    pub fn clear_data(&mut self) {
        self.telemetry.store.clear();
    }

    // ==================== Accessors ====================

    pub fn store(&self) -> &PlotStore {
        &self.telemetry.store
    }

    pub fn messages(&self) -> &MessageLog {
        &self.telemetry.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageLog {
        &mut self.telemetry.messages
    }

    pub fn raw_log(&self) -> &MessageLog {
        &self.telemetry.raw
    }

    pub fn raw_log_mut(&mut self) -> &mut MessageLog {
        &mut self.telemetry.raw
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    /// Status line for the serial panel
    pub fn status(&self) -> String {
        match (&self.error, self.status) {
            (Some(error), _) => error.clone(),
            (None, ConnectionStatus::Connected) => "operating".to_string(),
            (None, ConnectionStatus::Connecting) => "Opening...".to_string(),
            (None, ConnectionStatus::Disconnected) => "idle".to_string(),
        }
    }

    /// Last transport error, if it has not been cleared by a new `start()`
    pub fn transport_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Error that should keep the serial panel expanded
    pub fn pending_error(&self) -> Option<&str> {
        self.transport_error()
            .or_else(|| self.name_filter().pending_error())
    }

    pub fn name_filter(&self) -> &PatternFilter {
        self.telemetry.parser.name_filter()
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    pub fn separator(&self) -> &LineSeparator {
        self.framer.separator()
    }

    pub fn separator_picker(&self) -> &SeparatorPicker {
        &self.separator_picker
    }

    pub fn baud_rate_picker(&self) -> &BaudRatePicker {
        &self.baud_picker
    }

    /// Bytes buffered since the last line boundary
    pub fn remainder(&self) -> &[u8] {
        self.framer.remainder()
    }

    pub fn stats(&self) -> SessionStats {
        self.telemetry.stats
    }
}

/// Echo raw bytes as they arrive, before framing
fn mirror(out: &mut dyn Write, bytes: &[u8]) {
    if let Err(e) = out.write_all(bytes).and_then(|_| out.flush()) {
        tracing::debug!("Mirror write failed: {}", e);
    }
}
