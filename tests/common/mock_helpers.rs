//! Mock construction helpers
//!
//! [`ScriptedTransport`] replays queued reads so tests can decide exactly
//! which bytes arrive in which chunk. The [`ScriptHandle`] stays with the
//! test after the transport has been boxed into a session.

use serial_plotter::error::{PlotterError, Result};
use serial_plotter::serial::{ReadStatus, SerialTransport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum ScriptedRead {
    Data(Vec<u8>),
    Error(String),
}

#[derive(Debug, Default)]
struct ScriptState {
    reads: VecDeque<ScriptedRead>,
    open: bool,
    open_error: Option<String>,
    opened_ports: Vec<String>,
    baud_rates: Vec<u32>,
    closes: usize,
    read_calls: usize,
}

/// Test-side view of a [`ScriptedTransport`]
#[derive(Clone, Default)]
pub struct ScriptHandle(Rc<RefCell<ScriptState>>);

impl ScriptHandle {
    /// Queue one read returning `bytes`
    pub fn push(&self, bytes: &[u8]) {
        self.0
            .borrow_mut()
            .reads
            .push_back(ScriptedRead::Data(bytes.to_vec()));
    }

    /// Queue a failing read
    pub fn push_error(&self, message: &str) {
        self.0
            .borrow_mut()
            .reads
            .push_back(ScriptedRead::Error(message.to_string()));
    }

    /// Make the next `open` fail with `message`
    pub fn fail_open(&self, message: &str) {
        self.0.borrow_mut().open_error = Some(message.to_string());
    }

    pub fn is_open(&self) -> bool {
        self.0.borrow().open
    }

    pub fn opened_ports(&self) -> Vec<String> {
        self.0.borrow().opened_ports.clone()
    }

    pub fn baud_rates(&self) -> Vec<u32> {
        self.0.borrow().baud_rates.clone()
    }

    pub fn closes(&self) -> usize {
        self.0.borrow().closes
    }

    pub fn read_calls(&self) -> usize {
        self.0.borrow().read_calls
    }

    pub fn queued(&self) -> usize {
        self.0.borrow().reads.len()
    }
}

/// Transport that replays reads queued through its [`ScriptHandle`]
pub struct ScriptedTransport {
    state: Rc<RefCell<ScriptState>>,
}

impl ScriptedTransport {
    pub fn new() -> (Self, ScriptHandle) {
        let handle = ScriptHandle::default();
        (
            Self {
                state: handle.0.clone(),
            },
            handle,
        )
    }
}

impl SerialTransport for ScriptedTransport {
    fn open(&mut self, port: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(message) = state.open_error.take() {
            return Err(PlotterError::Transport(message));
        }
        state.open = true;
        state.opened_ports.push(port.to_string());
        Ok(())
    }

    fn configure(&mut self, baud_rate: u32) -> Result<()> {
        self.state.borrow_mut().baud_rates.push(baud_rate);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        let mut state = self.state.borrow_mut();
        state.read_calls += 1;
        match state.reads.pop_front() {
            None => Ok(ReadStatus::Pending),
            Some(ScriptedRead::Error(message)) => Err(PlotterError::Transport(message)),
            Some(ScriptedRead::Data(mut bytes)) => {
                let n = buf.len().min(bytes.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    // Whatever did not fit arrives with the next read
                    let rest = bytes.split_off(n);
                    state.reads.push_front(ScriptedRead::Data(rest));
                }
                Ok(ReadStatus::Data(n))
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.open = false;
        state.closes += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.borrow().open
    }
}

/// Shared in-memory writer for capturing mirror output
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
