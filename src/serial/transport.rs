//! Serial transport abstraction
//!
//! The session only needs four operations from a port: open, configure,
//! read and close. [`SerialTransport`] captures those so the session can be
//! driven by real hardware ([`SerialPortTransport`]), by the pattern
//! generator behind the `mock-serial` feature, or by scripted transports in
//! tests.
//!
//! Reads never block the reactor: when no bytes are waiting the transport
//! answers [`ReadStatus::Pending`] and the session tries again on the next
//! poll.

use crate::config::DEFAULT_BAUD_RATE;
use crate::error::{PlotterError, Result};
use serialport::SerialPort;
use std::io::{ErrorKind, Read};
use std::time::Duration;

/// Default timeout for a read that was started with bytes waiting
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Result of a single read attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// `n` bytes were written to the front of the buffer
    Data(usize),
    /// Nothing available yet; the read stays armed
    Pending,
}

/// Byte-stream port used by the serial session
#[cfg_attr(test, mockall::automock)]
pub trait SerialTransport {
    /// Open the named port
    fn open(&mut self, port: &str) -> Result<()>;

    /// Apply the baud rate to the open port
    fn configure(&mut self, baud_rate: u32) -> Result<()>;

    /// Read whatever is available into `buf`
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus>;

    /// Close the port; closing a closed port is not an error
    fn close(&mut self) -> Result<()>;

    /// Check if a port is currently open
    fn is_open(&self) -> bool;
}

/// Information about an available serial port (for listing)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub description: String,
}

impl std::fmt::Display for PortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.description)
        }
    }
}

/// List the serial ports present on this machine
pub fn list_ports() -> Vec<PortInfo> {
    match serialport::available_ports() {
        Ok(ports) => ports
            .into_iter()
            .map(|p| {
                let description = match p.port_type {
                    serialport::SerialPortType::UsbPort(usb) => usb
                        .product
                        .unwrap_or_else(|| format!("{:04x}:{:04x}", usb.vid, usb.pid)),
                    serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                    serialport::SerialPortType::PciPort => "PCI".to_string(),
                    serialport::SerialPortType::Unknown => String::new(),
                };
                PortInfo {
                    name: p.port_name,
                    description,
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to list serial ports: {}", e);
            Vec::new()
        }
    }
}

/// Transport backed by the `serialport` crate
pub struct SerialPortTransport {
    port: Option<Box<dyn SerialPort>>,
    read_timeout: Duration,
}

impl Default for SerialPortTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPortTransport {
    pub fn new() -> Self {
        Self {
            port: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| PlotterError::Transport("Port is not open".to_string()))
    }
}

impl SerialTransport for SerialPortTransport {
    fn open(&mut self, port: &str) -> Result<()> {
        if self.port.is_some() {
            self.close()?;
        }
        let opened = serialport::new(port, DEFAULT_BAUD_RATE)
            .timeout(self.read_timeout)
            .open()?;
        tracing::debug!("Opened {}", port);
        self.port = Some(opened);
        Ok(())
    }

    fn configure(&mut self, baud_rate: u32) -> Result<()> {
        self.port_mut()?.set_baud_rate(baud_rate)?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        let port = self.port_mut()?;
        if port.bytes_to_read()? == 0 {
            return Ok(ReadStatus::Pending);
        }
        match port.read(buf) {
            Ok(0) => Ok(ReadStatus::Pending),
            Ok(n) => Ok(ReadStatus::Data(n)),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Ok(ReadStatus::Pending)
            }
            Err(e) => Err(PlotterError::Transport(e.to_string())),
        }
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the handle closes the descriptor
        self.port.take();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}
