//! Serial port access
//!
//! - [`transport`]: the byte-stream abstraction and the `serialport` backend
//! - [`session`]: connection lifecycle, the read chain and the data it produces
//! - `mock`: pattern generator for running without hardware (`mock-serial` feature)

#[cfg(feature = "mock-serial")]
pub mod mock;
pub mod session;
pub mod transport;

#[cfg(feature = "mock-serial")]
pub use mock::{MockDataPattern, SimulatedTransport};
pub use session::{DataChangedCallback, SerialSession, SessionStats};
pub use transport::{list_ports, PortInfo, ReadStatus, SerialPortTransport, SerialTransport};
