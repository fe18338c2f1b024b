//! Test to verify test infrastructure works correctly

mod common;

use common::builders::ConfigBuilder;
use common::mock_helpers::ScriptedTransport;
use serial_plotter::serial::{ReadStatus, SerialTransport};

#[test]
fn test_infrastructure_setup() {
    let config = ConfigBuilder::new()
        .port("COM3")
        .baud_rate(115200)
        .separator("crnl")
        .build();

    assert_eq!(config.serial.port, "COM3");
    assert_eq!(config.serial.baud_rate, 115200);
    assert!(config.validate().is_ok());
}

#[test]
fn test_scripted_transport_splits_reads() {
    let (mut transport, handle) = ScriptedTransport::new();
    transport.open("COM3").unwrap();
    handle.push(b"abcdef");

    let mut buf = [0u8; 4];
    assert_eq!(transport.read(&mut buf).unwrap(), ReadStatus::Data(4));
    assert_eq!(&buf, b"abcd");
    assert_eq!(transport.read(&mut buf).unwrap(), ReadStatus::Data(2));
    assert_eq!(&buf[..2], b"ef");
    assert_eq!(transport.read(&mut buf).unwrap(), ReadStatus::Pending);
}

#[test]
fn test_float_comparison() {
    common::assert_float_eq(1.0, 1.0000001, 0.001);
}

#[test]
#[should_panic]
fn test_float_comparison_fails() {
    common::assert_float_eq(1.0, 2.0, 0.001);
}
