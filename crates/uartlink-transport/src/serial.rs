//! Serial port configuration and opening.
//!
//! Both host drivers, [`SerialUart`](crate::SerialUart) and
//! [`SingleWireSerial`](crate::SingleWireSerial), sit on a port opened by
//! [`open_port`]. The accessory link starts out at 57600 baud, 8N1, with no
//! flow control; the decoder changes baud and parity later through control
//! commands.
//!
//! # Example
//!
//! ```no_run
//! use uartlink_transport::{open_port, SerialConfig};
//!
//! # fn example() -> uartlink_core::Result<()> {
//! let port = open_port("/dev/ttyUSB0", &SerialConfig::default())?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio_serial::SerialPort;
use uartlink_core::control::DEFAULT_BAUD_RATE;
use uartlink_core::driver::StopBits;
use uartlink_core::error::{Error, Result};

/// Serial port configuration.
///
/// Defaults:
/// - 57600 baud
/// - 8 data bits, 1 stop bit, no parity
/// - No flow control
/// - RTS drives the transmit-enable line
/// - 10 ms read timeout
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
    /// Modem line wired to the line driver's transmit-enable input.
    pub tx_enable_line: ControlLine,
    /// Upper bound on a single blocking read. Reads are only issued when the
    /// OS reports buffered bytes, so this is a safety net.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            tx_enable_line: ControlLine::Rts,
            read_timeout: Duration::from_millis(10),
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => tokio_serial::DataBits::Five,
            DataBits::Six => tokio_serial::DataBits::Six,
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<FlowControl> for tokio_serial::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => tokio_serial::FlowControl::None,
            FlowControl::Software => tokio_serial::FlowControl::Software,
            FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

/// A modem control output usable as a transmit-enable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLine {
    Rts,
    Dtr,
}

pub(crate) fn serial_stop_bits(bits: StopBits) -> tokio_serial::StopBits {
    match bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
    }
}

pub(crate) fn serial_error(context: &str, e: tokio_serial::Error) -> Error {
    Error::Transport(format!("{context}: {e}"))
}

/// Open a serial port with the given configuration.
///
/// DTR and RTS are de-asserted immediately after opening so the line driver
/// stays off until the decoder enables transmission.
pub fn open_port(path: &str, config: &SerialConfig) -> Result<Box<dyn SerialPort>> {
    if config.baud_rate == 0 {
        return Err(Error::InvalidParameter(
            "baud rate must be non-zero".into(),
        ));
    }

    tracing::debug!(
        port = %path,
        baud_rate = config.baud_rate,
        data_bits = ?config.data_bits,
        stop_bits = ?config.stop_bits,
        parity = ?config.parity,
        flow_control = ?config.flow_control,
        tx_enable_line = ?config.tx_enable_line,
        "Opening serial port"
    );

    let mut port = tokio_serial::new(path, config.baud_rate)
        .data_bits(config.data_bits.into())
        .stop_bits(serial_stop_bits(config.stop_bits))
        .parity(config.parity.into())
        .flow_control(config.flow_control.into())
        .timeout(config.read_timeout)
        .open()
        .map_err(|e| {
            tracing::error!(port = %path, error = %e, "Failed to open serial port");
            serial_error(&format!("failed to open serial port {path}"), e)
        })?;

    if let Err(e) = port.write_data_terminal_ready(false) {
        tracing::warn!(port = %path, error = %e, "Failed to de-assert DTR");
    }
    if let Err(e) = port.write_request_to_send(false) {
        tracing::warn!(port = %path, error = %e, "Failed to de-assert RTS");
    }

    tracing::info!(port = %path, baud_rate = config.baud_rate, "Serial port opened");
    Ok(port)
}
