//! Hardware UART driver on a host serial port.
//!
//! [`SerialUart`] implements [`UartDriver`] for a USB-serial adapter or
//! on-board UART feeding an RS-485 style line driver: data on TX/RX, the
//! driver's transmit-enable input on RTS (or DTR).

use std::io::{ErrorKind, Read, Write};

use tokio_serial::SerialPort;
use uartlink_core::driver::UartDriver;
use uartlink_core::error::Result;

use crate::serial::{ControlLine, SerialConfig, open_port, serial_error};

/// [`UartDriver`] over a serial port.
pub struct SerialUart {
    port: Box<dyn SerialPort>,
    tx_enable_line: ControlLine,
    port_name: String,
}

impl SerialUart {
    /// Open `path` with `config` and wrap it.
    pub fn open(path: &str, config: &SerialConfig) -> Result<Self> {
        let port = open_port(path, config)?;
        Ok(Self::from_port(port, config.tx_enable_line))
    }

    /// Wrap an already opened port.
    pub fn from_port(port: Box<dyn SerialPort>, tx_enable_line: ControlLine) -> Self {
        let port_name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        Self {
            port,
            tx_enable_line,
            port_name,
        }
    }

    /// Name the OS reported for the port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl UartDriver for SerialUart {
    fn begin(&mut self, baud_rate: u32) -> Result<()> {
        tracing::debug!(port = %self.port_name, baud_rate, "Reconfiguring UART");
        self.port
            .set_baud_rate(baud_rate)
            .map_err(|e| serial_error("failed to set baud rate", e))
    }

    fn available(&mut self) -> Result<usize> {
        let n = self
            .port
            .bytes_to_read()
            .map_err(|e| serial_error("failed to query receive buffer", e))?;
        Ok(n as usize)
    }

    fn read(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {
                Ok(None)
            }
            Err(e) => {
                tracing::error!(port = %self.port_name, error = %e, "Failed to read from UART");
                Err(e.into())
            }
        }
    }

    fn write(&mut self, byte: u8) -> Result<()> {
        self.port.write_all(&[byte])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Waits for the OS output queue to drain, not just the user-space buffer.
        self.port.flush()?;
        Ok(())
    }

    fn set_tx_enabled(&mut self, enabled: bool) -> Result<()> {
        tracing::trace!(port = %self.port_name, line = ?self.tx_enable_line, enabled, "TX enable");
        let result = match self.tx_enable_line {
            ControlLine::Rts => self.port.write_request_to_send(enabled),
            ControlLine::Dtr => self.port.write_data_terminal_ready(enabled),
        };
        result.map_err(|e| serial_error("failed to drive TX-enable line", e))
    }

    fn set_even_parity(&mut self, even: bool) -> Result<()> {
        let parity = if even {
            tokio_serial::Parity::Even
        } else {
            tokio_serial::Parity::None
        };
        tracing::debug!(port = %self.port_name, ?parity, "Setting parity");
        self.port
            .set_parity(parity)
            .map_err(|e| serial_error("failed to set parity", e))
    }
}
