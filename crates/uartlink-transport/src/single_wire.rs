//! Single-wire serial driver on a host serial port.
//!
//! For accessories whose TX and RX share one wire (an open-drain line tied to
//! both pins of a USB-serial adapter). The port hears its own output, so the
//! decoder sees every transmitted frame again as a readback.
//!
//! Break-signal mode holds the line in a break condition until it is
//! disabled. The decoder drives it through the parity control commands.

use std::io::{ErrorKind, Read, Write};

use tokio_serial::SerialPort;
use uartlink_core::driver::{OneWireDriver, StopBits};
use uartlink_core::error::Result;

use crate::serial::{SerialConfig, open_port, serial_error, serial_stop_bits};

/// [`OneWireDriver`] over a serial port.
pub struct SingleWireSerial {
    port: Box<dyn SerialPort>,
    port_name: String,
    break_enabled: bool,
}

impl SingleWireSerial {
    /// Open `path` with `config` and wrap it.
    pub fn open(path: &str, config: &SerialConfig) -> Result<Self> {
        let port = open_port(path, config)?;
        Ok(Self::from_port(port))
    }

    /// Wrap an already opened port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        let port_name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        Self {
            port,
            port_name,
            break_enabled: false,
        }
    }

    /// Name the OS reported for the port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Whether the line is currently held in a break condition.
    pub fn is_break_enabled(&self) -> bool {
        self.break_enabled
    }
}

impl OneWireDriver for SingleWireSerial {
    fn begin(&mut self, stop_bits: StopBits, baud_rate: u32) -> Result<()> {
        tracing::debug!(port = %self.port_name, ?stop_bits, baud_rate, "Reconfiguring single-wire line");
        self.port
            .set_stop_bits(serial_stop_bits(stop_bits))
            .map_err(|e| serial_error("failed to set stop bits", e))?;
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
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, byte: u8) -> Result<()> {
        self.port.write_all(&[byte])?;
        Ok(())
    }

    fn enable_break(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.break_enabled {
            return Ok(());
        }
        let result = if enabled {
            self.port.set_break()
        } else {
            self.port.clear_break()
        };
        result.map_err(|e| serial_error("failed to change break condition", e))?;
        self.break_enabled = enabled;
        tracing::debug!(port = %self.port_name, enabled, "Break-signal mode");
        Ok(())
    }
}
