//! The two serial backends and the control dispatch table.
//!
//! [`Backend`] is the single capability set a [`Session`](crate::Session)
//! routes every transport operation through. There are exactly two
//! implementations:
//!
//! | command          | [`HardwareBackend`]                      | [`SoftwareBackend`]          |
//! |------------------|------------------------------------------|------------------------------|
//! | `EnableTx`       | assert TX-enable                         | no-op                        |
//! | `DisableTx`      | flush, then deassert TX-enable           | no-op                        |
//! | `SetParityEven`  | even parity                              | break mode on                |
//! | `SetParityNone`  | no parity                                | break mode off               |
//! | `SetBaudRate(r)` | re-begin at [`hardware_baud_rate`]`(r)`  | re-begin at `r`, 1 stop bit  |
//!
//! The software line encodes the parity phase of the handshake as a break
//! condition, so the parity commands must map onto `enable_break` exactly as
//! listed. Upstream decoders rely on that translation.
//!
//! Driver errors cannot be reported to the decoder, so they are logged and
//! the operation is treated as having had no effect.

use std::fmt;

use crate::control::{ControlCommand, hardware_baud_rate};
use crate::driver::{OneWireDriver, StopBits, UartDriver};
use crate::error::Result;

/// Which physical backend a session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Hardware UART with a transmit-enable line.
    Hardware,
    /// Software-emulated single-wire serial.
    Software,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Hardware => write!(f, "hardware"),
            BackendKind::Software => write!(f, "software"),
        }
    }
}

/// Byte transport plus electrical control, independent of the physical line.
pub trait Backend: Send {
    /// The variant this backend implements.
    fn kind(&self) -> BackendKind;

    /// Transmit one byte. There is no backpressure signal at this level.
    fn send_byte(&mut self, byte: u8);

    /// Number of received bytes ready to read. `0` means "poll again later".
    fn bytes_available(&mut self) -> usize;

    /// Take the next received byte, if any.
    fn receive_byte(&mut self) -> Option<u8>;

    /// Apply a control command to the line.
    fn apply(&mut self, command: ControlCommand);
}

fn log_failure(kind: BackendKind, operation: &str, result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!(backend = %kind, operation, error = %e, "Serial driver operation failed");
    }
}

/// [`Backend`] over a hardware UART.
pub struct HardwareBackend<U> {
    uart: U,
}

impl<U: UartDriver> HardwareBackend<U> {
    /// Wrap a hardware UART driver.
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    /// Borrow the wrapped driver.
    pub fn driver(&self) -> &U {
        &self.uart
    }

    /// Unwrap the driver.
    pub fn into_driver(self) -> U {
        self.uart
    }
}

impl<U: UartDriver> Backend for HardwareBackend<U> {
    fn kind(&self) -> BackendKind {
        BackendKind::Hardware
    }

    fn send_byte(&mut self, byte: u8) {
        log_failure(BackendKind::Hardware, "write", self.uart.write(byte));
    }

    fn bytes_available(&mut self) -> usize {
        match self.uart.available() {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(backend = "hardware", error = %e, "Failed to query receive buffer");
                0
            }
        }
    }

    fn receive_byte(&mut self) -> Option<u8> {
        match self.uart.read() {
            Ok(byte) => byte,
            Err(e) => {
                tracing::warn!(backend = "hardware", error = %e, "Failed to read byte");
                None
            }
        }
    }

    fn apply(&mut self, command: ControlCommand) {
        let kind = BackendKind::Hardware;
        match command {
            ControlCommand::EnableTx => {
                log_failure(kind, "set_tx_enabled", self.uart.set_tx_enabled(true));
            }
            ControlCommand::DisableTx => {
                // Deasserting TX-enable with bytes still shifting out truncates them.
                log_failure(kind, "flush", self.uart.flush());
                log_failure(kind, "set_tx_enabled", self.uart.set_tx_enabled(false));
            }
            ControlCommand::SetParityEven => {
                log_failure(kind, "set_even_parity", self.uart.set_even_parity(true));
            }
            ControlCommand::SetParityNone => {
                log_failure(kind, "set_even_parity", self.uart.set_even_parity(false));
            }
            ControlCommand::SetBaudRate(requested) => {
                let baud_rate = hardware_baud_rate(requested);
                tracing::info!(backend = %kind, requested, baud_rate, "Setting baud rate");
                log_failure(kind, "begin", self.uart.begin(baud_rate));
            }
        }
    }
}

/// [`Backend`] over a software single-wire serial line.
pub struct SoftwareBackend<W> {
    line: W,
}

impl<W: OneWireDriver> SoftwareBackend<W> {
    /// Wrap a single-wire line driver.
    pub fn new(line: W) -> Self {
        Self { line }
    }

    /// Borrow the wrapped driver.
    pub fn driver(&self) -> &W {
        &self.line
    }

    /// Unwrap the driver.
    pub fn into_driver(self) -> W {
        self.line
    }
}

impl<W: OneWireDriver> Backend for SoftwareBackend<W> {
    fn kind(&self) -> BackendKind {
        BackendKind::Software
    }

    fn send_byte(&mut self, byte: u8) {
        log_failure(BackendKind::Software, "write", self.line.write(byte));
    }

    fn bytes_available(&mut self) -> usize {
        match self.line.available() {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(backend = "software", error = %e, "Failed to query receive buffer");
                0
            }
        }
    }

    fn receive_byte(&mut self) -> Option<u8> {
        match self.line.read() {
            Ok(byte) => byte,
            Err(e) => {
                tracing::warn!(backend = "software", error = %e, "Failed to read byte");
                None
            }
        }
    }

    fn apply(&mut self, command: ControlCommand) {
        let kind = BackendKind::Software;
        match command {
            // Single wire: the line direction is implicit, there is nothing to drive.
            ControlCommand::EnableTx | ControlCommand::DisableTx => {}
            ControlCommand::SetParityEven => {
                log_failure(kind, "enable_break", self.line.enable_break(true));
            }
            ControlCommand::SetParityNone => {
                log_failure(kind, "enable_break", self.line.enable_break(false));
            }
            ControlCommand::SetBaudRate(baud_rate) => {
                tracing::info!(backend = %kind, baud_rate, "Setting baud rate");
                log_failure(kind, "begin", self.line.begin(StopBits::One, baud_rate));
            }
        }
    }
}
