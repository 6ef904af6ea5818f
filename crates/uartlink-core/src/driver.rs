//! Physical serial driver traits.
//!
//! A [`Backend`](crate::backend::Backend) never talks to hardware directly.
//! It wraps one of two driver contracts:
//!
//! - [`UartDriver`] -- a full-duplex hardware UART with a separate
//!   transmit-enable line and a real parity setting.
//! - [`OneWireDriver`] -- a software-emulated serial line sharing one wire for
//!   both directions. It has no transmit-enable line and signals parity
//!   changes as a break condition instead.
//!
//! Concrete drivers live in `uartlink-transport` (serial ports) and
//! `uartlink-test-harness` (recording mocks). Every method is fallible so
//! host drivers can surface OS errors; the backend adapters decide what to do
//! with them.

use crate::error::Result;

/// Number of stop bits framing each character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopBits {
    One,
    Two,
}

/// Driver contract for a hardware UART.
pub trait UartDriver: Send {
    /// (Re)start the UART at the given baud rate.
    fn begin(&mut self, baud_rate: u32) -> Result<()>;

    /// Number of received bytes that can be read without blocking.
    fn available(&mut self) -> Result<usize>;

    /// Read one received byte, or `None` if nothing is buffered.
    fn read(&mut self) -> Result<Option<u8>>;

    /// Queue one byte for transmission.
    fn write(&mut self, byte: u8) -> Result<()>;

    /// Block until every queued byte has left the shift register.
    fn flush(&mut self) -> Result<()>;

    /// Drive the transmit-enable line.
    fn set_tx_enabled(&mut self, enabled: bool) -> Result<()>;

    /// Select even parity (`true`) or no parity (`false`).
    fn set_even_parity(&mut self, even: bool) -> Result<()>;
}

/// Driver contract for a software single-wire serial line.
pub trait OneWireDriver: Send {
    /// (Re)start the line with the given framing and baud rate.
    fn begin(&mut self, stop_bits: StopBits, baud_rate: u32) -> Result<()>;

    /// Number of received bytes that can be read without blocking.
    fn available(&mut self) -> Result<usize>;

    /// Read one received byte, or `None` if nothing is buffered.
    fn read(&mut self) -> Result<Option<u8>>;

    /// Transmit one byte.
    fn write(&mut self, byte: u8) -> Result<()>;

    /// Enter (`true`) or leave (`false`) break-signal mode.
    fn enable_break(&mut self, enabled: bool) -> Result<()>;
}
