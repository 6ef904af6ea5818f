//! Host-side drivers and polling for uartlink.
//!
//! This crate provides concrete implementations of the driver traits from
//! `uartlink-core` on top of ordinary serial ports:
//!
//! - [`SerialUart`]: a full-duplex UART, with RTS or DTR wired to the line
//!   driver's transmit-enable input
//! - [`SingleWireSerial`]: a single shared wire, with break-signal mode
//!   mapped to the port's break condition
//! - [`run_poll_loop`]: drives [`Session::feed`](uartlink_core::Session::feed)
//!   from a tokio interval
//!
//! # Example
//!
//! ```no_run
//! use uartlink_core::{FrameDecoder, SessionBuilder};
//! use uartlink_transport::{SerialConfig, SerialUart};
//!
//! # fn example<D: FrameDecoder>(decoder: D) -> uartlink_core::Result<()> {
//! let uart = SerialUart::open("/dev/ttyUSB0", &SerialConfig::default())?;
//! let mut buffer = [0u8; 256];
//! let mut session = SessionBuilder::new().begin_hardware(uart, &mut buffer, decoder)?;
//! # let _ = session.feed();
//! # Ok(())
//! # }
//! ```

pub mod poll;
pub mod serial;
pub mod single_wire;
pub mod uart;

#[cfg(test)]
mod test_port;

pub use poll::{PollStats, run_poll_loop};
pub use serial::{ControlLine, DataBits, FlowControl, Parity, SerialConfig, open_port};
pub use single_wire::SingleWireSerial;
pub use uart::SerialUart;
