//! uartlink-core: transport layer for accessory protocols over serial lines.
//!
//! An accessory talks to its host over either a hardware UART or a
//! software-emulated single-wire line. This crate hides that difference from
//! the protocol decoder sitting on top:
//!
//! - [`Session`] drains received bytes into a [`FrameDecoder`], timestamps
//!   them, and re-arms the decoder on the same buffer after every frame.
//! - [`ControlRelay`] applies the decoder's [`ControlCommand`]s (TX enable,
//!   parity, baud) and byte writes to whichever [`Backend`] is active.
//! - [`HardwareBackend`] and [`SoftwareBackend`] adapt the two physical
//!   driver contracts, [`UartDriver`] and [`OneWireDriver`].
//!
//! Everything runs on the caller's polling loop. Nothing here blocks, spawns,
//! or locks.

pub mod backend;
pub mod clock;
pub mod control;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod session;

pub use backend::{Backend, BackendKind, HardwareBackend, SoftwareBackend};
pub use clock::{Clock, MonotonicClock};
pub use control::{ControlCommand, DEFAULT_BAUD_RATE, PRESCALER_QUIRK_BAUD_RATE};
pub use decoder::{FrameDecoder, FrameDirection, FrameInfo, Link};
pub use driver::{OneWireDriver, StopBits, UartDriver};
pub use error::{Error, Result};
pub use session::{ControlRelay, Session, SessionBuilder};
