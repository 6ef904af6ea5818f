//! uartlink-test-harness: mock drivers, a scripted decoder and a manual
//! clock for uartlink.
//!
//! - [`MockUart`] / [`MockOneWire`] record every driver call and let tests
//!   inject received bytes.
//! - [`ScriptedDecoder`] frames on a delimiter byte, records what it is fed,
//!   and can issue control commands on cue.
//! - [`ManualClock`] gives deterministic timestamps.

pub mod clock;
pub mod mock_decoder;
pub mod mock_uart;

pub use clock::ManualClock;
pub use mock_decoder::{DELIMITER, ScriptedDecoder};
pub use mock_uart::{MockOneWire, MockUart, OneWireEvent, UartEvent};
