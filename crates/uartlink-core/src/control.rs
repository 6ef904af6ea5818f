//! Decoder-issued control commands.
//!
//! A frame decoder reconfigures the serial line while it works: it turns the
//! transmit driver on and off around its own replies, flips parity during the
//! connection handshake, and renegotiates the baud rate once a link is up.
//! Each of those requests is a [`ControlCommand`] passed to
//! [`Link::control`](crate::decoder::Link::control). Commands take effect
//! immediately on the active backend; nothing is queued or remembered.

use std::fmt;

/// Baud rate a session starts at unless configured otherwise.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Hardware UART baud rate that is configured one unit higher than requested.
///
/// Some UART prescaler calculations pick a deliberately poor divisor at
/// exactly this rate. Requesting one baud more lands on the accurate divisor
/// while staying well within receiver tolerance.
pub const PRESCALER_QUIRK_BAUD_RATE: u32 = 57_600;

/// An electrical reconfiguration request from the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// Assert the transmit-enable line.
    EnableTx,
    /// Drain pending output, then deassert the transmit-enable line.
    DisableTx,
    /// Switch the line to even parity.
    SetParityEven,
    /// Switch the line to no parity.
    SetParityNone,
    /// Reconfigure the line for a new baud rate.
    SetBaudRate(u32),
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::EnableTx => write!(f, "enable-tx"),
            ControlCommand::DisableTx => write!(f, "disable-tx"),
            ControlCommand::SetParityEven => write!(f, "set-parity-even"),
            ControlCommand::SetParityNone => write!(f, "set-parity-none"),
            ControlCommand::SetBaudRate(rate) => write!(f, "set-baud({rate})"),
        }
    }
}

/// Baud rate actually programmed into a hardware UART for `requested`.
///
/// # Example
///
/// ```
/// use uartlink_core::control::hardware_baud_rate;
///
/// assert_eq!(hardware_baud_rate(57_600), 57_601);
/// assert_eq!(hardware_baud_rate(115_200), 115_200);
/// ```
pub fn hardware_baud_rate(requested: u32) -> u32 {
    if requested == PRESCALER_QUIRK_BAUD_RATE {
        requested + 1
    } else {
        requested
    }
}
