//! The frame decoder contract.
//!
//! The decoder owns the accessory protocol: frame boundaries, escaping,
//! checksums, the connection handshake. A [`Session`](crate::Session) feeds it
//! one byte at a time and gives it a [`Link`] whenever it may need to talk
//! back to the line. The decoder never sees which backend is active.

use crate::control::ControlCommand;

/// The decoder's view of the serial line.
///
/// Passed into every decoder call that may transmit or reconfigure. The
/// decoder must not hold on to it between calls.
pub trait Link {
    /// Transmit one byte on the active backend.
    fn write_byte(&mut self, byte: u8);

    /// Apply a control command to the active backend.
    fn control(&mut self, command: ControlCommand);
}

/// Where a completed frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameDirection {
    /// Sent by the host.
    Incoming,
    /// The line echo of a frame this side transmitted.
    Readback,
}

/// A completed frame, as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameInfo {
    /// Number of payload bytes at the start of the receive buffer.
    pub length: usize,
    pub direction: FrameDirection,
}

impl FrameInfo {
    pub fn incoming(length: usize) -> Self {
        Self {
            length,
            direction: FrameDirection::Incoming,
        }
    }

    pub fn readback(length: usize) -> Self {
        Self {
            length,
            direction: FrameDirection::Readback,
        }
    }

    pub fn is_incoming(&self) -> bool {
        self.direction == FrameDirection::Incoming
    }
}

/// A byte-level frame decoder driven by a [`Session`](crate::Session).
pub trait FrameDecoder: Send {
    /// Called once when a session begins (and again on every re-begin).
    ///
    /// `initial_baud` is the rate the decoder should bring the line up at,
    /// typically by issuing [`ControlCommand::SetBaudRate`] through `link`.
    fn initialize(&mut self, link: &mut dyn Link, initial_baud: u32);

    /// Arm the decoder to assemble the next frame into `buffer`.
    ///
    /// Called after `initialize` and after every completed frame, always with
    /// the same buffer. Its capacity is `buffer.len()`.
    fn prepare_for_read(&mut self, buffer: &mut [u8]);

    /// Consume one received byte.
    ///
    /// Returns `Some` when this byte completed a frame. `timestamp_ms` comes
    /// from a monotonic clock and is non-decreasing across calls.
    fn handle_byte(
        &mut self,
        byte: u8,
        buffer: &mut [u8],
        timestamp_ms: u64,
        link: &mut dyn Link,
    ) -> Option<FrameInfo>;

    /// Frame and transmit `payload`. Returns `false` if a frame cannot be sent
    /// right now (for example while a receive is in progress).
    fn write_frame(&mut self, payload: &[u8], link: &mut dyn Link) -> bool;

    /// Emit a keepalive/presence signal.
    fn notify(&mut self, link: &mut dyn Link);

    /// Whether the decoder considers the link established.
    fn is_connected(&self) -> bool;
}
