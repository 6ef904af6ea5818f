//! A scripted stand-in for a real protocol decoder.
//!
//! [`ScriptedDecoder`] frames on a single delimiter byte and records
//! everything a session hands it. It can also be scripted to issue control
//! commands when it sees particular bytes, which is how tests exercise the
//! control relay from inside `feed()`.
//!
//! Behaviour:
//!
//! - `initialize` records the initial baud and requests it via
//!   [`ControlCommand::SetBaudRate`].
//! - Payload bytes accumulate into the buffer; a delimiter completes the
//!   frame. Leading delimiters (empty frames) are ignored.
//! - A gap longer than the configured inter-byte timeout discards the partial
//!   frame before the new byte is handled.
//! - `write_frame` is refused while a frame is partially received. Otherwise
//!   it brackets the payload with `EnableTx`/`DisableTx`.
//! - With readback enabled, each written frame is expected back as an echo;
//!   the next completed frame is reported as [`FrameDirection::Readback`].
//! - The link counts as connected after the handshake frame arrives (any
//!   incoming frame, unless a specific handshake payload is configured).

use std::collections::HashMap;

use uartlink_core::control::ControlCommand;
use uartlink_core::decoder::{FrameDecoder, FrameDirection, FrameInfo, Link};

/// Default frame delimiter.
pub const DELIMITER: u8 = 0x7E;

/// A delimiter-framed decoder with recording and scripting hooks.
#[derive(Debug, Clone)]
pub struct ScriptedDecoder {
    delimiter: u8,
    handshake: Option<Vec<u8>>,
    readback: bool,
    inter_byte_timeout_ms: Option<u64>,
    script: HashMap<u8, Vec<ControlCommand>>,

    cursor: usize,
    capacity: usize,
    last_byte_ms: Option<u64>,
    readbacks_expected: usize,
    connected: bool,

    initialized: Vec<u32>,
    armed: Vec<(usize, usize)>,
    received: Vec<(u8, u64)>,
    completed: Vec<FrameInfo>,
    written_frames: Vec<Vec<u8>>,
    notifications: usize,
    timeouts: usize,
}

impl ScriptedDecoder {
    pub fn new() -> Self {
        ScriptedDecoder {
            delimiter: DELIMITER,
            handshake: None,
            readback: false,
            inter_byte_timeout_ms: None,
            script: HashMap::new(),
            cursor: 0,
            capacity: 0,
            last_byte_ms: None,
            readbacks_expected: 0,
            connected: false,
            initialized: Vec::new(),
            armed: Vec::new(),
            received: Vec::new(),
            completed: Vec::new(),
            written_frames: Vec::new(),
            notifications: 0,
            timeouts: 0,
        }
    }

    /// Use a different frame delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Only a frame with exactly this payload establishes the link.
    pub fn handshake(mut self, payload: &[u8]) -> Self {
        self.handshake = Some(payload.to_vec());
        self
    }

    /// Expect every written frame to come back as a readback.
    pub fn readback(mut self, enabled: bool) -> Self {
        self.readback = enabled;
        self
    }

    /// Abandon a partial frame when bytes are further apart than `ms`.
    pub fn inter_byte_timeout(mut self, ms: u64) -> Self {
        self.inter_byte_timeout_ms = Some(ms);
        self
    }

    /// Issue `commands` whenever `byte` is received, before handling it.
    pub fn on_byte(mut self, byte: u8, commands: &[ControlCommand]) -> Self {
        self.script.insert(byte, commands.to_vec());
        self
    }

    /// Baud rates passed to `initialize`, one per (re)start.
    pub fn initialized(&self) -> &[u32] {
        &self.initialized
    }

    /// `(address, capacity)` of every buffer passed to `prepare_for_read`.
    pub fn armed(&self) -> &[(usize, usize)] {
        &self.armed
    }

    /// Every byte handled, with its timestamp.
    pub fn received(&self) -> &[(u8, u64)] {
        &self.received
    }

    /// Every frame reported complete.
    pub fn completed(&self) -> &[FrameInfo] {
        &self.completed
    }

    /// Payloads accepted by `write_frame`.
    pub fn written_frames(&self) -> &[Vec<u8>] {
        &self.written_frames
    }

    pub fn notifications(&self) -> usize {
        self.notifications
    }

    /// Partial frames abandoned because of an inter-byte gap.
    pub fn timeouts(&self) -> usize {
        self.timeouts
    }

    /// Whether a frame is partially assembled.
    pub fn is_receiving(&self) -> bool {
        self.cursor > 0
    }

    fn complete(&mut self, buffer: &[u8]) -> FrameInfo {
        let length = self.cursor;
        let direction = if self.readbacks_expected > 0 {
            self.readbacks_expected -= 1;
            FrameDirection::Readback
        } else {
            FrameDirection::Incoming
        };

        if direction == FrameDirection::Incoming && !self.connected {
            self.connected = match &self.handshake {
                Some(expected) => &buffer[..length] == expected.as_slice(),
                None => true,
            };
        }

        self.cursor = 0;
        let info = FrameInfo { length, direction };
        self.completed.push(info);
        info
    }
}

impl Default for ScriptedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for ScriptedDecoder {
    fn initialize(&mut self, link: &mut dyn Link, initial_baud: u32) {
        self.initialized.push(initial_baud);
        self.connected = false;
        self.readbacks_expected = 0;
        self.last_byte_ms = None;
        link.control(ControlCommand::SetBaudRate(initial_baud));
    }

    fn prepare_for_read(&mut self, buffer: &mut [u8]) {
        self.cursor = 0;
        self.capacity = buffer.len();
        self.armed.push((buffer.as_ptr() as usize, buffer.len()));
    }

    fn handle_byte(
        &mut self,
        byte: u8,
        buffer: &mut [u8],
        timestamp_ms: u64,
        link: &mut dyn Link,
    ) -> Option<FrameInfo> {
        self.received.push((byte, timestamp_ms));

        if let (Some(timeout), Some(last)) = (self.inter_byte_timeout_ms, self.last_byte_ms) {
            if self.cursor > 0 && timestamp_ms.saturating_sub(last) > timeout {
                self.cursor = 0;
                self.timeouts += 1;
            }
        }
        self.last_byte_ms = Some(timestamp_ms);

        if let Some(commands) = self.script.get(&byte) {
            for &command in commands {
                link.control(command);
            }
        }

        if byte == self.delimiter {
            if self.cursor == 0 {
                return None;
            }
            return Some(self.complete(buffer));
        }

        // Overlong frames keep only what fits; the delimiter still ends them.
        if self.cursor < self.capacity.min(buffer.len()) {
            buffer[self.cursor] = byte;
            self.cursor += 1;
        }
        None
    }

    fn write_frame(&mut self, payload: &[u8], link: &mut dyn Link) -> bool {
        if self.cursor > 0 {
            return false;
        }
        link.control(ControlCommand::EnableTx);
        for &b in payload {
            link.write_byte(b);
        }
        link.write_byte(self.delimiter);
        link.control(ControlCommand::DisableTx);

        if self.readback {
            self.readbacks_expected += 1;
        }
        self.written_frames.push(payload.to_vec());
        true
    }

    fn notify(&mut self, link: &mut dyn Link) {
        self.notifications += 1;
        link.write_byte(self.delimiter);
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
