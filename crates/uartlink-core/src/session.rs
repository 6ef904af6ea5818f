//! Session: backend selection, frame feeding and the control relay.
//!
//! A [`Session`] binds one [`Backend`] to one [`FrameDecoder`] and one
//! caller-owned receive buffer. The caller polls [`Session::feed`] from its
//! main loop; each call drains every byte the backend currently holds into
//! the decoder and returns as soon as a frame completes. Control commands the
//! decoder issues while handling a byte are applied to the backend before the
//! next byte is read.
//!
//! # Example
//!
//! ```no_run
//! use uartlink_core::{FrameDecoder, SessionBuilder, UartDriver};
//!
//! # fn handle(_frame: &[u8]) {}
//! # fn example<U, D>(uart: U, decoder: D) -> uartlink_core::Result<()>
//! # where
//! #     U: UartDriver + 'static,
//! #     D: FrameDecoder,
//! # {
//! let mut buffer = [0u8; 256];
//! let mut session = SessionBuilder::new()
//!     .initial_baud(57_600)
//!     .begin_hardware(uart, &mut buffer, decoder)?;
//!
//! loop {
//!     if let Some(info) = session.feed() {
//!         handle(session.frame(&info));
//!     }
//! }
//! # }
//! ```

use crate::backend::{Backend, BackendKind, HardwareBackend, SoftwareBackend};
use crate::clock::{Clock, MonotonicClock};
use crate::control::{ControlCommand, DEFAULT_BAUD_RATE};
use crate::decoder::{FrameDecoder, FrameInfo, Link};
use crate::driver::{OneWireDriver, UartDriver};
use crate::error::{Error, Result};

/// Routes decoder writes and control commands to the active backend.
pub struct ControlRelay<'a> {
    backend: &'a mut dyn Backend,
}

impl<'a> ControlRelay<'a> {
    /// Relay onto `backend` for the duration of one decoder call.
    pub fn new(backend: &'a mut dyn Backend) -> Self {
        Self { backend }
    }
}

impl Link for ControlRelay<'_> {
    fn write_byte(&mut self, byte: u8) {
        tracing::trace!(byte, "Sending byte");
        self.backend.send_byte(byte);
    }

    fn control(&mut self, command: ControlCommand) {
        tracing::debug!(backend = %self.backend.kind(), %command, "Applying control command");
        self.backend.apply(command);
    }
}

/// Configuration for a [`Session`].
///
/// Defaults: initial baud [`DEFAULT_BAUD_RATE`], [`MonotonicClock`].
#[derive(Debug, Clone)]
pub struct SessionBuilder<C = MonotonicClock> {
    initial_baud: u32,
    clock: C,
}

impl SessionBuilder<MonotonicClock> {
    /// Builder with the default baud rate and clock.
    pub fn new() -> Self {
        Self {
            initial_baud: DEFAULT_BAUD_RATE,
            clock: MonotonicClock::new(),
        }
    }
}

impl Default for SessionBuilder<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionBuilder<C> {
    /// Baud rate handed to the decoder's `initialize` (default: 57600).
    pub fn initial_baud(mut self, baud: u32) -> Self {
        self.initial_baud = baud;
        self
    }

    /// Replace the timestamp source.
    pub fn clock<C2: Clock>(self, clock: C2) -> SessionBuilder<C2> {
        SessionBuilder {
            initial_baud: self.initial_baud,
            clock,
        }
    }

    /// Begin a session on a hardware UART.
    pub fn begin_hardware<'buf, U, D>(
        self,
        uart: U,
        buffer: &'buf mut [u8],
        decoder: D,
    ) -> Result<Session<'buf, D, C>>
    where
        U: UartDriver + 'static,
        D: FrameDecoder,
    {
        self.begin(Box::new(HardwareBackend::new(uart)), buffer, decoder)
    }

    /// Begin a session on a software single-wire line.
    pub fn begin_software<'buf, W, D>(
        self,
        line: W,
        buffer: &'buf mut [u8],
        decoder: D,
    ) -> Result<Session<'buf, D, C>>
    where
        W: OneWireDriver + 'static,
        D: FrameDecoder,
    {
        self.begin(Box::new(SoftwareBackend::new(line)), buffer, decoder)
    }

    fn begin<'buf, D: FrameDecoder>(
        self,
        backend: Box<dyn Backend>,
        buffer: &'buf mut [u8],
        decoder: D,
    ) -> Result<Session<'buf, D, C>> {
        if buffer.is_empty() {
            return Err(Error::InvalidParameter(
                "receive buffer must not be empty".into(),
            ));
        }
        if self.initial_baud == 0 {
            return Err(Error::InvalidParameter(
                "initial baud rate must be non-zero".into(),
            ));
        }

        let mut session = Session {
            backend,
            decoder,
            buffer,
            clock: self.clock,
            initial_baud: self.initial_baud,
        };
        session.start();
        Ok(session)
    }
}

/// One accessory link: an active backend, a decoder and a lent receive buffer.
pub struct Session<'buf, D, C = MonotonicClock> {
    backend: Box<dyn Backend>,
    decoder: D,
    buffer: &'buf mut [u8],
    clock: C,
    initial_baud: u32,
}

impl<'buf, D: FrameDecoder> Session<'buf, D, MonotonicClock> {
    /// Begin a session on a hardware UART with default configuration.
    pub fn begin_hardware<U>(uart: U, buffer: &'buf mut [u8], decoder: D) -> Result<Self>
    where
        U: UartDriver + 'static,
    {
        SessionBuilder::new().begin_hardware(uart, buffer, decoder)
    }

    /// Begin a session on a software single-wire line with default configuration.
    pub fn begin_software<W>(line: W, buffer: &'buf mut [u8], decoder: D) -> Result<Self>
    where
        W: OneWireDriver + 'static,
    {
        SessionBuilder::new().begin_software(line, buffer, decoder)
    }
}

impl<'buf, D: FrameDecoder, C: Clock> Session<'buf, D, C> {
    fn start(&mut self) {
        tracing::info!(
            backend = %self.backend.kind(),
            initial_baud = self.initial_baud,
            buffer_len = self.buffer.len(),
            "Beginning session"
        );
        let mut relay = ControlRelay::new(self.backend.as_mut());
        self.decoder.initialize(&mut relay, self.initial_baud);
        self.decoder.prepare_for_read(self.buffer);
    }

    /// Switch to a hardware UART and restart the decoder on the same buffer.
    pub fn restart_hardware<U>(&mut self, uart: U)
    where
        U: UartDriver + 'static,
    {
        self.backend = Box::new(HardwareBackend::new(uart));
        self.start();
    }

    /// Switch to a software single-wire line and restart the decoder on the
    /// same buffer.
    pub fn restart_software<W>(&mut self, line: W)
    where
        W: OneWireDriver + 'static,
    {
        self.backend = Box::new(SoftwareBackend::new(line));
        self.start();
    }

    /// Drain the backend into the decoder.
    ///
    /// Returns `Some` as soon as a frame completes; the decoder has already
    /// been re-armed on the same buffer by then and the frame bytes are at
    /// the start of [`buffer`](Self::buffer). Returns `None` once the backend
    /// has no more bytes. Never blocks.
    pub fn feed(&mut self) -> Option<FrameInfo> {
        while self.backend.bytes_available() > 0 {
            let Some(byte) = self.backend.receive_byte() else {
                break;
            };
            let timestamp_ms = self.clock.now_ms();
            tracing::trace!(byte, timestamp_ms, "Received byte");

            let mut relay = ControlRelay::new(self.backend.as_mut());
            let completed = self
                .decoder
                .handle_byte(byte, self.buffer, timestamp_ms, &mut relay);

            if let Some(info) = completed {
                self.decoder.prepare_for_read(self.buffer);
                tracing::debug!(
                    length = info.length,
                    direction = ?info.direction,
                    "Frame complete"
                );
                return Some(info);
            }
        }
        None
    }

    /// Hand an outgoing frame to the decoder. `false` means "not now, retry".
    pub fn write(&mut self, payload: &[u8]) -> bool {
        let mut relay = ControlRelay::new(self.backend.as_mut());
        let accepted = self.decoder.write_frame(payload, &mut relay);
        if !accepted {
            tracing::debug!(bytes = payload.len(), "Decoder declined frame");
        }
        accepted
    }

    /// Ask the decoder to emit a keepalive/presence signal.
    pub fn notify(&mut self) {
        let mut relay = ControlRelay::new(self.backend.as_mut());
        self.decoder.notify(&mut relay);
    }

    /// Whether the decoder considers the accessory link established.
    pub fn is_connected(&self) -> bool {
        self.decoder.is_connected()
    }

    /// Which backend the session is currently bound to.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The whole lent receive buffer, including bytes past the last frame.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer[..]
    }

    /// The bytes of a frame just returned by [`feed`](Self::feed).
    pub fn frame(&self, info: &FrameInfo) -> &[u8] {
        &self.buffer[..info.length.min(self.buffer.len())]
    }

    /// Borrow the decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// End the session, returning the decoder and the buffer.
    pub fn release(self) -> (D, &'buf mut [u8]) {
        (self.decoder, self.buffer)
    }
}
