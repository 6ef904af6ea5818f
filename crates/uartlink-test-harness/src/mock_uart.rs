//! Recording mock drivers for both backend contracts.
//!
//! [`MockUart`] implements [`UartDriver`] and [`MockOneWire`] implements
//! [`OneWireDriver`]. Both are cheap handles onto shared state: clone one,
//! move the clone into a session, and inspect the first handle afterwards.
//!
//! # Example
//!
//! ```
//! use uartlink_test_harness::{MockUart, UartEvent};
//! use uartlink_core::UartDriver;
//!
//! let uart = MockUart::new();
//! let mut driver = uart.clone();
//! driver.begin(57_601).unwrap();
//! assert_eq!(uart.events(), vec![UartEvent::Begin(57_601)]);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use uartlink_core::driver::{OneWireDriver, StopBits, UartDriver};
use uartlink_core::error::{Error, Result};

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One call observed by a [`MockUart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartEvent {
    Begin(u32),
    Write(u8),
    Flush,
    TxEnabled(bool),
    EvenParity(bool),
}

#[derive(Debug)]
struct UartState {
    rx: VecDeque<u8>,
    /// Written but not yet flushed.
    pending: Vec<u8>,
    /// Flushed onto the wire.
    sent: Vec<u8>,
    /// Lost because TX-enable was dropped before they were flushed.
    truncated: Vec<u8>,
    events: Vec<UartEvent>,
    baud_rate: Option<u32>,
    even_parity: bool,
    tx_enabled: bool,
    connected: bool,
}

/// A mock hardware UART.
///
/// Written bytes sit in a pending queue until [`flush`](UartDriver::flush).
/// Deasserting TX-enable while bytes are pending discards them into
/// [`truncated`](MockUart::truncated), the way a real transceiver would cut
/// off a character mid-shift.
#[derive(Debug, Clone)]
pub struct MockUart {
    state: Arc<Mutex<UartState>>,
}

impl MockUart {
    /// Create a connected mock UART with nothing received and nothing sent.
    pub fn new() -> Self {
        MockUart {
            state: Arc::new(Mutex::new(UartState {
                rx: VecDeque::new(),
                pending: Vec::new(),
                sent: Vec::new(),
                truncated: Vec::new(),
                events: Vec::new(),
                baud_rate: None,
                even_parity: false,
                tx_enabled: false,
                connected: true,
            })),
        }
    }

    /// Queue bytes as if the host had sent them.
    pub fn push_rx(&self, bytes: &[u8]) {
        lock(&self.state).rx.extend(bytes);
    }

    /// Number of received bytes not yet read.
    pub fn rx_remaining(&self) -> usize {
        lock(&self.state).rx.len()
    }

    /// Every call made on any handle, in order.
    pub fn events(&self) -> Vec<UartEvent> {
        lock(&self.state).events.clone()
    }

    /// Bytes that made it onto the wire.
    pub fn sent(&self) -> Vec<u8> {
        lock(&self.state).sent.clone()
    }

    /// Bytes written but not yet flushed.
    pub fn pending(&self) -> Vec<u8> {
        lock(&self.state).pending.clone()
    }

    /// Bytes cut off by disabling TX before a flush.
    pub fn truncated(&self) -> Vec<u8> {
        lock(&self.state).truncated.clone()
    }

    /// Every byte passed to `write`, flushed or not.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|e| match e {
                UartEvent::Write(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Baud rate from the most recent `begin`, if any.
    pub fn baud_rate(&self) -> Option<u32> {
        lock(&self.state).baud_rate
    }

    pub fn is_even_parity(&self) -> bool {
        lock(&self.state).even_parity
    }

    pub fn is_tx_enabled(&self) -> bool {
        lock(&self.state).tx_enabled
    }

    /// Set the connected state.
    ///
    /// When set to `false`, every driver call returns [`Error::NotConnected`].
    pub fn set_connected(&self, connected: bool) {
        lock(&self.state).connected = connected;
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut UartState) -> T) -> Result<T> {
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(Error::NotConnected);
        }
        Ok(f(&mut *state))
    }
}

impl Default for MockUart {
    fn default() -> Self {
        Self::new()
    }
}

impl UartDriver for MockUart {
    fn begin(&mut self, baud_rate: u32) -> Result<()> {
        self.with_state(|s| {
            s.events.push(UartEvent::Begin(baud_rate));
            s.baud_rate = Some(baud_rate);
        })
    }

    fn available(&mut self) -> Result<usize> {
        self.with_state(|s| s.rx.len())
    }

    fn read(&mut self) -> Result<Option<u8>> {
        self.with_state(|s| s.rx.pop_front())
    }

    fn write(&mut self, byte: u8) -> Result<()> {
        self.with_state(|s| {
            s.events.push(UartEvent::Write(byte));
            s.pending.push(byte);
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.with_state(|s| {
            s.events.push(UartEvent::Flush);
            let pending = std::mem::take(&mut s.pending);
            s.sent.extend(pending);
        })
    }

    fn set_tx_enabled(&mut self, enabled: bool) -> Result<()> {
        self.with_state(|s| {
            s.events.push(UartEvent::TxEnabled(enabled));
            if !enabled {
                let pending = std::mem::take(&mut s.pending);
                s.truncated.extend(pending);
            }
            s.tx_enabled = enabled;
        })
    }

    fn set_even_parity(&mut self, even: bool) -> Result<()> {
        self.with_state(|s| {
            s.events.push(UartEvent::EvenParity(even));
            s.even_parity = even;
        })
    }
}

/// One call observed by a [`MockOneWire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneWireEvent {
    Begin { stop_bits: StopBits, baud_rate: u32 },
    Write(u8),
    Break(bool),
}

#[derive(Debug)]
struct OneWireState {
    rx: VecDeque<u8>,
    sent: Vec<u8>,
    events: Vec<OneWireEvent>,
    baud_rate: Option<u32>,
    stop_bits: Option<StopBits>,
    break_enabled: bool,
    echo: bool,
}

/// A mock software single-wire line.
///
/// With [`with_echo`](MockOneWire::with_echo), every transmitted byte is also
/// received, as on a real shared wire.
#[derive(Debug, Clone)]
pub struct MockOneWire {
    state: Arc<Mutex<OneWireState>>,
}

impl MockOneWire {
    pub fn new() -> Self {
        MockOneWire {
            state: Arc::new(Mutex::new(OneWireState {
                rx: VecDeque::new(),
                sent: Vec::new(),
                events: Vec::new(),
                baud_rate: None,
                stop_bits: None,
                break_enabled: false,
                echo: false,
            })),
        }
    }

    /// Loop transmitted bytes back into the receive queue.
    pub fn with_echo(self) -> Self {
        lock(&self.state).echo = true;
        self
    }

    pub fn push_rx(&self, bytes: &[u8]) {
        lock(&self.state).rx.extend(bytes);
    }

    pub fn rx_remaining(&self) -> usize {
        lock(&self.state).rx.len()
    }

    pub fn events(&self) -> Vec<OneWireEvent> {
        lock(&self.state).events.clone()
    }

    pub fn sent(&self) -> Vec<u8> {
        lock(&self.state).sent.clone()
    }

    pub fn baud_rate(&self) -> Option<u32> {
        lock(&self.state).baud_rate
    }

    pub fn stop_bits(&self) -> Option<StopBits> {
        lock(&self.state).stop_bits
    }

    pub fn is_break_enabled(&self) -> bool {
        lock(&self.state).break_enabled
    }
}

impl Default for MockOneWire {
    fn default() -> Self {
        Self::new()
    }
}

impl OneWireDriver for MockOneWire {
    fn begin(&mut self, stop_bits: StopBits, baud_rate: u32) -> Result<()> {
        let mut s = lock(&self.state);
        s.events.push(OneWireEvent::Begin {
            stop_bits,
            baud_rate,
        });
        s.stop_bits = Some(stop_bits);
        s.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        Ok(lock(&self.state).rx.len())
    }

    fn read(&mut self) -> Result<Option<u8>> {
        Ok(lock(&self.state).rx.pop_front())
    }

    fn write(&mut self, byte: u8) -> Result<()> {
        let mut s = lock(&self.state);
        s.events.push(OneWireEvent::Write(byte));
        s.sent.push(byte);
        if s.echo {
            s.rx.push_back(byte);
        }
        Ok(())
    }

    fn enable_break(&mut self, enabled: bool) -> Result<()> {
        let mut s = lock(&self.state);
        s.events.push(OneWireEvent::Break(enabled));
        s.break_enabled = enabled;
        Ok(())
    }
}
