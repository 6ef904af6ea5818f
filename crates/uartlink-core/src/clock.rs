//! Millisecond timestamps for byte delivery.
//!
//! Decoders abandon a partially assembled frame when the gap between two
//! bytes exceeds their protocol threshold. The session only supplies the
//! timestamp; the timeout policy belongs to the decoder.

use std::time::Instant;

/// A monotonic millisecond clock.
pub trait Clock: Send {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`std::time::Instant`], with its origin at creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
