//! A hand-driven clock for deterministic timestamps.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uartlink_core::clock::Clock;

/// A [`Clock`] that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and move
/// another into a session. A non-zero step makes every reading advance the
/// clock afterwards, which spreads timestamps across a burst of bytes.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
    step_ms: u64,
}

impl ManualClock {
    /// A clock frozen at `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        ManualClock {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
            step_ms: 0,
        }
    }

    /// A clock at `start_ms` that advances by `step_ms` after every reading.
    pub fn stepping(start_ms: u64, step_ms: u64) -> Self {
        ManualClock {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
            step_ms,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Current time without advancing a stepping clock.
    pub fn peek(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}
