//! Async polling loop for a [`Session`].
//!
//! [`Session::feed`] never blocks, so something has to call it regularly.
//! [`run_poll_loop`] does that on a tokio interval: one `feed()` per tick,
//! every completed frame handed to a callback, until the callback breaks or
//! the cancellation token fires.
//!
//! # Example
//!
//! ```no_run
//! use std::ops::ControlFlow;
//! use std::time::Duration;
//!
//! use tokio_util::sync::CancellationToken;
//! use uartlink_core::{FrameDecoder, Session};
//! use uartlink_transport::run_poll_loop;
//!
//! # async fn example<D: FrameDecoder>(session: &mut Session<'_, D>) -> uartlink_core::Result<()> {
//! let cancel = CancellationToken::new();
//! let stats = run_poll_loop(session, Duration::from_millis(5), &cancel, |info, frame| {
//!     println!("{:?}: {:02X?}", info.direction, frame);
//!     ControlFlow::Continue(())
//! })
//! .await?;
//! println!("{} frames in {} ticks", stats.frames, stats.ticks);
//! # Ok(())
//! # }
//! ```

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uartlink_core::clock::Clock;
use uartlink_core::decoder::{FrameDecoder, FrameInfo};
use uartlink_core::error::{Error, Result};
use uartlink_core::session::Session;

/// Counters from one run of [`run_poll_loop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Interval ticks handled (each one called `feed()` once).
    pub ticks: u64,
    /// Frames handed to the callback.
    pub frames: u64,
}

/// Poll `session` every `period` until cancelled or `on_frame` breaks.
///
/// Ticks missed because the task was descheduled are skipped rather than
/// replayed in a burst.
pub async fn run_poll_loop<D, C, F>(
    session: &mut Session<'_, D, C>,
    period: Duration,
    cancel: &CancellationToken,
    mut on_frame: F,
) -> Result<PollStats>
where
    D: FrameDecoder,
    C: Clock,
    F: FnMut(FrameInfo, &[u8]) -> ControlFlow<()>,
{
    if period.is_zero() {
        return Err(Error::InvalidParameter(
            "poll period must be non-zero".into(),
        ));
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = PollStats::default();

    tracing::debug!(
        backend = %session.backend_kind(),
        period_ms = period.as_millis() as u64,
        "Starting poll loop"
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(ticks = stats.ticks, frames = stats.frames, "Poll loop cancelled");
                break;
            }
            _ = interval.tick() => {}
        }

        stats.ticks += 1;
        if let Some(info) = session.feed() {
            stats.frames += 1;
            if on_frame(info, session.frame(&info)).is_break() {
                tracing::debug!(ticks = stats.ticks, frames = stats.frames, "Poll loop stopped by handler");
                break;
            }
        }
    }

    Ok(stats)
}
