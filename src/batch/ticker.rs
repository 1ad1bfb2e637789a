//! Tick Source Module
//!
//! Periodic wakeups for timed mode. A tick source is polled alongside the
//! input stream and is stopped exactly once, when the worker exits.

use crate::AggregatorError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior, interval_at};
use tracing::debug;

/// Source of flush ticks for a timed aggregator
///
/// `tick` must be cancel safe: the worker races it against the input stream
/// and drops whichever future loses.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick
    async fn tick(&mut self);

    /// Release the timer. Consumes the source, so it can only happen once.
    fn stop(self)
    where
        Self: Sized;

    /// Fixed tick period, if the source has one
    fn period(&self) -> Option<Duration> {
        None
    }
}

/// Longest period an [`IntervalTicker`] honors; larger values are clamped
///
/// Roughly 30 years.
pub const MAX_TICK_PERIOD: Duration = Duration::from_secs(86400 * 365 * 30);

/// Tick source backed by a tokio [`Interval`]
///
/// The first tick fires one full period after creation, not immediately.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
    period: Duration,
}

impl IntervalTicker {
    /// Creates a ticker firing every `period`
    ///
    /// Periods above [`MAX_TICK_PERIOD`] are clamped to it. Must be called
    /// from within a Tokio runtime.
    pub fn new(period: Duration) -> Result<Self, AggregatorError> {
        if period.is_zero() {
            return Err(AggregatorError::InvalidTickInterval);
        }
        let period = period.min(MAX_TICK_PERIOD);
        let start = Instant::now()
            .checked_add(period)
            .ok_or(AggregatorError::InvalidTickInterval)?;
        let mut interval = interval_at(start, period);
        // Ticks missed while blocked on a slow consumer are not replayed in a burst
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Ok(Self { interval, period })
    }
}

#[async_trait]
impl TickSource for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }

    fn stop(self) {
        debug!("Interval ticker stopped (period {:?})", self.period);
    }

    fn period(&self) -> Option<Duration> {
        Some(self.period)
    }
}

/// Tick source that only fires when its [`TickTrigger`] is pulled
///
/// Pending ticks coalesce: firing twice before the worker notices yields a
/// single tick. If the trigger is dropped the source never fires again.
#[derive(Debug)]
pub struct ManualTicker {
    ticks: mpsc::Receiver<()>,
}

/// Fires ticks into a paired [`ManualTicker`]
#[derive(Debug, Clone)]
pub struct TickTrigger {
    ticks: mpsc::Sender<()>,
}

/// Create a connected trigger / ticker pair
pub fn manual_ticker() -> (TickTrigger, ManualTicker) {
    let (tx, rx) = mpsc::channel(1);
    (TickTrigger { ticks: tx }, ManualTicker { ticks: rx })
}

impl TickTrigger {
    /// Request a tick
    ///
    /// Returns `false` once the ticker has been stopped.
    pub fn fire(&self) -> bool {
        match self.ticks.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        }
    }

    /// Whether the paired ticker has been stopped (or dropped)
    pub fn is_stopped(&self) -> bool {
        self.ticks.is_closed()
    }
}

#[async_trait]
impl TickSource for ManualTicker {
    async fn tick(&mut self) {
        if self.ticks.recv().await.is_none() {
            // Every trigger is gone; no tick can ever arrive
            std::future::pending::<()>().await;
        }
    }

    fn stop(mut self) {
        self.ticks.close();
        debug!("Manual ticker stopped");
    }
}
