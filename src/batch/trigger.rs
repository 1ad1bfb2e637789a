//! Batch Trigger Module
//!
//! Names the condition that sealed a batch and keeps per-worker counters.

use serde::Serialize;
use std::fmt;

/// Why a batch left the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTrigger {
    /// The batch reached capacity
    Full,
    /// The flush timer fired with a non-empty batch pending
    Tick,
    /// The input stream ended with a non-empty batch pending
    StreamEnd,
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushTrigger::Full => write!(f, "full"),
            FlushTrigger::Tick => write!(f, "tick"),
            FlushTrigger::StreamEnd => write!(f, "stream end"),
        }
    }
}

/// Counters reported when a worker terminates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregatorStats {
    pub items_received: u64,
    pub batches_emitted: u64,
    pub full_flushes: u64,
    pub tick_flushes: u64,
    pub stream_end_flushes: u64,
    /// Ticks that found nothing to flush
    pub idle_ticks: u64,
}

impl AggregatorStats {
    pub(crate) fn record_item(&mut self) {
        self.items_received += 1;
    }

    pub(crate) fn record_idle_tick(&mut self) {
        self.idle_ticks += 1;
    }

    /// Count a batch that was handed to the output stream
    pub(crate) fn record_flush(&mut self, trigger: FlushTrigger) {
        self.batches_emitted += 1;
        match trigger {
            FlushTrigger::Full => self.full_flushes += 1,
            FlushTrigger::Tick => self.tick_flushes += 1,
            FlushTrigger::StreamEnd => self.stream_end_flushes += 1,
        }
    }
}
