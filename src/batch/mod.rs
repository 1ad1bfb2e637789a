//! Batch Aggregation Module
//!
//! This module handles grouping items into batches:
//! - BatchEngine: Owns the in-progress batch and seals it at capacity
//! - Trigger: Names why a batch was flushed and counts flushes
//! - Ticker: Tick sources for timed mode
//! - Orchestrator: The worker task wiring input, engine, ticker and output

mod engine;
mod trigger;
mod ticker;
pub mod orchestrator;


pub use engine::BatchEngine;
pub use trigger::{AggregatorStats, FlushTrigger};
pub use ticker::{IntervalTicker, MAX_TICK_PERIOD, ManualTicker, TickSource, TickTrigger, manual_ticker};
pub use orchestrator::{Aggregator, AggregatorHandle, run, run_with_interval, run_with_timer};
