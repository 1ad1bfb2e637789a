//! This crate implements a size- and time-bounded batching stage.
//! Items pulled from an input channel are grouped into batches and pushed to
//! an output channel, flushing when a batch is full, when a timer fires, or
//! when the input stream ends.

pub mod types; // Item and batch types flowing through the aggregator.
pub mod error; // Errors surfaced by the aggregator.
pub mod batch; // Batch engine, tick sources and the aggregator worker.
pub mod config; // Defines and loads host configuration.

// Re-export commonly used types and entry points for easier access.
pub use types::*;
pub use error::AggregatorError;
pub use config::Config;
pub use batch::{Aggregator, AggregatorHandle, AggregatorStats, run, run_with_interval, run_with_timer};
