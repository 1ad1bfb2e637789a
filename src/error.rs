//! Error Module
//!
//! Errors surfaced by the aggregator. Stream end and timer ticks are normal
//! control signals and never show up here.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("batch capacity must be a positive integer")]
    InvalidCapacity,

    #[error("tick interval must be greater than zero")]
    InvalidTickInterval,

    /// The consumer dropped the output receiver while the worker was still
    /// emitting. The host must keep the output alive for the worker's lifetime.
    #[error("output stream closed, dropping batch of {pending} item(s)")]
    OutputClosed { pending: usize },

    #[error("aggregator worker panicked")]
    WorkerPanicked,

    /// The worker task was dropped before finishing, e.g. at runtime shutdown
    #[error("aggregator worker cancelled")]
    WorkerCancelled,
}
