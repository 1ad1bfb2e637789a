//! Batch Orchestrator Module
//!
//! Runs the aggregator worker: a single tokio task that pulls items from the
//! input channel, fills batches through the [`BatchEngine`], and pushes sealed
//! batches to the output channel.
//!
//! # Flush Conditions
//! 1. The batch reaches capacity (both modes)
//! 2. The tick source fires with a non-empty batch pending (timed mode)
//! 3. The input stream ends with a non-empty batch pending (both modes)
//!
//! Timed mode waits on input and ticks with `tokio::select!`, so an idle
//! worker is parked rather than spinning. When an item and a tick are ready at
//! the same time the branch is picked at random; callers must not depend on
//! which one wins.

use crate::{
    AggregatorError, Batch,
    batch::{AggregatorStats, BatchEngine, FlushTrigger, IntervalTicker, TickSource},
};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Size- and time-bounded batching stage
pub struct Aggregator<T> {
    /// Items arrive here; the stream ends when every sender is dropped
    input: Receiver<T>,
    /// Sealed batches leave here
    output: Sender<Batch<T>>,
    engine: BatchEngine<T>,
    stats: AggregatorStats,
}

/// Handle to a running aggregator worker
///
/// Dropping the handle detaches the worker; it keeps running until its input
/// stream ends.
#[derive(Debug)]
pub struct AggregatorHandle {
    task: JoinHandle<Result<AggregatorStats, AggregatorError>>,
}

impl AggregatorHandle {
    /// Wait for the worker to terminate
    ///
    /// # Returns
    /// * `Ok(AggregatorStats)` once the input stream ended and the last batch
    ///   was delivered
    /// * `Err(AggregatorError::OutputClosed)` if the consumer went away first
    /// * `Err(AggregatorError::WorkerCancelled)` if the runtime shut down
    ///   under the worker
    pub async fn join(self) -> Result<AggregatorStats, AggregatorError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                error!("Aggregator worker panicked: {:?}", e);
                Err(AggregatorError::WorkerPanicked)
            }
            Err(e) => {
                warn!("Aggregator worker cancelled: {:?}", e);
                Err(AggregatorError::WorkerCancelled)
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T: Send + 'static> Aggregator<T> {
    /// Creates a new aggregator
    ///
    /// # Arguments
    /// * `input` - Stream of items to batch
    /// * `output` - Stream receiving sealed batches
    /// * `capacity` - Batch size that triggers an immediate flush
    pub fn new(
        input: Receiver<T>,
        output: Sender<Batch<T>>,
        capacity: usize,
    ) -> Result<Self, AggregatorError> {
        Ok(Self {
            input,
            output,
            engine: BatchEngine::new(capacity)?,
            stats: AggregatorStats::default(),
        })
    }

    /// Spawn the worker in plain mode
    ///
    /// Flushes only on a full batch or when the input stream ends.
    pub fn start(self) -> AggregatorHandle {
        AggregatorHandle {
            task: tokio::spawn(self.run_plain()),
        }
    }

    /// Spawn the worker in timed mode
    ///
    /// Like [`Aggregator::start`], and additionally flushes any non-empty
    /// batch whenever `ticker` fires. The ticker is stopped when the worker
    /// exits.
    pub fn start_with_timer<S>(self, ticker: S) -> AggregatorHandle
    where
        S: TickSource + 'static,
    {
        AggregatorHandle {
            task: tokio::spawn(self.run_timed(ticker)),
        }
    }

    async fn run_plain(mut self) -> Result<AggregatorStats, AggregatorError> {
        info!("Aggregator starting (capacity={}, plain mode)", self.engine.capacity());

        let result = self.plain_loop().await;
        self.finish(result)
    }

    async fn run_timed<S: TickSource>(mut self, mut ticker: S) -> Result<AggregatorStats, AggregatorError> {
        match ticker.period() {
            Some(period) => info!(
                "Aggregator starting (capacity={}, timed mode, tick_interval={:?})",
                self.engine.capacity(),
                period
            ),
            None => info!(
                "Aggregator starting (capacity={}, timed mode, manual ticks)",
                self.engine.capacity()
            ),
        }

        let result = self.timed_loop(&mut ticker).await;
        // Single release point for every exit path of the loop
        ticker.stop();
        self.finish(result)
    }

    async fn plain_loop(&mut self) -> Result<(), AggregatorError> {
        while let Some(item) = self.input.recv().await {
            self.accept(item).await?;
        }
        self.drain().await
    }

    async fn timed_loop<S: TickSource>(&mut self, ticker: &mut S) -> Result<(), AggregatorError> {
        loop {
            tokio::select! {
                received = self.input.recv() => match received {
                    Some(item) => self.accept(item).await?,
                    None => return self.drain().await,
                },
                _ = ticker.tick() => self.flush_on_tick().await?,
            }
        }
    }

    async fn accept(&mut self, item: T) -> Result<(), AggregatorError> {
        self.stats.record_item();
        trace!("Item accepted ({} pending)", self.engine.len() + 1);

        if let Some(batch) = self.engine.push(item) {
            self.emit(batch, FlushTrigger::Full).await?;
        }
        Ok(())
    }

    async fn flush_on_tick(&mut self) -> Result<(), AggregatorError> {
        match self.engine.flush() {
            Some(batch) => self.emit(batch, FlushTrigger::Tick).await,
            None => {
                self.stats.record_idle_tick();
                trace!("Tick with empty batch, nothing to flush");
                Ok(())
            }
        }
    }

    async fn drain(&mut self) -> Result<(), AggregatorError> {
        debug!("Input stream closed ({} item(s) pending)", self.engine.len());

        match self.engine.flush() {
            Some(batch) => self.emit(batch, FlushTrigger::StreamEnd).await,
            None => Ok(()),
        }
    }

    /// Hand a batch to the output stream, waiting for room if it is full
    async fn emit(&mut self, batch: Batch<T>, trigger: FlushTrigger) -> Result<(), AggregatorError> {
        let size = batch.len();
        if self.output.send(batch).await.is_err() {
            error!("Output stream closed, cannot emit batch of {} item(s) ({})", size, trigger);
            return Err(AggregatorError::OutputClosed { pending: size });
        }

        self.stats.record_flush(trigger);
        debug!("Batch #{} emitted with {} items ({})", self.stats.batches_emitted, size, trigger);
        Ok(())
    }

    fn finish(self, result: Result<(), AggregatorError>) -> Result<AggregatorStats, AggregatorError> {
        result?;
        info!(
            "Aggregator stopped: {} items in {} batches (full={}, tick={}, stream_end={}, idle_ticks={})",
            self.stats.items_received,
            self.stats.batches_emitted,
            self.stats.full_flushes,
            self.stats.tick_flushes,
            self.stats.stream_end_flushes,
            self.stats.idle_ticks
        );
        Ok(self.stats)
    }
}

/// Start an aggregator in plain mode
///
/// Returns immediately; the caller observes progress through `output`.
pub fn run<T: Send + 'static>(
    input: Receiver<T>,
    output: Sender<Batch<T>>,
    capacity: usize,
) -> Result<AggregatorHandle, AggregatorError> {
    Ok(Aggregator::new(input, output, capacity)?.start())
}

/// Start an aggregator in timed mode driven by `ticker`
pub fn run_with_timer<T, S>(
    input: Receiver<T>,
    output: Sender<Batch<T>>,
    capacity: usize,
    ticker: S,
) -> Result<AggregatorHandle, AggregatorError>
where
    T: Send + 'static,
    S: TickSource + 'static,
{
    Ok(Aggregator::new(input, output, capacity)?.start_with_timer(ticker))
}

/// Start an aggregator in timed mode, flushing every `tick_interval`
pub fn run_with_interval<T: Send + 'static>(
    input: Receiver<T>,
    output: Sender<Batch<T>>,
    capacity: usize,
    tick_interval: Duration,
) -> Result<AggregatorHandle, AggregatorError> {
    let aggregator = Aggregator::new(input, output, capacity)?;
    let ticker = IntervalTicker::new(tick_interval)?;
    Ok(aggregator.start_with_timer(ticker))
}
