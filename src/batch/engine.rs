//! Batch Engine Module
//!
//! Owns the in-progress batch. The engine is moved into the worker task, so
//! the batch has exactly one writer and needs no lock.

use crate::{AggregatorError, Batch};

/// Accumulates items into batches of at most `capacity`
pub struct BatchEngine<T> {
    /// Size threshold that triggers an immediate flush
    capacity: usize,
    /// Batch being filled. Its length never exceeds `capacity`.
    current: Batch<T>,
}

impl<T> BatchEngine<T> {
    /// Creates a new batch engine
    ///
    /// # Returns
    /// `Err(AggregatorError::InvalidCapacity)` if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self, AggregatorError> {
        if capacity == 0 {
            return Err(AggregatorError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            current: Vec::with_capacity(capacity),
        })
    }

    /// Append an item to the current batch
    ///
    /// Returns the completed batch when this item filled it. The engine is
    /// already reset by the time the caller sees the batch, so the next item
    /// always lands in a fresh one.
    pub fn push(&mut self, item: T) -> Option<Batch<T>> {
        self.current.push(item);
        if self.current.len() == self.capacity {
            Some(self.take())
        } else {
            None
        }
    }

    /// Take whatever is pending, or `None` if the batch is empty
    pub fn flush(&mut self) -> Option<Batch<T>> {
        if self.current.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn take(&mut self) -> Batch<T> {
        std::mem::replace(&mut self.current, Vec::with_capacity(self.capacity))
    }
}
