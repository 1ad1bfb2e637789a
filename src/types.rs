use serde::{Deserialize, Serialize};

/// A single payload flowing through the aggregator
///
/// Immutable once created. Ownership moves from the producer into the
/// aggregator's current batch and from there to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    value: String,
}

impl Message {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Self { value }
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An ordered group of items emitted as one unit
///
/// Never empty when it leaves the aggregator, and never longer than the
/// configured capacity.
pub type Batch<T = Message> = Vec<T>;
