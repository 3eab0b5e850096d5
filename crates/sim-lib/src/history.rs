//! Historical snapshot retention
//!
//! Bounded FIFO of past sampling results, queryable by recency window.
//! Entries are never mutated after append; the only deletion is
//! capacity eviction from the front.

use std::collections::VecDeque;
use std::time::Duration;

use crate::models::HistoricalSnapshot;

/// Default retention capacity
const DEFAULT_CAPACITY: usize = 100;

/// Bounded FIFO of historical snapshots
pub struct HistoryBuffer {
    buffer: VecDeque<HistoricalSnapshot>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create a buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a buffer with a custom capacity (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a snapshot, evicting the oldest entries once over capacity
    pub fn append(&mut self, snapshot: HistoricalSnapshot) {
        self.buffer.push_back(snapshot);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// All retained snapshots with `timestamp >= now - window`, in
    /// original chronological (ascending) order
    pub fn query(&self, window: Duration, now: f64) -> Vec<HistoricalSnapshot> {
        if self.buffer.is_empty() {
            return Vec::new();
        }

        let cutoff = now - window.as_secs_f64();
        self.buffer
            .iter()
            .filter(|snapshot| snapshot.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
