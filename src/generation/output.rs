//! Bounded record streams.
//!
//! Records past a stream's capacity are dropped in emission order and only
//! counted, so a saturated pass loses its last records instead of failing.

use serde::Serialize;

/// Fixed-capacity, append-only record stream.
#[derive(Clone, Debug, Serialize)]
pub struct RecordBuffer<T> {
    records: Vec<T>,
    capacity: usize,
    dropped: usize,
}

impl<T> RecordBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Append `record`; returns false if it was dropped.
    pub fn push(&mut self, record: T) -> bool {
        if self.records.len() < self.capacity {
            self.records.push(record);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Append records in order until the buffer is full, counting the rest as dropped.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Records rejected because the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.records
    }
}

impl<'a, T> IntoIterator for &'a RecordBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
