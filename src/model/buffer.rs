use std::collections::VecDeque;

use super::record::StreamRecord;

/// Rolling window length used by the dashboard: the latest record plus 300 before it.
pub const DEFAULT_BUFFER_LEN: usize = 301;

/// Bounded, time-ordered window of the most recent stream records.
///
/// Appending beyond `capacity` evicts from the front, so the oldest record goes first.
#[derive(Debug, Clone)]
pub struct RecordBuffer {
    records: VecDeque<StreamRecord>,
    capacity: usize,
    evicted: u64,
}

impl RecordBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    pub fn push(&mut self, record: StreamRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
            self.evicted += 1;
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.evicted = 0;
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

    /// Number of records dropped by eviction since the last `clear`.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn latest(&self) -> Option<&StreamRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StreamRecord> + ExactSizeIterator {
        self.records.iter()
    }

    pub fn to_vec(&self) -> Vec<StreamRecord> {
        self.records.iter().cloned().collect()
    }
}

impl Default for RecordBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_LEN)
    }
}
