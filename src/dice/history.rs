//! Bounded roll history
//!
//! A capped FIFO log of recent rolls, safe to append to and read from
//! multiple threads.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Default number of rolls retained
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// One logged roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    /// What was rolled, e.g. "2d6+3" or "2d20 advantage"
    pub formula: String,
    /// Final result including modifiers
    pub result: i32,
    /// Position of this roll in the engine's lifetime (starts at 1)
    pub sequence: u64,
    /// Individual die faces behind the result
    pub dice: Vec<u32>,
    /// When the roll was made
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
struct HistoryInner {
    records: VecDeque<RollRecord>,
    next_sequence: u64,
}

/// Capped FIFO log of rolls
#[derive(Debug)]
pub struct RollHistory {
    inner: Mutex<HistoryInner>,
    capacity: usize,
}

impl Default for RollHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RollHistory {
    /// Create a history holding at most `capacity` records (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(HistoryInner {
                records: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
                next_sequence: 1,
            }),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when full. Returns the stored record.
    pub fn record(&self, formula: String, result: i32, dice: Vec<u32>) -> RollRecord {
        let mut inner = self.inner.lock();

        let record = RollRecord {
            formula,
            result,
            sequence: inner.next_sequence,
            dice,
            timestamp: Utc::now(),
        };
        inner.next_sequence += 1;

        if inner.records.len() >= self.capacity {
            inner.records.pop_front();
        }
        inner.records.push_back(record.clone());

        record
    }

    /// Most recent record
    pub fn last(&self) -> Option<RollRecord> {
        self.inner.lock().records.back().cloned()
    }

    /// The last `n` records, oldest first
    pub fn recent(&self, n: usize) -> Vec<RollRecord> {
        let inner = self.inner.lock();
        let skip = inner.records.len().saturating_sub(n);
        inner.records.iter().skip(skip).cloned().collect()
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Maximum number of records held
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all records. Sequence numbers keep counting.
    pub fn clear(&self) {
        self.inner.lock().records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_eviction() {
        let history = RollHistory::new(3);
        for i in 1..=5 {
            history.record(format!("1d{}", i), i, vec![i as u32]);
        }

        assert_eq!(history.len(), 3);
        let kept: Vec<i32> = history.recent(10).iter().map(|r| r.result).collect();
        assert_eq!(kept, vec![3, 4, 5]);
        assert_eq!(history.last().unwrap().sequence, 5);
    }

    #[test]
    fn test_recent_is_oldest_first() {
        let history = RollHistory::default();
        history.record("1d6".into(), 1, vec![1]);
        history.record("1d6".into(), 2, vec![2]);
        history.record("1d6".into(), 3, vec![3]);

        let recent = history.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].result, 2);
        assert_eq!(recent[1].result, 3);
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn test_clear_keeps_sequence() {
        let history = RollHistory::default();
        history.record("1d4".into(), 2, vec![2]);
        history.clear();
        assert!(history.is_empty());
        assert!(history.last().is_none());

        let next = history.record("1d4".into(), 3, vec![3]);
        assert_eq!(next.sequence, 2);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let history = RollHistory::new(0);
        assert_eq!(history.capacity(), 1);
        history.record("1d4".into(), 1, vec![1]);
        history.record("1d4".into(), 4, vec![4]);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_concurrent_append() {
        let history = Arc::new(RollHistory::new(10_000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        history.record(format!("t{}", t), i, vec![]);
                        let _ = history.recent(5);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(history.len(), 2000);
        let mut sequences: Vec<u64> = history.recent(2000).iter().map(|r| r.sequence).collect();
        sequences.sort_unstable();
        sequences.dedup();
        assert_eq!(sequences.len(), 2000, "every roll gets a unique sequence");
    }
}
