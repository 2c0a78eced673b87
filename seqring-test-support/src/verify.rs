//! Ordering verification for consumers reading a ring buffer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

/// Verifies values published by several producers arrive complete and, per
/// producer, in the order they were published.
///
/// Producers tag each value with `(producer, counter)` where `counter`
/// starts at 0 and increases by one per publish.
pub struct ValueVerifier {
    /// Next expected counter per producer
    next_expected: Mutex<HashMap<usize, u64>>,
    /// Values seen in order
    accepted: AtomicU64,
    /// Counter below the expected one (duplicate or reordered)
    duplicates: AtomicU64,
    /// Counter above the expected one (something was skipped)
    skipped: AtomicU64,
}

impl Default for ValueVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueVerifier {
    pub fn new() -> Self {
        Self {
            next_expected: Mutex::new(HashMap::new()),
            accepted: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Verify one consumed value
    pub fn verify(&self, producer: usize, counter: u64) -> VerifyResult {
        let mut next_expected = self.next_expected.lock().unwrap();
        let expected = next_expected.entry(producer).or_insert(0);

        if counter == *expected {
            *expected += 1;
            self.accepted.fetch_add(1, Ordering::Relaxed);
            VerifyResult::Ok
        } else if counter < *expected {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
            VerifyResult::Duplicate { producer, counter }
        } else {
            let result = VerifyResult::Skipped {
                producer,
                expected: *expected,
                actual: counter,
            };
            *expected = counter + 1;
            self.skipped.fetch_add(1, Ordering::Relaxed);
            result
        }
    }

    /// Values accepted from `producer` so far
    pub fn received_from(&self, producer: usize) -> u64 {
        self.next_expected
            .lock()
            .unwrap()
            .get(&producer)
            .copied()
            .unwrap_or(0)
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Check if any errors occurred
    pub fn has_errors(&self) -> bool {
        self.duplicates.load(Ordering::Relaxed) > 0 || self.skipped.load(Ordering::Relaxed) > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Ok,
    Duplicate {
        producer: usize,
        counter: u64,
    },
    Skipped {
        producer: usize,
        expected: u64,
        actual: u64,
    },
}

/// Checks that consumed ring sequences are contiguous and detects gaps.
pub struct SequenceChecker {
    /// Expected next sequence
    next_expected: AtomicI64,
    /// Gaps detected: (start, end)
    gaps: Mutex<Vec<(i64, i64)>>,
    /// Total sequences seen
    total_seen: AtomicU64,
    /// Out of order count
    out_of_order: AtomicU64,
}

impl Default for SequenceChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceChecker {
    /// Checker expecting the first published sequence, 0
    pub fn new() -> Self {
        Self::with_start(0)
    }

    pub fn with_start(start: i64) -> Self {
        Self {
            next_expected: AtomicI64::new(start),
            gaps: Mutex::new(Vec::new()),
            total_seen: AtomicU64::new(0),
            out_of_order: AtomicU64::new(0),
        }
    }

    /// Check a sequence number
    pub fn check(&self, seq: i64) -> SequenceStatus {
        self.total_seen.fetch_add(1, Ordering::Relaxed);
        let expected = self.next_expected.load(Ordering::Relaxed);

        if seq == expected {
            self.next_expected.store(seq + 1, Ordering::Relaxed);
            SequenceStatus::InOrder
        } else if seq < expected {
            // late arrival or duplicate
            self.out_of_order.fetch_add(1, Ordering::Relaxed);
            SequenceStatus::OutOfOrder
        } else {
            let gap_start = expected;
            let gap_end = seq - 1;
            self.gaps.lock().unwrap().push((gap_start, gap_end));
            self.next_expected.store(seq + 1, Ordering::Relaxed);
            SequenceStatus::Gap {
                start: gap_start,
                end: gap_end,
            }
        }
    }

    /// Check every sequence in `lo..=hi`, as handed out by one barrier wait
    pub fn check_range(&self, lo: i64, hi: i64) -> bool {
        (lo..=hi).all(|seq| self.check(seq) == SequenceStatus::InOrder)
    }

    /// Get all detected gaps
    pub fn gaps(&self) -> Vec<(i64, i64)> {
        self.gaps.lock().unwrap().clone()
    }

    pub fn total_seen(&self) -> u64 {
        self.total_seen.load(Ordering::Relaxed)
    }

    /// No gaps and nothing out of order
    pub fn is_perfect(&self) -> bool {
        self.gaps.lock().unwrap().is_empty() && self.out_of_order.load(Ordering::Relaxed) == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceStatus {
    InOrder,
    OutOfOrder,
    Gap { start: i64, end: i64 },
}
