//! Sequence - cache-line padded progress counter.
//!
//! Every producer cursor and every consumer position is a `Sequence`. It is
//! the only synchronisation primitive the sequencers use: ordered loads and
//! stores plus CAS/fetch-add, never a lock.

use std::fmt;
use std::sync::atomic::{fence, AtomicI64, Ordering};
use std::sync::Arc;

/// Value of a sequence before anything was produced or consumed.
pub const INITIAL_VALUE: i64 = -1;

/// Atomic 64-bit counter occupying its own (pair of) cache line(s).
///
/// 128-byte alignment keeps adjacent sequences off each other's line and out
/// of the adjacent-line prefetcher's pair.
#[repr(align(128))]
pub struct Sequence {
    value: AtomicI64,
}

impl Sequence {
    pub const fn new(initial_value: i64) -> Self {
        Self {
            value: AtomicI64::new(initial_value),
        }
    }

    /// Acquire read.
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Release write: all writes before this call are visible before `value`.
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    /// Release write followed by a full fence (store/load barrier).
    #[inline]
    pub fn set_volatile(&self, value: i64) {
        self.value.store(value, Ordering::Release);
        fence(Ordering::SeqCst);
    }

    #[inline]
    pub fn compare_and_set(&self, expected: i64, new_value: i64) -> bool {
        self.value
            .compare_exchange(expected, new_value, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns the value before the addition.
    #[inline]
    pub fn get_and_add(&self, increment: i64) -> i64 {
        self.value.fetch_add(increment, Ordering::AcqRel)
    }

    /// Returns the value after the addition.
    #[inline]
    pub fn add_and_get(&self, increment: i64) -> i64 {
        self.get_and_add(increment) + increment
    }

    #[inline]
    pub fn increment_and_get(&self) -> i64 {
        self.add_and_get(1)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(INITIAL_VALUE)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sequence").field(&self.get()).finish()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Smallest value among `sequences`, never larger than `minimum`.
#[inline]
pub fn minimum_sequence(sequences: &[Arc<Sequence>], minimum: i64) -> i64 {
    sequences
        .iter()
        .fold(minimum, |min, sequence| min.min(sequence.get()))
}

/// Fixed set of sequences read as one (the minimum of its members).
#[derive(Debug, Clone)]
pub struct SequenceGroup {
    sequences: Box<[Arc<Sequence>]>,
}

impl SequenceGroup {
    pub fn new(sequences: &[Arc<Sequence>]) -> Self {
        Self {
            sequences: sequences.into(),
        }
    }

    /// Minimum of the members, `i64::MAX` for an empty group.
    #[inline]
    pub fn get(&self) -> i64 {
        minimum_sequence(&self.sequences, i64::MAX)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
