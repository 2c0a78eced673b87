//! Sequencer trait and the state shared by both producer variants.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::{Result, SeqRingError};
use crate::sequence::{minimum_sequence, Sequence};
use crate::wait_strategy::WaitStrategy;

/// How long a producer parks between gating checks while the ring is full.
pub(crate) const PRODUCER_PARK: Duration = Duration::from_nanos(1);

/// Producer-side coordinator: claims sequences, keeps producers from lapping
/// the slowest gating consumer and makes published sequences visible.
pub trait Sequencer: Send + Sync + fmt::Debug {
    fn buffer_size(&self) -> usize;

    /// Shared cursor sequence (what barriers wait on).
    fn cursor_sequence(&self) -> &Arc<Sequence>;

    fn wait_strategy(&self) -> &Arc<dyn WaitStrategy>;

    #[inline]
    fn cursor(&self) -> i64 {
        self.cursor_sequence().get()
    }

    /// Claim the next sequence, waiting for space.
    fn next(&self) -> Result<i64> {
        self.next_n(1)
    }

    /// Claim `n` sequences, waiting for space. Returns the highest claimed.
    fn next_n(&self, n: usize) -> Result<i64>;

    /// Claim the next sequence or fail with `InsufficientCapacity`.
    fn try_next(&self) -> Result<i64> {
        self.try_next_n(1)
    }

    /// Claim `n` sequences or fail with `InsufficientCapacity`, claiming nothing.
    fn try_next_n(&self, n: usize) -> Result<i64>;

    /// Move the producer position to `sequence`. Initialisation only.
    fn claim(&self, sequence: i64);

    fn publish(&self, sequence: i64);

    /// Publish `lo..=hi`.
    fn publish_range(&self, lo: i64, hi: i64);

    fn is_available(&self, sequence: i64) -> bool;

    /// Highest sequence in `lower_bound..=available` published without gaps
    /// starting from `lower_bound`.
    fn highest_published_sequence(&self, lower_bound: i64, available: i64) -> i64;

    fn has_available_capacity(&self, required: usize) -> bool;

    fn remaining_capacity(&self) -> i64;

    /// Gate producers on `sequences`; each is moved to the current cursor.
    fn add_gating_sequences(&self, sequences: &[Arc<Sequence>]);

    /// Returns `false` when `sequence` was not gating this sequencer.
    fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool;

    /// `true` while at least one consumer gates the producers.
    fn has_gating_sequences(&self) -> bool;

    /// Minimum of the gating sequences, or the cursor when there are none.
    fn minimum_sequence(&self) -> i64;
}

/// State common to the single and multi producer sequencers.
pub(crate) struct SequencerCore {
    pub(crate) buffer_size: usize,
    pub(crate) wait_strategy: Arc<dyn WaitStrategy>,
    pub(crate) cursor: Arc<Sequence>,
    gating_sequences: RwLock<Vec<Arc<Sequence>>>,
}

impl SequencerCore {
    pub(crate) fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        if buffer_size < 1 {
            return Err(SeqRingError::invalid_argument(
                "buffer size must not be less than 1",
            ));
        }
        if !buffer_size.is_power_of_two() {
            return Err(SeqRingError::invalid_argument(
                "buffer size must be a power of 2",
            ));
        }

        Ok(Self {
            buffer_size,
            wait_strategy,
            cursor: Arc::new(Sequence::default()),
            gating_sequences: RwLock::new(Vec::new()),
        })
    }

    /// `n` must be within `1..=buffer_size`.
    #[inline]
    pub(crate) fn check_claim_size(&self, n: usize) -> Result<()> {
        if n < 1 || n > self.buffer_size {
            return Err(SeqRingError::invalid_argument(format!(
                "n must be > 0 and <= buffer size {}, got {}",
                self.buffer_size, n
            )));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn minimum_gating_sequence(&self, minimum: i64) -> i64 {
        minimum_sequence(&self.gating_sequences.read(), minimum)
    }

    pub(crate) fn add_gating_sequences(&self, sequences: &[Arc<Sequence>]) {
        {
            let mut gating = self.gating_sequences.write();
            let cursor = self.cursor.get();
            for sequence in sequences {
                sequence.set(cursor);
                gating.push(sequence.clone());
            }
        }

        // the cursor may have moved while the set was being updated
        let cursor = self.cursor.get();
        for sequence in sequences {
            sequence.set(cursor);
        }
        trace_debug!(added = sequences.len(), cursor, "gating sequences added");
    }

    pub(crate) fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool {
        let mut gating = self.gating_sequences.write();
        let before = gating.len();
        gating.retain(|s| !Arc::ptr_eq(s, sequence));
        let removed = before - gating.len();
        trace_debug!(removed, "gating sequence removed");
        removed > 0
    }

    pub(crate) fn has_gating_sequences(&self) -> bool {
        !self.gating_sequences.read().is_empty()
    }

    pub(crate) fn gating_snapshot(&self) -> Vec<i64> {
        self.gating_sequences.read().iter().map(|s| s.get()).collect()
    }
}

impl fmt::Debug for SequencerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequencerCore")
            .field("buffer_size", &self.buffer_size)
            .field("wait_strategy", &self.wait_strategy)
            .field("cursor", &self.cursor)
            .field("gating_sequences", &self.gating_snapshot())
            .finish()
    }
}
