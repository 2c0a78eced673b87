//! SingleProducerSequencer - claim protocol for exactly one producer thread.
//!
//! Claims are handed out from producer-local counters with no atomic
//! read-modify-write; publication is a single release store of the cursor,
//! so publication order always equals claim order.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use crate::disruptor::sequencer::{Sequencer, SequencerCore, PRODUCER_PARK};
use crate::error::{Result, SeqRingError};
use crate::sequence::{Sequence, INITIAL_VALUE};
use crate::wait_strategy::WaitStrategy;

/// Producer-local counters, on their own cache line.
///
/// Only the owning producer thread writes these, so `Relaxed` loads and
/// stores are plain memory accesses.
#[repr(align(128))]
struct ProducerState {
    /// Highest sequence handed out.
    next_value: AtomicI64,
    /// Last observed minimum gating sequence.
    cached_value: AtomicI64,
}

pub struct SingleProducerSequencer {
    core: SequencerCore,
    state: ProducerState,
    /// First thread to claim; every later claim must come from it.
    owner: OnceLock<ThreadId>,
}

impl SingleProducerSequencer {
    pub fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        let core = SequencerCore::new(buffer_size, wait_strategy)?;
        trace_debug!(buffer_size, "single producer sequencer created");

        Ok(Self {
            core,
            state: ProducerState {
                next_value: AtomicI64::new(INITIAL_VALUE),
                cached_value: AtomicI64::new(INITIAL_VALUE),
            },
            owner: OnceLock::new(),
        })
    }

    /// Panics when a second thread claims from this sequencer.
    ///
    /// Two threads sharing the producer counters would be handed the same
    /// sequence, and with it the same slot.
    #[inline]
    fn assert_same_thread(&self) {
        let current = thread::current().id();
        let owner = *self.owner.get_or_init(|| current);
        assert!(
            owner == current,
            "SingleProducerSequencer accessed by two threads - use ProducerType::Multi"
        );
    }

    fn has_capacity(&self, required: i64, do_store: bool) -> bool {
        let next_value = self.state.next_value.load(Ordering::Relaxed);
        let wrap_point = (next_value + required) - self.core.buffer_size as i64;
        let cached_gating_sequence = self.state.cached_value.load(Ordering::Relaxed);

        if wrap_point > cached_gating_sequence || cached_gating_sequence > next_value {
            if do_store {
                self.core.cursor.set_volatile(next_value);
            }

            let min_sequence = self.core.minimum_gating_sequence(next_value);
            self.state
                .cached_value
                .store(min_sequence, Ordering::Relaxed);

            if wrap_point > min_sequence {
                return false;
            }
        }

        true
    }
}

impl Sequencer for SingleProducerSequencer {
    #[inline]
    fn buffer_size(&self) -> usize {
        self.core.buffer_size
    }

    #[inline]
    fn cursor_sequence(&self) -> &Arc<Sequence> {
        &self.core.cursor
    }

    #[inline]
    fn wait_strategy(&self) -> &Arc<dyn WaitStrategy> {
        &self.core.wait_strategy
    }

    fn next_n(&self, n: usize) -> Result<i64> {
        self.assert_same_thread();
        self.core.check_claim_size(n)?;

        let next_value = self.state.next_value.load(Ordering::Relaxed);
        let next_sequence = next_value + n as i64;
        let wrap_point = next_sequence - self.core.buffer_size as i64;
        let cached_gating_sequence = self.state.cached_value.load(Ordering::Relaxed);

        if wrap_point > cached_gating_sequence || cached_gating_sequence > next_value {
            // let consumers see where the producer is before it stalls
            self.core.cursor.set_volatile(next_value);

            let mut stalled = false;
            let min_sequence = loop {
                let min_sequence = self.core.minimum_gating_sequence(next_value);
                if wrap_point <= min_sequence {
                    break min_sequence;
                }
                if !stalled {
                    trace_trace!(wrap_point, min_sequence, "producer waiting for gating consumers");
                    stalled = true;
                }
                thread::park_timeout(PRODUCER_PARK);
            };

            self.state
                .cached_value
                .store(min_sequence, Ordering::Relaxed);
        }

        self.state
            .next_value
            .store(next_sequence, Ordering::Relaxed);
        Ok(next_sequence)
    }

    fn try_next_n(&self, n: usize) -> Result<i64> {
        self.assert_same_thread();
        self.core.check_claim_size(n)?;

        if !self.has_capacity(n as i64, true) {
            return Err(SeqRingError::InsufficientCapacity);
        }

        let next_sequence = self.state.next_value.load(Ordering::Relaxed) + n as i64;
        self.state
            .next_value
            .store(next_sequence, Ordering::Relaxed);
        Ok(next_sequence)
    }

    fn claim(&self, sequence: i64) {
        self.state.next_value.store(sequence, Ordering::Relaxed);
    }

    #[inline]
    fn publish(&self, sequence: i64) {
        self.core.cursor.set(sequence);
        self.core.wait_strategy.signal_all_when_blocking();
    }

    #[inline]
    fn publish_range(&self, _lo: i64, hi: i64) {
        self.publish(hi);
    }

    fn is_available(&self, sequence: i64) -> bool {
        let current = self.core.cursor.get();
        sequence <= current && sequence > current - self.core.buffer_size as i64
    }

    #[inline]
    fn highest_published_sequence(&self, _lower_bound: i64, available: i64) -> i64 {
        available
    }

    fn has_available_capacity(&self, required: usize) -> bool {
        self.has_capacity(required as i64, false)
    }

    fn remaining_capacity(&self) -> i64 {
        let next_value = self.state.next_value.load(Ordering::Relaxed);
        let consumed = self.core.minimum_gating_sequence(next_value);
        let produced = next_value;
        self.core.buffer_size as i64 - (produced - consumed)
    }

    fn add_gating_sequences(&self, sequences: &[Arc<Sequence>]) {
        self.core.add_gating_sequences(sequences);
    }

    fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool {
        self.core.remove_gating_sequence(sequence)
    }

    fn has_gating_sequences(&self) -> bool {
        self.core.has_gating_sequences()
    }

    fn minimum_sequence(&self) -> i64 {
        self.core.minimum_gating_sequence(self.core.cursor.get())
    }
}

impl fmt::Debug for SingleProducerSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleProducerSequencer")
            .field("core", &self.core)
            .field("next_value", &self.state.next_value.load(Ordering::Relaxed))
            .finish()
    }
}
