//! MultiProducerSequencer - claim protocol for any number of producer threads.
//!
//! Producers claim by advancing the shared cursor with fetch-add (or CAS for
//! `try_next`). Because claims and publications can finish out of order, each
//! slot carries an availability flag: the lap number of the sequence last
//! published into it. Consumers only see a prefix of sequences whose flags
//! all match.

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;

use crate::disruptor::sequencer::{Sequencer, SequencerCore, PRODUCER_PARK};
use crate::error::{Result, SeqRingError};
use crate::sequence::Sequence;
use crate::wait_strategy::WaitStrategy;

pub struct MultiProducerSequencer {
    core: SequencerCore,
    /// Last observed minimum gating sequence, shared by all producers.
    gating_sequence_cache: Sequence,
    /// Per-slot lap number of the last published sequence, -1 = never.
    available_buffer: Box<[AtomicI32]>,
    index_mask: i64,
    index_shift: u32,
}

impl MultiProducerSequencer {
    pub fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        let core = SequencerCore::new(buffer_size, wait_strategy)?;
        let available_buffer = (0..buffer_size)
            .map(|_| AtomicI32::new(-1))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        trace_debug!(buffer_size, "multi producer sequencer created");

        Ok(Self {
            core,
            gating_sequence_cache: Sequence::default(),
            available_buffer,
            index_mask: buffer_size as i64 - 1,
            index_shift: buffer_size.trailing_zeros(),
        })
    }

    #[inline]
    fn calculate_index(&self, sequence: i64) -> usize {
        (sequence & self.index_mask) as usize
    }

    #[inline]
    fn calculate_availability_flag(&self, sequence: i64) -> i32 {
        (sequence >> self.index_shift) as i32
    }

    #[inline]
    fn set_available(&self, sequence: i64) {
        let index = self.calculate_index(sequence);
        let flag = self.calculate_availability_flag(sequence);
        self.available_buffer[index].store(flag, Ordering::Release);
    }

    fn has_capacity(&self, required: i64, cursor_value: i64) -> bool {
        let wrap_point = (cursor_value + required) - self.core.buffer_size as i64;
        let cached_gating_sequence = self.gating_sequence_cache.get();

        if wrap_point > cached_gating_sequence || cached_gating_sequence > cursor_value {
            let min_sequence = self.core.minimum_gating_sequence(cursor_value);
            self.gating_sequence_cache.set(min_sequence);

            if wrap_point > min_sequence {
                return false;
            }
        }

        true
    }
}

impl Sequencer for MultiProducerSequencer {
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
        self.core.check_claim_size(n)?;

        let n = n as i64;
        let current = self.core.cursor.get_and_add(n);
        let next_sequence = current + n;
        let wrap_point = next_sequence - self.core.buffer_size as i64;
        let cached_gating_sequence = self.gating_sequence_cache.get();

        if wrap_point > cached_gating_sequence || cached_gating_sequence > current {
            let mut stalled = false;
            let gating_sequence = loop {
                let gating_sequence = self.core.minimum_gating_sequence(current);
                if wrap_point <= gating_sequence {
                    break gating_sequence;
                }
                if !stalled {
                    trace_trace!(wrap_point, gating_sequence, "producer waiting for gating consumers");
                    stalled = true;
                }
                thread::park_timeout(PRODUCER_PARK);
            };

            self.gating_sequence_cache.set(gating_sequence);
        }

        Ok(next_sequence)
    }

    fn try_next_n(&self, n: usize) -> Result<i64> {
        self.core.check_claim_size(n)?;

        let n = n as i64;
        loop {
            let current = self.core.cursor.get();
            let next = current + n;

            if !self.has_capacity(n, current) {
                return Err(SeqRingError::InsufficientCapacity);
            }
            if self.core.cursor.compare_and_set(current, next) {
                return Ok(next);
            }
        }
    }

    fn claim(&self, sequence: i64) {
        self.core.cursor.set(sequence);
    }

    fn publish(&self, sequence: i64) {
        self.set_available(sequence);
        self.core.wait_strategy.signal_all_when_blocking();
    }

    fn publish_range(&self, lo: i64, hi: i64) {
        for sequence in lo..=hi {
            self.set_available(sequence);
        }
        self.core.wait_strategy.signal_all_when_blocking();
    }

    fn is_available(&self, sequence: i64) -> bool {
        let index = self.calculate_index(sequence);
        let flag = self.calculate_availability_flag(sequence);
        self.available_buffer[index].load(Ordering::Acquire) == flag
    }

    fn highest_published_sequence(&self, lower_bound: i64, available: i64) -> i64 {
        for sequence in lower_bound..=available {
            if !self.is_available(sequence) {
                return sequence - 1;
            }
        }
        available
    }

    fn has_available_capacity(&self, required: usize) -> bool {
        self.has_capacity(required as i64, self.core.cursor.get())
    }

    fn remaining_capacity(&self) -> i64 {
        let produced = self.core.cursor.get();
        let consumed = self.core.minimum_gating_sequence(produced);
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

impl fmt::Debug for MultiProducerSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiProducerSequencer")
            .field("core", &self.core)
            .field("gating_sequence_cache", &self.gating_sequence_cache)
            .finish()
    }
}
