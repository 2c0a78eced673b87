//! Sequence barrier - a consumer's view of what it may read.
//!
//! A barrier combines the sequencer cursor, the sequences of the consumers
//! it depends on and one wait strategy. It also carries the alert flag used
//! for cooperative cancellation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::disruptor::Sequencer;
use crate::error::{Result, SeqRingError};
use crate::sequence::{Sequence, SequenceGroup};
use crate::wait_strategy::WaitStrategy;

/// What a consumer waits on besides the cursor.
#[derive(Debug, Clone)]
pub enum DependentSequence {
    /// No upstream consumers: the producer cursor itself.
    Cursor(Arc<Sequence>),
    /// Minimum of the upstream consumers' sequences.
    Group(SequenceGroup),
}

impl DependentSequence {
    #[inline]
    pub fn get(&self) -> i64 {
        match self {
            DependentSequence::Cursor(cursor) => cursor.get(),
            DependentSequence::Group(group) => group.get(),
        }
    }
}

pub struct SequenceBarrier {
    sequencer: Arc<dyn Sequencer>,
    wait_strategy: Arc<dyn WaitStrategy>,
    cursor: Arc<Sequence>,
    dependent: DependentSequence,
    alerted: AtomicBool,
}

impl SequenceBarrier {
    /// Barrier over `sequencer`'s cursor that also waits for `dependents`.
    pub fn new(sequencer: Arc<dyn Sequencer>, dependents: &[Arc<Sequence>]) -> Self {
        let cursor = sequencer.cursor_sequence().clone();
        let wait_strategy = sequencer.wait_strategy().clone();
        let dependent = if dependents.is_empty() {
            DependentSequence::Cursor(cursor.clone())
        } else {
            DependentSequence::Group(SequenceGroup::new(dependents))
        };

        Self {
            sequencer,
            wait_strategy,
            cursor,
            dependent,
            alerted: AtomicBool::new(false),
        }
    }

    /// Wait until `sequence` is readable.
    ///
    /// Returns the highest contiguously published sequence, which may be
    /// larger than requested, or smaller when the wait strategy returned
    /// early (multi-producer claims that are not yet published).
    pub fn wait_for(&self, sequence: i64) -> Result<i64> {
        self.check_alert()?;

        let available = self
            .wait_strategy
            .wait_for(sequence, &self.cursor, &self.dependent, self)?;

        if available < sequence {
            return Ok(available);
        }

        Ok(self
            .sequencer
            .highest_published_sequence(sequence, available))
    }

    /// Current value this barrier waits on (cursor or minimum dependent).
    pub fn cursor(&self) -> i64 {
        self.dependent.get()
    }

    pub fn is_alerted(&self) -> bool {
        self.alerted.load(Ordering::Acquire)
    }

    /// Raise the alert and wake any parked waiter. Idempotent.
    pub fn alert(&self) {
        trace_debug!("barrier alerted");
        self.alerted.store(true, Ordering::Release);
        self.wait_strategy.signal_all_when_blocking();
    }

    pub fn clear_alert(&self) {
        self.alerted.store(false, Ordering::Release);
    }

    #[inline]
    pub fn check_alert(&self) -> Result<()> {
        if self.is_alerted() {
            Err(SeqRingError::Alert)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for SequenceBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceBarrier")
            .field("cursor", &self.cursor)
            .field("dependent", &self.dependent)
            .field("wait_strategy", &self.wait_strategy)
            .field("alerted", &self.is_alerted())
            .finish()
    }
}
