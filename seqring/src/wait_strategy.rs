//! Consumer wait strategies.
//!
//! | strategy                      | latency  | cpu      | notes                          |
//! |-------------------------------|----------|----------|--------------------------------|
//! | `BusySpinWaitStrategy`        | lowest   | highest  | needs a dedicated core         |
//! | `YieldingWaitStrategy`        | low      | high     | spins 100 times, then yields   |
//! | `BlockingWaitStrategy`        | variable | lowest   | parks on a condition variable  |
//! | `TimeoutBlockingWaitStrategy` | variable | lowest   | as blocking, fails on timeout  |
//!
//! Every strategy re-checks the barrier's alert flag on each spin or wake-up;
//! that is the only way a waiting consumer learns it has to stop.

use std::fmt;
use std::hint;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::barrier::{DependentSequence, SequenceBarrier};
use crate::error::{Result, SeqRingError};
use crate::sequence::Sequence;

/// Spins before `YieldingWaitStrategy` starts yielding.
const SPIN_TRIES: u32 = 100;

/// Policy used by a barrier to wait for a sequence to become available.
pub trait WaitStrategy: Send + Sync + fmt::Debug {
    /// Wait until `dependent` reaches `sequence` and return its value.
    ///
    /// `cursor` is the sequencer's cursor, `dependent` the minimum of the
    /// consumer's upstream sequences (or the cursor itself). Fails with
    /// `Alert` when the barrier is alerted, and `Timeout` for strategies
    /// that bound their wait.
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependent: &DependentSequence,
        barrier: &SequenceBarrier,
    ) -> Result<i64>;

    /// Wake consumers parked by this strategy. Called by producers after publishing.
    fn signal_all_when_blocking(&self);
}

#[inline]
fn spin_on_dependent(
    sequence: i64,
    dependent: &DependentSequence,
    barrier: &SequenceBarrier,
) -> Result<i64> {
    loop {
        let available = dependent.get();
        if available >= sequence {
            return Ok(available);
        }
        barrier.check_alert()?;
        hint::spin_loop();
    }
}

// ============================================================================
// Blocking
// ============================================================================

/// Parks on a condition variable until the cursor moves, then spins on the
/// dependent sequences. The lock only guards the wake-up signal.
#[derive(Debug, Default)]
pub struct BlockingWaitStrategy {
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl BlockingWaitStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaitStrategy for BlockingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependent: &DependentSequence,
        barrier: &SequenceBarrier,
    ) -> Result<i64> {
        if cursor.get() < sequence {
            let mut guard = self.mutex.lock();
            while cursor.get() < sequence {
                barrier.check_alert()?;
                self.condvar.wait(&mut guard);
            }
        }

        spin_on_dependent(sequence, dependent, barrier)
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }
}

// ============================================================================
// Blocking with timeout
// ============================================================================

/// Blocking strategy whose cursor wait is bounded by `timeout`.
///
/// Fails with `SeqRingError::Timeout` when nothing is published in time, so
/// the consumer can run idle or heartbeat work and come back.
#[derive(Debug)]
pub struct TimeoutBlockingWaitStrategy {
    mutex: Mutex<()>,
    condvar: Condvar,
    timeout: Duration,
}

impl TimeoutBlockingWaitStrategy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl WaitStrategy for TimeoutBlockingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependent: &DependentSequence,
        barrier: &SequenceBarrier,
    ) -> Result<i64> {
        if cursor.get() < sequence {
            let mut guard = self.mutex.lock();
            match Instant::now().checked_add(self.timeout) {
                Some(deadline) => {
                    while cursor.get() < sequence {
                        barrier.check_alert()?;
                        if Instant::now() >= deadline {
                            trace_trace!(sequence, timeout = ?self.timeout, "wait timed out");
                            return Err(SeqRingError::Timeout);
                        }
                        self.condvar.wait_until(&mut guard, deadline);
                    }
                }
                // timeout past the end of the clock, wait like the plain blocking strategy
                None => {
                    while cursor.get() < sequence {
                        barrier.check_alert()?;
                        self.condvar.wait(&mut guard);
                    }
                }
            }
        }

        spin_on_dependent(sequence, dependent, barrier)
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }
}

// ============================================================================
// Busy spin
// ============================================================================

/// Pure spin. Lowest latency; burns a core.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusySpinWaitStrategy;

impl WaitStrategy for BusySpinWaitStrategy {
    #[inline]
    fn wait_for(
        &self,
        sequence: i64,
        _cursor: &Sequence,
        dependent: &DependentSequence,
        barrier: &SequenceBarrier,
    ) -> Result<i64> {
        spin_on_dependent(sequence, dependent, barrier)
    }

    #[inline]
    fn signal_all_when_blocking(&self) {}
}

// ============================================================================
// Yielding
// ============================================================================

/// Spins `SPIN_TRIES` times, then yields the thread on every further miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldingWaitStrategy;

impl WaitStrategy for YieldingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        _cursor: &Sequence,
        dependent: &DependentSequence,
        barrier: &SequenceBarrier,
    ) -> Result<i64> {
        let mut counter = SPIN_TRIES;
        loop {
            let available = dependent.get();
            if available >= sequence {
                return Ok(available);
            }
            barrier.check_alert()?;
            if counter == 0 {
                thread::yield_now();
            } else {
                counter -= 1;
            }
        }
    }

    #[inline]
    fn signal_all_when_blocking(&self) {}
}

// ============================================================================
// Configuration
// ============================================================================

/// Wait strategy selection for `RingBufferConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategyKind {
    #[default]
    Blocking,
    TimeoutBlocking(Duration),
    BusySpin,
    Yielding,
}

impl WaitStrategyKind {
    pub fn build(self) -> Arc<dyn WaitStrategy> {
        match self {
            WaitStrategyKind::Blocking => Arc::new(BlockingWaitStrategy::new()),
            WaitStrategyKind::TimeoutBlocking(timeout) => {
                Arc::new(TimeoutBlockingWaitStrategy::new(timeout))
            }
            WaitStrategyKind::BusySpin => Arc::new(BusySpinWaitStrategy),
            WaitStrategyKind::Yielding => Arc::new(YieldingWaitStrategy),
        }
    }
}
