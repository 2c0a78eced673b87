//! # seqring
//!
//! Sequencer and pre-allocated ring buffer core of the LMAX Disruptor pattern.
//!
//! ## Components
//!
//! - **Sequence**: cache-line padded atomic progress counter
//! - **Sequencer**: claims sequences for producers, gates them on consumers
//!   (single- and multi-producer variants)
//! - **SequenceBarrier**: a consumer's wait point over the cursor and its
//!   upstream consumers, with cooperative alerting
//! - **WaitStrategy**: blocking, timeout-blocking, busy-spin and yielding waits
//! - **RingBuffer**: power-of-two slot array with translate-and-publish helpers
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use seqring::{BlockingWaitStrategy, RingBuffer, Sequence};
//!
//! # fn main() -> seqring::Result<()> {
//! let ring = RingBuffer::create_single_producer(|| 0u64, 1024, Arc::new(BlockingWaitStrategy::new()))?;
//! let consumer = Arc::new(Sequence::default());
//! ring.add_gating_sequences(&[consumer.clone()]);
//! let barrier = ring.new_barrier(&[]);
//!
//! ring.publish_event(|slot, seq| *slot = seq as u64 * 2)?;
//! let available = barrier.wait_for(0)?;
//! // SAFETY: published and confirmed by the barrier, producers are gated on `consumer`
//! let value = unsafe { *ring.get(available) };
//! assert_eq!(value, 0);
//! consumer.set(available);
//! # Ok(())
//! # }
//! ```

// Tracing macros - no-op when feature disabled
#[cfg(feature = "tracing")]
macro_rules! trace_debug { ($($arg:tt)*) => { tracing::debug!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug { ($($arg:tt)*) => {} }

#[cfg(feature = "tracing")]
macro_rules! trace_warn { ($($arg:tt)*) => { tracing::warn!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn { ($($arg:tt)*) => {} }

#[cfg(feature = "tracing")]
macro_rules! trace_trace { ($($arg:tt)*) => { tracing::trace!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_trace { ($($arg:tt)*) => {} }

pub mod barrier;
pub mod disruptor;
pub mod error;
pub mod sequence;
pub mod wait_strategy;

// Re-export main components
pub use barrier::SequenceBarrier;
pub use disruptor::{
    MultiProducerSequencer, ProducerType, RingBuffer, RingBufferConfig, Sequencer,
    SingleProducerSequencer,
};
pub use error::{Result, SeqRingError};
pub use sequence::{Sequence, INITIAL_VALUE};
pub use wait_strategy::{
    BlockingWaitStrategy, BusySpinWaitStrategy, TimeoutBlockingWaitStrategy, WaitStrategy,
    WaitStrategyKind, YieldingWaitStrategy,
};
