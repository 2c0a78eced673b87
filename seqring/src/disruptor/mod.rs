//! Sequencers and the ring buffer built on them (LMAX Disruptor pattern).
//!
//! - `SingleProducerSequencer` - one producer thread, no atomic RMW on claim
//! - `MultiProducerSequencer` - any number of producers, per-slot availability flags
//! - `RingBuffer<E>` - pre-allocated slots over either sequencer

mod multi;
mod ring_buffer;
mod sequencer;
mod single;

// Re-exports
pub use multi::MultiProducerSequencer;
pub use ring_buffer::RingBuffer;
pub use sequencer::Sequencer;
pub use single::SingleProducerSequencer;

use std::time::Duration;

use crate::error::{Result, SeqRingError};
use crate::wait_strategy::WaitStrategyKind;

/// Default ring buffer size (must be power of 2)
pub const DEFAULT_RING_BUFFER_SIZE: usize = 64 * 1024; // 64K slots

/// Which sequencer a ring buffer is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProducerType {
    /// Exactly one publishing thread.
    #[default]
    Single,
    /// Any number of publishing threads.
    Multi,
}

/// Configuration for ring buffer construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBufferConfig {
    /// Number of slots (must be power of 2)
    pub size: usize,
    pub producer_type: ProducerType,
    pub wait_strategy: WaitStrategyKind,
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_RING_BUFFER_SIZE,
            producer_type: ProducerType::default(),
            wait_strategy: WaitStrategyKind::default(),
        }
    }
}

impl RingBufferConfig {
    /// Create a new configuration with the specified size
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(SeqRingError::invalid_argument(
                "ring buffer size must be greater than 0",
            ));
        }
        if !size.is_power_of_two() {
            return Err(SeqRingError::invalid_argument(
                "ring buffer size must be power of 2",
            ));
        }

        Ok(Self {
            size,
            ..Default::default()
        })
    }

    pub fn with_producer_type(mut self, producer_type: ProducerType) -> Self {
        self.producer_type = producer_type;
        self
    }

    pub fn with_wait_strategy(mut self, wait_strategy: WaitStrategyKind) -> Self {
        self.wait_strategy = wait_strategy;
        self
    }

    /// Block consumers for at most `timeout` (timeout-blocking strategy).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.wait_strategy = WaitStrategyKind::TimeoutBlocking(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_config_creation() {
        let config = RingBufferConfig::new(1024).unwrap();
        assert_eq!(config.size, 1024);
        assert_eq!(config.producer_type, ProducerType::Single);
        assert_eq!(config.wait_strategy, WaitStrategyKind::Blocking);
    }

    #[test]
    fn test_ring_buffer_config_default() {
        let config = RingBufferConfig::default();
        assert_eq!(config.size, DEFAULT_RING_BUFFER_SIZE);
        assert_eq!(config.producer_type, ProducerType::Single);
    }

    #[test]
    fn test_ring_buffer_config_invalid_size() {
        assert!(RingBufferConfig::new(0).is_err());
        assert!(RingBufferConfig::new(1023).is_err()); // Not power of 2
    }

    #[test]
    fn test_ring_buffer_config_builder() {
        let config = RingBufferConfig::new(1024)
            .unwrap()
            .with_producer_type(ProducerType::Multi)
            .with_wait_strategy(WaitStrategyKind::BusySpin);

        assert_eq!(config.size, 1024);
        assert_eq!(config.producer_type, ProducerType::Multi);
        assert_eq!(config.wait_strategy, WaitStrategyKind::BusySpin);

        let config = config.with_timeout(Duration::from_millis(5));
        assert_eq!(
            config.wait_strategy,
            WaitStrategyKind::TimeoutBlocking(Duration::from_millis(5))
        );
    }
}
