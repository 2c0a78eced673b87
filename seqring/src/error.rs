//! Error types for seqring.

use thiserror::Error;

/// Result type for seqring operations.
pub type Result<T> = std::result::Result<T, SeqRingError>;

/// Errors raised by sequencers, barriers and the ring buffer.
///
/// Every variant except `InvalidArgument` carries no payload, so the
/// capacity, alert and timeout signals never allocate on the hot path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeqRingError {
    /// Bad construction or claim parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A non-blocking claim found the ring full relative to the slowest consumer.
    #[error("insufficient capacity")]
    InsufficientCapacity,

    /// The barrier was alerted while (or before) waiting.
    #[error("alerted")]
    Alert,

    /// No publication happened within the configured wait window.
    #[error("timed out waiting for sequence")]
    Timeout,
}

impl SeqRingError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Capacity and timeout signals are normal control flow; callers retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientCapacity | Self::Timeout)
    }
}
