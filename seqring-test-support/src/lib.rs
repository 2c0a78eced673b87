//! Test helpers for seqring: ordering verification and jitter injection.

pub mod jitter;
pub mod verify;

pub use jitter::Jitter;
pub use verify::{SequenceChecker, SequenceStatus, ValueVerifier, VerifyResult};
