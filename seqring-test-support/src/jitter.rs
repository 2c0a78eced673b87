//! Random delay injection for concurrency tests.
//!
//! Sprinkled between claim and publish, it makes producers finish out of
//! claim order so consumers actually hit unpublished gaps.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Injects random short pauses with a given probability.
///
/// # Example
///
/// ```
/// use seqring_test_support::Jitter;
///
/// let mut jitter = Jitter::new(7)
///     .with_probability(0.05)
///     .with_delay_range(1, 50);
///
/// jitter.maybe_delay();
/// ```
pub struct Jitter {
    probability: f64,
    delay_min_us: u64,
    delay_max_us: u64,
    yield_only: bool,
    rng: StdRng,
    events_triggered: usize,
}

impl Jitter {
    /// Deterministic jitter from `seed`; never fires until a probability is set.
    pub fn new(seed: u64) -> Self {
        Self {
            probability: 0.0,
            delay_min_us: 1,
            delay_max_us: 100,
            yield_only: false,
            rng: StdRng::seed_from_u64(seed),
            events_triggered: 0,
        }
    }

    /// Frequent, short pauses for multi-producer stress tests
    pub fn aggressive(seed: u64) -> Self {
        Self::new(seed)
            .with_probability(0.05)
            .with_delay_range(1, 20)
    }

    /// Yield instead of sleeping
    pub fn yielding(seed: u64, probability: f64) -> Self {
        let mut jitter = Self::new(seed).with_probability(probability);
        jitter.yield_only = true;
        jitter
    }

    pub fn with_probability(mut self, prob: f64) -> Self {
        self.probability = prob.clamp(0.0, 1.0);
        self
    }

    pub fn with_delay_range(mut self, min_us: u64, max_us: u64) -> Self {
        self.delay_min_us = min_us.min(max_us);
        self.delay_max_us = max_us.max(min_us);
        self
    }

    /// Maybe pause the calling thread. Returns whether it did.
    pub fn maybe_delay(&mut self) -> bool {
        if self.rng.gen::<f64>() >= self.probability {
            return false;
        }

        if self.yield_only {
            std::thread::yield_now();
        } else {
            let delay_us = self.rng.gen_range(self.delay_min_us..=self.delay_max_us);
            std::thread::sleep(Duration::from_micros(delay_us));
        }
        self.events_triggered += 1;
        true
    }

    /// Get number of pauses injected
    pub fn events_triggered(&self) -> usize {
        self.events_triggered
    }
}
