//! RingBuffer - pre-allocated slots over a sequencer.
//!
//! Slots are created once by the entry factory and overwritten in place
//! forever after. The ring owns the storage; producers borrow a slot between
//! claim and publish, consumers between `wait_for` and advancing their own
//! sequence.
//!
//! The safe translate-and-publish methods hand the translator a `&mut` to the
//! claimed slot. That borrow is exclusive only while no other claim can reach
//! the same slot, so they require:
//!
//! - at least one gating sequence, otherwise a producer can lap a slot that
//!   is still being filled (checked, `InvalidArgument`)
//! - a single-producer ring to be claimed from one thread only (checked,
//!   panics on the second thread)
//!
//! Gating sequences must only be advanced over published sequences, and the
//! last one must not be removed while producers are publishing.

use std::cell::UnsafeCell;
use std::fmt;
use std::sync::Arc;

use crate::barrier::SequenceBarrier;
use crate::disruptor::{
    MultiProducerSequencer, ProducerType, RingBufferConfig, Sequencer, SingleProducerSequencer,
};
use crate::error::{Result, SeqRingError};
use crate::sequence::Sequence;
use crate::wait_strategy::WaitStrategy;

/// Publishes `lo..=hi` when dropped, including during a translator panic.
struct PublishOnDrop<'a> {
    sequencer: &'a dyn Sequencer,
    lo: i64,
    hi: i64,
}

impl Drop for PublishOnDrop<'_> {
    fn drop(&mut self) {
        self.sequencer.publish_range(self.lo, self.hi);
    }
}

pub struct RingBuffer<E> {
    entries: Box<[UnsafeCell<E>]>,
    index_mask: i64,
    sequencer: Arc<dyn Sequencer>,
}

// Slot access is coordinated by the sequencer protocol: a slot is written
// only by the producer holding its sequence and read only after publication.
unsafe impl<E: Send> Send for RingBuffer<E> {}
unsafe impl<E: Send + Sync> Sync for RingBuffer<E> {}

impl<E> RingBuffer<E> {
    /// Ring over `sequencer`, pre-filled by calling `factory` once per slot.
    pub fn new<F>(mut factory: F, sequencer: Arc<dyn Sequencer>) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        let buffer_size = sequencer.buffer_size();
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

        let entries = (0..buffer_size)
            .map(|_| UnsafeCell::new(factory()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            entries,
            index_mask: buffer_size as i64 - 1,
            sequencer,
        })
    }

    pub fn create<F>(
        producer_type: ProducerType,
        factory: F,
        buffer_size: usize,
        wait_strategy: Arc<dyn WaitStrategy>,
    ) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        match producer_type {
            ProducerType::Single => Self::create_single_producer(factory, buffer_size, wait_strategy),
            ProducerType::Multi => Self::create_multi_producer(factory, buffer_size, wait_strategy),
        }
    }

    pub fn create_single_producer<F>(
        factory: F,
        buffer_size: usize,
        wait_strategy: Arc<dyn WaitStrategy>,
    ) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        let sequencer = SingleProducerSequencer::new(buffer_size, wait_strategy)?;
        Self::new(factory, Arc::new(sequencer))
    }

    pub fn create_multi_producer<F>(
        factory: F,
        buffer_size: usize,
        wait_strategy: Arc<dyn WaitStrategy>,
    ) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        let sequencer = MultiProducerSequencer::new(buffer_size, wait_strategy)?;
        Self::new(factory, Arc::new(sequencer))
    }

    pub fn with_config<F>(config: RingBufferConfig, factory: F) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        trace_debug!(
            size = config.size,
            producer_type = ?config.producer_type,
            wait_strategy = ?config.wait_strategy,
            "creating ring buffer"
        );
        Self::create(
            config.producer_type,
            factory,
            config.size,
            config.wait_strategy.build(),
        )
    }

    #[inline]
    fn slot(&self, sequence: i64) -> &UnsafeCell<E> {
        &self.entries[(sequence & self.index_mask) as usize]
    }

    /// Entry for `sequence`. No availability check is made.
    ///
    /// # Safety
    ///
    /// - `sequence` must have been published and confirmed by a barrier (or
    ///   be claimed by the caller and not yet published).
    /// - No producer may be writing the slot, i.e. the gating sequence of the
    ///   reader must not have advanced past `sequence`.
    #[inline]
    pub unsafe fn get(&self, sequence: i64) -> &E {
        &*self.slot(sequence).get()
    }

    /// Mutable entry for `sequence`.
    ///
    /// # Safety
    ///
    /// - `sequence` must be claimed by the caller and not yet published.
    /// - Only one reference to the slot may exist while the returned one
    ///   is alive.
    #[inline]
    #[allow(clippy::mut_from_ref)] // exclusive access comes from the claim, see Safety
    pub unsafe fn get_mut(&self, sequence: i64) -> &mut E {
        &mut *self.slot(sequence).get()
    }

    /// Move the producer to `sequence` and return its slot. Initialisation only.
    ///
    /// # Safety
    ///
    /// Same as [`RingBuffer::get_mut`]; no producer or consumer may be active.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn claim_and_get_preallocated(&self, sequence: i64) -> &mut E {
        self.sequencer.claim(sequence);
        self.get_mut(sequence)
    }

    // --- sequencer delegation ---

    #[inline]
    pub fn next(&self) -> Result<i64> {
        self.sequencer.next()
    }

    #[inline]
    pub fn next_n(&self, n: usize) -> Result<i64> {
        self.sequencer.next_n(n)
    }

    #[inline]
    pub fn try_next(&self) -> Result<i64> {
        self.sequencer.try_next()
    }

    #[inline]
    pub fn try_next_n(&self, n: usize) -> Result<i64> {
        self.sequencer.try_next_n(n)
    }

    #[inline]
    pub fn publish(&self, sequence: i64) {
        self.sequencer.publish(sequence);
    }

    #[inline]
    pub fn publish_range(&self, lo: i64, hi: i64) {
        self.sequencer.publish_range(lo, hi);
    }

    pub fn is_available(&self, sequence: i64) -> bool {
        self.sequencer.is_available(sequence)
    }

    pub fn add_gating_sequences(&self, sequences: &[Arc<Sequence>]) {
        self.sequencer.add_gating_sequences(sequences);
    }

    pub fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool {
        self.sequencer.remove_gating_sequence(sequence)
    }

    pub fn minimum_gating_sequence(&self) -> i64 {
        self.sequencer.minimum_sequence()
    }

    #[inline]
    pub fn cursor(&self) -> i64 {
        self.sequencer.cursor()
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.entries.len()
    }

    pub fn has_available_capacity(&self, required: usize) -> bool {
        self.sequencer.has_available_capacity(required)
    }

    pub fn remaining_capacity(&self) -> i64 {
        self.sequencer.remaining_capacity()
    }

    pub fn sequencer(&self) -> &Arc<dyn Sequencer> {
        &self.sequencer
    }

    /// Barrier over this ring's cursor that also waits for `dependents`.
    pub fn new_barrier(&self, dependents: &[Arc<Sequence>]) -> SequenceBarrier {
        SequenceBarrier::new(self.sequencer.clone(), dependents)
    }

    // --- translate and publish ---

    /// Refuse to hand out `&mut` slots when nothing stops a producer lapping them.
    fn check_exclusive_claims(&self) -> Result<()> {
        if self.sequencer.has_gating_sequences() {
            return Ok(());
        }
        trace_warn!(
            sequencer = ?self.sequencer,
            "translate-and-publish on a ring with no gating sequences"
        );
        Err(SeqRingError::invalid_argument(
            "translate-and-publish needs at least one gating sequence",
        ))
    }

    fn translate_one<F>(&self, sequence: i64, translator: F)
    where
        F: FnOnce(&mut E, i64),
    {
        let _publish = PublishOnDrop {
            sequencer: self.sequencer.as_ref(),
            lo: sequence,
            hi: sequence,
        };
        // SAFETY: `sequence` was just claimed and is published only when the guard drops
        let slot = unsafe { self.get_mut(sequence) };
        translator(slot, sequence);
    }

    fn translate_batch<A, F>(&self, args: &[A], hi: i64, mut translator: F)
    where
        F: FnMut(&mut E, i64, &A),
    {
        let lo = hi - (args.len() as i64 - 1);
        let _publish = PublishOnDrop {
            sequencer: self.sequencer.as_ref(),
            lo,
            hi,
        };
        for (sequence, arg) in (lo..=hi).zip(args) {
            // SAFETY: `lo..=hi` was just claimed and is published only when the guard drops
            let slot = unsafe { self.get_mut(sequence) };
            translator(slot, sequence, arg);
        }
    }

    /// `args[batch_starts_at..batch_starts_at + batch_size]`, or InvalidArgument.
    fn batch_segment<'a, A>(
        &self,
        args: &'a [A],
        batch_starts_at: usize,
        batch_size: usize,
    ) -> Result<&'a [A]> {
        if batch_size > self.buffer_size() {
            return Err(SeqRingError::invalid_argument(format!(
                "batch size {} exceeds buffer size {}",
                batch_size,
                self.buffer_size()
            )));
        }
        match batch_starts_at.checked_add(batch_size) {
            Some(end) if end <= args.len() => Ok(&args[batch_starts_at..end]),
            _ => Err(SeqRingError::invalid_argument(format!(
                "batch {}+{} overruns {} arguments",
                batch_starts_at,
                batch_size,
                args.len()
            ))),
        }
    }

    /// Claim the next slot, fill it with `translator` and publish it.
    ///
    /// The slot is published even if `translator` panics. Returns the
    /// published sequence.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the ring has no gating sequence; nothing is
    /// claimed.
    ///
    /// # Panics
    ///
    /// On a single-producer ring, when called from a thread other than the
    /// first one that claimed. Panics from `translator` are propagated after
    /// the slot is published.
    pub fn publish_event<F>(&self, translator: F) -> Result<i64>
    where
        F: FnOnce(&mut E, i64),
    {
        self.check_exclusive_claims()?;
        let sequence = self.sequencer.next()?;
        self.translate_one(sequence, translator);
        Ok(sequence)
    }

    /// As [`RingBuffer::publish_event`], failing with `InsufficientCapacity`
    /// instead of waiting.
    pub fn try_publish_event<F>(&self, translator: F) -> Result<i64>
    where
        F: FnOnce(&mut E, i64),
    {
        self.check_exclusive_claims()?;
        let sequence = self.sequencer.try_next()?;
        self.translate_one(sequence, translator);
        Ok(sequence)
    }

    /// Publish one event built from `arg`. Pass a tuple for several arguments.
    pub fn publish_event_with<A, F>(&self, translator: F, arg: A) -> Result<i64>
    where
        F: FnOnce(&mut E, i64, A),
    {
        self.publish_event(|slot, sequence| translator(slot, sequence, arg))
    }

    pub fn try_publish_event_with<A, F>(&self, translator: F, arg: A) -> Result<i64>
    where
        F: FnOnce(&mut E, i64, A),
    {
        self.try_publish_event(|slot, sequence| translator(slot, sequence, arg))
    }

    /// Publish one event per element of
    /// `args[batch_starts_at..batch_starts_at + batch_size]`.
    ///
    /// Bounds are checked before anything is claimed. The whole batch is
    /// published even if `translator` panics part way through. Returns the
    /// highest published sequence.
    ///
    /// Errors and panics as [`RingBuffer::publish_event`].
    pub fn publish_events<A, F>(
        &self,
        args: &[A],
        batch_starts_at: usize,
        batch_size: usize,
        translator: F,
    ) -> Result<i64>
    where
        F: FnMut(&mut E, i64, &A),
    {
        self.check_exclusive_claims()?;
        let batch = self.batch_segment(args, batch_starts_at, batch_size)?;
        let hi = self.sequencer.next_n(batch_size)?;
        self.translate_batch(batch, hi, translator);
        Ok(hi)
    }

    pub fn try_publish_events<A, F>(
        &self,
        args: &[A],
        batch_starts_at: usize,
        batch_size: usize,
        translator: F,
    ) -> Result<i64>
    where
        F: FnMut(&mut E, i64, &A),
    {
        self.check_exclusive_claims()?;
        let batch = self.batch_segment(args, batch_starts_at, batch_size)?;
        let hi = self.sequencer.try_next_n(batch_size)?;
        self.translate_batch(batch, hi, translator);
        Ok(hi)
    }

    /// Publish one event per element of `args`.
    pub fn publish_all<A, F>(&self, args: &[A], translator: F) -> Result<i64>
    where
        F: FnMut(&mut E, i64, &A),
    {
        self.publish_events(args, 0, args.len(), translator)
    }

    pub fn try_publish_all<A, F>(&self, args: &[A], translator: F) -> Result<i64>
    where
        F: FnMut(&mut E, i64, &A),
    {
        self.try_publish_events(args, 0, args.len(), translator)
    }
}

impl<E> fmt::Debug for RingBuffer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("buffer_size", &self.buffer_size())
            .field("sequencer", &self.sequencer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wait_strategy::{BusySpinWaitStrategy, WaitStrategyKind};
    use std::panic::{self, AssertUnwindSafe};
    use std::sync;
    use std::thread;

    /// Ring with one idle gating consumer, returned alongside it.
    fn single(size: usize) -> (RingBuffer<i64>, Arc<Sequence>) {
        let ring =
            RingBuffer::create_single_producer(|| -1, size, Arc::new(BusySpinWaitStrategy)).unwrap();
        let consumer = Arc::new(Sequence::default());
        ring.add_gating_sequences(&[consumer.clone()]);
        (ring, consumer)
    }

    fn multi(size: usize) -> (RingBuffer<i64>, Arc<Sequence>) {
        let ring =
            RingBuffer::create_multi_producer(|| -1, size, Arc::new(BusySpinWaitStrategy)).unwrap();
        let consumer = Arc::new(Sequence::default());
        ring.add_gating_sequences(&[consumer.clone()]);
        (ring, consumer)
    }

    #[test]
    fn test_factory_fills_every_slot() {
        let mut calls = 0;
        let ring = RingBuffer::create_single_producer(
            || {
                calls += 1;
                calls
            },
            8,
            Arc::new(BusySpinWaitStrategy),
        )
        .unwrap();

        assert_eq!(ring.buffer_size(), 8);
        assert_eq!(calls, 8);
        assert_eq!(unsafe { *ring.get(0) }, 1);
        assert_eq!(unsafe { *ring.get(7) }, 8);
        // wraps onto slot 0
        assert_eq!(unsafe { *ring.get(8) }, 1);
    }

    #[test]
    fn test_invalid_size() {
        let result =
            RingBuffer::create_single_producer(|| 0u8, 12, Arc::new(BusySpinWaitStrategy));
        assert!(matches!(result, Err(SeqRingError::InvalidArgument(_))));
        let result = RingBuffer::create_multi_producer(|| 0u8, 0, Arc::new(BusySpinWaitStrategy));
        assert!(matches!(result, Err(SeqRingError::InvalidArgument(_))));
    }

    #[test]
    fn test_claim_write_publish() {
        let (ring, _consumer) = single(8);
        let seq = ring.next().unwrap();
        unsafe { *ring.get_mut(seq) = 42 };
        assert!(!ring.is_available(seq));
        ring.publish(seq);
        assert!(ring.is_available(seq));
        assert_eq!(unsafe { *ring.get(seq) }, 42);
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn test_translator_arities() {
        let (ring, _consumer) = single(8);

        assert_eq!(ring.publish_event(|slot, seq| *slot = seq * 10).unwrap(), 0);
        ring.publish_event_with(|slot, _, a: i64| *slot = a, 5).unwrap();
        ring.publish_event_with(|slot, _, (a, b): (i64, i64)| *slot = a + b, (2, 3))
            .unwrap();
        ring.try_publish_event_with(
            |slot, _, (a, b, c): (i64, i64, i64)| *slot = a * b * c,
            (2, 3, 4),
        )
        .unwrap();

        let values: Vec<i64> = (0..4).map(|s| unsafe { *ring.get(s) }).collect();
        assert_eq!(values, vec![0, 5, 5, 24]);
        assert_eq!(ring.cursor(), 3);
    }

    #[test]
    fn test_publish_events_segment() {
        let (ring, _consumer) = multi(8);
        let args = [10, 20, 30, 40, 50];

        let hi = ring
            .publish_events(&args, 1, 3, |slot, _, arg| *slot = *arg)
            .unwrap();
        assert_eq!(hi, 2);

        let values: Vec<i64> = (0..3).map(|s| unsafe { *ring.get(s) }).collect();
        assert_eq!(values, vec![20, 30, 40]);
        assert_eq!(ring.sequencer().highest_published_sequence(0, 2), 2);
    }

    #[test]
    fn test_batch_bounds_checked_before_claim() {
        for (ring, _consumer) in [single(4), multi(4)] {
            let args = [1, 2, 3];
            let capacity = ring.remaining_capacity();

            let overrun = ring.publish_events(&args, 2, 2, |slot, _, arg| *slot = *arg);
            assert!(matches!(overrun, Err(SeqRingError::InvalidArgument(_))));

            let overflow = ring.try_publish_events(&args, usize::MAX, 2, |slot, _, arg| *slot = *arg);
            assert!(matches!(overflow, Err(SeqRingError::InvalidArgument(_))));

            let too_big = ring.publish_all(&[0; 5], |slot, _, arg| *slot = *arg);
            assert!(matches!(too_big, Err(SeqRingError::InvalidArgument(_))));

            let empty = ring.publish_all(&[] as &[i64], |slot, _, arg| *slot = *arg);
            assert!(matches!(empty, Err(SeqRingError::InvalidArgument(_))));

            assert_eq!(ring.cursor(), -1);
            assert_eq!(ring.remaining_capacity(), capacity);
        }
    }

    #[test]
    fn test_try_publish_on_full_ring() {
        let (ring, consumer) = single(4);

        ring.try_publish_all(&[1, 2, 3, 4], |slot, _, arg| *slot = *arg)
            .unwrap();
        assert_eq!(
            ring.try_publish_event(|slot, _| *slot = 5),
            Err(SeqRingError::InsufficientCapacity)
        );
        assert_eq!(
            ring.try_publish_all(&[5], |slot, _, arg| *slot = *arg),
            Err(SeqRingError::InsufficientCapacity)
        );
        // slot 0 was not overwritten
        assert_eq!(unsafe { *ring.get(0) }, 1);

        consumer.set(0);
        assert_eq!(ring.try_publish_event(|slot, _| *slot = 5), Ok(4));
        assert_eq!(unsafe { *ring.get(4) }, 5);
    }

    #[test]
    fn test_panicking_translator_still_publishes() {
        let (ring, _consumer) = single(8);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            ring.publish_event(|_, _| panic!("translator failed")).unwrap();
        }));
        assert!(result.is_err());
        assert_eq!(ring.cursor(), 0);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            ring.publish_all(&[1, 2, 3], |slot, _, arg| {
                if *arg == 2 {
                    panic!("translator failed");
                }
                *slot = *arg;
            })
            .unwrap();
        }));
        assert!(result.is_err());
        // the whole batch is published, not just the filled prefix
        assert_eq!(ring.cursor(), 3);
        assert_eq!(unsafe { *ring.get(1) }, 1);

        assert_eq!(ring.publish_event(|slot, _| *slot = 9).unwrap(), 4);
    }

    #[test]
    fn test_multi_producer_panicking_translator_does_not_leave_gap() {
        let (ring, _consumer) = multi(8);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            ring.publish_event(|_, _| panic!("translator failed")).unwrap();
        }));
        ring.publish_event(|slot, _| *slot = 1).unwrap();

        let barrier = ring.new_barrier(&[]);
        assert_eq!(barrier.wait_for(0).unwrap(), 1);
    }

    #[test]
    fn test_claim_and_get_preallocated() {
        let (ring, _consumer) = single(8);
        unsafe {
            *ring.claim_and_get_preallocated(5) = 55;
        }
        ring.publish(5);
        assert_eq!(ring.cursor(), 5);
        assert_eq!(unsafe { *ring.get(5) }, 55);
        assert_eq!(ring.next().unwrap(), 6);
    }

    #[test]
    fn test_gating_delegation() {
        let (ring, first) = multi(8);
        ring.publish_all(&[1, 2, 3], |slot, _, arg| *slot = *arg)
            .unwrap();

        let second = Arc::new(Sequence::default());
        ring.add_gating_sequences(&[second.clone()]);
        assert_eq!(second.get(), 2);
        assert_eq!(ring.minimum_gating_sequence(), -1);
        assert_eq!(ring.remaining_capacity(), 5);

        first.set(2);
        assert_eq!(ring.minimum_gating_sequence(), 2);
        assert_eq!(ring.remaining_capacity(), 8);
        assert!(ring.has_available_capacity(8));

        assert!(ring.remove_gating_sequence(&second));
        assert!(!ring.remove_gating_sequence(&second));
    }

    #[test]
    fn test_with_config() {
        let config = RingBufferConfig::new(16)
            .unwrap()
            .with_producer_type(ProducerType::Multi)
            .with_wait_strategy(WaitStrategyKind::Yielding);
        let ring = RingBuffer::with_config(config, || 0u32).unwrap();
        ring.add_gating_sequences(&[Arc::new(Sequence::default())]);

        assert_eq!(ring.buffer_size(), 16);
        ring.publish_event(|slot, _| *slot = 1).unwrap();
        assert!(format!("{:?}", ring).contains("MultiProducerSequencer"));
    }

    #[test]
    fn test_translate_without_gating_is_refused() {
        for producer_type in [ProducerType::Single, ProducerType::Multi] {
            let ring =
                RingBuffer::create(producer_type, || 0i64, 1, Arc::new(BusySpinWaitStrategy))
                    .unwrap();
            let mut called = false;

            let results = [
                ring.publish_event(|_, _| called = true),
                ring.try_publish_event_with(|_, _, _: ()| called = true, ()),
                ring.publish_all(&[1], |_, _, _| called = true),
                ring.try_publish_events(&[1], 0, 1, |_, _, _| called = true),
            ];
            for result in results {
                assert!(
                    matches!(result, Err(SeqRingError::InvalidArgument(_))),
                    "{producer_type:?}"
                );
            }
            assert!(!called);
            assert_eq!(ring.cursor(), -1);

            // a gating consumer unlocks the safe path
            let consumer = Arc::new(Sequence::default());
            ring.add_gating_sequences(&[consumer.clone()]);
            assert_eq!(ring.publish_event(|slot, _| *slot = 5), Ok(0));
            assert!(ring.remove_gating_sequence(&consumer));
            assert!(ring.try_publish_event(|slot, _| *slot = 6).is_err());
            assert_eq!(unsafe { *ring.get(0) }, 5);
        }
    }

    #[test]
    fn test_slot_is_not_reclaimed_while_translating() {
        let (ring, consumer) = multi(1);
        let ring = Arc::new(ring);
        let in_translator = Arc::new(sync::Barrier::new(2));
        let release = Arc::new(sync::Barrier::new(2));

        let (ring_a, entered, leave) = (ring.clone(), in_translator.clone(), release.clone());
        let producer = thread::spawn(move || {
            ring_a.publish_event(|slot, seq| {
                entered.wait();
                leave.wait();
                *slot = seq + 10;
            })
        });

        in_translator.wait();
        // slot 0 is still being filled, a second claim must not land on it
        assert_eq!(
            ring.try_publish_event(|slot, _| *slot = 99),
            Err(SeqRingError::InsufficientCapacity)
        );
        assert!(!ring.is_available(0));
        release.wait();

        assert_eq!(producer.join().unwrap(), Ok(0));
        assert_eq!(unsafe { *ring.get(0) }, 10);

        consumer.set(0);
        assert_eq!(ring.try_publish_event(|slot, _| *slot = 99), Ok(1));
        assert_eq!(unsafe { *ring.get(1) }, 99);
    }

    #[test]
    fn test_single_producer_ring_rejects_second_thread() {
        let (ring, _consumer) = single(8);
        let ring = Arc::new(ring);
        ring.publish_event(|slot, _| *slot = 1).unwrap();

        let other = ring.clone();
        let result = thread::spawn(move || other.publish_event(|slot, _| *slot = 2)).join();
        assert!(result.is_err());

        assert_eq!(ring.cursor(), 0);
        assert_eq!(unsafe { *ring.get(0) }, 1);
    }
}
