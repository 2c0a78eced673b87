//! Sequencer and ring buffer throughput benchmarks
//!
//! Run: cargo bench --bench bench_sequencer

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;

use seqring::{
    BusySpinWaitStrategy, MultiProducerSequencer, RingBuffer, Sequence, Sequencer,
    SingleProducerSequencer, WaitStrategy, YieldingWaitStrategy,
};

const RING_SIZE: usize = 64 * 1024; // 64K slots
const BATCH_SIZE: usize = 64;
const TOTAL_EVENTS: u64 = 1_000_000; // 1M events

/// Claim + publish cost with no consumer attached
fn bench_claim_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("Claim-Publish");
    group.throughput(Throughput::Elements(1));

    let single = SingleProducerSequencer::new(RING_SIZE, Arc::new(BusySpinWaitStrategy)).unwrap();
    group.bench_function(BenchmarkId::new("sequencer", "single"), |b| {
        b.iter(|| {
            let seq = single.next().unwrap();
            single.publish(seq);
            std::hint::black_box(seq)
        })
    });

    let multi = MultiProducerSequencer::new(RING_SIZE, Arc::new(BusySpinWaitStrategy)).unwrap();
    group.bench_function(BenchmarkId::new("sequencer", "multi"), |b| {
        b.iter(|| {
            let seq = multi.next().unwrap();
            multi.publish(seq);
            std::hint::black_box(seq)
        })
    });

    group.finish();
}

/// Producer(s) to one consumer through a barrier, batched publish
fn run_pipeline(ring: Arc<RingBuffer<u64>>, producers: usize, events: u64) -> u64 {
    let consumer_sequence = Arc::new(Sequence::default());
    ring.add_gating_sequences(&[consumer_sequence.clone()]);
    let barrier = ring.new_barrier(&[]);
    let start = ring.cursor() + 1;
    let end = start + events as i64;

    let ring_cons = ring.clone();
    let consumer = thread::spawn(move || {
        let mut next = start;
        let mut sum = 0u64;
        while next < end {
            let available = barrier.wait_for(next).unwrap();
            for sequence in next..=available {
                sum = sum.wrapping_add(unsafe { *ring_cons.get(sequence) });
            }
            if available >= next {
                consumer_sequence.set(available);
                next = available + 1;
            }
        }
        sum
    });

    let per_producer = events / producers as u64;
    let handles: Vec<_> = (0..producers)
        .map(|_| {
            let ring = ring.clone();
            thread::spawn(move || {
                let values = [1u64; BATCH_SIZE];
                let mut sent = 0u64;
                while sent < per_producer {
                    let batch = ((per_producer - sent) as usize).min(BATCH_SIZE);
                    ring.publish_events(&values, 0, batch, |slot, _, v| *slot = *v)
                        .unwrap();
                    sent += batch as u64;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    let sum = consumer.join().unwrap();
    ring.remove_gating_sequence(&consumer_sequence);
    sum
}

fn busy_spin() -> Arc<dyn WaitStrategy> {
    Arc::new(BusySpinWaitStrategy)
}

fn yielding() -> Arc<dyn WaitStrategy> {
    Arc::new(YieldingWaitStrategy)
}

fn bench_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pipeline");
    group.throughput(Throughput::Elements(TOTAL_EVENTS));
    group.sample_size(10);

    let strategies: [(&str, fn() -> Arc<dyn WaitStrategy>); 2] =
        [("busy-spin", busy_spin), ("yielding", yielding)];

    for (name, strategy) in strategies {
        group.bench_function(BenchmarkId::new("1P1C", name), |b| {
            b.iter(|| {
                let ring = Arc::new(
                    RingBuffer::create_single_producer(|| 0u64, RING_SIZE, strategy()).unwrap(),
                );
                run_pipeline(ring, 1, TOTAL_EVENTS)
            })
        });

        group.bench_function(BenchmarkId::new("2P1C", name), |b| {
            b.iter(|| {
                let ring = Arc::new(
                    RingBuffer::create_multi_producer(|| 0u64, RING_SIZE, strategy()).unwrap(),
                );
                run_pipeline(ring, 2, TOTAL_EVENTS)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_claim_publish, bench_pipelines);
criterion_main!(benches);
