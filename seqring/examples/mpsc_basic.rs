//! Average Calculator - MPSC (4 Producers, 1 Consumer)
//!
//! Producers claim through the multi-producer sequencer; the consumer's
//! barrier only hands out sequences whose slots are fully published.

use seqring::{ProducerType, RingBuffer, RingBufferConfig, Sequence, WaitStrategyKind};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const RING_SIZE: usize = 1024 * 64;
const MESSAGES_PER_PRODUCER: u64 = 250_000;
const NUM_PRODUCERS: usize = 4;
const MAX_NUMBER: u64 = MESSAGES_PER_PRODUCER * NUM_PRODUCERS as u64;

fn main() {
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  Average Calculator - MPSC (4P/1C)                     ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    println!("Task: Calculate average of numbers 1 to {}", MAX_NUMBER);

    let config = RingBufferConfig::new(RING_SIZE)
        .unwrap()
        .with_producer_type(ProducerType::Multi)
        .with_wait_strategy(WaitStrategyKind::Yielding);
    let ring = Arc::new(RingBuffer::with_config(config, || 0u64).unwrap());

    let consumer_sequence = Arc::new(Sequence::default());
    ring.add_gating_sequences(&[consumer_sequence.clone()]);
    let barrier = ring.new_barrier(&[]);

    let start = Instant::now();

    // Producer threads
    let mut producer_threads = vec![];
    for producer_id in 0..NUM_PRODUCERS {
        let ring = ring.clone();
        let handle = thread::spawn(move || {
            let start_num = producer_id as u64 * MESSAGES_PER_PRODUCER + 1;
            for number in start_num..start_num + MESSAGES_PER_PRODUCER {
                ring.publish_event_with(|slot, _, n| *slot = n, number)
                    .unwrap();
            }
        });
        producer_threads.push(handle);
    }

    // Consumer thread
    let ring_cons = ring.clone();
    let consumer = thread::spawn(move || {
        let mut next = 0i64;
        let mut sum = 0u64;
        while next < MAX_NUMBER as i64 {
            let available = barrier.wait_for(next).unwrap();
            for sequence in next..=available {
                // SAFETY: published and confirmed by the barrier; gated by consumer_sequence
                sum += unsafe { *ring_cons.get(sequence) };
            }
            if available >= next {
                consumer_sequence.set(available);
                next = available + 1;
            }
        }
        sum
    });

    for handle in producer_threads {
        handle.join().unwrap();
    }
    let sum = consumer.join().unwrap();
    let duration = start.elapsed();

    let expected = MAX_NUMBER * (MAX_NUMBER + 1) / 2;
    assert_eq!(sum, expected, "Sum mismatch!");

    println!("Sum:     {}", sum);
    println!("Average: {:.2}", sum as f64 / MAX_NUMBER as f64);
    println!(
        "Throughput: {:.2}M msgs/sec",
        MAX_NUMBER as f64 / duration.as_secs_f64() / 1_000_000.0
    );
}
