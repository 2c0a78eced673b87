//! Simple SPSC Example
//!
//! One producer publishes through translate-and-publish, one consumer reads
//! through a barrier and gates the producer with its own sequence.

use seqring::{BusySpinWaitStrategy, RingBuffer, Sequence};
use std::sync::Arc;
use std::thread;

const RING_SIZE: usize = 1024 * 64;
const MESSAGE_COUNT: u64 = 1_000_000;
const BATCH_SIZE: usize = 1024;

fn main() {
    println!("\n=== Simple SPSC Example ===\n");

    let ring = Arc::new(
        RingBuffer::create_single_producer(|| 0u64, RING_SIZE, Arc::new(BusySpinWaitStrategy))
            .unwrap(),
    );

    let consumer_sequence = Arc::new(Sequence::default());
    ring.add_gating_sequences(&[consumer_sequence.clone()]);
    let barrier = ring.new_barrier(&[]);

    // Producer thread
    let ring_prod = ring.clone();
    let producer = thread::spawn(move || {
        let values: Vec<u64> = (1..=MESSAGE_COUNT).collect();
        let mut sent = 0usize;

        while sent < values.len() {
            let batch = (values.len() - sent).min(BATCH_SIZE);
            ring_prod
                .publish_events(&values, sent, batch, |slot, _, value| *slot = *value)
                .unwrap();
            sent += batch;
        }

        println!("Producer: sent {} messages", sent);
    });

    // Consumer thread
    let ring_cons = ring.clone();
    let consumer = thread::spawn(move || {
        let mut next = 0i64;
        let mut sum = 0u64;

        while next < MESSAGE_COUNT as i64 {
            let available = barrier.wait_for(next).unwrap();
            for sequence in next..=available {
                // SAFETY: published and confirmed by the barrier; gated by consumer_sequence
                sum += unsafe { *ring_cons.get(sequence) };
            }
            consumer_sequence.set(available);
            next = available + 1;
        }

        println!("Consumer: received {} messages, sum = {}", next, sum);
        sum
    });

    let start = std::time::Instant::now();
    producer.join().unwrap();
    let sum = consumer.join().unwrap();
    let duration = start.elapsed();

    // Verify
    let expected = (MESSAGE_COUNT * (MESSAGE_COUNT + 1)) / 2;
    assert_eq!(sum, expected, "Sum mismatch!");

    let throughput = MESSAGE_COUNT as f64 / duration.as_secs_f64() / 1_000_000.0;
    println!("\nThroughput: {:.2}M msgs/sec", throughput);
    println!("Verified: sum = {} (expected {})", sum, expected);
}
