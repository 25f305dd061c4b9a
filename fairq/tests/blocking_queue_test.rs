// Copyright 2023 The Fairq Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Multi-threaded tests for BoundedBlockingQueue

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use fairq::BoundedBlockingQueue;
use fairq::CountDownLatch;
use fairq::OfferError;
use fairq::QueueConfig;
use fairq::QueueError;

#[test]
fn test_single_producer_single_consumer_fifo() {
    let queue = Arc::new(BoundedBlockingQueue::new(4).unwrap());
    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..1_000u32 {
                queue.put(i).unwrap();
            }
        })
    };

    let consumed: Vec<u32> = (0..1_000).map(|_| queue.take().unwrap()).collect();
    producer.join().unwrap();

    assert_eq!(consumed, (0..1_000).collect::<Vec<_>>());
    assert!(queue.is_empty());
}

#[test]
fn test_many_producers_many_consumers_no_loss_no_duplicates() {
    const PRODUCERS: u64 = 4;
    const CONSUMERS: u64 = 3;
    const PER_PRODUCER: u64 = 2_500;
    const TOTAL: u64 = PRODUCERS * PER_PRODUCER;

    let queue = Arc::new(BoundedBlockingQueue::new(8).unwrap());
    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.put(p * PER_PRODUCER + i).unwrap();
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|c| {
            let queue = Arc::clone(&queue);
            let quota = TOTAL / CONSUMERS + u64::from(c < TOTAL % CONSUMERS);
            thread::spawn(move || (0..quota).map(|_| queue.take().unwrap()).collect::<Vec<_>>())
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    let mut seen = HashSet::new();
    let mut sum = 0u64;
    for consumer in consumers {
        for item in consumer.join().unwrap() {
            assert!(seen.insert(item), "item {item} consumed twice");
            sum += item;
        }
    }

    assert_eq!(seen.len() as u64, TOTAL);
    assert_eq!(sum, TOTAL * (TOTAL - 1) / 2);
    assert!(queue.is_empty());
}

#[test]
fn test_per_producer_order_is_preserved() {
    let queue = Arc::new(BoundedBlockingQueue::new(3).unwrap());
    let producers: Vec<_> = (0..2u32)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..500u32 {
                    queue.put((p, i)).unwrap();
                }
            })
        })
        .collect();

    let mut next = [0u32; 2];
    for _ in 0..1_000 {
        let (p, i) = queue.take().unwrap();
        assert_eq!(next[p as usize], i);
        next[p as usize] += 1;
    }
    for producer in producers {
        producer.join().unwrap();
    }
}

#[test]
fn test_offer_blocks_until_concurrent_poll_frees_space() {
    let queue = Arc::new(BoundedBlockingQueue::new(1).unwrap());
    queue.offer(1, Duration::from_millis(50)).unwrap();

    let rejected = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.offer(2, Duration::from_millis(50)))
    };
    assert_eq!(rejected.join().unwrap(), Err(OfferError::Timeout(2)));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.take().unwrap())
    };
    assert_eq!(consumer.join().unwrap(), 1);
    queue.offer(2, Duration::from_millis(50)).unwrap();
}

#[test]
fn test_blocked_offer_completes_once_space_frees() {
    let queue = Arc::new(BoundedBlockingQueue::new(1).unwrap());
    queue.put(1).unwrap();

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.offer(2, Duration::from_secs(10)))
    };
    thread::sleep(Duration::from_millis(50));
    assert_eq!(queue.take().unwrap(), 1);

    assert_eq!(producer.join().unwrap(), Ok(()));
    assert_eq!(queue.take().unwrap(), 2);
}

#[test]
fn test_poll_timeout_precision() {
    let queue = BoundedBlockingQueue::<u8>::new(1).unwrap();
    let timeout = Duration::from_millis(100);

    let start = Instant::now();
    assert_eq!(queue.poll(timeout).unwrap(), None);
    let elapsed = start.elapsed();

    assert!(elapsed >= timeout, "returned after {elapsed:?}");
    assert!(elapsed < timeout + Duration::from_secs(2), "returned after {elapsed:?}");
}

#[test]
fn test_poll_budget_survives_stolen_items() {
    let queue = Arc::new(
        BoundedBlockingQueue::with_config(QueueConfig {
            capacity: 1,
            fair: false,
            spin_tries: 0,
        })
        .unwrap(),
    );
    let timeout = Duration::from_millis(300);
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let start = Instant::now();
            let item = queue.poll(timeout).unwrap();
            (item, start.elapsed())
        })
    };

    // Each put wakes the consumer, which then finds the item already gone.
    let stealing = Instant::now();
    while !consumer.is_finished() && stealing.elapsed() < Duration::from_secs(1) {
        queue.put(1).unwrap();
        let _ = queue.poll(Duration::ZERO).unwrap();
        thread::sleep(Duration::from_millis(1));
    }

    let (item, elapsed) = consumer.join().unwrap();
    if item.is_none() {
        assert!(elapsed >= timeout, "returned after {elapsed:?}");
        assert!(
            elapsed < timeout + Duration::from_millis(600),
            "wakeups extended the budget, returned after {elapsed:?}"
        );
    }
}

#[test]
fn test_zero_timeout_does_not_wait() {
    let queue = BoundedBlockingQueue::<u8>::new(1).unwrap();
    let start = Instant::now();
    assert_eq!(queue.poll(Duration::ZERO).unwrap(), None);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_clear_releases_all_blocked_producers() {
    let queue = Arc::new(BoundedBlockingQueue::new(2).unwrap());
    queue.put(1).unwrap();
    queue.put(2).unwrap();

    let producers: Vec<_> = [3, 4]
        .into_iter()
        .map(|item| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.put(item))
        })
        .collect();
    thread::sleep(Duration::from_millis(50));
    queue.clear();

    for producer in producers {
        producer.join().unwrap().unwrap();
    }
    let mut refilled = vec![
        queue.poll(Duration::ZERO).unwrap().unwrap(),
        queue.poll(Duration::ZERO).unwrap().unwrap(),
    ];
    refilled.sort_unstable();
    assert_eq!(refilled, vec![3, 4]);
    assert!(queue.is_empty());
}

#[test]
fn test_occupancy_never_exceeds_capacity() {
    const CAPACITY: usize = 5;
    let queue = Arc::new(BoundedBlockingQueue::new(CAPACITY).unwrap());
    let start = CountDownLatch::new(1);

    let producers: Vec<_> = (0..8)
        .map(|i| {
            let queue = Arc::clone(&queue);
            let start = start.clone();
            thread::spawn(move || {
                start.wait();
                (0..4)
                    .filter(|j| queue.offer(i * 4 + j, Duration::ZERO).is_ok())
                    .count()
            })
        })
        .collect();
    start.count_down();

    let accepted: usize = producers.into_iter().map(|p| p.join().unwrap()).sum();
    assert_eq!(accepted, CAPACITY);

    let mut drained = 0;
    while queue.poll(Duration::ZERO).unwrap().is_some() {
        drained += 1;
    }
    assert_eq!(drained, CAPACITY);
}

#[test]
fn test_documented_scenario() {
    let queue = BoundedBlockingQueue::new(2).unwrap();
    assert!(queue.offer(1, Duration::from_millis(100)).is_ok());
    assert!(queue.offer(2, Duration::from_millis(100)).is_ok());
    let rejected = queue.offer(3, Duration::from_millis(100)).unwrap_err();
    assert!(rejected.is_timeout());
    assert_eq!(queue.take().unwrap(), 1);
    assert!(queue.offer(rejected.into_inner(), Duration::from_millis(100)).is_ok());

    assert_eq!(queue.take().unwrap(), 2);
    assert_eq!(queue.take().unwrap(), 3);
}

#[test]
fn test_interrupt_releases_blocked_producers_and_consumers() {
    let full = Arc::new(BoundedBlockingQueue::new(1).unwrap());
    full.put(0).unwrap();
    let producer = {
        let full = Arc::clone(&full);
        thread::spawn(move || full.offer(1, Duration::from_secs(30)))
    };
    while !producer.is_finished() {
        full.interrupt_waiters();
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(producer.join().unwrap(), Err(OfferError::Interrupted(1)));
    assert_eq!(full.take().unwrap(), 0);
    assert!(full.is_empty());

    let empty = Arc::new(BoundedBlockingQueue::<u32>::new(1).unwrap());
    let consumer = {
        let empty = Arc::clone(&empty);
        thread::spawn(move || empty.poll(Duration::from_secs(30)))
    };
    while !consumer.is_finished() {
        empty.interrupt_waiters();
        thread::sleep(Duration::from_millis(5));
    }
    let err = consumer.join().unwrap().unwrap_err();
    assert_eq!(err, QueueError::Interrupted);
    assert!(err.is_retryable());
}

#[test]
fn test_item_arriving_with_interrupt_is_delivered() {
    let queue = Arc::new(BoundedBlockingQueue::<u32>::new(1).unwrap());
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.take())
    };
    thread::sleep(Duration::from_millis(50));

    queue.put(42).unwrap();
    queue.interrupt_waiters();

    assert_eq!(consumer.join().unwrap(), Ok(42));
    assert!(queue.is_empty());
}

#[test]
fn test_interrupt_wins_over_deadline_in_timed_poll() {
    let queue = Arc::new(BoundedBlockingQueue::<u32>::new(1).unwrap());
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.poll(Duration::from_millis(200)))
    };
    thread::sleep(Duration::from_millis(50));
    while !consumer.is_finished() {
        queue.interrupt_waiters();
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(consumer.join().unwrap(), Err(QueueError::Interrupted));
}
