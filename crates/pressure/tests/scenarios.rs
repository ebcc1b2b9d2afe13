//! End-to-end behaviour of the public API for each overflow policy, the
//! pressure classifier and the reentrancy fault.

use pressure::{
    FaultReason, Item, OverflowPolicy, PressureState, Queue, QueueConfig, QueueError, Storage,
};

fn drain<S: Storage>(queue: &Queue<S>) -> Vec<u64> {
    std::iter::from_fn(|| queue.dequeue().ok())
        .map(|(item, _)| item.payload)
        .collect()
}

#[test]
fn reject_refuses_overflow() {
    let config = QueueConfig::with_capacity(4).with_policy(OverflowPolicy::Reject);
    let queue = Queue::new(config, [Item::EMPTY; 4]).expect("valid config");

    let results: Vec<_> = (1..=6).map(|p| queue.enqueue(p, p)).collect();

    assert!(results[..4].iter().all(Result::is_ok));
    assert_eq!(results[4], Err(QueueError::Full));
    assert_eq!(results[5], Err(QueueError::Full));

    let stats = queue.stats();
    assert_eq!(stats.rejected, 2);
    assert_eq!(queue.len(), 4);
    assert!(stats.is_balanced(queue.len()));
    assert_eq!(drain(&queue), vec![1, 2, 3, 4]);
}

#[test]
fn drop_oldest_keeps_newest_window() {
    let config = QueueConfig::with_capacity(4).with_policy(OverflowPolicy::DropOldest);
    let queue = Queue::new(config, [Item::EMPTY; 4]).expect("valid config");

    for p in [10, 20, 30, 40, 50, 60, 70] {
        let outcome = queue.enqueue(p, 0).expect("drop-oldest never refuses");
        assert!(!outcome.was_dropped);
    }

    assert_eq!(queue.stats().dropped_oldest, 3);
    assert_eq!(drain(&queue), vec![40, 50, 60, 70]);
    assert!(queue.stats().is_balanced(queue.len()));
}

#[test]
fn drop_newest_keeps_oldest_window() {
    let config = QueueConfig::with_capacity(4).with_policy(OverflowPolicy::DropNewest);
    let queue = Queue::new(config, [Item::EMPTY; 4]).expect("valid config");

    for p in [10, 20, 30, 40] {
        assert!(!queue.enqueue(p, 0).expect("room available").was_dropped);
    }
    for p in [50, 60, 70] {
        let outcome = queue.enqueue(p, 0).expect("drop-newest reports success");
        assert!(outcome.was_dropped);
    }

    assert_eq!(queue.stats().dropped_newest, 3);
    assert_eq!(drain(&queue), vec![10, 20, 30, 40]);
    assert!(queue.stats().is_balanced(queue.len()));
}

#[test]
fn watermarks_classify_fill() {
    let mut slots = vec![Item::EMPTY; 20];
    let queue = Queue::init(20, OverflowPolicy::Reject, 5, 15, 18, slots.as_mut_slice())
        .expect("valid config");

    for p in 0..16 {
        queue.enqueue(p, 0).expect("room available");
    }
    assert_eq!(queue.pressure_state(), PressureState::High);

    queue.enqueue(16, 0).expect("room available");
    let outcome = queue.enqueue(17, 0).expect("room available");
    assert_eq!(outcome.state, PressureState::Critical);
    assert_eq!(queue.pressure_state(), PressureState::Critical);

    let stats = queue.stats();
    assert_eq!(stats.critical_events, 1);
    assert_eq!(stats.high_water_events, 1);
    assert_eq!(stats.peak_fill, 18);
}

#[test]
fn reentrant_enqueue_faults_until_reset() {
    let config = QueueConfig::with_capacity(8);
    let mut queue = Queue::new(config, vec![Item::EMPTY; 8]).expect("valid config");

    let mut inner = None;
    let outer = queue
        .enqueue_with(1, 100, |q, _| inner = Some(q.enqueue(2, 101)))
        .expect("outer call completes");

    assert_eq!(inner, Some(Err(QueueError::Reentry)));
    assert!(!outer.valid);
    assert_eq!(queue.pressure_state(), PressureState::Fault);

    let fault = QueueError::Fault(FaultReason::Reentrancy);
    assert_eq!(queue.enqueue(3, 102), Err(fault));
    assert_eq!(queue.dequeue().map(|(item, _)| item), Err(fault));
    assert_eq!(queue.peek(), Err(fault));

    queue.reset();
    assert!(!queue.is_faulted());
    assert!(queue.is_empty());
    assert!(queue.enqueue(4, 103).expect("healthy again").valid);
}

#[test]
fn mixed_traffic_stays_accounted() {
    let config = QueueConfig::with_capacity(10)
        .with_policy(OverflowPolicy::DropOldest)
        .with_watermarks(3, 8, 9);
    let queue = Queue::new(config, [Item::EMPTY; 10]).expect("valid config");

    for p in 0..50 {
        queue.enqueue(p, p).expect("drop-oldest never refuses");
    }
    for _ in 0..7 {
        queue.dequeue().expect("non-empty");
    }

    let stats = queue.stats();
    assert_eq!(stats.enqueued, 50);
    assert_eq!(stats.dequeued, 7);
    assert_eq!(stats.dropped_oldest, 40);
    assert_eq!(queue.len(), 3);
    assert!(stats.is_balanced(queue.len()));
    assert_eq!(queue.verify(), Ok(()));
}

#[test]
fn shared_across_threads_behind_a_mutex() {
    use std::sync::{Arc, Mutex};
    use std::thread;

    let config = QueueConfig::with_capacity(64).with_policy(OverflowPolicy::DropNewest);
    let queue = Arc::new(Mutex::new(
        Queue::new(config, vec![Item::EMPTY; 64]).expect("valid config"),
    ));

    let producers: Vec<_> = (0..4u64)
        .map(|t| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..100 {
                    let q = queue.lock().expect("lock not poisoned");
                    q.enqueue(t * 1000 + i, i).expect("drop-newest never refuses");
                    drop(q);
                    if i % 2 == 0 {
                        let q = queue.lock().expect("lock not poisoned");
                        let _ = q.dequeue();
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer thread");
    }

    let q = queue.lock().expect("lock not poisoned");
    assert_eq!(q.stats().enqueued, 400);
    assert!(q.stats().is_balanced(q.len()));
    assert!(!q.is_faulted());
}
