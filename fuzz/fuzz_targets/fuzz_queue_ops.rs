#![no_main]

//! Drives a queue with arbitrary operation sequences and checks it against a
//! `VecDeque` model after every step.

use std::collections::VecDeque;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pressure::{FaultReason, Item, OverflowPolicy, Queue, QueueConfig, QueueError};

#[derive(Debug, Clone, Copy, Arbitrary)]
enum FuzzPolicy {
    Reject,
    DropOldest,
    DropNewest,
}

impl From<FuzzPolicy> for OverflowPolicy {
    fn from(p: FuzzPolicy) -> Self {
        match p {
            FuzzPolicy::Reject => OverflowPolicy::Reject,
            FuzzPolicy::DropOldest => OverflowPolicy::DropOldest,
            FuzzPolicy::DropNewest => OverflowPolicy::DropNewest,
        }
    }
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum FuzzOp {
    Enqueue(u64),
    Dequeue,
    Peek,
    ClearStats,
    Reset,
    /// Enqueue whose completion callback dequeues.
    ReentrantEnqueue(u64),
    /// Dequeue whose completion callback enqueues.
    ReentrantDequeue(u64),
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    policy: FuzzPolicy,
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: Input| {
    let capacity = u32::from(input.capacity.max(2));
    let policy = OverflowPolicy::from(input.policy);
    let config = QueueConfig::with_capacity(capacity).with_policy(policy);
    let Ok(mut queue) = Queue::new(config, vec![Item::EMPTY; capacity as usize]) else {
        return;
    };

    let mut model: VecDeque<u64> = VecDeque::new();
    let mut faulted = false;
    let fault = QueueError::Fault(FaultReason::Reentrancy);

    for op in input.ops.into_iter().take(4096) {
        let full = model.len() == capacity as usize;
        match op {
            FuzzOp::Enqueue(payload) => {
                let result = queue.enqueue(payload, 0);
                if faulted {
                    assert_eq!(result, Err(fault));
                    continue;
                }
                apply_enqueue(&mut model, policy, full, payload, result);
            }
            FuzzOp::Dequeue => {
                let result = queue.dequeue().map(|(item, _)| item.payload);
                if faulted {
                    assert_eq!(result, Err(fault));
                    continue;
                }
                assert_eq!(result.ok(), model.pop_front());
            }
            FuzzOp::Peek => {
                let result = queue.peek().map(|item| item.payload);
                if faulted {
                    assert_eq!(result, Err(fault));
                } else {
                    assert_eq!(result.ok(), model.front().copied());
                }
            }
            FuzzOp::ClearStats => {
                assert_eq!(queue.clear_stats().is_err(), faulted);
            }
            FuzzOp::Reset => {
                queue.reset();
                model.clear();
                faulted = false;
            }
            FuzzOp::ReentrantEnqueue(payload) => {
                let mut inner = None;
                let result = queue.enqueue_with(payload, 0, |q, _| {
                    inner = Some(q.dequeue().map(|(item, _)| item));
                });
                if faulted {
                    assert_eq!(result, Err(fault));
                    assert!(inner.is_none());
                    continue;
                }
                match &result {
                    Ok(outcome) => {
                        assert_eq!(inner, Some(Err(QueueError::Reentry)));
                        assert!(!outcome.valid);
                        faulted = true;
                    }
                    Err(e) => {
                        assert!(inner.is_none());
                        assert_eq!(*e, QueueError::Full);
                    }
                }
                apply_enqueue(&mut model, policy, full, payload, result);
            }
            FuzzOp::ReentrantDequeue(payload) => {
                let mut inner = None;
                let result = queue.dequeue_with(|q, _, _| inner = Some(q.enqueue(payload, 0)));
                if faulted {
                    assert_eq!(result.map(|(item, _)| item), Err(fault));
                    continue;
                }
                match result {
                    Ok((item, outcome)) => {
                        assert_eq!(inner, Some(Err(QueueError::Reentry)));
                        assert!(!outcome.valid);
                        assert_eq!(Some(item.payload), model.pop_front());
                        faulted = true;
                    }
                    Err(e) => {
                        assert_eq!(e, QueueError::Empty);
                        assert!(model.is_empty());
                    }
                }
            }
        }

        assert_eq!(queue.is_faulted(), faulted);
        assert_eq!(queue.len() as usize, model.len());
        assert!(queue.len() <= queue.capacity());
        assert!(queue.stats().is_balanced(queue.len()));
        assert_eq!(queue.verify(), Ok(()));
    }
});

fn apply_enqueue<T>(
    model: &mut VecDeque<u64>,
    policy: OverflowPolicy,
    full: bool,
    payload: u64,
    result: Result<T, QueueError>,
) {
    match (policy, full) {
        (_, false) => {
            assert!(result.is_ok());
            model.push_back(payload);
        }
        (OverflowPolicy::Reject, true) => assert_eq!(result.err(), Some(QueueError::Full)),
        (OverflowPolicy::DropOldest, true) => {
            assert!(result.is_ok());
            model.pop_front();
            model.push_back(payload);
        }
        (OverflowPolicy::DropNewest, true) => assert!(result.is_ok()),
    }
}
