#![no_main]

//! Construction must either fail cleanly or yield a queue whose
//! configuration satisfies every ordering rule.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pressure::{ConfigError, ErrorCode, Item, MAX_CAPACITY, OverflowPolicy, Queue};

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u16,
    policy: u8,
    low: u16,
    high: u16,
    critical: u16,
    storage_len: u16,
}

fuzz_target!(|input: Input| {
    let Ok(policy) = OverflowPolicy::try_from(input.policy) else {
        assert!(input.policy > 2);
        return;
    };
    let capacity = u32::from(input.capacity);
    let (low, high, critical) = (
        u32::from(input.low),
        u32::from(input.high),
        u32::from(input.critical),
    );
    let storage = vec![Item::EMPTY; usize::from(input.storage_len % 4200)];
    let storage_len = storage.len();

    match Queue::init(capacity, policy, low, high, critical, storage) {
        Ok(queue) => {
            assert!((1..=MAX_CAPACITY).contains(&capacity));
            assert_eq!(storage_len, capacity as usize);
            assert!(low < high && high < critical && critical <= capacity);
            assert!(queue.is_empty());
            assert_eq!(queue.verify(), Ok(()));
        }
        Err(ConfigError::MissingStorage) => assert_eq!(storage_len, 0),
        Err(e) => assert_eq!(e.code(), ErrorCode::Config),
    }
});
