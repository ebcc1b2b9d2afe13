//! Stored records and the storage they live in.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Position of an item in the queue's insertion order.
///
/// Assigned at enqueue time, strictly increasing over the queue's lifetime,
/// never reused, not even for items that were later evicted. Restarts at
/// [`Sequence::FIRST`] on reset. Zero is never assigned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Sequence(u64);

impl Sequence {
    /// Marks a slot that has never held an item.
    pub const NONE: Sequence = Sequence(0);

    /// The first sequence a queue hands out.
    pub const FIRST: Sequence = Sequence(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the following sequence, or `None` once the counter is spent.
    pub fn next(self) -> Option<Sequence> {
        self.0.checked_add(1).map(Sequence)
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Sequence {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Sequence> for u64 {
    fn from(seq: Sequence) -> Self {
        seq.0
    }
}

/// One queued record: an opaque payload plus the caller's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Item {
    pub payload: u64,
    pub timestamp: u64,
    pub sequence: Sequence,
}

impl Item {
    /// Filler for caller-allocated storage.
    ///
    /// ```
    /// # use pressure::Item;
    /// let mut slots = [Item::EMPTY; 16];
    /// # let _ = &mut slots;
    /// ```
    pub const EMPTY: Item = Item {
        payload: 0,
        timestamp: 0,
        sequence: Sequence::NONE,
    };
}

/// Backing slots for a [`Queue`](crate::Queue).
///
/// Implemented for anything that can lend out a mutable slice of items:
/// arrays, `&mut [Item]`, `Vec<Item>`, `Box<[Item]>`. The queue never grows
/// or reallocates its storage; it only indexes into it.
pub trait Storage: AsRef<[Item]> + AsMut<[Item]> {}

impl<T> Storage for T where T: AsRef<[Item]> + AsMut<[Item]> {}
