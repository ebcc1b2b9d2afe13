//! Fixed-size circular buffer over caller-owned storage.
//!
//! `head` is the next slot to read, `tail` the next slot to write, `count`
//! the number of resident items. `head == tail` holds both when empty and
//! when full, so emptiness and fullness are decided by `count` alone.

use crate::item::{Item, Storage};

pub(crate) struct Ring<S> {
    slots: S,
    capacity: u32,
    head: u32,
    tail: u32,
    count: u32,
}

impl<S: Storage> Ring<S> {
    /// Wraps `slots`, which must hold exactly `capacity` items.
    pub(crate) fn new(slots: S, capacity: u32) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be positive");
        debug_assert_eq!(
            slots.as_ref().len(),
            capacity as usize,
            "ring storage length must equal capacity"
        );

        Self {
            slots,
            capacity,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) fn len(&self) -> u32 {
        self.count
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub(crate) fn head(&self) -> u32 {
        self.head
    }

    pub(crate) fn tail(&self) -> u32 {
        self.tail
    }

    fn advance(&self, index: u32) -> u32 {
        (index + 1) % self.capacity
    }

    /// Writes `item` at `tail`. The ring must not be full.
    pub(crate) fn push_back(&mut self, item: Item) {
        assert!(
            self.count < self.capacity,
            "push on full ring: count={} capacity={}",
            self.count,
            self.capacity
        );

        self.slots.as_mut()[self.tail as usize] = item;
        self.tail = self.advance(self.tail);
        self.count += 1;
    }

    /// Removes and returns the item at `head`.
    pub(crate) fn pop_front(&mut self) -> Option<Item> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots.as_ref()[self.head as usize];
        self.head = self.advance(self.head);
        self.count -= 1;
        Some(item)
    }

    /// Returns a copy of the item at `head` without removing it.
    pub(crate) fn front(&self) -> Option<Item> {
        if self.is_empty() {
            return None;
        }
        Some(self.slots.as_ref()[self.head as usize])
    }

    /// Resident items from oldest to newest.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Item> + '_ {
        let slots = self.slots.as_ref();
        (0..self.count).map(move |offset| {
            let index = (self.head + offset) % self.capacity;
            &slots[index as usize]
        })
    }

    /// Forgets all resident items. Slots keep their stale contents.
    pub(crate) fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    pub(crate) fn into_slots(self) -> S {
        self.slots
    }
}
