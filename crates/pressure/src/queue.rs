//! The bounded queue.
//!
//! Control flow for every mutating call:
//!
//! ```text
//! guard.enter ─► ring full? ─► policy.resolve ─► ring write/read
//!                                              ─► classifier.observe
//!                                              ─► stats.record / observe
//!                                              ─► on_complete callback
//! ```
//!
//! The callback runs after the mutation while the call still counts as in
//! progress, so a callback that calls back into a mutating operation trips
//! the reentrancy fault.

use std::cell::RefCell;
use std::fmt;

use crate::classifier::{Classifier, PressureState, Transition, Watermarks};
use crate::config::QueueConfig;
use crate::error::{ConfigError, FaultReason, QueueError};
use crate::guard::{Guard, GuardState};
use crate::item::{Item, Sequence, Storage};
use crate::ledger::{Entry, Stats};
use crate::policy::{OverflowPolicy, Resolution};
use crate::ring::Ring;

/// Post-operation snapshot returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOutcome {
    pub state: PressureState,
    /// Resident count after the operation.
    pub fill: u32,
    pub capacity: u32,
    /// Set only when `DropNewest` discarded the incoming item. The call
    /// still succeeded, so callers must check this flag, not just `Ok`.
    pub was_dropped: bool,
    /// False when the queue faulted before the call returned; the other
    /// fields then describe the last known ring state.
    pub valid: bool,
}

impl QueueOutcome {
    /// `fill / capacity`, in `0.0..=1.0`.
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(self.fill) / f64::from(self.capacity)
    }

    fn invalidated(self) -> Self {
        Self {
            state: PressureState::Fault,
            valid: false,
            ..self
        }
    }
}

struct Core<S> {
    ring: Ring<S>,
    classifier: Classifier,
    stats: Stats,
    next_sequence: Sequence,
}

impl<S: Storage> Core<S> {
    fn new(ring: Ring<S>, watermarks: Watermarks) -> Self {
        Self {
            ring,
            classifier: Classifier::new(watermarks),
            stats: Stats::default(),
            next_sequence: Sequence::FIRST,
        }
    }

    fn outcome(&self, was_dropped: bool) -> QueueOutcome {
        QueueOutcome {
            state: self.classifier.state(),
            fill: self.ring.len(),
            capacity: self.ring.capacity(),
            was_dropped,
            valid: true,
        }
    }

    fn enqueue(
        &mut self,
        policy: OverflowPolicy,
        payload: u64,
        timestamp: u64,
    ) -> Result<QueueOutcome, QueueError> {
        let full = self.ring.is_full();

        // Only paths that write consume a sequence; check before touching
        // the ring so an exhausted counter leaves no trace.
        let writes = !full || policy == OverflowPolicy::DropOldest;
        let sequence = self.next_sequence;
        let following = match sequence.next() {
            Some(next) => next,
            None if writes => return Err(QueueError::Overflow),
            None => sequence,
        };

        let mut entry = Entry::Stored;
        if full {
            match policy.resolve(&mut self.ring) {
                Resolution::Refuse => {
                    self.stats.record(Entry::Rejected);
                    tracing::trace!(payload, "queue full; item rejected");
                    return Err(QueueError::Full);
                }
                Resolution::Discard => {
                    self.stats.record(Entry::DroppedNewest);
                    tracing::trace!(payload, "queue full; incoming item discarded");
                    return Ok(self.outcome(true));
                }
                Resolution::Evicted(evicted) => {
                    entry = Entry::StoredWithEviction;
                    tracing::trace!(
                        evicted = %evicted.sequence,
                        "queue full; oldest item evicted"
                    );
                }
            }
        }

        self.ring.push_back(Item {
            payload,
            timestamp,
            sequence,
        });
        self.next_sequence = following;
        self.stats.record(entry);
        self.reclassify();

        Ok(self.outcome(false))
    }

    fn dequeue(&mut self) -> Result<(Item, QueueOutcome), QueueError> {
        let item = self.ring.pop_front().ok_or(QueueError::Empty)?;
        self.stats.record(Entry::Dequeued);
        self.reclassify();

        Ok((item, self.outcome(false)))
    }

    fn reclassify(&mut self) {
        let fill = self.ring.len();
        let transition: Transition = self.classifier.observe(fill);
        self.stats.observe(fill, transition);

        if transition.entered_critical() {
            tracing::debug!(fill, capacity = self.ring.capacity(), "queue entered CRITICAL");
        } else if transition.entered_high() {
            tracing::debug!(fill, capacity = self.ring.capacity(), "queue entered HIGH");
        }
    }

    fn reset(&mut self) {
        self.ring.clear();
        self.classifier.reset();
        self.stats = Stats::default();
        self.next_sequence = Sequence::FIRST;
    }

    /// Checks the structural invariants. Returns the first one violated.
    fn verify(&self) -> Result<(), &'static str> {
        let capacity = self.ring.capacity();
        if self.ring.len() > capacity {
            return Err("count exceeds capacity");
        }
        if self.ring.head() >= capacity || self.ring.tail() >= capacity {
            return Err("index out of bounds");
        }
        if !self.stats.is_balanced(self.ring.len()) {
            return Err("ledger out of balance");
        }

        let mut previous = Sequence::NONE;
        for item in self.ring.iter() {
            if item.sequence <= previous {
                return Err("resident sequences not strictly increasing");
            }
            previous = item.sequence;
        }
        if !self.ring.is_empty() && previous >= self.next_sequence {
            return Err("resident sequence at or beyond next_sequence");
        }
        Ok(())
    }
}

/// Fixed-capacity FIFO over caller-supplied storage.
///
/// Operations take `&self` and run to completion without blocking or
/// allocating. See the [`guard`](crate::guard) module for the threading
/// model.
///
/// # Example
///
/// ```
/// use pressure::{Item, OverflowPolicy, PressureState, Queue, QueueConfig};
///
/// let config = QueueConfig::with_capacity(4).with_policy(OverflowPolicy::DropOldest);
/// let queue = Queue::new(config, [Item::EMPTY; 4])?;
///
/// for payload in 1..=5 {
///     queue.enqueue(payload, 0)?;
/// }
///
/// let (oldest, outcome) = queue.dequeue()?;
/// assert_eq!(oldest.payload, 2);
/// assert_eq!(outcome.fill, 3);
/// assert_eq!(queue.stats().dropped_oldest, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Queue<S: Storage> {
    config: QueueConfig,
    core: RefCell<Core<S>>,
    guard: Guard,
}

impl<S: Storage> Queue<S> {
    /// Builds a queue over `storage`, which must hold exactly
    /// `config.capacity` slots.
    ///
    /// Nothing is written to `storage` during construction. On error the
    /// storage is dropped; pass `&mut [Item]` to keep ownership.
    pub fn new(config: QueueConfig, storage: S) -> Result<Self, ConfigError> {
        let len = storage.as_ref().len();
        if len == 0 {
            return Err(ConfigError::MissingStorage);
        }
        config.validate()?;
        if len != config.capacity as usize {
            return Err(ConfigError::StorageLength {
                len,
                capacity: config.capacity,
            });
        }

        let ring = Ring::new(storage, config.capacity);
        Ok(Self {
            config,
            core: RefCell::new(Core::new(ring, config.watermarks())),
            guard: Guard::new(),
        })
    }

    /// Positional form of [`Queue::new`].
    pub fn init(
        capacity: u32,
        policy: OverflowPolicy,
        low_water: u32,
        high_water: u32,
        critical_water: u32,
        storage: S,
    ) -> Result<Self, ConfigError> {
        let config = QueueConfig {
            capacity,
            policy,
            low_water,
            high_water,
            critical_water,
        };
        Self::new(config, storage)
    }

    /// Offers an item to the queue.
    ///
    /// When the queue is full the configured policy decides: `Reject` fails
    /// with [`QueueError::Full`], `DropOldest` evicts the head and stores the
    /// item, `DropNewest` discards the item and returns an outcome with
    /// `was_dropped` set.
    pub fn enqueue(&self, payload: u64, timestamp: u64) -> Result<QueueOutcome, QueueError> {
        self.enqueue_with(payload, timestamp, |_, _| {})
    }

    /// Like [`Queue::enqueue`], then calls `on_complete` before returning.
    ///
    /// The callback may read the queue (`peek`, `stats`, accessors). Calling
    /// a mutating operation from inside it is reentrancy: the inner call
    /// fails with [`QueueError::Reentry`], the queue faults, and this call
    /// returns an outcome with `valid == false`.
    pub fn enqueue_with<F>(
        &self,
        payload: u64,
        timestamp: u64,
        on_complete: F,
    ) -> Result<QueueOutcome, QueueError>
    where
        F: FnOnce(&Self, &QueueOutcome),
    {
        let _call = self.guard.enter()?;
        let result = self
            .core
            .borrow_mut()
            .enqueue(self.config.policy, payload, timestamp);
        let outcome = self.settle(result)?;
        self.debug_verify();

        on_complete(self, &outcome);
        Ok(self.finish(outcome))
    }

    /// Removes and returns the oldest item.
    pub fn dequeue(&self) -> Result<(Item, QueueOutcome), QueueError> {
        self.dequeue_with(|_, _, _| {})
    }

    /// Like [`Queue::dequeue`], then calls `on_complete` before returning.
    /// Same reentrancy rules as [`Queue::enqueue_with`].
    pub fn dequeue_with<F>(&self, on_complete: F) -> Result<(Item, QueueOutcome), QueueError>
    where
        F: FnOnce(&Self, &Item, &QueueOutcome),
    {
        let _call = self.guard.enter()?;
        let (item, outcome) = self.core.borrow_mut().dequeue()?;
        self.debug_verify();

        on_complete(self, &item, &outcome);
        Ok((item, self.finish(outcome)))
    }

    /// Returns a copy of the oldest item without removing it.
    pub fn peek(&self) -> Result<Item, QueueError> {
        self.guard.check()?;
        self.core.borrow().ring.front().ok_or(QueueError::Empty)
    }

    /// Copy of the ledger. Available even while faulted.
    pub fn stats(&self) -> Stats {
        self.core.borrow().stats
    }

    /// Zeroes the ledger, keeping queued items.
    ///
    /// Resident items are carried into the fresh ledger as already offered,
    /// so the balance equation still holds afterwards.
    pub fn clear_stats(&mut self) -> Result<(), QueueError> {
        self.guard.check()?;
        let core = self.core.get_mut();
        core.stats = Stats::cleared(core.ring.len());
        Ok(())
    }

    /// Empties the queue and clears counters, pressure state and faults.
    /// Configuration and storage binding are kept.
    pub fn reset(&mut self) {
        let previous = self.guard.fault();
        self.core.get_mut().reset();
        self.guard.reset();
        tracing::debug!(
            capacity = self.config.capacity,
            cleared_fault = previous.map(FaultReason::name),
            "queue reset"
        );
    }

    /// Tears the queue down and hands the storage back.
    pub fn into_storage(self) -> S {
        self.core.into_inner().ring.into_slots()
    }

    pub fn len(&self) -> u32 {
        self.core.borrow().ring.len()
    }

    pub fn capacity(&self) -> u32 {
        self.config.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.core.borrow().ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.core.borrow().ring.is_full()
    }

    pub fn fill_ratio(&self) -> f64 {
        f64::from(self.len()) / f64::from(self.config.capacity)
    }

    /// Current pressure, or [`PressureState::Fault`] while faulted.
    pub fn pressure_state(&self) -> PressureState {
        if self.guard.fault().is_some() {
            return PressureState::Fault;
        }
        self.core.borrow().classifier.state()
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.config.policy
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn watermarks(&self) -> Watermarks {
        self.core.borrow().classifier.watermarks()
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.state()
    }

    pub fn fault(&self) -> Option<FaultReason> {
        self.guard.fault()
    }

    pub fn is_faulted(&self) -> bool {
        self.guard.fault().is_some()
    }

    /// Checks the structural invariants, returning the first violation.
    pub fn verify(&self) -> Result<(), &'static str> {
        self.core.borrow().verify()
    }

    fn settle(&self, result: Result<QueueOutcome, QueueError>) -> Result<QueueOutcome, QueueError> {
        if result == Err(QueueError::Overflow) {
            self.guard.trip(FaultReason::SequenceExhausted);
        }
        result
    }

    fn finish(&self, outcome: QueueOutcome) -> QueueOutcome {
        if self.guard.fault().is_some() {
            outcome.invalidated()
        } else {
            outcome
        }
    }

    fn debug_verify(&self) {
        if cfg!(debug_assertions) {
            if let Err(violation) = self.verify() {
                panic!("queue invariant violated: {violation}");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn head_tail(&self) -> (u32, u32) {
        let core = self.core.borrow();
        (core.ring.head(), core.ring.tail())
    }

    #[cfg(test)]
    pub(crate) fn set_next_sequence(&self, next: Sequence) {
        self.core.borrow_mut().next_sequence = next;
    }
}

impl<S: Storage> fmt::Debug for Queue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("state", &self.pressure_state())
            .field("guard", &self.guard.state())
            .finish_non_exhaustive()
    }
}
