//! Outcome accounting.
//!
//! Every item offered to a healthy queue is counted in `enqueued` and ends
//! up in exactly one disposition: dequeued, still resident, evicted
//! (`dropped_oldest`), discarded (`dropped_newest`) or `rejected`. The
//! balance equation
//!
//! ```text
//! enqueued == dequeued + resident + dropped_oldest + dropped_newest + rejected
//! ```
//!
//! holds after every completed operation.

use serde::{Deserialize, Serialize};

use crate::classifier::Transition;

/// Running counters for one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Items offered to `enqueue`, whatever became of them.
    pub enqueued: u64,
    pub dequeued: u64,
    pub rejected: u64,
    pub dropped_oldest: u64,
    pub dropped_newest: u64,
    /// Highest resident count observed.
    pub peak_fill: u32,
    /// Upward crossings into HIGH.
    pub high_water_events: u32,
    /// Crossings into CRITICAL.
    pub critical_events: u32,
}

/// Final disposition of one ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    /// Arrived and was written to the ring.
    Stored,
    /// Arrived and was written after evicting the oldest resident.
    StoredWithEviction,
    /// Arrived at a full queue and was refused.
    Rejected,
    /// Arrived at a full queue and was discarded.
    DroppedNewest,
    /// Left the ring through `dequeue`.
    Dequeued,
}

impl Stats {
    /// Sum of every disposition given `resident` items still queued.
    pub fn accounted(&self, resident: u32) -> u64 {
        self.dequeued
            + u64::from(resident)
            + self.dropped_oldest
            + self.dropped_newest
            + self.rejected
    }

    /// True when every offered item is accounted for.
    pub fn is_balanced(&self, resident: u32) -> bool {
        self.enqueued == self.accounted(resident)
    }

    /// Items that were offered but never reached a consumer.
    pub fn lost(&self) -> u64 {
        self.dropped_oldest + self.dropped_newest + self.rejected
    }

    pub(crate) fn record(&mut self, entry: Entry) {
        match entry {
            Entry::Stored => self.enqueued += 1,
            Entry::StoredWithEviction => {
                self.enqueued += 1;
                self.dropped_oldest += 1;
            }
            Entry::Rejected => {
                self.enqueued += 1;
                self.rejected += 1;
            }
            Entry::DroppedNewest => {
                self.enqueued += 1;
                self.dropped_newest += 1;
            }
            Entry::Dequeued => self.dequeued += 1,
        }
    }

    /// Folds in the post-mutation fill level and pressure transition.
    pub(crate) fn observe(&mut self, fill: u32, transition: Transition) {
        self.peak_fill = self.peak_fill.max(fill);
        if transition.entered_high() {
            self.high_water_events = self.high_water_events.saturating_add(1);
        }
        if transition.entered_critical() {
            self.critical_events = self.critical_events.saturating_add(1);
        }
    }

    /// Zeroes the counters while `resident` items remain queued.
    ///
    /// Items still resident are carried forward as already offered so the
    /// balance equation keeps holding across the clear.
    pub(crate) fn cleared(resident: u32) -> Self {
        Self {
            enqueued: u64::from(resident),
            peak_fill: resident,
            ..Self::default()
        }
    }
}
