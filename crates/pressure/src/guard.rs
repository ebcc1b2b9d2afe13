//! Reentrancy detection and the sticky fault state.
//!
//! This guard is single-threaded only. It catches one call stack re-entering
//! the same queue (for example from a completion callback), not concurrent
//! callers on different threads. `Queue` is `!Sync` because of the `Cell`s
//! below; sharing one across threads requires an external lock such as a
//! `Mutex` around the whole queue.

use std::cell::Cell;

use crate::error::{FaultReason, QueueError};

/// Whether a queue accepts operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GuardState {
    #[default]
    Clear,
    /// Every operation fails until an explicit reset.
    Faulted(FaultReason),
}

#[derive(Debug, Default)]
pub(crate) struct Guard {
    in_progress: Cell<bool>,
    state: Cell<GuardState>,
}

impl Guard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> GuardState {
        self.state.get()
    }

    pub(crate) fn fault(&self) -> Option<FaultReason> {
        match self.state.get() {
            GuardState::Clear => None,
            GuardState::Faulted(reason) => Some(reason),
        }
    }

    /// Starts a mutating call.
    ///
    /// A call already in progress faults the queue and fails with `Reentry`.
    /// An existing fault fails with `Fault`. Otherwise the in-progress marker
    /// is set until the returned token drops, on every exit path.
    pub(crate) fn enter(&self) -> Result<CallToken<'_>, QueueError> {
        if self.in_progress.get() {
            self.trip(FaultReason::Reentrancy);
            return Err(QueueError::Reentry);
        }
        self.check()?;

        self.in_progress.set(true);
        Ok(CallToken { guard: self })
    }

    /// Fails with `Fault` if the queue is faulted. Does not mark a call.
    pub(crate) fn check(&self) -> Result<(), QueueError> {
        match self.state.get() {
            GuardState::Clear => Ok(()),
            GuardState::Faulted(reason) => Err(QueueError::Fault(reason)),
        }
    }

    /// Faults the queue. The first reason sticks.
    pub(crate) fn trip(&self, reason: FaultReason) {
        if self.state.get() == GuardState::Clear {
            tracing::warn!(%reason, "queue faulted; reset required");
            self.state.set(GuardState::Faulted(reason));
        }
    }

    pub(crate) fn reset(&mut self) {
        self.in_progress.set(false);
        self.state.set(GuardState::Clear);
    }
}

/// Marks a call in progress for as long as it lives.
pub(crate) struct CallToken<'a> {
    guard: &'a Guard,
}

impl Drop for CallToken<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clears_marker_on_drop() {
        let guard = Guard::new();
        {
            let _token = guard.enter().expect("clear guard admits a call");
            assert!(guard.in_progress.get());
        }
        assert!(!guard.in_progress.get());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn nested_enter_faults() {
        let guard = Guard::new();
        let _outer = guard.enter().expect("first call admitted");

        assert_eq!(guard.enter().err(), Some(QueueError::Reentry));
        assert_eq!(guard.state(), GuardState::Faulted(FaultReason::Reentrancy));
    }

    #[test]
    fn fault_is_sticky_until_reset() {
        let mut guard = Guard::new();
        guard.trip(FaultReason::SequenceExhausted);
        guard.trip(FaultReason::Reentrancy);

        assert_eq!(
            guard.enter().err(),
            Some(QueueError::Fault(FaultReason::SequenceExhausted))
        );
        assert_eq!(
            guard.check(),
            Err(QueueError::Fault(FaultReason::SequenceExhausted))
        );

        guard.reset();
        assert_eq!(guard.state(), GuardState::Clear);
        assert!(guard.enter().is_ok());
    }
}
