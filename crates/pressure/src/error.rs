//! Error types for queue construction and queue operations.
//!
//! Two families exist. [`ConfigError`] is raised once, at construction, and
//! is only cured by building a new queue. [`QueueError`] is raised by the
//! steady-state operations: `Full` and `Empty` are ordinary control flow,
//! `Reentry`, `Fault` and `Overflow` mean the queue is (or just became)
//! sticky-faulted and needs [`Queue::reset`](crate::Queue::reset).

use std::fmt::{self, Display};

use thiserror::Error;

use crate::MAX_CAPACITY;

/// Why a queue entered the faulted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultReason {
    /// An operation started while another operation on the same queue was
    /// still in progress.
    Reentrancy,
    /// The sequence counter ran out of values.
    SequenceExhausted,
}

impl FaultReason {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reentrancy => "reentrancy",
            Self::SequenceExhausted => "sequence exhausted",
        }
    }
}

impl Display for FaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric error taxonomy, stable across releases.
///
/// Useful when results cross a boundary that only carries integers (status
/// words, FFI, log aggregation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    Null,
    Config,
    Full,
    Empty,
    Fault,
    Reentry,
    Overflow,
}

impl ErrorCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Null => -1,
            Self::Config => -2,
            Self::Full => -3,
            Self::Empty => -4,
            Self::Fault => -5,
            Self::Reentry => -6,
            Self::Overflow => -7,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Null => "ERR_NULL",
            Self::Config => "ERR_CONFIG",
            Self::Full => "ERR_FULL",
            Self::Empty => "ERR_EMPTY",
            Self::Fault => "ERR_FAULT",
            Self::Reentry => "ERR_REENTRY",
            Self::Overflow => "ERR_OVERFLOW",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A queue configuration was rejected.
///
/// Validation happens before anything is mutated, so a failed construction
/// leaves the caller's storage untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No storage slots were supplied.
    #[error("storage buffer is missing (zero slots supplied)")]
    MissingStorage,

    /// Capacity outside `(0, MAX_CAPACITY]`.
    #[error("capacity {capacity} must be in 1..={max}", max = MAX_CAPACITY)]
    Capacity { capacity: u32 },

    /// Storage length disagrees with the configured capacity.
    #[error("storage holds {len} slots but capacity is {capacity}")]
    StorageLength { len: usize, capacity: u32 },

    /// Raw policy discriminant does not name a known policy.
    #[error("unknown overflow policy {0}")]
    UnknownPolicy(u8),

    /// `low_water` must be strictly below `high_water`.
    #[error("low_water {low} must be below high_water {high}")]
    LowWater { low: u32, high: u32 },

    /// `high_water` must not exceed capacity.
    #[error("high_water {high} exceeds capacity {capacity}")]
    HighWater { high: u32, capacity: u32 },

    /// `critical_water` must be above `high_water` and at most capacity.
    #[error("critical_water {critical} must be in {high}<..={capacity}")]
    CriticalWater {
        critical: u32,
        high: u32,
        capacity: u32,
    },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingStorage => ErrorCode::Null,
            _ => ErrorCode::Config,
        }
    }
}

/// A queue operation could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Queue full under the reject policy. The item was counted as rejected.
    #[error("queue is full")]
    Full,

    /// Nothing to dequeue or peek.
    #[error("queue is empty")]
    Empty,

    /// This call re-entered a queue that was already mid-operation. The
    /// queue is now faulted.
    #[error("reentrant call detected")]
    Reentry,

    /// The queue was already faulted; the call did no work.
    #[error("queue is faulted ({0}); reset required")]
    Fault(FaultReason),

    /// The sequence counter is exhausted. The queue is now faulted.
    #[error("sequence counter overflow")]
    Overflow,
}

impl QueueError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Full => ErrorCode::Full,
            Self::Empty => ErrorCode::Empty,
            Self::Reentry => ErrorCode::Reentry,
            Self::Fault(_) => ErrorCode::Fault,
            Self::Overflow => ErrorCode::Overflow,
        }
    }

    /// Returns true for the steady-state signals (`Full`, `Empty`) that
    /// callers are expected to branch on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Full | Self::Empty)
    }

    /// Returns true if the queue is faulted after this error.
    pub fn is_fault(&self) -> bool {
        !self.is_recoverable()
    }
}
