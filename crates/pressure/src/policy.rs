//! Overflow policy and its resolution against a full ring.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::item::{Item, Storage};
use crate::ring::Ring;

/// What to do when an item arrives at a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Refuse the new item and report `Full` to the producer.
    #[default]
    Reject,
    /// Evict the oldest resident item to make room. Never refuses.
    DropOldest,
    /// Discard the new item but report success with `was_dropped` set.
    DropNewest,
}

impl OverflowPolicy {
    pub const ALL: [OverflowPolicy; 3] = [Self::Reject, Self::DropOldest, Self::DropNewest];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Reject => "REJECT",
            Self::DropOldest => "DROP_OLDEST",
            Self::DropNewest => "DROP_NEWEST",
        }
    }

    /// Applies the policy to a ring that is at capacity.
    ///
    /// Only `DropOldest` touches the ring, and only to evict its head. The
    /// caller performs the write (if any) and the accounting.
    pub(crate) fn resolve<S: Storage>(self, ring: &mut Ring<S>) -> Resolution {
        debug_assert!(ring.is_full(), "overflow resolved on a ring with room");

        match self {
            Self::Reject => Resolution::Refuse,
            Self::DropOldest => match ring.pop_front() {
                Some(evicted) => Resolution::Evicted(evicted),
                // Unreachable while the ring is full; treat as plain room.
                None => Resolution::Evicted(Item::EMPTY),
            },
            Self::DropNewest => Resolution::Discard,
        }
    }
}

impl Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for OverflowPolicy {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Reject),
            1 => Ok(Self::DropOldest),
            2 => Ok(Self::DropNewest),
            other => Err(ConfigError::UnknownPolicy(other)),
        }
    }
}

impl From<OverflowPolicy> for u8 {
    fn from(policy: OverflowPolicy) -> Self {
        match policy {
            OverflowPolicy::Reject => 0,
            OverflowPolicy::DropOldest => 1,
            OverflowPolicy::DropNewest => 2,
        }
    }
}

/// Decision taken for an item arriving at a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Do not store; fail the call with `Full`.
    Refuse,
    /// The head was evicted; proceed with the normal write.
    Evicted(Item),
    /// Do not store; succeed with `was_dropped`.
    Discard,
}
