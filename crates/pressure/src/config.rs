//! Queue configuration.

use serde::{Deserialize, Serialize};

use crate::MAX_CAPACITY;
use crate::classifier::Watermarks;
use crate::error::ConfigError;
use crate::policy::OverflowPolicy;

/// Default capacity used by [`QueueConfig::default`].
pub const DEFAULT_CAPACITY: u32 = 64;

/// Immutable parameters of a queue.
///
/// Constraints, checked by [`QueueConfig::validate`]:
///
/// - `0 < capacity <= MAX_CAPACITY`
/// - `low_water < high_water <= capacity`
/// - `high_water < critical_water <= capacity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub capacity: u32,
    pub policy: OverflowPolicy,
    pub low_water: u32,
    pub high_water: u32,
    pub critical_water: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: OverflowPolicy::Reject,
            low_water: 16,
            high_water: 48,
            critical_water: 58,
        }
    }
}

impl QueueConfig {
    /// Config for `capacity` with 25% / 75% / 90% watermarks and the reject
    /// policy.
    pub fn with_capacity(capacity: u32) -> Self {
        let marks = Watermarks::for_capacity(capacity);
        Self {
            capacity,
            policy: OverflowPolicy::Reject,
            low_water: marks.low,
            high_water: marks.high,
            critical_water: marks.critical,
        }
    }

    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_watermarks(mut self, low: u32, high: u32, critical: u32) -> Self {
        self.low_water = low;
        self.high_water = high;
        self.critical_water = critical;
        self
    }

    pub fn watermarks(&self) -> Watermarks {
        Watermarks::new(self.low_water, self.high_water, self.critical_water)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ConfigError::Capacity {
                capacity: self.capacity,
            });
        }
        self.watermarks().validate(self.capacity)
    }
}
