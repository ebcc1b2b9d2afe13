//! Pressure classification from fill level.
//!
//! The classifier is consulted after every successful mutation. It maps the
//! resident count onto a coarse state using three watermarks, checked from
//! most to least severe, and reports the transition so the ledger can count
//! upward edges into HIGH and CRITICAL.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Coarse fill-level category reported with every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressureState {
    /// Below `low_water`.
    #[default]
    Low,
    /// At or above `low_water`.
    Normal,
    /// At or above `high_water`; producers should slow down.
    High,
    /// At or above `critical_water`; backpressure is needed now.
    Critical,
    /// The queue is sticky-faulted. Never produced by classification.
    Fault,
}

impl PressureState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
            Self::Fault => "FAULT",
        }
    }

    /// True for HIGH and CRITICAL.
    pub const fn needs_backpressure(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl Display for PressureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fill-count thresholds, `low < high < critical <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Watermarks {
    pub low: u32,
    pub high: u32,
    pub critical: u32,
}

impl Watermarks {
    pub fn new(low: u32, high: u32, critical: u32) -> Self {
        Self {
            low,
            high,
            critical,
        }
    }

    /// Derives 25% / 75% / 90% thresholds for `capacity`.
    ///
    /// For very small capacities the thresholds are pushed apart so they
    /// stay strictly ordered; whether they still fit is up to
    /// [`Watermarks::validate`].
    pub fn for_capacity(capacity: u32) -> Self {
        let percent = |p: u64| (u64::from(capacity) * p / 100) as u32;
        let low = percent(25);
        let high = percent(75).max(low.saturating_add(1));
        let critical = percent(90).max(high.saturating_add(1));
        Self::new(low, high, critical)
    }

    /// Checks the ordering constraints against `capacity`.
    pub fn validate(&self, capacity: u32) -> Result<(), ConfigError> {
        if self.low >= self.high {
            return Err(ConfigError::LowWater {
                low: self.low,
                high: self.high,
            });
        }
        if self.high > capacity {
            return Err(ConfigError::HighWater {
                high: self.high,
                capacity,
            });
        }
        if self.critical > capacity || self.critical <= self.high {
            return Err(ConfigError::CriticalWater {
                critical: self.critical,
                high: self.high,
                capacity,
            });
        }
        Ok(())
    }

    /// Maps a fill count onto a state, most severe first.
    pub fn classify(&self, count: u32) -> PressureState {
        if count >= self.critical {
            PressureState::Critical
        } else if count >= self.high {
            PressureState::High
        } else if count >= self.low {
            PressureState::Normal
        } else {
            PressureState::Low
        }
    }
}

/// A state change observed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PressureState,
    pub to: PressureState,
}

impl Transition {
    /// Upward edge into HIGH. Falling from CRITICAL to HIGH does not count.
    pub fn entered_high(&self) -> bool {
        self.to == PressureState::High
            && matches!(self.from, PressureState::Low | PressureState::Normal)
    }

    /// Edge into CRITICAL from any other state.
    pub fn entered_critical(&self) -> bool {
        self.to == PressureState::Critical && self.from != PressureState::Critical
    }

    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

pub(crate) struct Classifier {
    watermarks: Watermarks,
    state: PressureState,
}

impl Classifier {
    pub(crate) fn new(watermarks: Watermarks) -> Self {
        Self {
            watermarks,
            state: PressureState::Low,
        }
    }

    pub(crate) fn state(&self) -> PressureState {
        self.state
    }

    pub(crate) fn watermarks(&self) -> Watermarks {
        self.watermarks
    }

    /// Reclassifies for `count` and returns the transition taken.
    pub(crate) fn observe(&mut self, count: u32) -> Transition {
        let to = self.watermarks.classify(count);
        let transition = Transition {
            from: self.state,
            to,
        };
        self.state = to;
        transition
    }

    pub(crate) fn reset(&mut self) {
        self.state = PressureState::Low;
    }
}
