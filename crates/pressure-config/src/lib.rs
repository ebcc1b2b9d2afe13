//! Configuration management for pressure queues
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (PRESSURE_* prefix, `__` between levels)
//! 2. pressure.local.toml (gitignored, local overrides)
//! 3. pressure.toml (git-tracked, project config)
//! 4. ~/.config/pressure/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [queue]
//! capacity = 256
//! policy = "drop-oldest"
//! low_water = 64
//! high_water = 192
//! critical_water = 230
//!
//! [queues.telemetry]
//! capacity = 32
//! policy = "drop-newest"
//! low_water = 8
//! high_water = 24
//! critical_water = 28
//! ```

use anyhow::Result;
use pressure::QueueConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Name reported for the unnamed `[queue]` section.
pub const DEFAULT_QUEUE: &str = "default";

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureSettings {
    /// Used by any queue without its own section.
    pub queue: QueueConfig,
    /// Per-queue overrides, keyed by queue name.
    pub queues: BTreeMap<String, QueueConfig>,
}

impl PressureSettings {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Parse a single TOML file, without layering.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Config for the queue called `name`, falling back to `[queue]`.
    pub fn queue_config(&self, name: &str) -> QueueConfig {
        self.queues.get(name).copied().unwrap_or(self.queue)
    }

    /// Validate every queue section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = self.queues.iter().map(|(name, cfg)| (name.as_str(), cfg));
        for (name, cfg) in std::iter::once((DEFAULT_QUEUE, &self.queue)).chain(named) {
            cfg.validate().map_err(|source| ConfigError::InvalidQueue {
                queue: name.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
