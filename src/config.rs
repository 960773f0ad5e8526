//! Platform configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a valid
//! configuration. Durations are given in milliseconds.
//!
//! ```json
//! {
//!   "success_rate": 0.8,
//!   "prep_time_ms": 50,
//!   "prep_timeout_ms": 5000,
//!   "sink_timeout_ms": 2000,
//!   "max_orders": 10000,
//!   "journal_path": "./data/orders.jsonl",
//!   "journal_buffer": 32
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Probability that the simulated kitchen prepares an order.
    pub success_rate: f64,
    /// Simulated preparation time.
    pub prep_time_ms: u64,
    /// Upper bound on a preparation attempt; exceeding it cancels the order.
    pub prep_timeout_ms: u64,
    /// Upper bound on a single sink save.
    pub sink_timeout_ms: u64,
    /// Registry capacity. `None` means unbounded.
    pub max_orders: Option<usize>,
    /// Journal file for completed orders. `None` keeps records in memory.
    pub journal_path: Option<PathBuf>,
    /// Pending appends the journal writer may queue.
    pub journal_buffer: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            success_rate: 0.8,
            prep_time_ms: 0,
            prep_timeout_ms: 5_000,
            sink_timeout_ms: 2_000,
            max_orders: None,
            journal_path: None,
            journal_buffer: 32,
        }
    }
}

impl PlatformConfig {
    /// Loads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(ConfigError::Invalid(format!(
                "success_rate must be within [0, 1], got {}",
                self.success_rate
            )));
        }
        if self.prep_timeout_ms == 0 {
            return Err(ConfigError::Invalid("prep_timeout_ms must be positive".into()));
        }
        if self.prep_time_ms >= self.prep_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "prep_time_ms ({}) must be below prep_timeout_ms ({}), otherwise every order is cancelled",
                self.prep_time_ms, self.prep_timeout_ms
            )));
        }
        if self.sink_timeout_ms == 0 {
            return Err(ConfigError::Invalid("sink_timeout_ms must be positive".into()));
        }
        if self.max_orders == Some(0) {
            return Err(ConfigError::Invalid("max_orders must be positive".into()));
        }
        if self.journal_buffer == 0 {
            return Err(ConfigError::Invalid("journal_buffer must be positive".into()));
        }
        Ok(())
    }

    pub fn prep_time(&self) -> Duration {
        Duration::from_millis(self.prep_time_ms)
    }

    pub fn prep_timeout(&self) -> Duration {
        Duration::from_millis(self.prep_timeout_ms)
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }
}
