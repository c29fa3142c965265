//! Configuration model for the QoE measurement task.
//!
//! All sections are optional in the TOML source; missing values fall back to
//! the defaults the measurement has always used (a 300 second budget checked
//! once per second).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock budget for one measurement run, in seconds.
pub const DEFAULT_DEADLINE_SECS: u64 = 300;

/// Default poll interval of the completion check, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QoeConfig {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub probe: Option<ProbeConfig>,
}

impl QoeConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: QoeConfig = toml::from_str(content)?;
        config.coordinator.validate()?;
        Ok(config)
    }
}

/// Timing parameters of the measurement wait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Absolute budget measured from the probe start.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Granularity at which completion and the deadline are checked.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            deadline_secs: DEFAULT_DEADLINE_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl CoordinatorConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Rejects settings that would make the poll loop spin or never wait.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(crate::QoeError::config(
                "coordinator.poll_interval_secs must be greater than zero",
            ));
        }
        if self.deadline_secs < self.poll_interval_secs {
            return Err(crate::QoeError::config(format!(
                "coordinator.deadline_secs ({}) must not be shorter than poll_interval_secs ({})",
                self.deadline_secs, self.poll_interval_secs
            )));
        }
        Ok(())
    }
}

/// The external playback probe executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}
