//! Configuration for machines and the shared clock.
//!
//! Both types deserialize with defaults for missing fields, so hosts can
//! keep them in whatever settings file they already load.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Tick rate must be a positive, finite number of frames per second (got {0})")]
    InvalidTickRate(f64),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-machine options fixed at construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// When true the machine ignores the shared clock and must be ticked
    /// through `execute_heartbeat_event` or a manual registry pass.
    pub manual_heartbeat: bool,
}

impl MachineOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Settings for [`IntervalClock`](crate::runtime::IntervalClock).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Frames per second.
    pub tick_rate_hz: f64,
}

pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

impl ClockConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidTickRate(self.tick_rate_hz))
        }
    }

    /// Time between frames.
    pub fn period(&self) -> Result<Duration, ConfigError> {
        self.validate()?;
        Ok(Duration::from_secs_f64(1.0 / self.tick_rate_hz))
    }
}
