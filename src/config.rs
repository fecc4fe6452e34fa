//! Session configuration
//!
//! Supplied once at pipeline construction and immutable for the session.
//!
//! ```rust
//! use can_concat::{ConcatConfig, Mode};
//!
//! let config = ConcatConfig::from_yaml("mode: notched\nperiod_ms: 100\n").unwrap();
//! assert_eq!(config.mode, Mode::Notched);
//! assert!(ConcatConfig::from_yaml("mode: notched\n").is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::types::Mode;
use crate::{CaptureError, Result};

/// Time base used for rate-limit decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// Injected clock read when the ACK is decoded. Elapsed time depends on
    /// how fast events are fed to the pipeline.
    #[default]
    Wall,

    /// End time of the ACK field. Elapsed time follows the capture.
    Trace,
}

/// Diff treatment when the previous emission for an identifier had no bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyHistory {
    /// Treat zero-length history like no history: every byte is Unchanged
    #[default]
    Unclassified,

    /// Every byte lies beyond the previous length and is classified New
    AllNew,
}

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcatConfig {
    /// Emission mode
    #[serde(default)]
    pub mode: Mode,

    /// Minimum period between emissions per identifier, in milliseconds.
    /// Required in Notched mode, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_ms: Option<f64>,

    /// Time base for the rate limiter
    #[serde(default)]
    pub time_source: TimeSource,

    /// Diff treatment for zero-length history
    #[serde(default)]
    pub empty_history: EmptyHistory,
}

impl ConcatConfig {
    /// Normal mode: change filtering only
    pub fn normal() -> Self {
        Self::default()
    }

    /// Notched mode with the given minimum period in milliseconds
    pub fn notched(period_ms: f64) -> Self {
        Self { mode: Mode::Notched, period_ms: Some(period_ms), ..Self::default() }
    }

    /// Select the time base for rate limiting
    pub fn with_time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    /// Select the diff treatment for zero-length history
    pub fn with_empty_history(mut self, empty_history: EmptyHistory) -> Self {
        self.empty_history = empty_history;
        self
    }

    /// Check the configuration before any events are processed
    pub fn validate(&self) -> Result<()> {
        if !self.mode.is_notched() {
            return Ok(());
        }

        match self.period_ms {
            None => Err(CaptureError::invalid_configuration(
                "notched mode requires period_ms",
            )),
            Some(ms) if !ms.is_finite() => Err(CaptureError::invalid_configuration(format!(
                "period_ms must be finite, got {}",
                ms
            ))),
            Some(ms) if ms < 0.0 => Err(CaptureError::invalid_configuration(format!(
                "period_ms must be >= 0, got {}",
                ms
            ))),
            Some(ms) if Duration::try_from_secs_f64(ms / 1000.0).is_err() => {
                Err(CaptureError::invalid_configuration(format!(
                    "period_ms {} does not fit in a Duration",
                    ms
                )))
            }
            Some(_) => Ok(()),
        }
    }

    /// Minimum inter-emission period, `None` when rate limiting is off
    pub fn notch_period(&self) -> Option<Duration> {
        self.mode.notch_period(self.period_ms)
    }

    /// Parse and validate a YAML configuration document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ConcatConfig = serde_yaml_ng::from_str(yaml).map_err(|e| {
            CaptureError::parse_error("ConcatConfig deserialization", e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse and validate a YAML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CaptureError::file_error(path.to_path_buf(), e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml(&yaml)
    }
}
