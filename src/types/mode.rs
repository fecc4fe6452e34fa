//! Emission mode control for the frame pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Emission mode for assembled frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Emit every frame whose data changed
    #[default]
    Normal,

    /// Additionally enforce a minimum period between emissions per identifier
    Notched,
}

impl Mode {
    /// Check if rate limiting applies
    pub fn is_notched(self) -> bool {
        matches!(self, Mode::Notched)
    }

    /// Get the minimum inter-emission period if rate limiting applies
    ///
    /// Returns `None` in Normal mode, or when the period is missing, negative
    /// or not finite (those are rejected by configuration validation). Periods
    /// too long for a `Duration` saturate to [`Duration::MAX`].
    pub fn notch_period(self, period_ms: Option<f64>) -> Option<Duration> {
        match self {
            Mode::Normal => None,
            Mode::Notched => period_ms
                .filter(|ms| ms.is_finite() && *ms >= 0.0)
                .map(|ms| Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)),
        }
    }
}
