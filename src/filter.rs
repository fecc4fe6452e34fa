//! Suppression stages between assembly and rendering
//!
//! Both filters only read the [`IdentityStore`]. The pipeline writes the
//! store once a frame has passed both of them.

use std::time::Duration;

use crate::identity::IdentityStore;

/// Result of comparing a candidate against the last emitted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDecision<'a> {
    /// Data is byte-identical to the last emission for this identifier
    Unchanged,
    /// Data differs, or the identifier has no history
    Changed {
        /// Last emitted data, for diff classification
        previous: Option<&'a [u8]>,
    },
}

/// Suppresses frames whose data did not change since the last emission
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeFilter;

impl ChangeFilter {
    /// Compare `data` against the history for `id`
    pub fn check<'a>(&self, store: &'a IdentityStore, id: u32, data: &[u8]) -> ChangeDecision<'a> {
        match store.last_data(id) {
            Some(previous) if previous == data => ChangeDecision::Unchanged,
            previous => ChangeDecision::Changed { previous },
        }
    }
}

/// Result of the rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Emission allowed
    Passed,
    /// Too soon after the last emission for this identifier
    TooSoon {
        /// Time since the last emission
        elapsed: Duration,
    },
}

/// Enforces a minimum period between emissions per identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimiter {
    period: Option<Duration>,
}

impl RateLimiter {
    /// Limiter enforcing `period`, or passing everything when `None`
    pub fn new(period: Option<Duration>) -> Self {
        Self { period }
    }

    /// Limiter that passes everything
    pub fn disabled() -> Self {
        Self { period: None }
    }

    /// Whether a period is enforced
    pub fn is_enabled(&self) -> bool {
        self.period.is_some()
    }

    /// Configured minimum period
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Check whether `id` may emit at session offset `now`
    ///
    /// The first emission of an identifier always passes. Elapsed time
    /// saturates at zero if `now` precedes the recorded emission.
    pub fn check(&self, store: &IdentityStore, id: u32, now: Duration) -> RateDecision {
        let Some(period) = self.period else {
            return RateDecision::Passed;
        };

        match store.last_emit_time(id) {
            Some(last) => {
                let elapsed = now.saturating_sub(last);
                if elapsed < period {
                    RateDecision::TooSoon { elapsed }
                } else {
                    RateDecision::Passed
                }
            }
            None => RateDecision::Passed,
        }
    }
}
