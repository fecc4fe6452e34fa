//! Replay provider for capture files

use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, info, trace};

use crate::capture::Capture;
use crate::provider::Provider;
use crate::types::{FieldEvent, TraceTime};
use crate::{CaptureError, Result};

/// Replay provider that yields events from a recorded capture
pub struct ReplayProvider {
    /// Remaining events in trace order
    events: VecDeque<FieldEvent>,

    /// Number of events in the capture
    total: usize,

    /// Playback speed multiplier when paced (1.0 = trace speed)
    speed: Option<f64>,

    /// Start time of the previously yielded event
    last_time: Option<TraceTime>,

    /// Where the events came from
    source: String,
}

impl ReplayProvider {
    /// Create a provider from a capture file, yielding events without pacing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let events = Capture::load(path)?.into_events()?;
        info!("Opened capture {}: {} events", path.display(), events.len());
        Ok(Self::with_source(events, path.display().to_string()))
    }

    /// Create a provider from events already in memory
    pub fn from_events(events: Vec<FieldEvent>) -> Self {
        Self::with_source(events, "memory".to_string())
    }

    fn with_source(events: Vec<FieldEvent>, source: String) -> Self {
        let total = events.len();
        Self { events: events.into(), total, speed: None, last_time: None, source }
    }

    /// Pace playback by trace time, scaled by `speed`
    ///
    /// Between two events the provider sleeps for the trace-time gap divided
    /// by `speed`, so a wall-clock rate limiter sees the capture's spacing.
    pub fn paced(mut self, speed: f64) -> Self {
        self.set_speed(speed);
        self
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f64) {
        let speed = speed.clamp(0.1, 10.0);
        self.speed = Some(speed);
        debug!("Playback speed set to {}x", speed);
    }

    /// Number of events not yet yielded
    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// Number of events in the capture
    pub fn total(&self) -> usize {
        self.total
    }

    /// Trace duration covered by the remaining events
    pub fn remaining_duration(&self) -> std::time::Duration {
        match (self.events.front(), self.events.back()) {
            (Some(first), Some(last)) => last.end_time.saturating_since(first.start_time),
            _ => std::time::Duration::ZERO,
        }
    }

    /// Skip forward to the first event starting at or after `time`
    pub fn seek(&mut self, time: TraceTime) -> Result<()> {
        let last_end = self.events.back().map(|event| event.end_time);
        match last_end {
            Some(end) if time <= end => {
                while self.events.front().is_some_and(|event| event.start_time < time) {
                    self.events.pop_front();
                }
                self.last_time = None;
                debug!("Seeked to {}", time);
                Ok(())
            }
            _ => Err(CaptureError::parse_error(
                "Replay seek",
                format!("{} is beyond the end of the capture", time),
            )),
        }
    }
}

#[async_trait::async_trait]
impl Provider for ReplayProvider {
    async fn next_event(&mut self) -> Result<Option<FieldEvent>> {
        let Some(event) = self.events.pop_front() else {
            debug!("Reached end of replay");
            return Ok(None);
        };

        if let (Some(speed), Some(last)) = (self.speed, self.last_time) {
            let gap = event.start_time.saturating_since(last).div_f64(speed);
            if !gap.is_zero() {
                tokio::time::sleep(gap).await;
            }
        }
        self.last_time = Some(event.start_time);

        trace!(
            "Event {}/{}: {} at {}",
            self.total - self.events.len(),
            self.total,
            event.kind(),
            event.start_time
        );

        Ok(Some(event))
    }

    fn describe(&self) -> String {
        format!("replay of {} ({} events)", self.source, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, frame_events_at};
    use std::time::Duration;

    #[tokio::test]
    async fn yields_events_in_order_then_none() {
        let events = frame_events_at(0x10, &[1, 2], TraceTime::ZERO);
        let mut provider = ReplayProvider::from_events(events.clone());

        for expected in &events {
            let event = provider.next_event().await.expect("no error").expect("event");
            assert_eq!(&event, expected);
        }
        assert!(provider.next_event().await.expect("no error").is_none());
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn paced_replay_sleeps_trace_gaps() {
        let mut events = frame_events_at(0x10, &[1], TraceTime::ZERO);
        events.extend(frame_events_at(0x10, &[2], TraceTime::from_millis(500.0)));
        let mut provider = ReplayProvider::from_events(events).paced(1.0);

        let start = tokio::time::Instant::now();
        while provider.next_event().await.expect("no error").is_some() {}
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(500), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "elapsed {elapsed:?}");
    }

    #[test]
    fn seek_skips_earlier_events() {
        let mut events = frame_events_at(0x1, &[1], TraceTime::ZERO);
        let later = frame_events_at(0x2, &[2], TraceTime::from_secs(1.0));
        events.extend(later.clone());
        let mut provider = ReplayProvider::from_events(events);

        provider.seek(TraceTime::from_secs(1.0)).expect("seek inside capture");
        assert_eq!(provider.remaining(), later.len());
        assert!(provider.seek(TraceTime::from_secs(10.0)).is_err());
    }

    #[tokio::test]
    async fn opens_fixture_capture() {
        let path = test_utils::require_fixture("dashboard_burst.yaml").expect("fixture present");
        let mut provider = ReplayProvider::open(&path).expect("valid capture");
        assert!(provider.total() > 0);
        assert!(provider.describe().contains("dashboard_burst.yaml"));
        assert!(provider.next_event().await.expect("no error").is_some());
    }
}
