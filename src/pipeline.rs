//! Per-event orchestration: assemble, filter, render, record
//!
//! One field event in, zero or one [`AssembledFrame`] out. The pipeline owns
//! all cross-event state for one capture session and is not shared between
//! threads; concurrent producers go through the [`Driver`](crate::driver::Driver).

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::assembler::{FrameAssembler, Step};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConcatConfig, TimeSource};
use crate::filter::{ChangeDecision, ChangeFilter, RateDecision, RateLimiter};
use crate::identity::IdentityStore;
use crate::render::FrameRenderer;
use crate::sink::FrameSink;
use crate::types::{AssembledFrame, FieldEvent, TraceTime};
use crate::Result;

/// Counters describing what the pipeline did with its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Field events decoded
    pub events: u64,
    /// Frames terminated by an ACK
    pub frames_completed: u64,
    /// Frames emitted
    pub emitted: u64,
    /// Frames dropped because their data matched the last emission
    pub suppressed_unchanged: u64,
    /// Frames dropped by the rate limiter
    pub suppressed_rate: u64,
    /// Frames discarded because a new identifier arrived before their ACK
    pub abandoned: u64,
    /// Data, CRC or ACK fields ignored because no frame was in flight
    pub out_of_order: u64,
}

impl PipelineStats {
    /// Frames completed but not emitted
    pub fn suppressed(&self) -> u64 {
        self.suppressed_unchanged + self.suppressed_rate
    }
}

/// Reassembly, deduplication and rate-limiting pipeline for one session
pub struct Pipeline<C: Clock = SystemClock> {
    config: ConcatConfig,
    assembler: FrameAssembler,
    store: IdentityStore,
    change_filter: ChangeFilter,
    rate_limiter: RateLimiter,
    renderer: FrameRenderer,
    clock: C,
    origin: Instant,
    sink: Option<Box<dyn FrameSink>>,
    stats: PipelineStats,
}

impl Pipeline<SystemClock> {
    /// Create a pipeline using the system clock
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if Notched mode lacks a usable period.
    pub fn new(config: ConcatConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Pipeline<C> {
    /// Create a pipeline reading time from `clock`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if Notched mode lacks a usable period.
    pub fn with_clock(config: ConcatConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let rate_limiter = RateLimiter::new(config.notch_period());
        let renderer = FrameRenderer::new(config.empty_history);
        let origin = clock.now();

        info!(
            "Pipeline created: mode={:?}, period={:?}, time_source={:?}",
            config.mode,
            rate_limiter.period(),
            config.time_source
        );

        Ok(Self {
            config,
            assembler: FrameAssembler::new(),
            store: IdentityStore::new(),
            change_filter: ChangeFilter,
            rate_limiter,
            renderer,
            clock,
            origin,
            sink: None,
            stats: PipelineStats::default(),
        })
    }

    /// Attach a presentation sink that sees every emitted frame
    pub fn with_sink(mut self, sink: impl FrameSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Replace or remove the presentation sink
    pub fn set_sink(&mut self, sink: Option<Box<dyn FrameSink>>) {
        self.sink = sink;
    }

    /// Decode one field event
    ///
    /// Returns the assembled frame when an ACK completes a frame that passes
    /// change filtering and rate limiting, `None` otherwise. Never fails.
    pub fn decode(&mut self, event: &FieldEvent) -> Option<AssembledFrame> {
        self.stats.events += 1;
        trace!("Event {}: {} at {}", self.stats.events, event.kind(), event.start_time);

        let candidate = match self.assembler.push(event) {
            Step::Complete(candidate) => candidate,
            Step::Abandoned { .. } => {
                self.stats.abandoned += 1;
                return None;
            }
            Step::OutOfOrder(_) => {
                self.stats.out_of_order += 1;
                return None;
            }
            Step::Idle | Step::Accumulating => return None,
        };
        self.stats.frames_completed += 1;

        let previous = match self.change_filter.check(&self.store, candidate.id, &candidate.data) {
            ChangeDecision::Unchanged => {
                self.stats.suppressed_unchanged += 1;
                trace!("Frame {:03X} unchanged, suppressed", candidate.id);
                return None;
            }
            ChangeDecision::Changed { previous } => previous,
        };

        let emitted_at = if self.rate_limiter.is_enabled() {
            let now = self.session_offset(candidate.end_time);
            if let RateDecision::TooSoon { elapsed } =
                self.rate_limiter.check(&self.store, candidate.id, now)
            {
                self.stats.suppressed_rate += 1;
                debug!("Frame {:03X} rate limited, {:?} since last emission", candidate.id, elapsed);
                return None;
            }
            Some(now)
        } else {
            None
        };

        let frame = self.renderer.render(candidate, previous);
        self.store.record_emission(frame.id, frame.data.clone(), emitted_at);
        self.stats.emitted += 1;

        if let Some(sink) = self.sink.as_mut() {
            sink.present(&frame);
        }

        Some(frame)
    }

    /// Decode a batch of events, collecting every emitted frame
    pub fn decode_all<'a, I>(&mut self, events: I) -> Vec<AssembledFrame>
    where
        I: IntoIterator<Item = &'a FieldEvent>,
    {
        events.into_iter().filter_map(|event| self.decode(event)).collect()
    }

    fn session_offset(&self, ack_end: TraceTime) -> Duration {
        match self.config.time_source {
            TimeSource::Wall => self.clock.now().saturating_duration_since(self.origin),
            TimeSource::Trace => ack_end.as_duration(),
        }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Emission history
    pub fn identities(&self) -> &IdentityStore {
        &self.store
    }

    /// Session configuration
    pub fn config(&self) -> &ConcatConfig {
        &self.config
    }

    /// Whether a frame is currently being assembled
    pub fn is_collecting(&self) -> bool {
        self.assembler.is_collecting()
    }
}

impl<C: Clock> std::fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("assembler", &self.assembler)
            .field("identities", &self.store.len())
            .field("has_sink", &self.sink.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}
