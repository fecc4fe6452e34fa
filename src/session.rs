//! Capture sessions: a running driver task plus its output handles

use futures::StreamExt;
use std::path::Path;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::{ReceiverStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::driver::Driver;
use crate::pipeline::{Pipeline, PipelineStats};
use crate::provider::Provider;
use crate::providers::{ChannelProvider, ReplayProvider};
use crate::types::{AssembledFrame, FieldEvent};
use crate::{CaptureError, ConcatConfig, Result};

/// One capture session from first event to exhaustion or cancellation
///
/// Dropping the session cancels the decoding task.
pub struct CaptureSession {
    /// Emitted frames, taken by [`CaptureSession::frames`]
    frames: Option<mpsc::Receiver<AssembledFrame>>,

    /// Pipeline counters
    stats: watch::Receiver<PipelineStats>,

    /// Cancellation token for stopping the task
    cancel: CancellationToken,
}

impl CaptureSession {
    /// Start decoding events from `provider` through `pipeline`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<P, C>(provider: P, pipeline: Pipeline<C>) -> Self
    where
        P: Provider,
        C: Clock,
    {
        info!("Starting capture session: {}", provider.describe());
        let channels = Driver::spawn(provider, pipeline);
        Self { frames: Some(channels.frames), stats: channels.stats, cancel: channels.cancel }
    }

    /// Replay a capture file with the given configuration
    pub async fn replay<P: AsRef<Path>>(path: P, config: ConcatConfig) -> Result<Self> {
        let pipeline = Pipeline::new(config)?;
        let provider = ReplayProvider::open(path)?;
        Ok(Self::start(provider, pipeline))
    }

    /// Decode events pushed through `receiver` by a live decoder
    pub async fn attach(receiver: mpsc::Receiver<FieldEvent>, config: ConcatConfig) -> Result<Self> {
        let pipeline = Pipeline::new(config)?;
        Ok(Self::start(ChannelProvider::new(receiver), pipeline))
    }

    /// Take the stream of emitted frames
    ///
    /// The stream ends when the provider is exhausted or the session is
    /// cancelled. It can be taken only once.
    pub fn frames(&mut self) -> Result<ReceiverStream<AssembledFrame>> {
        self.frames
            .take()
            .map(ReceiverStream::new)
            .ok_or_else(|| CaptureError::channel_closed("frame stream already taken"))
    }

    /// Drain every remaining frame, then return them with the final counters
    pub async fn collect(mut self) -> Result<(Vec<AssembledFrame>, PipelineStats)> {
        let frames: Vec<AssembledFrame> = self.frames()?.collect().await;
        let stats = self.stats();
        debug!("Session drained: {} frames", frames.len());
        Ok((frames, stats))
    }

    /// Current pipeline counters
    pub fn stats(&self) -> PipelineStats {
        *self.stats.borrow()
    }

    /// Stream of counter updates, starting with the current value
    pub fn stats_updates(&self) -> WatchStream<PipelineStats> {
        WatchStream::new(self.stats.clone())
    }

    /// Stop the decoding task
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the session was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        debug!("Dropping capture session");
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::frame_events_at;
    use crate::types::TraceTime;

    #[tokio::test]
    async fn frames_can_be_taken_once() {
        let pipeline = Pipeline::new(ConcatConfig::normal()).expect("valid config");
        let provider = ReplayProvider::from_events(Vec::new());
        let mut session = CaptureSession::start(provider, pipeline);

        assert!(session.frames().is_ok());
        assert!(matches!(session.frames(), Err(CaptureError::ChannelClosed { .. })));
    }

    #[tokio::test]
    async fn attach_decodes_live_events() {
        let (tx, rx) = mpsc::channel(64);
        let session = CaptureSession::attach(rx, ConcatConfig::normal()).await.expect("valid config");

        for event in frame_events_at(0x7FF, &[0xFF], TraceTime::ZERO) {
            tx.send(event).await.expect("session alive");
        }
        drop(tx);

        let (frames, stats) = session.collect().await.expect("frames available");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].canonical_string, "7FF#FF");
        assert_eq!(stats.events, 4);
    }

    #[tokio::test]
    async fn attach_rejects_invalid_configuration() {
        let (_tx, rx) = mpsc::channel(1);
        let config = ConcatConfig { mode: crate::Mode::Notched, ..ConcatConfig::default() };
        assert!(matches!(
            CaptureSession::attach(rx, config).await,
            Err(CaptureError::InvalidConfiguration { .. })
        ));
    }
}
