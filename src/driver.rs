//! Driver spawns and manages the decoding task

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::clock::Clock;
use crate::pipeline::{Pipeline, PipelineStats};
use crate::provider::Provider;
use crate::types::AssembledFrame;

/// Capacity of the emitted-frame channel
pub const FRAME_CHANNEL_CAPACITY: usize = 256;

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for emitted frames, closed when the task ends
    pub frames: mpsc::Receiver<AssembledFrame>,
    /// Receiver for pipeline counters, updated after every event
    pub stats: watch::Receiver<PipelineStats>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the decoding task
///
/// The spawned task owns both the provider and the pipeline, so every event
/// is decoded sequentially no matter how many producers feed the provider.
pub struct Driver;

impl Driver {
    /// Spawn the decoding task for `provider` and `pipeline`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P, C>(provider: P, pipeline: Pipeline<C>) -> DriverChannels
    where
        P: Provider,
        C: Clock,
    {
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (stats_tx, stats_rx) = watch::channel(PipelineStats::default());
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::decode_task(provider, pipeline, frame_tx, stats_tx, cancel_task).await;
        });

        DriverChannels { frames: frame_rx, stats: stats_rx, cancel }
    }

    async fn decode_task<P, C>(
        mut provider: P,
        mut pipeline: Pipeline<C>,
        frame_tx: mpsc::Sender<AssembledFrame>,
        stats_tx: watch::Sender<PipelineStats>,
        cancel: CancellationToken,
    ) where
        P: Provider,
        C: Clock,
    {
        info!("Decode task started for {}", provider.describe());
        let mut error_count = 0u32;
        const MAX_ERRORS: u32 = 10;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Decode task cancelled");
                    break;
                }
                result = provider.next_event() => result,
            };

            match result {
                Ok(Some(event)) => {
                    error_count = 0;
                    let emitted = pipeline.decode(&event);
                    stats_tx.send_replace(pipeline.stats());

                    if let Some(frame) = emitted {
                        trace!("Emitting {}", frame.canonical_string);
                        let sent = tokio::select! {
                            _ = cancel.cancelled() => {
                                info!("Decode task cancelled while sending");
                                break;
                            }
                            sent = frame_tx.send(frame) => sent,
                        };
                        if sent.is_err() {
                            debug!("Frame receiver dropped, shutting down");
                            break;
                        }
                    }
                }
                Ok(None) => {
                    info!("Provider exhausted");
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    error!("Provider error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    if error_count >= MAX_ERRORS {
                        error!("Too many provider errors, shutting down");
                        break;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ...
                    let backoff = std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        let stats = pipeline.stats();
        info!(
            "Decode task ended: {} events, {} frames completed, {} emitted, {} suppressed",
            stats.events,
            stats.frames_completed,
            stats.emitted,
            stats.suppressed()
        );
    }
}
