//! Reassembly of CAN frames from field-level decoder events.
//!
//! Bus-trace decoders report a CAN frame as a sequence of separate fields:
//! identifier, data bytes, CRC, ACK. This crate stitches those fields back
//! into whole frames, drops frames whose data has not changed since the last
//! emission for the same identifier, optionally rate-limits emission per
//! identifier, and renders each surviving frame as a canonical string with a
//! per-byte change classification.
//!
//! # Features
//!
//! - **Frame assembly**: two-state machine tolerant of truncated or
//!   out-of-order input
//! - **Change filtering**: only frames whose data differs are emitted
//! - **Notched mode**: minimum period between emissions per identifier,
//!   measured on an injectable clock or on trace time
//! - **Byte diffs**: every emitted byte is classified unchanged, changed or new
//! - **Sessions**: replay YAML captures or attach to a live decoder channel
//!
//! ## Example (synchronous)
//!
//! ```rust
//! use can_concat::{ConcatConfig, FieldEvent, Pipeline, TraceTime};
//!
//! let mut pipeline = Pipeline::new(ConcatConfig::normal()).unwrap();
//! let t = |us: f64| TraceTime::from_secs(us / 1_000_000.0);
//!
//! assert!(pipeline.decode(&FieldEvent::identifier(0x123, t(0.0), t(20.0))).is_none());
//! assert!(pipeline.decode(&FieldEvent::data(vec![0x01], t(20.0), t(40.0))).is_none());
//! assert!(pipeline.decode(&FieldEvent::data(vec![0x02], t(40.0), t(60.0))).is_none());
//! let frame = pipeline.decode(&FieldEvent::ack(t(60.0), t(80.0))).unwrap();
//! assert_eq!(frame.canonical_string, "123#01.02");
//! ```
//!
//! ## Example (capture replay)
//!
//! ```rust,no_run
//! use can_concat::{CanConcat, ConcatConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = CanConcat::replay("capture.yaml", ConcatConfig::notched(100.0)).await?;
//!     let mut frames = session.frames()?;
//!
//!     while let Some(frame) = frames.next().await {
//!         println!("{}", frame.canonical_string);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Reassembly pipeline
pub mod assembler;
pub mod clock;
pub mod config;
pub mod filter;
pub mod identity;
pub mod pipeline;
pub mod render;
pub mod sink;

// Event sources and session architecture
pub mod capture;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod session;

// Core exports
pub use error::*;
pub use types::*;

// Pipeline exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConcatConfig, EmptyHistory, TimeSource};
pub use pipeline::{Pipeline, PipelineStats};
pub use sink::{FrameSink, Markers, TracingSink, WriterSink};

// Session exports
pub use capture::Capture;
pub use session::CaptureSession;

/// Unified entry point for capture sessions.
///
/// ## Capture Replay
/// ```rust,no_run
/// use can_concat::{CanConcat, ConcatConfig};
///
/// #[tokio::main]
/// async fn main() -> can_concat::Result<()> {
///     let session = CanConcat::replay("capture.yaml", ConcatConfig::normal()).await?;
///     let (frames, stats) = session.collect().await?;
///     println!("{} frames, {} suppressed", frames.len(), stats.suppressed());
///     Ok(())
/// }
/// ```
pub struct CanConcat;

impl CanConcat {
    /// Replay a YAML capture file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The file does not exist or is not readable
    /// - The file is not a valid capture
    pub async fn replay<P: AsRef<std::path::Path>>(
        path: P,
        config: ConcatConfig,
    ) -> Result<CaptureSession> {
        CaptureSession::replay(path, config).await
    }

    /// Decode events pushed by a live decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub async fn attach(
        receiver: tokio::sync::mpsc::Receiver<FieldEvent>,
        config: ConcatConfig,
    ) -> Result<CaptureSession> {
        CaptureSession::attach(receiver, config).await
    }
}
