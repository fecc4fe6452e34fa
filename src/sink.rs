//! Presentation side channel for emitted frames
//!
//! Sinks receive every emitted [`AssembledFrame`] and turn it into a
//! human-readable line. They only read the precomputed `byte_diff` and never
//! feed anything back into the pipeline.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::types::{AssembledFrame, ByteChange};

/// Opening and closing markers wrapped around highlighted bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    /// Wrapped around bytes classified [`ByteChange::Changed`]
    pub changed: (&'static str, &'static str),
    /// Wrapped around bytes classified [`ByteChange::New`]
    pub new: (&'static str, &'static str),
}

impl Markers {
    /// Terminal colours: bright red for changed bytes, bright green for new bytes
    pub const ANSI: Markers =
        Markers { changed: ("\x1b[91m", "\x1b[0m"), new: ("\x1b[92m", "\x1b[0m") };

    /// Plain text: `[..]` for changed bytes, `{..}` for new bytes
    pub const BRACKETS: Markers = Markers { changed: ("[", "]"), new: ("{", "}") };

    fn wrap(&self, change: ByteChange) -> Option<(&'static str, &'static str)> {
        match change {
            ByteChange::Unchanged => None,
            ByteChange::Changed => Some(self.changed),
            ByteChange::New => Some(self.new),
        }
    }
}

/// Render the decorated line for `frame`
///
/// ```rust
/// use can_concat::{AssembledFrame, ByteChange, TraceTime};
/// use can_concat::sink::{Markers, decorate};
///
/// let frame = AssembledFrame {
///     start_time: TraceTime::ZERO,
///     end_time: TraceTime::ZERO,
///     id: 0x10,
///     data: vec![0xAA, 0xBB],
///     crc: None,
///     canonical_string: "010#AA.BB".to_string(),
///     byte_diff: vec![ByteChange::Unchanged, ByteChange::New],
/// };
/// assert_eq!(decorate(&frame, &Markers::BRACKETS), "010#AA.{BB}");
/// ```
pub fn decorate(frame: &AssembledFrame, markers: &Markers) -> String {
    let mut out = format!("{:03X}#", frame.id);
    for (index, byte) in frame.data.iter().enumerate() {
        if index > 0 {
            out.push('.');
        }
        let hex = format!("{:02X}", byte);
        let change = frame.byte_diff.get(index).copied().unwrap_or(ByteChange::Unchanged);
        match markers.wrap(change) {
            Some((open, close)) => {
                out.push_str(open);
                out.push_str(&hex);
                out.push_str(close);
            }
            None => out.push_str(&hex),
        }
    }
    out
}

/// Consumer of emitted frames for human-facing output
pub trait FrameSink: Send {
    /// Present one emitted frame
    fn present(&mut self, frame: &AssembledFrame);
}

/// Writes one decorated line per frame to an [`io::Write`](std::io::Write)
pub struct WriterSink<W> {
    writer: W,
    markers: Markers,
}

impl<W: Write + Send> WriterSink<W> {
    /// Sink writing lines with the given markers
    pub fn new(writer: W, markers: Markers) -> Self {
        Self { writer, markers }
    }

    /// Sink writing ANSI-coloured lines
    pub fn ansi(writer: W) -> Self {
        Self::new(writer, Markers::ANSI)
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<std::io::Stdout> {
    /// ANSI-coloured lines on standard output
    pub fn stdout() -> Self {
        Self::ansi(std::io::stdout())
    }
}

impl<W: Write + Send> FrameSink for WriterSink<W> {
    fn present(&mut self, frame: &AssembledFrame) {
        let line = decorate(frame, &self.markers);
        if let Err(e) = writeln!(self.writer, "{}", line) {
            warn!("Failed to write frame {}: {}", frame.canonical_string, e);
        }
    }
}

/// Logs one decorated line per frame through `tracing`
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    markers: Markers,
}

impl Default for TracingSink {
    fn default() -> Self {
        Self { markers: Markers::BRACKETS }
    }
}

impl TracingSink {
    /// Tracing sink with the given markers
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }
}

impl FrameSink for TracingSink {
    fn present(&mut self, frame: &AssembledFrame) {
        info!(target: "can_concat::frames", id = frame.id, "{}", decorate(frame, &self.markers));
    }
}

/// Collects decorated lines in memory
///
/// Clones share the same buffer, so a handle kept outside the pipeline sees
/// every line presented through the boxed sink.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferSink {
    /// Lines presented so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl FrameSink for BufferSink {
    fn present(&mut self, frame: &AssembledFrame) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(decorate(frame, &Markers::BRACKETS));
        }
    }
}
