//! Test utilities for building field-event sequences and locating fixtures
//!
//! Shared by unit tests and the benchmarks (behind the `benchmark` feature).

#![cfg(any(test, feature = "benchmark"))]

use std::path::{Path, PathBuf};

use crate::types::{FieldEvent, TraceTime};

/// Trace-time width of one synthetic field, in seconds
pub const FIELD_WIDTH_SECS: f64 = 0.000_02;

/// Error returned when a required capture fixture cannot be located.
#[derive(Debug, Clone, thiserror::Error)]
#[error("capture fixture {name} not found in {}", .dir.display())]
pub struct FixtureError {
    name: String,
    dir: PathBuf,
}

/// Events the upstream decoder reports for one frame, starting at trace time zero
///
/// See [`frame_events_at`].
pub fn frame_events(id: u32, data: &[u8]) -> Vec<FieldEvent> {
    frame_events_at(id, data, TraceTime::ZERO)
}

/// Events the upstream decoder reports for one frame starting at `start`
///
/// Produces an identifier field, one data field per byte, a CRC field and an
/// ACK field, each [`FIELD_WIDTH_SECS`] wide and back to back.
pub fn frame_events_at(id: u32, data: &[u8], start: TraceTime) -> Vec<FieldEvent> {
    let mut events = Vec::with_capacity(data.len() + 3);
    let mut cursor = start.as_secs();
    let mut span = || {
        let begin = cursor;
        cursor += FIELD_WIDTH_SECS;
        (TraceTime::from_secs(begin), TraceTime::from_secs(cursor))
    };

    let (s, e) = span();
    events.push(FieldEvent::identifier(id, s, e));
    for byte in data {
        let (s, e) = span();
        events.push(FieldEvent::data(vec![*byte], s, e));
    }
    let (s, e) = span();
    events.push(FieldEvent::crc(crc15(data), s, e));
    let (s, e) = span();
    events.push(FieldEvent::ack(s, e));
    events
}

/// Placeholder CRC-15 style checksum; the pipeline never validates it
fn crc15(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |acc, byte| ((acc << 3) ^ u32::from(*byte)) & 0x7FFF)
}

/// Directory holding YAML capture fixtures
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Require that a named capture fixture exists on disk.
pub fn require_fixture(file_name: &str) -> Result<PathBuf, FixtureError> {
    let path = fixtures_dir().join(file_name);
    if path.exists() {
        Ok(path)
    } else {
        Err(FixtureError { name: file_name.to_string(), dir: fixtures_dir() })
    }
}
