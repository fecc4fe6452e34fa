//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use can_concat::{AssembledFrame, Clock, FieldEvent, Pipeline, TraceTime};

/// Trace-time width of one synthetic field, in seconds
pub const FIELD_WIDTH_SECS: f64 = 0.000_02;

/// Identifier, one data field per byte, CRC and ACK, back to back from `start_ms`
///
/// Mirrors `can_concat::test_utils::frame_events_at`, which is only compiled for
/// integration tests under the `benchmark` feature. The CRC is fixed because the
/// pipeline carries it through without checking it.
pub fn frame_at(id: u32, data: &[u8], start_ms: f64) -> Vec<FieldEvent> {
    let mut t = start_ms / 1000.0;
    let mut next = || {
        let span = (TraceTime::from_secs(t), TraceTime::from_secs(t + FIELD_WIDTH_SECS));
        t += FIELD_WIDTH_SECS;
        span
    };

    let mut events = Vec::new();
    let (s, e) = next();
    events.push(FieldEvent::identifier(id, s, e));
    for byte in data {
        let (s, e) = next();
        events.push(FieldEvent::data(vec![*byte], s, e));
    }
    let (s, e) = next();
    events.push(FieldEvent::crc(0x1ABC, s, e));
    let (s, e) = next();
    events.push(FieldEvent::ack(s, e));
    events
}

/// Feed one whole frame and return what the pipeline emitted for it
pub fn feed<C: Clock>(pipeline: &mut Pipeline<C>, id: u32, data: &[u8]) -> Option<AssembledFrame> {
    feed_at(pipeline, id, data, 0.0)
}

/// Feed one whole frame starting at `start_ms` trace time
pub fn feed_at<C: Clock>(
    pipeline: &mut Pipeline<C>,
    id: u32,
    data: &[u8],
    start_ms: f64,
) -> Option<AssembledFrame> {
    let mut emitted: Vec<AssembledFrame> = frame_at(id, data, start_ms)
        .iter()
        .filter_map(|event| pipeline.decode(event))
        .collect();
    assert!(emitted.len() <= 1, "one frame fed, {} emitted", emitted.len());
    emitted.pop()
}

/// Path of a bundled capture fixture
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}
