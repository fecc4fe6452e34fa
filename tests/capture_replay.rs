//! Replaying recorded captures through capture sessions

mod common;

use anyhow::{Context, Result};
use can_concat::providers::ReplayProvider;
use can_concat::sink::BufferSink;
use can_concat::{
    ByteChange, CanConcat, CaptureError, CaptureSession, ConcatConfig, ManualClock, Pipeline,
    TimeSource,
};
use futures::StreamExt;
use std::time::Duration;

#[tokio::test]
async fn normal_mode_replay_emits_changed_frames() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let session = CanConcat::replay(common::fixture("dashboard_burst.yaml"), ConcatConfig::normal())
        .await
        .context("open capture")?;
    let (frames, stats) = session.collect().await?;

    let rendered: Vec<&str> = frames.iter().map(|f| f.canonical_string.as_str()).collect();
    assert_eq!(
        rendered,
        vec![
            "123#01.02",
            "123#01.03",
            "010#AA",
            "010#AA.BB.CC",
            "005#00",
            "010#AA.BB.CD",
            "123#01.04",
        ]
    );

    assert_eq!(frames[1].byte_diff, vec![ByteChange::Unchanged, ByteChange::Changed]);
    assert_eq!(frames[3].byte_diff, vec![ByteChange::Unchanged, ByteChange::New, ByteChange::New]);
    assert!(frames.iter().all(|f| f.crc.is_some()));

    assert_eq!(stats.events, 61);
    assert_eq!(stats.frames_completed, 8);
    assert_eq!(stats.emitted, 7);
    assert_eq!(stats.suppressed_unchanged, 1);
    assert_eq!(stats.abandoned, 1);
    assert_eq!(stats.out_of_order, 2);
    Ok(())
}

#[tokio::test]
async fn trace_timed_notch_thins_the_burst() -> Result<()> {
    let config = ConcatConfig::notched(100.0).with_time_source(TimeSource::Trace);
    let session = CanConcat::replay(common::fixture("dashboard_burst.yaml"), config).await?;
    let (frames, stats) = session.collect().await?;

    let rendered: Vec<&str> = frames.iter().map(|f| f.canonical_string.as_str()).collect();
    assert_eq!(rendered, vec!["123#01.02", "010#AA", "005#00", "123#01.04"]);
    assert_eq!(frames[3].byte_diff, vec![ByteChange::Unchanged, ByteChange::Changed]);
    assert_eq!(stats.suppressed_rate, 3);
    assert_eq!(stats.suppressed_unchanged, 1);
    Ok(())
}

#[tokio::test]
async fn wall_clock_notch_depends_on_feed_rate() -> Result<()> {
    // A frozen clock makes every repeat emission of an identifier look
    // instantaneous, regardless of the trace timestamps.
    let clock = ManualClock::new();
    let pipeline = Pipeline::with_clock(ConcatConfig::notched(100.0), clock)?;
    let provider = ReplayProvider::open(common::fixture("dashboard_burst.yaml"))?;
    let (frames, _) = CaptureSession::start(provider, pipeline).collect().await?;

    let rendered: Vec<&str> = frames.iter().map(|f| f.canonical_string.as_str()).collect();
    assert_eq!(rendered, vec!["123#01.02", "010#AA", "005#00"]);
    Ok(())
}

#[tokio::test]
async fn sink_sees_every_emitted_frame() -> Result<()> {
    let sink = BufferSink::default();
    let pipeline = Pipeline::new(ConcatConfig::normal())?.with_sink(sink.clone());
    let provider = ReplayProvider::open(common::fixture("dashboard_burst.yaml"))?;
    let (frames, _) = CaptureSession::start(provider, pipeline).collect().await?;

    let lines = sink.lines();
    assert_eq!(lines.len(), frames.len());
    assert_eq!(lines[1], "123#01.[03]");
    assert_eq!(lines[3], "010#AA.{BB}.{CC}");
    assert_eq!(lines[5], "010#AA.BB.[CD]");
    Ok(())
}

#[tokio::test]
async fn live_channel_session_streams_frames() -> Result<()> {
    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let mut session = CanConcat::attach(rx, ConcatConfig::normal()).await?;
    let mut frames = session.frames()?;

    let producer = tokio::spawn(async move {
        for (id, data, start) in [(0x300u32, vec![1u8], 0.0), (0x300, vec![1], 5.0), (0x300, vec![2], 10.0)] {
            for event in common::frame_at(id, &data, start) {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        }
    });

    let first = tokio::time::timeout(Duration::from_secs(1), frames.next())
        .await?
        .context("first frame")?;
    let second = tokio::time::timeout(Duration::from_secs(1), frames.next())
        .await?
        .context("second frame")?;
    producer.await?;

    assert_eq!(first.canonical_string, "300#01");
    assert_eq!(second.canonical_string, "300#02");
    assert!(frames.next().await.is_none());
    assert_eq!(session.stats().suppressed_unchanged, 1);
    Ok(())
}

#[tokio::test]
async fn missing_capture_reports_file_error() {
    let result = CanConcat::replay(common::fixture("no_such_capture.yaml"), ConcatConfig::normal()).await;
    assert!(matches!(result, Err(CaptureError::File { .. })));
}
