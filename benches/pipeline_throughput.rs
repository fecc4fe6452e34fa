//! Benchmarks for per-event decoding cost
//!
//! Measures:
//! - Assembly plus rendering for frames whose data changes every time
//! - The change-filter fast path for repeated frames
//! - Notched mode with many identifiers
//!
//! Platform: Cross-platform, synthetic events only (CI-safe)

use can_concat::test_utils::frame_events_at;
use can_concat::{ConcatConfig, FieldEvent, Pipeline, TraceTime};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Build a burst of `frames` 8-byte frames cycling over `ids` identifiers
fn burst(frames: usize, ids: u32, changing: bool) -> Vec<FieldEvent> {
    let mut events = Vec::with_capacity(frames * 12);
    for n in 0..frames {
        let id = 0x100 + (n as u32 % ids);
        let seed = if changing { n as u8 } else { 0 };
        let data = [seed, 1, 2, 3, 4, 5, 6, seed.wrapping_mul(3)];
        events.extend(frame_events_at(id, &data, TraceTime::from_millis(n as f64)));
    }
    events
}

fn bench_changing_frames(c: &mut Criterion) {
    let events = burst(1_000, 16, true);

    let mut group = c.benchmark_group("decode_changing");
    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("normal_mode", |b| {
        b.iter(|| {
            let mut pipeline = Pipeline::new(ConcatConfig::normal()).expect("valid config");
            for event in &events {
                black_box(pipeline.decode(black_box(event)));
            }
        })
    });
    group.finish();
}

fn bench_repeated_frames(c: &mut Criterion) {
    let events = burst(1_000, 16, false);

    let mut group = c.benchmark_group("decode_repeated");
    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("suppressed_unchanged", |b| {
        b.iter(|| {
            let mut pipeline = Pipeline::new(ConcatConfig::normal()).expect("valid config");
            for event in &events {
                black_box(pipeline.decode(black_box(event)));
            }
        })
    });
    group.finish();
}

fn bench_notched(c: &mut Criterion) {
    let events = burst(1_000, 256, true);

    c.bench_function("decode_notched_256_ids", |b| {
        b.iter(|| {
            let mut pipeline = Pipeline::new(ConcatConfig::notched(10.0)).expect("valid config");
            for event in &events {
                black_box(pipeline.decode(black_box(event)));
            }
        })
    });
}

criterion_group!(benches, bench_changing_frames, bench_repeated_frames, bench_notched);
criterion_main!(benches);
