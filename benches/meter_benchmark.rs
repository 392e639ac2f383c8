//! Performance benchmarks for the meter renderer
//!
//! Run with: cargo bench --bench meter_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use deckscope::deck::Track;
use deckscope::layout::Rect;
use deckscope::render::meter::{draw_closeup, draw_meters, draw_overview};
use deckscope::render::{Framebuffer, MeterScale, Palette, PixelFormat};

/// Five minutes of a slowly swelling tone
fn test_track() -> Track {
    let rate = 44100;
    let samples: Vec<f32> = (0..rate * 300)
        .map(|i| {
            let t = i as f32 / rate as f32;
            (t * 440.0 * std::f32::consts::TAU).sin() * (0.5 + 0.5 * (t * 0.1).sin())
        })
        .collect();

    let mut track = Track::from_pcm(rate as u32, &samples);
    track.set_bpm(128.0);
    track
}

fn benchmark_meter_passes(c: &mut Criterion) {
    let track = test_track();
    let palette = Palette::default();
    let position = track.length() as i64 / 3;

    let mut group = c.benchmark_group("meter");

    // Typical deck widths at common window sizes
    for width in [320, 480, 960] {
        let rect = Rect::new(0, 0, width, 40);
        let mut fb = Framebuffer::new(width, 40, PixelFormat::BGRX32).unwrap();

        group.throughput(Throughput::Elements(width as u64));

        group.bench_function(format!("overview_{}px", width), |b| {
            b.iter(|| {
                draw_overview(&mut fb, rect, black_box(&track), black_box(position), &palette);
            });
        });

        group.bench_function(format!("closeup_{}px", width), |b| {
            let scale = MeterScale::default();
            b.iter(|| {
                draw_closeup(&mut fb, rect, black_box(&track), black_box(position), scale, false, &palette);
            });
        });
    }

    group.finish();
}

fn benchmark_meter_stack(c: &mut Criterion) {
    let track = test_track();
    let palette = Palette::default();
    let rect = Rect::new(0, 0, 480, 150);
    let mut fb = Framebuffer::new(480, 150, PixelFormat::BGRX32).unwrap();

    c.bench_function("meter_stack_advancing", |b| {
        let mut position = 0i64;
        let length = track.length() as i64;

        b.iter(|| {
            // Simulate the playhead moving one refresh at a time
            draw_meters(&mut fb, rect, &track, black_box(position), MeterScale::default(), &palette);
            position = (position + 441) % length;
        });
    });
}

criterion_group!(benches, benchmark_meter_passes, benchmark_meter_stack);

criterion_main!(benches);
