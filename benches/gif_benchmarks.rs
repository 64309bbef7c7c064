//! Benchmarks for GIF encoding, sampling, and end-to-end conversion.
//!
//! Run with: cargo bench
//!
//! The conversion benchmark needs `tests/fixtures/sample_video.mp4` and is
//! skipped without it.

use std::{path::Path, time::Duration};

use criterion::Criterion;
use ffmpeg_next::util::log::Level as LogLevel;
use gifmaker::{ChannelOrder, Frame, FrameSampler, GifSettings};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// A moving bar over a gradient, so consecutive frames differ in a band.
fn synthetic_frames(count: u32, width: u32, height: u32) -> Vec<Frame> {
    (0..count)
        .map(|index| {
            let bar = (index * 8) % width;
            let mut data = Vec::with_capacity((width * height * 3) as usize);
            for y in 0..height {
                for x in 0..width {
                    if x.abs_diff(bar) < 6 {
                        data.extend_from_slice(&[255, 255, 255]);
                    } else {
                        data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 96]);
                    }
                }
            }
            Frame::new(width, height, ChannelOrder::Rgb, data).unwrap()
        })
        .collect()
}

fn benchmark_encoding(criterion: &mut Criterion) {
    let frames = synthetic_frames(20, 160, 120);
    let mut group = criterion.benchmark_group("encode 20 frames 160x120");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("optimized", |bencher| {
        let settings = GifSettings::new();
        bencher.iter(|| gifmaker::encode_gif_to_memory(&frames, &settings).unwrap());
    });

    group.bench_function("full frames", |bencher| {
        let settings = GifSettings::new().optimize(false);
        bencher.iter(|| gifmaker::encode_gif_to_memory(&frames, &settings).unwrap());
    });

    group.finish();
}

fn benchmark_sampling(criterion: &mut Criterion) {
    let sampler = FrameSampler::new(30, 10);
    criterion.bench_function("sample 100k decode indices", |bencher| {
        bencher.iter(|| (0..100_000u64).filter(|&index| sampler.keeps(index)).count());
    });
}

fn benchmark_conversion(criterion: &mut Criterion) {
    ffmpeg_next::util::log::set_level(LogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("bench.gif");

    let mut group = criterion.benchmark_group("convert sample video");
    group.sample_size(10);
    group.bench_function("320x240 at 10 fps", |bencher| {
        bencher.iter(|| gifmaker::create_gif(SAMPLE_VIDEO, &output, (320, 240), 10).unwrap());
    });
    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_encoding,
    benchmark_sampling,
    benchmark_conversion,
);
criterion::criterion_main!(benches);
