//! End-to-end conversion tests.
//!
//! Fixtures are generated Y4M files; a real `tests/fixtures/sample_video.mp4`
//! is used too when present.

mod common;

use std::{path::Path, time::Duration};

use gifmaker::{ConversionOptions, Converter, SourceFrameRate, VideoSource};

use common::{BLUE, RED};

#[test]
fn three_second_clip_at_ten_fps_keeps_every_third_frame() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 90, 30, 3);
    let output = directory.path().join("out.gif");

    let summary = gifmaker::create_gif(&input, &output, (32, 24), 10).expect("Conversion failed");

    assert_eq!(summary.decoded_frames, 90);
    assert_eq!(summary.kept_frames, 30);
    assert_eq!(summary.sampling_interval, 3);
    assert_eq!(summary.frame_delay_ms, 100);
    assert_eq!(
        summary.output_size_bytes,
        std::fs::metadata(&output).unwrap().len()
    );

    let frames = common::decode_gif(&output);
    assert_eq!(frames.len(), 30);
    for frame in &frames {
        assert_eq!(frame.buffer().dimensions(), (32, 24));
        assert_eq!(Duration::from(frame.delay()), Duration::from_millis(100));
        // Only frames at multiples of 3 are red in the source.
        let pixel = common::center_pixel(frame.buffer());
        assert!(common::is_close(pixel, RED), "expected red, got {pixel:?}");
    }
    assert!(common::loops_forever(&output));
}

#[test]
fn matching_rate_keeps_all_frames() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 90, 30, 2);
    let output = directory.path().join("out.gif");

    let summary = gifmaker::create_gif(&input, &output, (32, 24), 30).expect("Conversion failed");
    assert_eq!(summary.kept_frames, 90);
    assert_eq!(summary.sampling_interval, 1);

    let frames = common::decode_gif(&output);
    assert_eq!(frames.len(), 90);
    let second = common::center_pixel(frames[1].buffer());
    assert!(common::is_close(second, BLUE), "expected blue, got {second:?}");
}

#[test]
fn rates_above_source_clamp_to_every_frame() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 20, 30, 1);
    let output = directory.path().join("out.gif");

    let summary = gifmaker::create_gif(&input, &output, (16, 16), 60).expect("Conversion failed");
    assert_eq!(summary.sampling_interval, 1);
    assert_eq!(summary.kept_frames, 20);
    assert_eq!(summary.frame_delay_ms, 16);
}

#[test]
fn uneven_interval_rounds_kept_count_up() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 90, 30, 4);
    let output = directory.path().join("out.gif");

    // 30 / 7 = 4, ceil(90 / 4) = 23.
    let summary = gifmaker::create_gif(&input, &output, (16, 12), 7).expect("Conversion failed");
    assert_eq!(summary.sampling_interval, 4);
    assert_eq!(summary.kept_frames, 23);
    assert_eq!(common::decode_gif(&output).len(), 23);
}

#[test]
fn frames_are_stretched_to_target_size() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 6, 30, 1);
    let output = directory.path().join("out.gif");

    // 64x48 source stretched to a tall 20x50 frame.
    gifmaker::create_gif(&input, &output, (20, 50), 30).expect("Conversion failed");
    for frame in common::decode_gif(&output) {
        assert_eq!(frame.buffer().dimensions(), (20, 50));
    }
}

#[test]
fn channel_order_survives_the_round_trip() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = directory.path().join("colors.y4m");
    common::write_y4m(&input, 32, 32, 30, &[RED, common::GREEN, BLUE]);
    let output = directory.path().join("out.gif");

    gifmaker::create_gif(&input, &output, (16, 16), 30).expect("Conversion failed");

    let frames = common::decode_gif(&output);
    let expected = [RED, common::GREEN, BLUE];
    assert_eq!(frames.len(), expected.len());
    for (frame, color) in frames.iter().zip(expected) {
        let pixel = common::center_pixel(frame.buffer());
        assert!(common::is_close(pixel, color), "expected {color:?}, got {pixel:?}");
    }
}

#[test]
fn unoptimized_output_has_same_frames() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 30, 30, 3);
    let optimized = directory.path().join("optimized.gif");
    let plain = directory.path().join("plain.gif");

    let base = ConversionOptions::new().with_target_size(32, 24).with_fps(10);
    let optimized_summary = Converter::new(base.clone())
        .create_gif(&input, &optimized)
        .expect("Optimized conversion failed");
    let plain_summary = Converter::new(base.with_optimize(false))
        .create_gif(&input, &plain)
        .expect("Plain conversion failed");

    assert_eq!(optimized_summary.kept_frames, plain_summary.kept_frames);
    assert_eq!(common::decode_gif(&plain).len(), 10);
    assert!(optimized_summary.output_size_bytes <= plain_summary.output_size_bytes);
}

#[test]
fn probed_source_rate_changes_the_interval() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 60, 60, 1);
    let output = directory.path().join("out.gif");

    let source = VideoSource::open(&input).expect("Failed to open fixture");
    assert!((source.metadata().frames_per_second - 60.0).abs() < 0.01);
    drop(source);

    let probed = Converter::new(
        ConversionOptions::new()
            .with_target_size(16, 12)
            .with_fps(10)
            .with_source_frame_rate(SourceFrameRate::Probed),
    )
    .create_gif(&input, &output)
    .expect("Conversion failed");
    assert_eq!(probed.sampling_interval, 6);
    assert_eq!(probed.kept_frames, 10);

    let assumed = gifmaker::create_gif(&input, &output, (16, 12), 10).expect("Conversion failed");
    assert_eq!(assumed.sampling_interval, 3);
    assert_eq!(assumed.kept_frames, 20);
}

#[test]
fn existing_output_is_overwritten() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 9, 30, 3);
    let output = directory.path().join("out.gif");
    std::fs::write(&output, b"stale contents").expect("Failed to seed output");

    gifmaker::create_gif(&input, &output, (16, 12), 10).expect("Conversion failed");
    assert_eq!(common::decode_gif(&output).len(), 3);
}

#[test]
fn finite_repeat_is_written() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = common::marked_video(&directory, 6, 30, 3);
    let output = directory.path().join("out.gif");

    Converter::new(
        ConversionOptions::new()
            .with_target_size(8, 8)
            .with_repeat(Some(2)),
    )
    .create_gif(&input, &output)
    .expect("Conversion failed");

    assert!(!common::loops_forever(&output));
    let bytes = std::fs::read(&output).unwrap();
    let marker = b"NETSCAPE2.0\x03\x01\x02\x00";
    assert!(bytes.windows(marker.len()).any(|window| window == marker));
}

#[test]
fn sample_video_converts() {
    let path = common::sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("sample.gif");
    let summary = gifmaker::create_gif(path, &output, (160, 120), 10).expect("Conversion failed");

    let frames = common::decode_gif(&output);
    assert_eq!(frames.len() as u64, summary.kept_frames);
    assert!(summary.decoded_frames >= summary.kept_frames);
}
