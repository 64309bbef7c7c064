//! Shared fixtures for integration tests.
//!
//! Videos are written as YUV4MPEG2 (`.y4m`): FFmpeg demuxes and decodes it
//! with built-in rawvideo support, so tests need no external codec.

#![allow(dead_code)]

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{AnimationDecoder, RgbaImage, codecs::gif::GifDecoder};

pub const RED: [u8; 3] = [255, 0, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];
pub const GREEN: [u8; 3] = [0, 255, 0];

/// Optional real-world fixture; tests using it are skipped when absent.
pub fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

/// BT.601 limited-range conversion, matching FFmpeg's default for
/// untagged YUV.
fn rgb_to_yuv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    let y = 16.0 + (65.481 * r + 128.553 * g + 24.966 * b) / 255.0;
    let u = 128.0 + (-37.797 * r - 74.203 * g + 112.0 * b) / 255.0;
    let v = 128.0 + (112.0 * r - 93.786 * g - 18.214 * b) / 255.0;
    [y, u, v].map(|value| value.round().clamp(0.0, 255.0) as u8)
}

/// Write a solid-colour Y4M video with one frame per entry in `colors`.
pub fn write_y4m(path: &Path, width: u32, height: u32, fps: u32, colors: &[[u8; 3]]) {
    let file = File::create(path).expect("Failed to create fixture");
    let mut writer = BufWriter::new(file);
    write!(writer, "YUV4MPEG2 W{width} H{height} F{fps}:1 Ip A1:1 C444\n")
        .expect("Failed to write Y4M header");

    let plane = width as usize * height as usize;
    for color in colors {
        writer.write_all(b"FRAME\n").expect("Failed to write frame marker");
        for component in rgb_to_yuv(*color) {
            writer
                .write_all(&vec![component; plane])
                .expect("Failed to write plane");
        }
    }
    writer.flush().expect("Failed to flush fixture");
}

/// Write a Y4M file whose only `FRAME` is cut short after `payload` bytes.
/// The demuxer reports end-of-stream on the short read, so the file opens
/// but yields no frames.
pub fn write_truncated_y4m(path: &Path, width: u32, height: u32, fps: u32, payload: usize) {
    let mut bytes = format!("YUV4MPEG2 W{width} H{height} F{fps}:1 Ip A1:1 C444\n").into_bytes();
    bytes.extend_from_slice(b"FRAME\n");
    bytes.extend(std::iter::repeat_n(128u8, payload));
    std::fs::write(path, bytes).expect("Failed to write fixture");
}

/// A temp directory holding `frames` frames where every frame whose index
/// is a multiple of `marker_every` is red and all others are blue.
pub fn marked_video(
    directory: &tempfile::TempDir,
    frames: usize,
    fps: u32,
    marker_every: usize,
) -> PathBuf {
    let path = directory.path().join("input.y4m");
    let colors: Vec<[u8; 3]> = (0..frames)
        .map(|index| if index % marker_every == 0 { RED } else { BLUE })
        .collect();
    write_y4m(&path, 64, 48, fps, &colors);
    path
}

/// Decode every composited frame of a GIF file.
pub fn decode_gif(path: &Path) -> Vec<image::Frame> {
    let file = File::open(path).expect("Failed to open GIF");
    GifDecoder::new(std::io::BufReader::new(file))
        .expect("Failed to read GIF header")
        .into_frames()
        .collect_frames()
        .expect("Failed to decode GIF frames")
}

/// Whether the file carries a NETSCAPE2.0 extension with loop count 0.
pub fn loops_forever(path: &Path) -> bool {
    let bytes = std::fs::read(path).expect("Failed to read GIF");
    let marker = b"NETSCAPE2.0\x03\x01\x00\x00";
    bytes.windows(marker.len()).any(|window| window == marker)
}

pub fn center_pixel(image: &RgbaImage) -> [u8; 4] {
    image.get_pixel(image.width() / 2, image.height() / 2).0
}

/// Loose colour match that tolerates YUV round-trip and palette error.
pub fn is_close(actual: [u8; 4], expected: [u8; 3]) -> bool {
    actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= 24)
}
