//! # gifmaker
//!
//! Convert video files into looping animated GIFs.
//!
//! `gifmaker` decodes a video with FFmpeg (via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate), keeps every
//! Nth frame, stretches each kept frame to a fixed size, and writes the
//! sequence as an infinitely looping GIF with palette optimization.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gifmaker::GifMakerError;
//!
//! // 800x600 at 10 fps: every 3rd frame of a 30 fps source, 100 ms each.
//! let summary = gifmaker::create_gif("demo.mp4", "demo.gif", (800, 600), 10)?;
//! println!("GIF created! Size: {:.2}MB", summary.output_size_megabytes());
//! # Ok::<(), GifMakerError>(())
//! ```
//!
//! ### With Options
//!
//! ```no_run
//! use gifmaker::{ConversionOptions, Converter, GifMakerError, SourceFrameRate};
//!
//! let options = ConversionOptions::new()
//!     .with_target_size(480, 270)
//!     .with_fps(15)
//!     .with_source_frame_rate(SourceFrameRate::Probed)
//!     .with_optimize(false);
//! Converter::new(options).create_gif("demo.mp4", "demo.gif")?;
//! # Ok::<(), GifMakerError>(())
//! ```
//!
//! ## Behaviour
//!
//! - **Sampling**: decode index `i` is kept iff `i % max(1, source_fps / fps) == 0`;
//!   the source rate is assumed to be 30 unless probed.
//! - **Resize**: bilinear, exact target size, aspect ratio not preserved.
//! - **Color**: frames leave the decoder as BGR and are swapped to RGB.
//! - **Output**: `1000 / fps` ms per frame, infinite loop, per-frame
//!   palettes, changed-region optimization.
//! - **Errors**: missing input, unopenable input, and an empty decode pass
//!   each have their own [`GifMakerError`] variant; no retries.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod converter;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod gif;
pub mod metadata;
pub mod progress;
pub mod sampling;
pub mod source;

pub use configuration::{
    ConversionOptions, DEFAULT_FPS, DEFAULT_SOURCE_FPS, DEFAULT_TARGET_SIZE, FrameSize,
    SourceFrameRate,
};
pub use converter::{ConversionSummary, Converter, create_gif};
pub use error::GifMakerError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::{ChannelOrder, Frame};
pub use crate::gif::{GifSettings, encode_gif, encode_gif_to_memory};
pub use metadata::VideoMetadata;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use sampling::FrameSampler;
pub use source::VideoSource;
