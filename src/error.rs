//! Error types for the `gifmaker` crate.
//!
//! This module defines [`GifMakerError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the path, frame
//! counts, or upstream message needed to explain the failure.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `gifmaker` operations.
///
/// Nothing in the crate recovers from these internally; each one aborts the
/// conversion and is returned to the caller as-is.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GifMakerError {
    /// The input video path does not exist.
    #[error("Video file not found: {}", path.display())]
    NotFound {
        /// Path that was passed to the converter.
        path: PathBuf,
    },

    /// The video could not be opened for decoding.
    #[error("Could not open video file at {}: {reason}", path.display())]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but contains no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The full decode pass produced no retained frames.
    #[error("No frames were extracted from the video ({decoded_frames} decoded)")]
    EmptyResult {
        /// How many frames the decoder produced before end-of-stream.
        decoded_frames: u64,
    },

    /// The target frame rate was zero.
    #[error("Target frame rate must be greater than zero")]
    InvalidFrameRate,

    /// The target size cannot be represented as a GIF frame.
    #[error("Invalid target size {width}x{height}: dimensions must be between 1 and 65535")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// Writing the animated GIF failed.
    #[error("GIF encoding error: {0}")]
    GifEncodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for GifMakerError {
    fn from(error: FfmpegError) -> Self {
        GifMakerError::FfmpegError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_path() {
        let error = GifMakerError::NotFound {
            path: PathBuf::from("missing/clip.mp4"),
        };
        assert_eq!(error.to_string(), "Video file not found: missing/clip.mp4");
    }

    #[test]
    fn empty_result_reports_decoded_count() {
        let error = GifMakerError::EmptyResult { decoded_frames: 0 };
        assert!(error.to_string().contains("No frames were extracted"));
    }

    #[test]
    fn ffmpeg_errors_convert() {
        let error: GifMakerError = FfmpegError::Eof.into();
        assert!(matches!(error, GifMakerError::FfmpegError(_)));
    }
}
