//! Scoped video decoding.
//!
//! [`VideoSource`] owns the FFmpeg demuxer and decoder for one input file.
//! Both are released when the source is dropped, so every exit path of a
//! conversion (success, empty result, decode error, cancellation) closes the
//! underlying file handle.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    codec::context::Context as CodecContext, decoder::Video as VideoDecoder,
    format::context::Input, frame::Video as VideoFrame, media::Type,
};

use crate::{error::GifMakerError, metadata::VideoMetadata};

/// An opened video file, ready for a single sequential decode pass.
///
/// # Example
///
/// ```no_run
/// use gifmaker::{GifMakerError, VideoSource};
///
/// let source = VideoSource::open("input.mp4")?;
/// let metadata = source.metadata();
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// # Ok::<(), GifMakerError>(())
/// ```
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    video_stream_index: usize,
    metadata: VideoMetadata,
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file and prepare a decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// - [`GifMakerError::FileOpen`] if FFmpeg cannot open the file or its
    ///   video decoder (corrupt file, unsupported codec).
    /// - [`GifMakerError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GifMakerError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |reason: String| GifMakerError::FileOpen {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let (video_stream_index, parameters, frames_per_second, stream_frames) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(GifMakerError::NoVideoStream)?;

            let average = stream.avg_frame_rate();
            let rate = if average.denominator() != 0 && average.numerator() > 0 {
                average
            } else {
                stream.rate()
            };
            let frames_per_second = if rate.denominator() != 0 {
                f64::from(rate.numerator()) / f64::from(rate.denominator())
            } else {
                0.0
            };

            (
                stream.index(),
                stream.parameters(),
                frames_per_second.max(0.0),
                stream.frames().max(0) as u64,
            )
        };

        let decoder = CodecContext::from_parameters(parameters)
            .and_then(|context| context.decoder().video())
            .map_err(|error| open_error(format!("Failed to open video decoder: {error}")))?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frame_count = if stream_frames > 0 {
            stream_frames
        } else {
            (duration.as_secs_f64() * frames_per_second).round() as u64
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec: decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            format: input_context.format().name().to_string(),
        };

        log::debug!(
            "Opened {}: {} {}x{} @ {:.2} fps, ~{} frames",
            path.display(),
            metadata.codec,
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            video_stream_index,
            metadata,
            path,
        })
    }

    /// Metadata cached at open time.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode every frame of the video stream in order, without seeking,
    /// passing each one to `handler` with its zero-based decode index.
    ///
    /// The decoder is flushed at end-of-stream so buffered frames are
    /// delivered too. Returns the total number of decoded frames. Stops at
    /// the first error from the decoder or the handler.
    pub(crate) fn for_each_frame<F>(&mut self, mut handler: F) -> Result<u64, GifMakerError>
    where
        F: FnMut(u64, &VideoFrame) -> Result<(), GifMakerError>,
    {
        let mut decoded_frame = VideoFrame::empty();
        let mut decode_index = 0u64;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            self.decoder.send_packet(&packet).map_err(|error| {
                GifMakerError::VideoDecodeError(format!(
                    "packet rejected at frame {decode_index}: {error}"
                ))
            })?;

            while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
                handler(decode_index, &decoded_frame)?;
                decode_index += 1;
            }
        }

        self.decoder.send_eof()?;
        while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
            handler(decode_index, &decoded_frame)?;
            decode_index += 1;
        }

        Ok(decode_index)
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        log::debug!("Releasing video source: {}", self.path.display());
    }
}
