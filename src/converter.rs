//! Video-to-GIF conversion.
//!
//! [`Converter::create_gif`] runs the whole pipeline in one blocking call:
//! validate the input path, open the video, decode every frame in order
//! while keeping every Nth one, resize and channel-swap the kept frames,
//! then encode them as a looping GIF and report the output size.
//!
//! All kept frames are held in memory until encoding starts, so memory use
//! grows with `kept frames × width × height × 3` bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{
    configuration::{ConversionOptions, FrameSize},
    error::GifMakerError,
    frame::{Frame, FrameResizer},
    gif::GifWriter,
    progress::{OperationType, ProgressTracker},
    sampling::FrameSampler,
    source::VideoSource,
};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// What a finished conversion produced.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ConversionSummary {
    /// Where the GIF was written.
    pub output_path: PathBuf,
    /// Frames decoded from the source before end-of-stream.
    pub decoded_frames: u64,
    /// Frames written to the GIF.
    pub kept_frames: u64,
    /// Decoded frames per kept frame.
    pub sampling_interval: u64,
    /// Display time of each GIF frame in milliseconds.
    pub frame_delay_ms: u32,
    /// Dimensions of every GIF frame.
    pub frame_size: FrameSize,
    /// Size of the written file.
    pub output_size_bytes: u64,
}

impl ConversionSummary {
    /// Output size in mebibytes.
    pub fn output_size_megabytes(&self) -> f64 {
        self.output_size_bytes as f64 / BYTES_PER_MEGABYTE
    }
}

/// Converts video files to animated GIFs with fixed settings.
///
/// # Example
///
/// ```no_run
/// use gifmaker::{ConversionOptions, Converter, GifMakerError};
///
/// let converter = Converter::new(ConversionOptions::new().with_target_size(640, 480));
/// let summary = converter.create_gif("demo.mp4", "demo.gif")?;
/// println!("{} frames, {:.2}MB", summary.kept_frames, summary.output_size_megabytes());
/// # Ok::<(), GifMakerError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConversionOptions,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert the video at `video_path` into a looping GIF at `gif_path`,
    /// overwriting any existing file.
    ///
    /// # Errors
    ///
    /// - [`GifMakerError::InvalidFrameRate`] / [`GifMakerError::InvalidSize`]
    ///   for unusable options.
    /// - [`GifMakerError::NotFound`] if `video_path` does not exist.
    /// - [`GifMakerError::FileOpen`] or [`GifMakerError::NoVideoStream`] if
    ///   the video cannot be opened for decoding.
    /// - [`GifMakerError::EmptyResult`] if no frames were kept.
    /// - [`GifMakerError::Cancelled`] if the cancellation token fires.
    /// - Decode, resize, encode, or I/O errors from the respective step.
    ///
    /// No output file is created unless decoding produced at least one frame.
    pub fn create_gif<P, Q>(
        &self,
        video_path: P,
        gif_path: Q,
    ) -> Result<ConversionSummary, GifMakerError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let video_path = video_path.as_ref();
        let gif_path = gif_path.as_ref();

        self.options.validate()?;
        if !video_path.exists() {
            return Err(GifMakerError::NotFound {
                path: video_path.to_path_buf(),
            });
        }

        let FrameSize { width, height } = self.options.target_size;
        log::info!("Converting video to GIF...");
        log::info!("Target size: {width}x{height}");
        log::info!("Target FPS: {}", self.options.fps);

        // The source is dropped, closing the decoder, before encoding starts.
        let (frames, decoded_frames, sampler) = {
            let mut source = VideoSource::open(video_path)?;
            self.extract_frames(&mut source)?
        };

        if frames.is_empty() {
            return Err(GifMakerError::EmptyResult { decoded_frames });
        }

        log::info!("Extracted {} frames", frames.len());
        log::info!("Saving GIF to: {}", gif_path.display());

        self.write_gif(gif_path, &frames)?;

        let summary = ConversionSummary {
            output_path: gif_path.to_path_buf(),
            decoded_frames,
            kept_frames: frames.len() as u64,
            sampling_interval: sampler.interval(),
            frame_delay_ms: self.options.frame_delay_ms(),
            frame_size: self.options.target_size,
            output_size_bytes: std::fs::metadata(gif_path)?.len(),
        };

        log::info!(
            "GIF created successfully! Size: {:.2}MB",
            summary.output_size_megabytes(),
        );

        Ok(summary)
    }

    /// Decode the whole source, keeping every Nth frame resized and in RGB
    /// order. Returns the kept frames, the decoded frame count, and the
    /// sampler that was applied.
    fn extract_frames(
        &self,
        source: &mut VideoSource,
    ) -> Result<(Vec<Frame>, u64, FrameSampler), GifMakerError> {
        let metadata = source.metadata();
        let sampler = self.options.sampler(metadata.probed_fps());
        let estimated_frames = metadata.estimated_frames();
        let target = self.options.target_size;

        log::debug!(
            "Sampling every {} frame(s) from {} (~{} frames)",
            sampler.interval(),
            source.path().display(),
            estimated_frames.unwrap_or(0),
        );

        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::Decoding,
            estimated_frames,
            self.options.batch_size,
        );
        let mut frames = Vec::with_capacity(
            estimated_frames.map_or(0, |total| sampler.expected_kept(total) as usize),
        );
        let mut resizer: Option<FrameResizer> = None;

        let decoded_frames = source.for_each_frame(|decode_index, decoded| {
            if self.options.is_cancelled() {
                return Err(GifMakerError::Cancelled);
            }

            let keep = sampler.keeps(decode_index);
            if keep {
                if resizer.is_none() {
                    resizer = Some(FrameResizer::new(
                        decoded.format(),
                        decoded.width(),
                        decoded.height(),
                        target,
                    )?);
                }
                if let Some(resizer) = resizer.as_mut() {
                    frames.push(resizer.resize(decoded)?.into_rgb());
                }
            }

            tracker.advance(keep);
            Ok(())
        })?;
        tracker.finish();

        log::debug!("Decoded {decoded_frames} frames, kept {}", frames.len());

        Ok((frames, decoded_frames, sampler))
    }

    fn write_gif(&self, gif_path: &Path, frames: &[Frame]) -> Result<(), GifMakerError> {
        let settings = self.options.gif_settings();
        let FrameSize { width, height } = self.options.target_size;

        let file = File::create(gif_path)?;
        let mut writer = GifWriter::new(BufWriter::new(file), width, height, &settings)?;
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::Encoding,
            Some(frames.len() as u64),
            self.options.batch_size,
        );

        for frame in frames {
            if self.options.is_cancelled() {
                return Err(GifMakerError::Cancelled);
            }
            writer.write_frame(frame)?;
            tracker.advance(true);
        }

        writer.finish()?.flush()?;
        tracker.finish();
        Ok(())
    }
}

/// Convert a video to a looping GIF with the given size and frame rate and
/// default settings otherwise.
///
/// Keeps every `max(1, 30 / fps)`th decoded frame and shows each one for
/// `1000 / fps` milliseconds.
///
/// # Example
///
/// ```no_run
/// use gifmaker::GifMakerError;
///
/// gifmaker::create_gif("demo.mp4", "demo.gif", (800, 600), 10)?;
/// # Ok::<(), GifMakerError>(())
/// ```
pub fn create_gif<P, Q, S>(
    video_path: P,
    gif_path: Q,
    target_size: S,
    fps: u32,
) -> Result<ConversionSummary, GifMakerError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: Into<FrameSize>,
{
    let FrameSize { width, height } = target_size.into();
    let options = ConversionOptions::new()
        .with_target_size(width, height)
        .with_fps(fps);
    Converter::new(options).create_gif(video_path, gif_path)
}
