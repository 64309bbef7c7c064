//! Conversion configuration.
//!
//! [`ConversionOptions`] is a builder that carries the target size, target
//! frame rate, encoding flags, progress callback, and cancellation token
//! through a conversion without widening every function signature.
//!
//! # Example
//!
//! ```no_run
//! use gifmaker::{CancellationToken, ConversionOptions, SourceFrameRate};
//!
//! let token = CancellationToken::new();
//! let options = ConversionOptions::new()
//!     .with_target_size(640, 360)
//!     .with_fps(15)
//!     .with_source_frame_rate(SourceFrameRate::Probed)
//!     .with_cancellation(token.clone());
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::error::GifMakerError;
use crate::gif::GifSettings;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::sampling::FrameSampler;

/// Frame rate assumed for the source when nothing else is known.
pub const DEFAULT_SOURCE_FPS: u32 = 30;

/// Default output size.
pub const DEFAULT_TARGET_SIZE: FrameSize = FrameSize {
    width: 800,
    height: 600,
};

/// Default output frame rate.
pub const DEFAULT_FPS: u32 = 10;

/// Output dimensions in pixels.
///
/// Frames are stretched to exactly this size; the source aspect ratio is not
/// preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a new size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for FrameSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// How the source frame rate used for sampling is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFrameRate {
    /// Treat the source as running at this many frames per second.
    Assumed(u32),
    /// Use the stream's average frame rate (rounded), falling back to
    /// [`DEFAULT_SOURCE_FPS`] when the container does not report one.
    Probed,
}

impl Default for SourceFrameRate {
    fn default() -> Self {
        SourceFrameRate::Assumed(DEFAULT_SOURCE_FPS)
    }
}

impl Display for SourceFrameRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SourceFrameRate::Assumed(fps) => write!(f, "{fps}"),
            SourceFrameRate::Probed => f.write_str("auto"),
        }
    }
}

impl SourceFrameRate {
    /// Resolve to a whole frame rate given the stream's reported rate.
    pub fn resolve(self, probed_fps: Option<f64>) -> u32 {
        match self {
            SourceFrameRate::Assumed(fps) => fps,
            SourceFrameRate::Probed => probed_fps
                .filter(|fps| fps.is_finite() && *fps >= 0.5)
                .map(|fps| fps.round() as u32)
                .unwrap_or(DEFAULT_SOURCE_FPS),
        }
    }
}

/// Settings for a single video-to-GIF conversion.
///
/// Defaults to 800×600 output at 10 fps from an assumed 30 fps source,
/// with palette optimization on and an infinite loop.
#[derive(Clone)]
pub struct ConversionOptions {
    pub(crate) target_size: FrameSize,
    pub(crate) fps: u32,
    pub(crate) source_frame_rate: SourceFrameRate,
    pub(crate) optimize: bool,
    /// `None` loops forever.
    pub(crate) repeat: Option<u16>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for ConversionOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConversionOptions")
            .field("target_size", &self.target_size)
            .field("fps", &self.fps)
            .field("source_frame_rate", &self.source_frame_rate)
            .field("optimize", &self.optimize)
            .field("repeat", &self.repeat)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionOptions {
    /// Create options with the default settings.
    pub fn new() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            fps: DEFAULT_FPS,
            source_frame_rate: SourceFrameRate::default(),
            optimize: true,
            repeat: None,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the output frame size.
    #[must_use]
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = FrameSize::new(width, height);
        self
    }

    /// Set the output frame rate. Also determines the per-frame delay.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Choose how the source frame rate is determined for sampling.
    #[must_use]
    pub fn with_source_frame_rate(mut self, rate: SourceFrameRate) -> Self {
        self.source_frame_rate = rate;
        self
    }

    /// Enable or disable palette / frame-difference optimization.
    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Set the loop count. `None` loops forever.
    #[must_use]
    pub fn with_repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Attach a progress callback, fired every
    /// [`batch_size`](ConversionOptions::with_batch_size) frames.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the conversion stops and returns
    /// [`GifMakerError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Output frame size.
    pub fn target_size(&self) -> FrameSize {
        self.target_size
    }

    /// Output frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// How the source frame rate is determined for sampling.
    pub fn source_frame_rate(&self) -> SourceFrameRate {
        self.source_frame_rate
    }

    /// Whether changed-region optimization is enabled.
    pub fn optimize(&self) -> bool {
        self.optimize
    }

    /// Loop count. `None` loops forever.
    pub fn repeat(&self) -> Option<u16> {
        self.repeat
    }

    /// Display time of each frame: `1000 / fps` milliseconds, truncated.
    pub fn frame_delay_ms(&self) -> u32 {
        1000u32.checked_div(self.fps).unwrap_or(0)
    }

    /// Check the target size and frame rate before any file is touched.
    ///
    /// # Errors
    ///
    /// - [`GifMakerError::InvalidFrameRate`] if the fps is zero.
    /// - [`GifMakerError::InvalidSize`] if either dimension is zero or does
    ///   not fit a GIF logical screen.
    pub fn validate(&self) -> Result<(), GifMakerError> {
        if self.fps == 0 {
            return Err(GifMakerError::InvalidFrameRate);
        }

        let FrameSize { width, height } = self.target_size;
        let limit = u32::from(u16::MAX);
        if width == 0 || height == 0 || width > limit || height > limit {
            return Err(GifMakerError::InvalidSize { width, height });
        }

        Ok(())
    }

    /// Sampler for a source whose stream reports `probed_fps`.
    pub fn sampler(&self, probed_fps: Option<f64>) -> FrameSampler {
        FrameSampler::new(self.source_frame_rate.resolve(probed_fps), self.fps)
    }

    pub(crate) fn gif_settings(&self) -> GifSettings {
        GifSettings::new()
            .frame_delay_ms(self.frame_delay_ms())
            .repeat(self.repeat)
            .optimize(self.optimize)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
