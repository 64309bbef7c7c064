//! Source video metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened and cached for the lifetime of the source. The converter uses it
//! for logging, progress estimates, and [`SourceFrameRate::Probed`](crate::SourceFrameRate::Probed).

use std::time::Duration;

/// Metadata for the video stream being converted.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second, or `0.0` if the container does not say.
    pub frames_per_second: f64,
    /// Estimated frame count from the stream header or duration × rate.
    /// Zero when unknown.
    pub frame_count: u64,
    /// Container duration.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"rawvideo"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// The reported frame rate, if the container provided a usable one.
    pub fn probed_fps(&self) -> Option<f64> {
        (self.frames_per_second > 0.0).then_some(self.frames_per_second)
    }

    /// The estimated frame count, if known.
    pub fn estimated_frames(&self) -> Option<u64> {
        (self.frame_count > 0).then_some(self.frame_count)
    }
}
