//! In-memory frames and the resize step.
//!
//! The decode path scales every retained FFmpeg frame to the target size in
//! packed BGR24, the decoder-side layout, producing a [`Frame`] tagged
//! [`ChannelOrder::Bgr`]. [`Frame::into_rgb`] then swaps the channels into
//! the RGB order the GIF encoder expects.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{configuration::FrameSize, error::GifMakerError};

/// Byte order of the three color channels in a packed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Blue, green, red. Produced by the decode path.
    Bgr,
    /// Red, green, blue. Expected by the encoder.
    Rgb,
}

/// A packed 8-bit, 3-channel bitmap with no row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    channel_order: ChannelOrder,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a packed pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GifMakerError::VideoDecodeError`] if `data` is not exactly
    /// `width * height * 3` bytes.
    pub fn new(
        width: u32,
        height: u32,
        channel_order: ChannelOrder,
        data: Vec<u8>,
    ) -> Result<Self, GifMakerError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(GifMakerError::VideoDecodeError(format!(
                "frame buffer is {} bytes, expected {expected} for {width}x{height}",
                data.len(),
            )));
        }
        Ok(Self {
            width,
            height,
            channel_order,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height as a [`FrameSize`].
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// Byte order of each pixel in [`data`](Frame::data).
    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    /// Raw packed pixel bytes in [`channel_order`](Frame::channel_order).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return the pixel at `(x, y)` in the frame's own channel order.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }

    /// Convert to RGB channel order, swapping in place if needed.
    pub fn into_rgb(mut self) -> Self {
        if self.channel_order == ChannelOrder::Bgr {
            for pixel in self.data.chunks_exact_mut(3) {
                pixel.swap(0, 2);
            }
            self.channel_order = ChannelOrder::Rgb;
        }
        self
    }

    /// Convert to an [`RgbImage`], swapping channels first if needed.
    pub fn into_rgb_image(self) -> Result<RgbImage, GifMakerError> {
        let Frame {
            width,
            height,
            data,
            ..
        } = self.into_rgb();
        RgbImage::from_raw(width, height, data).ok_or_else(|| {
            GifMakerError::VideoDecodeError(
                "Failed to construct RGB image from frame data".to_string(),
            )
        })
    }
}

/// Resizes decoded FFmpeg frames to the target size with bilinear
/// interpolation, emitting packed BGR24 [`Frame`]s.
///
/// The scaler is rebuilt if the decoder switches format or resolution
/// mid-stream.
pub(crate) struct FrameResizer {
    scaler: ScalingContext,
    source: (Pixel, u32, u32),
    target: FrameSize,
    scaled: VideoFrame,
}

impl FrameResizer {
    pub(crate) fn new(
        format: Pixel,
        width: u32,
        height: u32,
        target: FrameSize,
    ) -> Result<Self, GifMakerError> {
        Ok(Self {
            scaler: build_scaler(format, width, height, target)?,
            source: (format, width, height),
            target,
            scaled: VideoFrame::empty(),
        })
    }

    pub(crate) fn resize(&mut self, decoded: &VideoFrame) -> Result<Frame, GifMakerError> {
        let source = (decoded.format(), decoded.width(), decoded.height());
        if source != self.source {
            log::debug!(
                "Decoder output changed from {:?} to {:?}; rebuilding scaler",
                self.source,
                source,
            );
            self.scaler = build_scaler(source.0, source.1, source.2, self.target)?;
            self.source = source;
        }

        self.scaler.run(decoded, &mut self.scaled)?;
        let buffer = packed_buffer(&self.scaled, self.target.width, self.target.height, 3);
        Frame::new(self.target.width, self.target.height, ChannelOrder::Bgr, buffer)
    }
}

fn build_scaler(
    format: Pixel,
    width: u32,
    height: u32,
    target: FrameSize,
) -> Result<ScalingContext, GifMakerError> {
    ScalingContext::get(
        format,
        width,
        height,
        Pixel::BGR24,
        target.width,
        target.height,
        ScalingFlags::BILINEAR,
    )
    .map_err(|error| {
        GifMakerError::VideoDecodeError(format!(
            "cannot scale {format:?} {width}x{height} to {}x{}: {error}",
            target.width, target.height,
        ))
    })
}

/// Copy plane 0 of a packed video frame into a tightly packed buffer,
/// dropping FFmpeg's per-row padding.
fn packed_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = width as usize * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * height as usize);
        for row in data.chunks(stride).take(height as usize) {
            buffer.extend_from_slice(&row[..row_length]);
        }
        buffer
    }
}
