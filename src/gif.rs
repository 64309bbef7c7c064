//! Animated GIF encoding.
//!
//! This module provides [`GifSettings`] and the encoding functions used by
//! [`Converter::create_gif`](crate::Converter::create_gif). Every frame is
//! quantized to its own 256-colour palette with the `gif` crate's NeuQuant
//! quantiser.
//!
//! With optimization enabled, each frame after the first only stores the
//! rectangle that changed since the previous frame. Unchanged pixels inside
//! that rectangle are written as transparent and frames use "keep"
//! disposal, so decoders composite them over the previous frame.
//!
//! # Example
//!
//! ```no_run
//! use gifmaker::{ChannelOrder, Frame, GifMakerError, GifSettings, encode_gif};
//!
//! let frames = vec![Frame::new(2, 2, ChannelOrder::Rgb, vec![255; 12])?];
//! let settings = GifSettings::new().frame_delay_ms(100);
//! encode_gif("output.gif", &frames, &settings)?;
//! # Ok::<(), GifMakerError>(())
//! ```

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gif::{DisposalMethod, Encoder, Frame as GifFrame, Repeat};

use crate::error::GifMakerError;
use crate::frame::{ChannelOrder, Frame};

/// NeuQuant sampling factor (1 = slowest / best, 30 = fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Configuration for animated GIF output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifSettings {
    /// Display time of each frame in milliseconds.
    pub frame_delay_ms: u32,
    /// How many times the animation repeats. `None` loops forever.
    pub repeat: Option<u16>,
    /// Store only changed regions of each frame.
    pub optimize: bool,
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            frame_delay_ms: 100,
            repeat: None,
            optimize: true,
        }
    }
}

impl GifSettings {
    /// Create settings with the defaults: 100 ms, infinite loop, optimized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-frame display time in milliseconds.
    pub fn frame_delay_ms(mut self, delay: u32) -> Self {
        self.frame_delay_ms = delay;
        self
    }

    /// Set the repeat count. `None` means loop forever.
    pub fn repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Enable or disable changed-region optimization.
    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// The delay as stored in the file, in hundredths of a second.
    ///
    /// GIF delays have 10 ms resolution; the millisecond value is truncated.
    pub fn delay_centiseconds(&self) -> u16 {
        u16::try_from(self.frame_delay_ms / 10).unwrap_or(u16::MAX)
    }
}

/// Encode a sequence of frames as an animated GIF at `path`, replacing any
/// existing file.
///
/// # Errors
///
/// Returns [`GifMakerError::GifEncodeError`] if `frames` is empty, frames
/// differ in size, or the encoder fails, and [`GifMakerError::IoError`] if
/// the file cannot be written.
pub fn encode_gif<P: AsRef<Path>>(
    path: P,
    frames: &[Frame],
    settings: &GifSettings,
) -> Result<(), GifMakerError> {
    log::debug!(
        "Encoding {} frames to GIF file {:?} (delay={}ms, optimize={})",
        frames.len(),
        path.as_ref(),
        settings.frame_delay_ms,
        settings.optimize,
    );
    let first = frames
        .first()
        .ok_or_else(|| GifMakerError::GifEncodeError("no frames to encode".to_string()))?;

    let file = File::create(path.as_ref())?;
    let mut writer =
        GifWriter::new(BufWriter::new(file), first.width(), first.height(), settings)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    writer.finish()?.flush()?;
    Ok(())
}

/// Encode a sequence of frames as an animated GIF into memory.
///
/// # Errors
///
/// Same as [`encode_gif`], minus file I/O.
pub fn encode_gif_to_memory(
    frames: &[Frame],
    settings: &GifSettings,
) -> Result<Vec<u8>, GifMakerError> {
    let first = frames
        .first()
        .ok_or_else(|| GifMakerError::GifEncodeError("no frames to encode".to_string()))?;

    let mut writer = GifWriter::new(Vec::new(), first.width(), first.height(), settings)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    writer.finish()
}

/// Incremental GIF writer: header on creation, one call per frame, trailer
/// on [`finish`](GifWriter::finish).
pub(crate) struct GifWriter<W: Write> {
    encoder: Encoder<W>,
    width: u32,
    height: u32,
    delay: u16,
    optimize: bool,
    /// RGBA pixels of the last written frame, kept only when optimizing.
    previous: Option<Vec<u8>>,
}

impl<W: Write> GifWriter<W> {
    pub(crate) fn new(
        writer: W,
        width: u32,
        height: u32,
        settings: &GifSettings,
    ) -> Result<Self, GifMakerError> {
        let (screen_width, screen_height) = gif_dimensions(width, height)?;

        let mut encoder =
            Encoder::new(writer, screen_width, screen_height, &[]).map_err(|e| {
                GifMakerError::GifEncodeError(format!("Failed to create GIF encoder: {e}"))
            })?;

        let repeat = match settings.repeat {
            None => Repeat::Infinite,
            Some(count) => Repeat::Finite(count),
        };
        encoder.set_repeat(repeat).map_err(|e| {
            GifMakerError::GifEncodeError(format!("Failed to set GIF repeat: {e}"))
        })?;

        Ok(Self {
            encoder,
            width,
            height,
            delay: settings.delay_centiseconds(),
            optimize: settings.optimize,
            previous: None,
        })
    }

    pub(crate) fn write_frame(&mut self, frame: &Frame) -> Result<(), GifMakerError> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(GifMakerError::GifEncodeError(format!(
                "frame is {}x{} but the animation is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height,
            )));
        }

        let current = rgba_pixels(frame);

        let mut gif_frame = match self.previous.as_deref() {
            Some(previous) if self.optimize => self.difference_frame(previous, &current),
            _ => {
                let mut pixels = current.clone();
                let (width, height) = gif_dimensions(self.width, self.height)?;
                GifFrame::from_rgba_speed(width, height, &mut pixels, QUANTIZER_SPEED)
            }
        };
        gif_frame.delay = self.delay;
        if self.optimize {
            gif_frame.dispose = DisposalMethod::Keep;
        }

        self.encoder.write_frame(&gif_frame).map_err(|e| {
            GifMakerError::GifEncodeError(format!("Failed to write GIF frame: {e}"))
        })?;

        if self.optimize {
            self.previous = Some(current);
        }
        Ok(())
    }

    /// Write the trailer and hand back the underlying writer.
    pub(crate) fn finish(self) -> Result<W, GifMakerError> {
        self.encoder
            .into_inner()
            .map_err(|e| GifMakerError::GifEncodeError(format!("Failed to finish GIF: {e}")))
    }

    fn difference_frame(&self, previous: &[u8], current: &[u8]) -> GifFrame<'static> {
        let Some(region) = changed_region(previous, current, self.width, self.height) else {
            // Nothing changed: a single transparent pixel keeps the frame's
            // slot and timing.
            let mut pixels = [0u8; 4];
            return GifFrame::from_rgba_speed(1, 1, &mut pixels, QUANTIZER_SPEED);
        };

        // Unchanged pixels keep their colour while the palette is built and
        // only become transparent afterwards, so no visible pixel can end up
        // on the transparent index.
        let pixel_count = region.width as usize * region.height as usize;
        let mut pixels = Vec::with_capacity(pixel_count * 4);
        let mut changed = Vec::with_capacity(pixel_count);
        for y in region.top..region.top + region.height {
            let row_start = (y as usize * self.width as usize + region.left as usize) * 4;
            let row_end = row_start + region.width as usize * 4;
            for (old, new) in previous[row_start..row_end]
                .chunks_exact(4)
                .zip(current[row_start..row_end].chunks_exact(4))
            {
                pixels.extend_from_slice(new);
                changed.push(old != new);
            }
        }

        // Region bounds come from the frame size, which already fits in u16.
        let mut gif_frame = GifFrame::from_rgba_speed(
            region.width as u16,
            region.height as u16,
            &mut pixels,
            QUANTIZER_SPEED,
        );
        mark_unchanged_transparent(&mut gif_frame, &changed);
        gif_frame.left = region.left as u16;
        gif_frame.top = region.top as u16;
        gif_frame
    }
}

/// A rectangle within a frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region {
    pub(crate) left: u32,
    pub(crate) top: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Smallest rectangle containing every pixel that differs between two RGBA
/// buffers of the same size, or `None` if they are identical.
pub(crate) fn changed_region(
    previous: &[u8],
    current: &[u8],
    width: u32,
    height: u32,
) -> Option<Region> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for y in 0..height {
        let row_start = y as usize * width as usize * 4;
        let row_end = row_start + width as usize * 4;
        let old_row = &previous[row_start..row_end];
        let new_row = &current[row_start..row_end];
        if old_row == new_row {
            continue;
        }

        let differs = |x: &usize| old_row[x * 4..x * 4 + 4] != new_row[x * 4..x * 4 + 4];
        let Some(first) = (0..width as usize).find(differs) else {
            continue;
        };
        let last = (0..width as usize).rev().find(differs).unwrap_or(first);
        let (first, last) = (first as u32, last as u32);

        bounds = Some(match bounds {
            None => (first, y, last, y),
            Some((left, top, right, _)) => (left.min(first), top, right.max(last), y),
        });
    }

    bounds.map(|(left, top, right, bottom)| Region {
        left,
        top,
        width: right - left + 1,
        height: bottom - top + 1,
    })
}

/// Point every unchanged pixel at a palette entry that no changed pixel
/// uses, and mark that entry transparent.
///
/// A palette with fewer than 256 colours gets a new entry. A full palette
/// gives up the entry used by the fewest changed pixels, and those pixels
/// move to the nearest remaining colour.
fn mark_unchanged_transparent(frame: &mut GifFrame<'static>, changed: &[bool]) {
    let mut palette = frame.palette.take().unwrap_or_default();
    let mut indices = frame.buffer.to_vec();

    let transparent = if palette.len() / 3 < 256 {
        let slot = (palette.len() / 3) as u8;
        palette.extend_from_slice(&[0, 0, 0]);
        slot
    } else {
        let mut usage = [0usize; 256];
        for (&index, _) in indices.iter().zip(changed).filter(|(_, is_changed)| **is_changed) {
            usage[usize::from(index)] += 1;
        }
        let victim = (0..=u8::MAX)
            .min_by_key(|&index| usage[usize::from(index)])
            .unwrap_or(0);
        if usage[usize::from(victim)] > 0 {
            let replacement = nearest_entry(&palette, victim);
            for (index, _) in indices
                .iter_mut()
                .zip(changed)
                .filter(|(index, is_changed)| **is_changed && **index == victim)
            {
                *index = replacement;
            }
        }
        victim
    };

    for (index, is_changed) in indices.iter_mut().zip(changed) {
        if !*is_changed {
            *index = transparent;
        }
    }

    frame.buffer = Cow::Owned(indices);
    frame.palette = Some(palette);
    frame.transparent = Some(transparent);
}

/// Closest other palette entry to `target` by squared RGB distance.
fn nearest_entry(palette: &[u8], target: u8) -> u8 {
    let offset = usize::from(target) * 3;
    let color = &palette[offset..offset + 3];
    palette
        .chunks_exact(3)
        .enumerate()
        .filter(|(index, _)| *index != usize::from(target))
        .min_by_key(|(_, entry)| {
            entry
                .iter()
                .zip(color)
                .map(|(a, b)| (i32::from(*a) - i32::from(*b)).pow(2))
                .sum::<i32>()
        })
        .map_or(target, |(index, _)| index as u8)
}

fn gif_dimensions(width: u32, height: u32) -> Result<(u16, u16), GifMakerError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => Ok((width, height)),
        _ => Err(GifMakerError::InvalidSize { width, height }),
    }
}

/// Expand a 3-channel frame to opaque RGBA, honouring its channel order.
fn rgba_pixels(frame: &Frame) -> Vec<u8> {
    let (red, blue) = match frame.channel_order() {
        ChannelOrder::Rgb => (0, 2),
        ChannelOrder::Bgr => (2, 0),
    };
    let mut rgba = Vec::with_capacity(frame.data().len() / 3 * 4);
    for pixel in frame.data().chunks_exact(3) {
        rgba.extend_from_slice(&[pixel[red], pixel[1], pixel[blue], 255]);
    }
    rgba
}
