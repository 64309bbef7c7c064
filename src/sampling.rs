//! Fixed-interval frame sampling.
//!
//! [`FrameSampler`] decides which decoded frames end up in the GIF. The
//! interval is `source_rate / target_fps` using integer division, clamped to
//! a minimum of 1 so that target rates above the source rate keep every
//! frame instead of dividing by zero.

/// Keeps every Nth decoded frame, starting with decode index 0.
///
/// # Example
///
/// ```
/// use gifmaker::FrameSampler;
///
/// let sampler = FrameSampler::new(30, 10);
/// assert_eq!(sampler.interval(), 3);
/// assert!(sampler.keeps(0));
/// assert!(!sampler.keeps(1));
/// assert!(sampler.keeps(3));
/// assert_eq!(sampler.expected_kept(90), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSampler {
    interval: u64,
}

impl FrameSampler {
    /// Build a sampler from the source frame rate and the target frame rate.
    ///
    /// A `target_fps` of zero is treated like a rate above the source rate;
    /// callers validate it earlier through
    /// [`ConversionOptions::validate`](crate::ConversionOptions::validate).
    pub fn new(source_fps: u32, target_fps: u32) -> Self {
        let interval = source_fps.checked_div(target_fps).unwrap_or(0);
        Self::with_interval(u64::from(interval))
    }

    /// Build a sampler with an explicit interval (clamped to at least 1).
    pub fn with_interval(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    /// Number of decoded frames between two retained frames.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Returns `true` if the frame at `decode_index` is retained.
    pub fn keeps(&self, decode_index: u64) -> bool {
        decode_index % self.interval == 0
    }

    /// How many frames a source with `decoded_frames` frames yields.
    pub fn expected_kept(&self, decoded_frames: u64) -> u64 {
        decoded_frames.div_ceil(self.interval)
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::with_interval(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_uses_integer_division() {
        assert_eq!(FrameSampler::new(30, 10).interval(), 3);
        assert_eq!(FrameSampler::new(30, 7).interval(), 4);
        assert_eq!(FrameSampler::new(30, 30).interval(), 1);
        assert_eq!(FrameSampler::new(30, 1).interval(), 30);
    }

    #[test]
    fn rates_above_source_clamp_to_one() {
        assert_eq!(FrameSampler::new(30, 31).interval(), 1);
        assert_eq!(FrameSampler::new(30, 120).interval(), 1);
        assert_eq!(FrameSampler::new(30, 0).interval(), 1);
    }

    #[test]
    fn kept_count_matches_modulo_rule() {
        for interval in 1..=7 {
            let sampler = FrameSampler::with_interval(interval);
            for total in 0..50u64 {
                let counted = (0..total).filter(|&index| sampler.keeps(index)).count() as u64;
                assert_eq!(sampler.expected_kept(total), counted, "interval {interval}, total {total}");
            }
        }
    }

    #[test]
    fn thirty_fps_source_at_ten_fps() {
        let sampler = FrameSampler::new(30, 10);
        assert_eq!(sampler.expected_kept(90), 30);
        assert_eq!(FrameSampler::new(30, 30).expected_kept(90), 90);
    }

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(FrameSampler::with_interval(0).interval(), 1);
        assert_eq!(FrameSampler::default().interval(), 1);
    }
}
