//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring a conversion,
//! [`CancellationToken`] for cooperative cancellation, and [`ProgressInfo`]
//! for progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gifmaker::{
//!     ConversionOptions, Converter, GifMakerError, ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {} frames", info.operation, info.current);
//!     }
//! }
//!
//! let options = ConversionOptions::new().with_progress(Arc::new(PrintProgress));
//! Converter::new(options).create_gif("input.mp4", "output.gif")?;
//! # Ok::<(), GifMakerError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The conversion phase currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding and sampling source frames.
    Decoding,
    /// Writing frames into the animated GIF.
    Encoding,
}

/// A snapshot of conversion progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled by
/// [`ConversionOptions::with_batch_size`](crate::ConversionOptions::with_batch_size).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which phase is running.
    pub operation: OperationType,
    /// Frames processed so far in this phase.
    pub current: u64,
    /// Total frames expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the phase started.
    pub elapsed: Duration,
    /// Frames retained for the GIF so far.
    pub kept: u64,
}

/// Trait for receiving progress updates during a conversion.
///
/// Progress callbacks are **infallible**: they observe but cannot halt the
/// conversion. Use [`CancellationToken`] for that.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during each phase.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Default when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and call [`cancel`](CancellationToken::cancel) from any
/// thread; the converter checks it before every decoded and encoded frame.
///
/// # Example
///
/// ```
/// use gifmaker::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks one phase's counters and emits callbacks every `batch_size` items.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    kept: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            kept: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one processed frame, noting whether it was retained.
    pub(crate) fn advance(&mut self, kept: bool) {
        self.current += 1;
        if kept {
            self.kept += 1;
        }
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report for the phase.
    pub(crate) fn finish(&mut self) {
        self.report();
    }

    fn report(&self) {
        // Estimated totals can undershoot; never report more than 100%.
        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| ((self.current as f32 / total as f32) * 100.0).min(100.0));

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            kept: self.kept,
        };

        self.callback.on_progress(&info);
    }
}
