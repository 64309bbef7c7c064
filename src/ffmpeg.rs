//! FFmpeg console verbosity.
//!
//! FFmpeg prints its own warnings to stderr independently of the Rust `log`
//! facade. Decoding a slightly damaged file can be noisy, so the CLI and
//! library users can tune it here without importing `ffmpeg-next`.
//!
//! ```no_run
//! use gifmaker::FfmpegLogLevel;
//!
//! gifmaker::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log level, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions after which FFmpeg aborts.
    Panic,
    /// Unrecoverable errors that leave the context unusable.
    Fatal,
    /// Recoverable errors, such as a damaged packet.
    Error,
    /// Warnings. FFmpeg's own default.
    Warning,
    /// Informational messages, including stream summaries.
    Info,
    /// More detailed informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Per-packet tracing. Extremely noisy.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(format!("unknown FFmpeg log level: {other}")),
        }
    }
}

/// Set what FFmpeg prints to stderr. Does not affect `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Error".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Error));
        assert_eq!("warn".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Warning));
        assert_eq!("QUIET".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Quiet));
        assert!("loud".parse::<FfmpegLogLevel>().is_err());
    }
}
