use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use colored::Colorize;
use gifmaker::{
    ConversionOptions, ConversionSummary, Converter, DEFAULT_FPS, DEFAULT_SOURCE_FPS,
    DEFAULT_TARGET_SIZE, FfmpegLogLevel, OperationType, ProgressCallback, ProgressInfo,
    SourceFrameRate,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  gifmaker demo.mp4 demo.gif\n  gifmaker demo.mp4 demo.gif --width 480 --height 270 --fps 15 --progress\n  gifmaker demo.mp4 demo.gif --source-fps auto --json";

#[derive(Debug, Parser)]
#[command(
    name = "gifmaker",
    version,
    about = "Convert a video into a looping animated GIF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input video path.
    input: PathBuf,

    /// Output GIF path (overwritten if it exists).
    output: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = DEFAULT_TARGET_SIZE.width)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = DEFAULT_TARGET_SIZE.height)]
    height: u32,

    /// Output frames per second.
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Source frame rate used for sampling: a number, or `auto` to read it
    /// from the stream.
    #[arg(
        long,
        default_value_t = SourceFrameRate::Assumed(DEFAULT_SOURCE_FPS),
        value_parser = parse_source_fps
    )]
    source_fps: SourceFrameRate,

    /// Write every frame in full instead of only the changed region.
    #[arg(long)]
    no_optimize: bool,

    /// Loop count; omit to loop forever.
    #[arg(long)]
    repeat: Option<u16>,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Print the conversion summary as JSON.
    #[arg(long)]
    json: bool,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    ffmpeg_log_level: Option<String>,
}

fn parse_source_fps(value: &str) -> Result<SourceFrameRate, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" | "probe" => Ok(SourceFrameRate::Probed),
        number => number
            .parse::<u32>()
            .ok()
            .filter(|fps| *fps > 0)
            .map(SourceFrameRate::Assumed)
            .ok_or_else(|| format!("expected a positive frame rate or `auto`, got `{value}`")),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{msg:>9} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("=> "));
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let label = match info.operation {
            OperationType::Decoding => "decoding",
            OperationType::Encoding => "encoding",
            _ => "working",
        };
        self.bar.set_message(label);
        self.bar
            .set_length(info.total.unwrap_or(info.current).max(info.current));
        self.bar.set_position(info.current);
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn build_options(cli: &Cli) -> ConversionOptions {
    let mut options = ConversionOptions::new()
        .with_target_size(cli.width, cli.height)
        .with_fps(cli.fps)
        .with_source_frame_rate(cli.source_fps)
        .with_optimize(!cli.no_optimize)
        .with_repeat(cli.repeat);

    if cli.progress {
        options = options
            .with_progress(Arc::new(TerminalProgress::new()))
            .with_batch_size(5);
    }

    options
}

fn print_summary(summary: &ConversionSummary, as_json: bool) {
    if as_json {
        let payload = json!({
            "output": summary.output_path.display().to_string(),
            "decoded_frames": summary.decoded_frames,
            "kept_frames": summary.kept_frames,
            "sampling_interval": summary.sampling_interval,
            "frame_delay_ms": summary.frame_delay_ms,
            "width": summary.frame_size.width,
            "height": summary.frame_size.height,
            "size_bytes": summary.output_size_bytes,
        });
        println!("{payload}");
    } else {
        println!(
            "{} {} ({} frames, {:.2}MB)",
            "created".green().bold(),
            summary.output_path.display(),
            summary.kept_frames,
            summary.output_size_megabytes(),
        );
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &cli.ffmpeg_log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        gifmaker::set_ffmpeg_log_level(parsed);
    }

    let options = build_options(cli);
    let summary = Converter::new(options).create_gif(&cli.input, &cli.output)?;
    print_summary(&summary, cli.json);
    Ok(())
}

// Failures are reported but do not change the exit status.
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(&cli) {
        eprintln!("{} {error}", "Error creating GIF:".red().bold());
    }
}
