//! retouch - tone-curve CLI
//!
//! Builds tone LUTs from control points, maps raw pixel buffers through
//! them, and replays control-point edits.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "retouch")]
#[command(author, version, about = "Tone-curve LUT builder and pixel mapper")]
#[command(long_about = "
Builds 100-sample tone LUTs from control points and applies them to
already-decoded pixel buffers.

Examples:
  retouch lut -p 0.5,0.8                         # Lift the midtones
  retouch lut --preset s-curve.yaml --format json
  retouch apply photo.raw -o out.raw -W 640 -H 480 -c 3 -p 0.5,0.8
  retouch apply photo16.raw -o out.raw -W 640 -H 480 --depth 16 --preset look.yaml
  retouch edit add:0.25,0.2 add:0.75,0.85 move:pt-1:0.3,0.15 --save s-curve.yaml
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the 100-sample LUT for a curve
    #[command(visible_alias = "l")]
    Lut(LutArgs),

    /// Map a raw interleaved pixel buffer through a curve
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// Replay control-point edits and print the result
    #[command(visible_alias = "e")]
    Edit(EditArgs),
}

/// Curve definition shared by all commands.
#[derive(Args, Clone, Default)]
struct CurveArgs {
    /// Curve preset (YAML)
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Extra control point `x,y` (repeatable), added on top of the preset
    #[arg(short = 'p', long = "point", value_name = "X,Y")]
    points: Vec<String>,

    /// Spline: natural, cardinal, catmull-rom or cardinal:<tension>
    #[arg(long)]
    spline: Option<String>,

    /// Cardinal tension (overrides the preset)
    #[arg(long)]
    tension: Option<f32>,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// One `index input output` line per sample
    #[default]
    Text,
    /// JSON report with points and samples
    Json,
}

#[derive(Args)]
struct LutArgs {
    #[command(flatten)]
    curve: CurveArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Args)]
struct ApplyArgs {
    /// Input raw sample file (interleaved, row-major)
    input: PathBuf,

    /// Output raw sample file
    #[arg(short, long)]
    output: PathBuf,

    /// Width in pixels
    #[arg(short = 'W', long)]
    width: u32,

    /// Height in pixels
    #[arg(short = 'H', long)]
    height: u32,

    /// Channels per pixel (1-4)
    #[arg(short, long, default_value = "3")]
    channels: usize,

    /// Bits per sample: 8, or 16 (little-endian)
    #[arg(short, long, default_value = "8", value_parser = ["8", "16"])]
    depth: String,

    #[command(flatten)]
    curve: CurveArgs,

    /// Red channel preset (applied before the master curve)
    #[arg(long)]
    red: Option<PathBuf>,

    /// Green channel preset
    #[arg(long)]
    green: Option<PathBuf>,

    /// Blue channel preset
    #[arg(long)]
    blue: Option<PathBuf>,

    /// Map on a background worker thread
    #[arg(long)]
    background: bool,
}

#[derive(Args)]
struct EditArgs {
    /// Edit ops: add:X,Y  move:ID:X,Y  remove:ID  reset  spline:KIND
    ops: Vec<String>,

    #[command(flatten)]
    curve: CurveArgs,

    /// Write the final curve as a YAML preset
    #[arg(long)]
    save: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

/// Installs the global subscriber. The returned guard flushes the log file
/// on drop and must live until exit.
fn init_logging(verbose: u8, log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_ref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Lut(args) => commands::lut::run(args),
        Commands::Apply(args) => commands::apply::run(args, cli.verbose),
        Commands::Edit(args) => commands::edit::run(args),
    }
}
