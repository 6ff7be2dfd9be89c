//! # Swarm Replay CLI
//!
//! The `swarm-replay` binary turns a scenario and a recorded trace into a
//! video:
//!
//! ```text
//! swarm-replay --scenario scenario.json --trace trace.json --output run.mp4
//! ```
//!
//! Logging goes to stderr through `tracing`; `RUST_LOG` overrides
//! `--log-level`.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use swarm_replay_core::{
    PlaybackConfig, PlaybackDriver, Scenario, TraceFormat, TraceStream, VideoSink, TRAIL_WINDOW,
};
use tracing::info;

/// Swarm Replay - render a recorded swarm run as a video
#[derive(Parser, Debug)]
#[command(name = "swarm-replay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Scenario document (area, agents, tasks)
    #[arg(long, value_name = "FILE")]
    scenario: PathBuf,

    /// Trace file (document or newline-delimited frames)
    #[arg(long, value_name = "FILE")]
    trace: PathBuf,

    /// Video file to write
    #[arg(short, long, value_name = "FILE", default_value = "simulation.mp4")]
    output: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 1000)]
    height: u32,

    /// Frame rate override (default: real trace time)
    #[arg(long)]
    fps: Option<u32>,

    /// Trace layout
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    format: FormatArg,

    /// ffmpeg binary used for encoding
    #[arg(long, env = "SWARM_REPLAY_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SWARM_REPLAY_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Auto,
    Document,
    Lines,
}

impl FormatArg {
    fn forced(self) -> Option<TraceFormat> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Document => Some(TraceFormat::Document),
            FormatArg::Lines => Some(TraceFormat::Lines),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let scenario = Scenario::from_path(&cli.scenario)
        .with_context(|| format!("Failed to load scenario {}", cli.scenario.display()))?;
    info!(
        title = %scenario.title(),
        agents = scenario.num_agents(),
        tasks = scenario.tasks().len(),
        "scenario loaded"
    );

    let trace = TraceStream::open_with_format(&cli.trace, cli.format.forced())
        .with_context(|| format!("Failed to open trace {}", cli.trace.display()))?;
    info!(format = ?trace.format(), path = %cli.trace.display(), "trace opened");

    let config = PlaybackConfig {
        output: cli.output,
        width: cli.width,
        height: cli.height,
        fps: cli.fps,
        ffmpeg: cli.ffmpeg,
        trail_window: TRAIL_WINDOW,
    };
    let mut sink = VideoSink::new(&scenario, &config);
    let driver = PlaybackDriver::new(config);

    println!("Saving video to {}...", driver.config().output.display());
    let summary = driver
        .run(&scenario, &trace, &mut sink)
        .context("Playback failed")?;
    info!(
        frames = summary.frames,
        fps = summary.fps,
        completed = summary.final_phases.completed,
        missed = summary.final_phases.missed,
        "replay complete"
    );
    println!("Done.");

    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
