//! Roboteye Preview - Terminal Dumps of the Eye Animator
//!
//! Drives the headless animator from a fixed-period loop and prints the frames
//! it selects, so animation timing can be checked without hardware.
//!
//! # Usage
//!
//! ```bash
//! # Scripted walk: idle, look left, idle, look right, manual blink
//! roboteye-preview sequence
//!
//! # Free-running playback for three seconds, paced in real time
//! roboteye-preview --bias=-0.8 play --duration-ms 3000 --realtime
//!
//! # Built-in animation table as JSON Lines
//! roboteye-preview --format json catalog
//!
//! # Validate and render a GIF export
//! roboteye-preview inspect animations/eye.json
//!
//! # Verbose logging (logs go to stderr)
//! RUST_LOG=roboteye_core=debug roboteye-preview sequence
//! ```
//!
//! # Configuration
//!
//! Settings come from `$XDG_CONFIG_HOME/roboteye/eye.toml`, then `ROBOTEYE_*`
//! environment variables, then the flags below.

mod output;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use roboteye_core::{
    default_config_path, default_phases, load_config_from_path, run_sequence, AnimationCatalog,
    AnimationDescriptor, AnimationId, ConfigOverrides, EyeAnimator, EyeConfig,
};

use output::Format;

/// Roboteye Preview - render eye animation frames in the terminal
#[derive(Parser, Debug)]
#[command(name = "roboteye-preview")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(
        short = 'c',
        long,
        env = "ROBOTEYE_CONFIG",
        value_name = "FILE",
        global = true
    )]
    config: Option<PathBuf>,

    /// Tick period in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    step_ms: Option<u32>,

    /// Disable autonomous blinking
    #[arg(long, global = true)]
    no_blink: bool,

    /// Milliseconds between autonomous blinks (0 = 1000)
    #[arg(long, value_name = "MS", global = true)]
    blink_interval_ms: Option<u32>,

    /// Horizontal gaze bias in [-1, 1]
    #[arg(
        long,
        value_name = "BIAS",
        allow_negative_numbers = true,
        global = true
    )]
    bias: Option<f32>,

    /// Animation the eye starts in
    #[arg(long, value_name = "NAME", global = true)]
    animation: Option<AnimationId>,

    /// Dump format
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = Format::Ascii,
        global = true
    )]
    format: Format,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short = 'l',
        long,
        env = "ROBOTEYE_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scripted five-phase sequence
    Sequence,

    /// Tick the animator for a fixed span of time
    Play {
        /// How much animation time to cover
        #[arg(long, value_name = "MS", default_value_t = 2000)]
        duration_ms: u64,

        /// Pace ticks with the wall clock (Ctrl-C stops early)
        #[arg(long)]
        realtime: bool,
    },

    /// List the built-in animations
    Catalog,

    /// Validate and render a JSON export from the GIF conversion tool
    Inspect {
        /// Path to the export
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(step) = self.step_ms {
            overrides = overrides.with_step_ms(step);
        }
        if self.no_blink {
            overrides = overrides.with_blink_enabled(false);
        }
        if let Some(interval) = self.blink_interval_ms {
            overrides = overrides.with_blink_interval_ms(interval);
        }
        if let Some(bias) = self.bias {
            overrides = overrides.with_bias(bias);
        }
        if let Some(id) = self.animation {
            overrides = overrides.with_default_animation(id);
        }
        overrides
    }
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so frame dumps on stdout stay clean.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "roboteye_preview={level},roboteye_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn load_settings(args: &Args) -> Result<EyeConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path.as_deref())
        .with_context(|| format!("Failed to load configuration from {path:?}"))?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid command-line settings")?;

    info!(
        source = %config.source(),
        step_ms = config.step_ms,
        blink = config.blink.enabled,
        bias = config.movement.bias,
        "Configuration resolved"
    );
    Ok(config)
}

fn run_scripted(config: &EyeConfig, format: Format) -> Result<()> {
    let mut animator = config.build_animator();
    let phases = default_phases();
    let steps = run_sequence(&mut animator, &phases, config.step_ms);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut remaining = steps.iter();
    for phase in &phases {
        output::write_phase_header(&mut out, format, &phase.label, phase.bias)?;
        for step in remaining.by_ref().take(phase.steps as usize) {
            output::write_sequence_step(&mut out, format, step)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn play_fixed(
    animator: &mut EyeAnimator,
    step_ms: u32,
    duration_ms: u64,
    format: Format,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut time_ms = 0u64;

    while time_ms <= duration_ms {
        let tick = animator.tick(step_ms);
        output::write_tick(&mut out, format, time_ms, &tick, &animator.snapshot())?;
        time_ms += u64::from(step_ms);
    }
    out.flush()?;
    Ok(())
}

fn millis(span: Duration) -> u64 {
    u64::try_from(span.as_millis()).unwrap_or(u64::MAX)
}

async fn play_realtime(
    animator: &mut EyeAnimator,
    step_ms: u32,
    duration_ms: u64,
    format: Format,
) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_millis(u64::from(step_ms)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let start = ticker.tick().await;
    let mut last = start;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let stdout = io::stdout();
    loop {
        let elapsed_ms = millis(last.duration_since(start));
        if elapsed_ms > duration_ms {
            break;
        }

        tokio::select! {
            now = ticker.tick() => {
                let delta = u32::try_from(millis(now.duration_since(last))).unwrap_or(u32::MAX);
                last = now;
                let tick = animator.tick(delta);
                let time_ms = elapsed_ms + u64::from(delta);
                let mut out = stdout.lock();
                output::write_tick(&mut out, format, time_ms, &tick, &animator.snapshot())?;
                out.flush()?;
            }
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, stopping playback");
                break;
            }
        }
    }
    Ok(())
}

fn inspect(path: &Path, format: Format) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor: {path:?}"))?;
    let descriptor = AnimationDescriptor::from_export_json(&json)
        .with_context(|| format!("Invalid descriptor: {path:?}"))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::write_descriptor(&mut out, format, &descriptor)?;
    out.flush()?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(?args, "Arguments parsed");

    match &args.command {
        Command::Catalog => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            output::write_catalog(&mut out, args.format, AnimationCatalog::builtin())?;
            out.flush()?;
        }
        Command::Inspect { path } => inspect(path, args.format)?,
        Command::Sequence => {
            let config = load_settings(&args)?;
            run_scripted(&config, args.format)?;
        }
        Command::Play {
            duration_ms,
            realtime,
        } => {
            let config = load_settings(&args)?;
            let mut animator = config.build_animator();
            if *realtime {
                play_realtime(&mut animator, config.step_ms, *duration_ms, args.format).await?;
            } else {
                play_fixed(&mut animator, config.step_ms, *duration_ms, args.format)?;
            }
        }
    }

    Ok(())
}
