//! Biometric Art CLI
//!
//! Runs a live session against the simulated collector and prints what the
//! classifier sees.

use anyhow::Context;
use biometric_art::{
    collector::{Collector, CollectorConfig, TypingProfile},
    config::Config,
    core::{classify, Activity, MouseMetrics, Rhythm, TypingMetrics},
    heart::{CaptureDevice, NoCaptureDevice, SimulatedCamera},
    Session, CAPTURE_DECLARATION, VERSION,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant};

#[derive(Parser)]
#[command(name = "biometric-art")]
#[command(version = VERSION)]
#[command(about = "Live particle art driven by typing, pointer motion and heart rate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live session with simulated input
    Run {
        /// Stop after this many seconds (runs until Ctrl+C otherwise)
        #[arg(long)]
        duration: Option<u64>,

        /// Seed for every random generator in the session
        #[arg(long)]
        seed: Option<u64>,

        /// Heart rate camera to try before falling back to simulation
        #[arg(long, value_enum, default_value_t = CameraChoice::Simulated)]
        camera: CameraChoice,

        /// Kind of typist the simulated collector imitates
        #[arg(long, default_value = "focused")]
        profile: TypingProfile,

        /// Write the final canvas as a binary PPM image
        #[arg(long)]
        export: Option<PathBuf>,

        /// Append one JSON snapshot per second to this file
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Read configuration from this file instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Classify one set of readings
    Classify {
        #[arg(long)]
        heart_rate: f64,

        #[arg(long, default_value = "steady")]
        rhythm: Rhythm,

        #[arg(long, default_value_t = 0.5)]
        intensity: f64,

        /// Pointer speed in px/ms
        #[arg(long, default_value_t = 0.0)]
        speed: f64,

        #[arg(long, default_value_t = 0.5)]
        smoothness: f64,
    },

    /// Display capture declaration
    Privacy,

    /// Show configuration
    Config,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CameraChoice {
    Simulated,
    None,
}

struct RunOptions {
    duration: Option<u64>,
    seed: Option<u64>,
    camera: CameraChoice,
    profile: TypingProfile,
    export: Option<PathBuf>,
    snapshots: Option<PathBuf>,
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            duration,
            seed,
            camera,
            profile,
            export,
            snapshots,
            config,
        } => {
            cmd_run(RunOptions {
                duration,
                seed,
                camera,
                profile,
                export,
                snapshots,
                config,
            })
            .await
        }
        Commands::Classify {
            heart_rate,
            rhythm,
            intensity,
            speed,
            smoothness,
        } => {
            cmd_classify(heart_rate, rhythm, intensity, speed, smoothness);
            Ok(())
        }
        Commands::Privacy => {
            println!("{CAPTURE_DECLARATION}");
            Ok(())
        }
        Commands::Config => cmd_config(),
    }
}

async fn cmd_run(options: RunOptions) -> anyhow::Result<()> {
    println!("Biometric Art v{VERSION}");
    println!();

    let mut config = match &options.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().context("failed to load config")?,
    };
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let device: Arc<dyn CaptureDevice> = match options.camera {
        CameraChoice::Simulated => Arc::new(SimulatedCamera::new(config.seed)),
        CameraChoice::None => Arc::new(NoCaptureDevice),
    };

    let canvas = config.canvas;
    let mut session = Session::new(config.clone(), device)?;
    println!("Session ID: {}", session.session_id());

    let mut snapshot_file = match &options.snapshots {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Some(std::io::BufWriter::new(file))
        }
        None => None,
    };

    let mut collector = Collector::new(
        CollectorConfig {
            profile: options.profile,
            width: canvas.width as f64,
            height: canvas.height as f64,
            seed: config.seed,
            ..CollectorConfig::default()
        },
        session.input_sender(),
    );

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    let source = session.activate().await;
    collector.start()?;

    println!("  Heart rate source: {source}");
    println!("  Typing profile: {:?}", collector.profile());
    println!("  Canvas: {}x{}", canvas.width, canvas.height);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let started = Instant::now();
    let limit = options.duration.map(Duration::from_secs);
    let mut ticker = interval(Duration::from_millis(100));
    let mut last_status = 0;

    while running.load(Ordering::SeqCst) {
        ticker.tick().await;
        let elapsed = started.elapsed();
        if limit.is_some_and(|limit| elapsed >= limit) {
            break;
        }

        let secs = elapsed.as_secs();
        if secs > last_status {
            last_status = secs;
            println!("[{}] {}", format_clock(elapsed), status_line(&session));

            if let Some(out) = snapshot_file.as_mut() {
                writeln!(out, "{}", session.snapshot_json())?;
            }
        }
    }

    println!();
    println!("Stopping...");
    collector.stop();
    session.deactivate().await?;

    if let Some(mut out) = snapshot_file {
        out.flush()?;
    }

    if let Some(path) = &options.export {
        if let Some(raster) = session.raster() {
            std::fs::write(path, raster.to_ppm())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported canvas to {}", path.display());
        }
    }

    println!();
    println!("{}", session.log().summary());
    Ok(())
}

fn status_line(session: &Session) -> String {
    let readings = session.readings();
    format!(
        "Current Emotion: {} | Heart Rate: {} BPM | Typing: {} WPM | Mouse: {}",
        session.emotion(),
        readings.heart_rate.round(),
        readings.typing.words_per_minute,
        readings.mouse.activity
    )
}

/// Session time as `mm:ss`.
fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn cmd_classify(heart_rate: f64, rhythm: Rhythm, intensity: f64, speed: f64, smoothness: f64) {
    let typing = TypingMetrics {
        words_per_minute: (intensity * 100.0).round().max(0.0) as u32,
        rhythm,
        intensity,
    };
    let mouse = MouseMetrics {
        speed,
        smoothness,
        activity: Activity::from_speed(speed),
    };

    let label = classify(heart_rate, &typing, &mouse);
    println!("{label} ({})", label.hex_color());
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load()?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl+C handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::from_secs(0)), "00:00");
        assert_eq!(format_clock(Duration::from_secs(75)), "01:15");
        assert_eq!(format_clock(Duration::from_millis(3_599_999)), "59:59");
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "biometric-art",
            "run",
            "--duration",
            "5",
            "--camera",
            "none",
            "--profile",
            "relaxed",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                duration,
                camera,
                profile,
                ..
            } => {
                assert_eq!(duration, Some(5));
                assert!(camera == CameraChoice::None);
                assert_eq!(profile, TypingProfile::Relaxed);
            }
            _ => panic!("expected run"),
        }
    }
}
