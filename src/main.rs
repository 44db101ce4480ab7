//! Lane Autopilot - lane keeping driver
//!
//! Pairs with the simulator, then runs the frame pipeline:
//!
//! ```text
//! replay ─▶ LaneSeeker ─▶ SteeringSmoother ─▶ ControlState ─▶ link-sender ─▶ vehicle
//!                                             VehicleState ◀─ link-receiver ◀─┘
//! ```
//!
//! Usage:
//!   lane-autopilot --segments drive.jsonl
//!   lane-autopilot -c autopilot.toml -s drive.jsonl --dry-run

use clap::Parser;
use lane_autopilot::config::AppConfig;
use lane_autopilot::core::source::FrameSource;
use lane_autopilot::error::{Error, Result};
use lane_autopilot::lane::{LaneSeeker, SteeringSmoother};
use lane_autopilot::link::{ControlState, VehicleLink, VehicleState};
use lane_autopilot::replay::SegmentReplay;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Vehicle speed/RPM log cadence
const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Lane keeping autopilot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults are used if it does not exist)
    #[arg(short, long, default_value = "autopilot.toml")]
    config: PathBuf,

    /// Segment replay file (JSON lines)
    #[arg(short, long)]
    segments: PathBuf,

    /// Replay rate in frames per second
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Pairing attempts before giving up
    #[arg(long, default_value = "3")]
    pair_attempts: u32,

    /// Run the pipeline without the vehicle link
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        AppConfig::from_file(&args.config)?
    } else {
        AppConfig::default()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Lane Autopilot v{} starting...", env!("CARGO_PKG_VERSION"));
    if args.config.exists() {
        log::info!("Using config: {}", args.config.display());
    } else {
        log::warn!("Config {} not found, using defaults", args.config.display());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut link = if args.dry_run {
        log::info!("Dry run: vehicle link disabled");
        None
    } else {
        Some(connect(&config, args.pair_attempts, &running)?)
    };

    let (control, vehicle) = match &link {
        Some(link) => (link.control(), link.vehicle()),
        None => (Arc::new(ControlState::new()), Arc::new(VehicleState::new())),
    };

    let result = drive(&args, &config, &running, &control, &vehicle);

    // Runs on every exit path of the pipeline; Drop would too
    if let Some(link) = link.as_mut()
        && let Err(e) = link.stop()
    {
        log::error!("Link shutdown failed: {}", e);
    }

    result
}

/// Bind, pair (retrying on timeout) and start the vehicle link
fn connect(config: &AppConfig, attempts: u32, running: &AtomicBool) -> Result<VehicleLink> {
    let mut link = VehicleLink::new(config.link.clone())?;

    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match link.pair() {
            Ok(()) => break,
            Err(Error::PairingTimeout { .. })
                if attempt < attempts && running.load(Ordering::Relaxed) =>
            {
                log::warn!("Pairing attempt {}/{} timed out, retrying", attempt, attempts);
            }
            Err(e) => return Err(e),
        }
    }

    link.start()?;
    Ok(link)
}

/// Frame loop: capture, seek, smooth, publish
fn drive(
    args: &Args,
    config: &AppConfig,
    running: &AtomicBool,
    control: &ControlState,
    vehicle: &VehicleState,
) -> Result<()> {
    let mut seeker = LaneSeeker::new(&config.vision, &config.estimator)?;
    let mut smoother = SteeringSmoother::new(config.steering.window, config.steering.scale);
    let mut replay = SegmentReplay::open(&args.segments, seeker.crop())?;

    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1)));
    control.set_throttle(config.steering.throttle);

    let mut frames: u64 = 0;
    let mut no_signal: u64 = 0;
    let mut last_status = Instant::now();

    log::info!("Lane Autopilot running. Press Ctrl-C to stop.");

    while running.load(Ordering::Relaxed) {
        let cycle_start = Instant::now();

        let Some(frame) = replay.capture()? else {
            log::info!("Replay finished");
            break;
        };

        let delta = match seeker.process_frame(&frame, &mut replay) {
            Ok(estimate) => estimate.delta,
            Err(e) => {
                log::warn!("Frame {} failed: {}", frames, e);
                None
            }
        };
        if delta.is_none() {
            no_signal += 1;
        }

        let steering = smoother.push(delta);
        control.set_steering(steering);
        frames += 1;

        log::debug!("Frame {}: delta={:?} steering={:.3}", frames, delta, steering);

        if last_status.elapsed() >= STATUS_INTERVAL {
            log::info!(
                "Speed {:.1} km/h, {} rpm, steering {:.3}",
                vehicle.speed(),
                vehicle.rpm(),
                control.steering()
            );
            last_status = Instant::now();
        }

        let elapsed = cycle_start.elapsed();
        if elapsed < frame_interval {
            thread::sleep(frame_interval - elapsed);
        }
    }

    log::info!("Processed {} frames ({} without lane signal)", frames, no_signal);
    Ok(())
}
