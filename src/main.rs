// src/main.rs
mod app;
mod ui;

use clap::Parser;
use eframe::egui;
use gesture_control::dispatch::{KeyDispatcher, LogDispatcher};
use gesture_control::trace::TraceRecorder;
use gesture_control::video::{self, VideoSource};
use gesture_control::{ClassificationPolicy, EngineConfig};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gesture_control", version, about = "Hand gesture keyboard control")]
struct Cli {
    /// Classification policy
    #[arg(long, value_enum, default_value_t = ClassificationPolicy::Zone)]
    policy: ClassificationPolicy,

    /// Camera index
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// Run on a blank canvas and steer the simulated hand with the mouse
    #[arg(long)]
    no_camera: bool,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Motion dead-zone in pixels
    #[arg(long, default_value_t = 12.0)]
    move_threshold: f64,

    /// Minimum spacing between motion commands
    #[arg(long, default_value_t = 120)]
    cooldown_ms: u64,

    /// Centre dwell before the zone policy activates
    #[arg(long, default_value_t = 2000)]
    dwell_ms: u64,

    /// Grace period after activation
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// Log key presses instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Record the landmark stream to a trace CSV
    #[arg(long)]
    record: Option<PathBuf>,

    /// List cameras and exit
    #[arg(long)]
    list_cameras: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            policy: self.policy,
            move_threshold: self.move_threshold,
            cooldown: Duration::from_millis(self.cooldown_ms),
            dwell: Duration::from_millis(self.dwell_ms),
            settle: Duration::from_millis(self.settle_ms),
        }
    }
}

#[cfg(feature = "uinput")]
fn key_dispatcher(dry_run: bool) -> Box<dyn KeyDispatcher> {
    use gesture_control::dispatch::UinputDispatcher;

    if dry_run {
        return Box::new(LogDispatcher::new());
    }

    match UinputDispatcher::new() {
        Ok(dispatcher) => Box::new(dispatcher),
        Err(e) => {
            warn!("Virtual keyboard unavailable ({}), logging key presses instead", e);
            Box::new(LogDispatcher::new())
        }
    }
}

#[cfg(not(feature = "uinput"))]
fn key_dispatcher(dry_run: bool) -> Box<dyn KeyDispatcher> {
    if !dry_run {
        warn!("Built without the uinput feature, logging key presses instead");
    }
    Box::new(LogDispatcher::new())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_control=info".into()),
        )
        .init();

    if cli.list_cameras {
        let cameras = video::list_cameras()?;
        println!("Found {} camera(s):", cameras.len());
        for camera in &cameras {
            println!("  [{}] {} ({})", camera.index, camera.name, camera.description);
        }
        return Ok(());
    }

    info!("gesture_control v{} starting", env!("CARGO_PKG_VERSION"));

    let video_source = if cli.no_camera {
        info!("No camera: simulated hand follows the mouse");
        VideoSource::blank(cli.width, cli.height)
    } else {
        VideoSource::new_camera(cli.camera, cli.width, cli.height, cli.fps)?
    };

    let config = cli.engine_config();
    let dispatcher = key_dispatcher(cli.dry_run);
    let recording = match &cli.record {
        Some(path) => Some(TraceRecorder::<File>::create(path)?),
        None => None,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 800.0])
            .with_min_inner_size([480.0, 400.0]),
        centered: true,
        ..Default::default()
    };

    eframe::run_native(
        "Gesture Control",
        options,
        Box::new(move |cc| {
            Box::new(app::GestureControlApp::new(
                cc,
                video_source,
                config,
                dispatcher,
                recording,
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Error running application: {}", e))?;

    info!("Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuning_constants() {
        let cli = Cli::parse_from(["gesture_control"]);
        let config = cli.engine_config();
        let defaults = EngineConfig::default();

        assert_eq!(config.policy, ClassificationPolicy::Zone);
        assert_eq!(config.move_threshold, defaults.move_threshold);
        assert_eq!(config.cooldown, defaults.cooldown);
        assert_eq!(config.dwell, defaults.dwell);
        assert_eq!(config.settle, defaults.settle);
        assert_eq!((cli.width, cli.height, cli.fps), (640, 480, 30));
    }

    #[test]
    fn motion_flags_parse() {
        let cli = Cli::parse_from([
            "gesture_control",
            "--policy",
            "motion",
            "--no-camera",
            "--cooldown-ms",
            "200",
            "--move-threshold",
            "20",
        ]);

        assert!(cli.no_camera);
        let config = cli.engine_config();
        assert_eq!(config.policy, ClassificationPolicy::Motion);
        assert_eq!(config.cooldown, Duration::from_millis(200));
        assert_eq!(config.move_threshold, 20.0);
    }
}
