use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};
use clap::Parser;
use gesture_control::dispatch::LogDispatcher;
use gesture_control::trace::load_trace;
use gesture_control::{ClassificationPolicy, Command, EngineConfig, FrameDimensions, GestureEngine};
use serde::Serialize;
use tracing::info;

/// Replays a recorded landmark trace through the gesture engine.
#[derive(Parser, Debug)]
#[command(name = "replay_trace")]
struct Cli {
    /// Trace CSV (time,hand,x0,y0,...,x20,y20)
    trace: PathBuf,

    #[arg(long, value_enum, default_value_t = ClassificationPolicy::Zone)]
    policy: ClassificationPolicy,

    /// Frame size the normalized landmarks are scaled to
    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    #[arg(long, default_value_t = 12.0)]
    move_threshold: f64,

    #[arg(long, default_value_t = 120)]
    cooldown_ms: u64,

    #[arg(long, default_value_t = 2000)]
    dwell_ms: u64,

    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// One JSON object per emitted command
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Emission {
    frame: usize,
    time: f64,
    command: Command,
    key: Option<&'static str>,
    point: Option<(f64, f64)>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_control=warn,replay_trace=info".into()),
        )
        .init();

    ensure!(cli.width > 0 && cli.height > 0, "Frame size must be non-zero");

    let frames = load_trace(&cli.trace)?;
    info!("Replaying {} frames from {:?}", frames.len(), cli.trace);

    let config = EngineConfig {
        policy: cli.policy,
        move_threshold: cli.move_threshold,
        cooldown: Duration::from_millis(cli.cooldown_ms),
        dwell: Duration::from_millis(cli.dwell_ms),
        settle: Duration::from_millis(cli.settle_ms),
    };
    let dims = FrameDimensions::new(cli.width, cli.height);
    let mut engine = GestureEngine::new(config, dims, LogDispatcher::new());

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for (idx, frame) in frames.iter().enumerate() {
        let report = engine.process_frame(frame.landmarks.as_ref(), frame.time);
        let Some(command) = report.dispatched else {
            continue;
        };

        *counts.entry(command.label()).or_default() += 1;

        let emission = Emission {
            frame: idx,
            time: frame.time.as_secs_f64(),
            command,
            key: command.key_name(),
            point: report.point.map(|p| (p.x, p.y)),
        };

        if cli.json {
            println!("{}", serde_json::to_string(&emission)?);
        } else {
            println!(
                "{:>6}  {:>8.3}s  {:<6}  key={}",
                emission.frame,
                emission.time,
                command.label(),
                emission.key.unwrap_or("-")
            );
        }
    }

    let total: usize = counts.values().sum();
    if cli.json {
        info!("{} commands emitted: {:?}", total, counts);
    } else {
        println!("\n{} frames, {} commands emitted", frames.len(), total);
        for (label, count) in &counts {
            println!("  {:<6} {:>5}", label, count);
        }
        println!("Final action: {}", engine.current_action());
    }

    if let Some(last) = frames.last() {
        let status = engine.gate_status(last.time);
        info!(
            "{:?} policy, final gate: {}",
            engine.config().policy,
            serde_json::to_string(&status)?
        );
    }

    Ok(())
}
