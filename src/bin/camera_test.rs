use clap::Parser;
use gesture_control::video::{list_cameras, check_camera};

/// Checks that a camera can be opened at the capture format the app uses.
#[derive(Parser, Debug)]
#[command(name = "camera_test")]
struct Cli {
    #[arg(long, default_value_t = 0)]
    camera: u32,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_control=debug".into()),
        )
        .init();

    println!("Testing camera access...\n");

    match list_cameras() {
        Ok(cameras) => {
            for camera in &cameras {
                println!("  [{}] {}", camera.index, camera.name);
            }
        }
        Err(e) => println!("✗ {:#}", e),
    }

    match check_camera(cli.camera, cli.width, cli.height, cli.fps) {
        Ok(dims) => {
            println!("✓ Frame captured: {}x{}", dims.width, dims.height);
            if (dims.width, dims.height) != (cli.width, cli.height) {
                println!("  (requested {}x{})", cli.width, cli.height);
            }
        }
        Err(e) => {
            println!("✗ {:#}", e);
            println!("\nPossible causes:");
            println!("1. Camera is being used by another app");
            println!("2. Camera permissions not granted");
            println!("3. No camera connected");
            std::process::exit(1);
        }
    }
}
