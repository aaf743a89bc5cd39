//! backdrop - animated procedural backgrounds
//!
//! Usage:
//!   backdrop [--preset <name>] [--config <file.toml>] [--seed <n>]
//!   backdrop --list
//!   backdrop --preset starfield --print-config > starfield.toml
//!   backdrop --preset session --snapshot out.png --frames 120

use backdrop::config::{EngineConfig, PRESETS};
use backdrop::engine::Engine;
use backdrop::error::HostError;
use backdrop::raster::Raster;
use backdrop::scheduler::ManualScheduler;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "backdrop")]
#[command(about = "Procedural animated backgrounds: particle networks, data rain, orbs and globes")]
struct Args {
    /// Built-in background to run
    #[arg(long, default_value = "network")]
    preset: String,

    /// Load the background from a TOML file instead of a preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the selected configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// List built-in presets and exit
    #[arg(long)]
    list: bool,

    /// Seed for reproducible scenes
    #[arg(long)]
    seed: Option<u64>,

    /// Render headless and write a PNG instead of opening a window
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Frames to simulate before the snapshot
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Snapshot width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Snapshot height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> Result<(), HostError> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        for (name, about) in PRESETS {
            println!("{name:<10} {about}");
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::preset(&args.preset)?,
    };

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    match &args.snapshot {
        Some(path) => snapshot(config, &args, path),
        None => backdrop::window::run(config, args.seed),
    }
}

/// Step a headless engine and save its last frame.
fn snapshot(config: EngineConfig, args: &Args, path: &Path) -> Result<(), HostError> {
    let seed = args.seed.unwrap_or(0);
    let mut engine = Engine::with_seed(config, ManualScheduler::new(), seed)?;
    engine.mount(
        args.width,
        args.height,
        Some(Raster::new(args.width, args.height)),
    );

    for _ in 0..args.frames {
        let Some(frame) = engine.scheduler_mut().take_due() else {
            break;
        };
        engine.on_frame(frame);
    }
    engine.stop();

    if let Some(raster) = engine.surface() {
        raster.save(path)?;
        log::info!("Wrote {} after {} frames", path.display(), args.frames);
    }
    Ok(())
}
