//! xmas_motion: interactive entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use xmas_motion::app::{run, AppConfig};
use snow_field::SimConfig;

#[derive(Parser, Debug)]
#[command(name = "xmas_motion", version, about = "Hand-steered holiday particle field")]
struct Cli {
    /// Number of particles
    #[arg(short = 'n', long, default_value_t = 1200)]
    count: usize,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1280)]
    width: usize,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 720)]
    height: usize,

    /// Seed for a reproducible particle field
    #[arg(long)]
    seed: Option<u64>,

    /// Hand interaction radius in pixels
    #[arg(long, default_value_t = snow_field::config::DEFAULT_INTERACTION_RADIUS)]
    radius: f32,

    /// Play back a JSON landmark recording instead of using the mouse
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Directory screenshots are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    screenshot_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose > 0 {
        logger.filter_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        logger.filter_level(log::LevelFilter::Error);
    }
    logger.init();

    let mut sim = SimConfig::default().with_interaction_radius(cli.radius);
    sim.seed = cli.seed;

    let cfg = AppConfig {
        particle_count: cli.count,
        width:          cli.width,
        height:         cli.height,
        sim,
        replay:         cli.replay,
        screenshot_dir: cli.screenshot_dir,
    };

    println!();
    println!("╔══════════════════════════════════════════════╗");
    println!("║     XmasMotion: hand-steered holiday field   ║");
    println!("╚══════════════════════════════════════════════╝");
    println!();
    match &cfg.replay {
        Some(path) => println!("  Mode: landmark replay ({})", path.display()),
        None       => println!("  Mode: mouse simulation  (LMB/F attract, RMB/O repel, W wave)"),
    }
    println!("  Particles: {}   P = screenshot   Q = quit", cfg.particle_count);
    println!();

    run(cfg).context("xmas_motion stopped with an error")
}
