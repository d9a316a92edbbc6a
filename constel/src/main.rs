use constel::{bench_forces, bench_frames, FrameClock, ScenarioConfig, World};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Headless Barnes-Hut galaxy simulation")]
struct Args {
    /// Scenario file, relative to the crate's scenarios/ directory
    #[arg(short, long, default_value = "default.yaml")]
    file: String,

    /// Override galaxy.stars
    #[arg(short = 'n', long)]
    stars: Option<usize>,

    /// Override galaxy.seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override run.frames
    #[arg(long)]
    frames: Option<usize>,

    /// Override run.threads
    #[arg(long)]
    threads: Option<usize>,

    /// Print force and frame timing tables instead of running a scenario
    #[arg(long)]
    bench: bool,

    /// Log per-frame statistics
    #[arg(short, long)]
    verbose: bool,
}

// load here to keep main clean
fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(&args.file);
    let mut cfg = ScenarioConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if let Some(stars) = args.stars {
        cfg.galaxy.stars = stars;
    }
    if args.seed.is_some() {
        cfg.galaxy.seed = args.seed;
    }
    if let Some(frames) = args.frames {
        cfg.run.frames = frames;
    }
    if args.threads.is_some() {
        cfg.run.threads = args.threads;
    }
    cfg.validate().context("command line overrides")?;
    Ok(cfg)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if args.bench {
        let workers = args.threads.unwrap_or_else(constel::simulation::scenario::default_threads);
        bench_forces()?;
        bench_frames(workers)?;
        return Ok(());
    }

    let cfg = load_scenario(&args)?;
    let mut world = World::init_world(&cfg).context("initializing world")?;
    let mut clock = FrameClock::new(cfg.run.max_fps);

    for _ in 0..cfg.run.frames {
        let elapsed = clock.tick();
        let stats = world.world_frame(elapsed)?;
        if stats.frame % 60 == 0 {
            info!(
                "frame {:5}: {:6.1} fps, {} quads, force {:?}",
                stats.frame,
                clock.history().mean_over(1.0),
                stats.quad_count,
                stats.force
            );
        }
    }

    world.finalize_world()?;
    Ok(())
}
