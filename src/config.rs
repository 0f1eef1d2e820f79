//! Command line and YAML configuration
//!
//! Precedence: built-in defaults < YAML file (`--config`) < individual flags.

use anyhow::Context;
use clap::Parser;
use galaxy_simulation::{BackendKind, Placement, SimulationConfig};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "galaxy-simulator", about = "Headless N-body galaxy simulation")]
pub struct Args {
    /// YAML file with any subset of the simulation configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of stars
    #[arg(short = 'n', long)]
    pub particles: Option<usize>,

    /// Execution backend: gpu, cpu or auto
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// Initial layout: spiral, disc or cube
    #[arg(long)]
    pub placement: Option<Placement>,

    /// Seed for the initial layout
    #[arg(long)]
    pub seed: Option<u64>,

    /// Softening epsilon (> 0)
    #[arg(long)]
    pub epsilon: Option<f32>,

    /// Time step per tick
    #[arg(long)]
    pub dt: Option<f32>,

    /// Dark-matter mass (0 disables)
    #[arg(long)]
    pub dark_matter: Option<f32>,

    /// Dark-energy acceleration (0 disables)
    #[arg(long)]
    pub dark_energy: Option<f32>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 1000)]
    pub frames: u64,

    /// Log statistics every N ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    pub report_every: u64,

    /// Pause when this frame is reached
    #[arg(long)]
    pub pause_at: Option<u64>,

    /// How many frames to stay paused
    #[arg(long, default_value_t = 0)]
    pub pause_for: u64,
}

/// Build and validate the run configuration from `args`.
pub fn load(args: &Args) -> anyhow::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => read_yaml(path)?,
        None => SimulationConfig::default(),
    };

    apply_overrides(args, &mut config);
    config.validate().context("invalid simulation configuration")?;

    log::debug!("{config:?}");
    Ok(config)
}

fn read_yaml(path: &PathBuf) -> anyhow::Result<SimulationConfig> {
    let file =
        File::open(path).with_context(|| format!("cannot open config {}", path.display()))?;
    let config = serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse config {}", path.display()))?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn apply_overrides(args: &Args, config: &mut SimulationConfig) {
    if let Some(particles) = args.particles {
        config.particle_count = particles;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(placement) = args.placement {
        config.placement = placement;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(epsilon) = args.epsilon {
        config.physics.epsilon = epsilon;
    }
    if let Some(dt) = args.dt {
        config.physics.delta_time = dt;
    }
    if let Some(mass) = args.dark_matter {
        config.physics.dark_matter_mass = mass;
    }
    if let Some(acceleration) = args.dark_energy {
        config.physics.dark_energy_acceleration = acceleration;
    }
}
