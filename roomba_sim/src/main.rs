//! # roomba_sim - headless roomba simulator
//!
//! Usage:
//!   roomba_sim                                # Default arena, 30s, random seed
//!   roomba_sim --config arena.toml            # Custom arena/motion settings
//!   roomba_sim --policy jittered --seed 7     # Override bounce policy and seed
//!   roomba_sim --record run.json --csv run.csv

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use roomba_core::BouncePolicy;
use roomba_sim::{SimConfig, Simulation};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Reflect,
    Jittered,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "roomba_sim")]
#[command(about = "Headless 2D roomba simulator with collision-response motion control")]
struct Args {
    /// Simulation configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run (overrides [clock].duration)
    #[arg(long)]
    duration: Option<f32>,

    /// RNG seed for spawn heading, jitter and frame timing
    #[arg(long)]
    seed: Option<u64>,

    /// Bounce policy (overrides [motion].policy)
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Write the full trajectory recording to this JSON file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Export the trajectory samples to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init(),
    }
}

fn build_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if let Some(policy) = args.policy {
        let policy = match policy {
            PolicyArg::Reflect => BouncePolicy::Reflect,
            PolicyArg::Jittered => BouncePolicy::jittered(),
        };
        config.motion = config.motion.with_policy(policy)?;
    }
    if let Some(seed) = args.seed {
        config.motion = config.motion.with_seed(seed);
    }
    if let Some(duration) = args.duration {
        config.clock.duration = duration;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = build_config(&args)?;
    let duration = config.clock.duration;
    info!(
        speed = config.motion.speed(),
        pause_duration = config.motion.pause_duration(),
        policy = %config.motion.policy(),
        obstacles = config.world.obstacles.len(),
        "starting roomba_sim (headless)"
    );

    let record = args.record.is_some() || args.csv.is_some();
    let mut sim = Simulation::new(config, record).context("Failed to build simulation")?;
    let summary = sim.run_for(duration).clone();

    let recording = sim.into_recording();
    if let Some(path) = &args.record {
        recording.save_json(path)?;
        info!(path = %path.display(), samples = recording.samples.len(), "recording saved");
    }
    if let Some(path) = &args.csv {
        recording.export_csv(path)?;
        info!(path = %path.display(), "trajectory exported");
    }

    println!("{}", summary);
    Ok(())
}
