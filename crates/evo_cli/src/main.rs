//! Headless runner for the Evolution Sandbox kernel.
//!
//! Grounded on the teacher's `primordium_tools` bins (`analyze`, `verify`):
//! a small `clap`-derived CLI over `anyhow::Result`, no TUI, no async
//! runtime — the kernel is synchronous and so is this harness. Runs N
//! ticks of a configured simulation and prints either a human summary or
//! the bare determinism snapshot hash from spec.md §8 scenario 6, so two
//! invocations with the same flags can be diffed by a test script.

use anyhow::{Context, Result};
use clap::Parser;
use evo_core::{Config, Simulation};
use evo_data::{EventKind, SimEvent};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Evolution Sandbox runner", long_about = None)]
struct Args {
    /// Number of ticks to run.
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,

    /// PRNG seed.
    #[arg(short, long, default_value_t = 42)]
    seed: u32,

    /// Path to a partial JSON config document (spec.md §6). Missing keys
    /// are defaulted, unknown keys ignored, every value clamped.
    #[arg(short, long)]
    config: Option<String>,

    /// Override `world.initial_deer_count`.
    #[arg(long)]
    deer: Option<u32>,

    /// Override `world.initial_wolf_count`.
    #[arg(long)]
    wolf: Option<u32>,

    /// Print only the determinism snapshot hash (spec.md §8 scenario 6),
    /// suitable for diffing two runs in a script.
    #[arg(long)]
    hash: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path).with_context(|| format!("reading config file {path}"))?;
            let (config, warnings) = Config::from_json(&content).with_context(|| format!("parsing config file {path}"))?;
            for warning in &warnings {
                tracing::warn!(field = %warning.field, message = %warning.message, "config value clamped");
            }
            config
        }
        None => Config::default(),
    };

    if let Some(deer) = args.deer {
        config.world.initial_deer_count = deer;
    }
    if let Some(wolf) = args.wolf {
        config.world.initial_wolf_count = wolf;
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut sim = Simulation::new(config, args.seed);
    sim.subscribe_to(vec![EventKind::AnimalDied, EventKind::AnimalBorn], |event| match event {
        SimEvent::AnimalDied { animal, cause } => tracing::debug!(%animal, ?cause, "animal died"),
        SimEvent::AnimalBorn { animal } => tracing::debug!(%animal, "animal born"),
        _ => {}
    });

    tracing::info!(seed = args.seed, fingerprint = %sim.config().fingerprint(), "starting run");

    for _ in 0..args.ticks {
        sim.step();
    }

    if args.hash {
        println!("{}", sim.snapshot_hash());
        return Ok(());
    }

    println!("tick:              {}", sim.current_tick());
    println!("deer:              {}", sim.deer_count());
    println!("wolf:              {}", sim.wolf_count());
    println!("vegetation tiles:  {}", sim.vegetation_count());
    println!("corpses:           {}", sim.corpses().count());
    println!("config fingerprint:{}", sim.config().fingerprint());
    println!("snapshot hash:     {}", sim.snapshot_hash());

    Ok(())
}
