//! `vivarium` -- runs a scenario headless and reports what happened.
//!
//! ```text
//! vivarium scenarios/meadow.json --ticks 5000 --dt 16 --report-every 500
//! vivarium scenarios/meadow.json --seed 7 --snapshot > final.json
//! ```
//!
//! Logs go to stderr (filter with `RUST_LOG`, default `info`); the optional
//! snapshot is written to stdout as JSON.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use vivarium_engine::prelude::*;
use vivarium_scenario::{load_path, LoadOptions};

#[derive(Parser, Debug)]
#[command(name = "vivarium", version, about = "Run an artificial-life scenario without a renderer")]
struct Args {
    /// Scenario JSON file
    scenario: PathBuf,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Frame time in milliseconds fed to every tick; measured when omitted
    #[arg(long)]
    dt: Option<f64>,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON snapshot of the final world to stdout
    #[arg(long)]
    snapshot: bool,

    /// Log statistics every K ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Some(dt) = args.dt {
        ensure!(dt.is_finite() && dt >= 0.0, "--dt must be a non-negative number, got {dt}");
    }

    let scenario = load_path(&args.scenario, &LoadOptions { seed: args.seed })
        .with_context(|| format!("failed to load scenario {}", args.scenario.display()))?;
    let mut world = scenario.world;
    info!(
        frame = scenario.frame,
        entities = world.len(),
        ticks = args.ticks,
        seed = world.config().seed,
        "starting run"
    );

    run(&mut world, &args)?;

    info!(stats = %world.stats(), hash = %world.state_hash(), "run finished");
    for (system, time) in &world.last_diagnostics().system_times {
        debug!(%system, ?time, "last tick");
    }

    if args.snapshot {
        let mut out = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &world.capture_snapshot())
            .context("failed to write snapshot")?;
        writeln!(out)?;
    }
    Ok(())
}

fn run(world: &mut World, args: &Args) -> Result<()> {
    for _ in 0..args.ticks {
        let report = world
            .update(args.dt)
            .with_context(|| format!("tick {} failed", world.tick_count() + 1))?;

        if args.report_every > 0 && report.tick % args.report_every == 0 {
            info!(tick = report.tick, stats = %world.stats(), "progress");
        }
        if world.is_empty() {
            info!(tick = report.tick, "no entities left, stopping early");
            break;
        }
    }
    Ok(())
}
