use anyhow::Context;
use clap::{Parser, ValueEnum};
use gridworld_mdp::config::{Algorithm, RunConfig};
use gridworld_mdp::report::{render_run, run_sweep};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Policy,
    Value,
    Both,
}

/// Solve a grid world MDP for a sweep of non-terminal rewards.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON run configuration. Defaults to the 3x3 classic sweep.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    algorithm: Option<AlgorithmArg>,

    /// Seed for the initial policy of policy iteration.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the solutions as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(algorithm) = args.algorithm {
        config.algorithms = match algorithm {
            AlgorithmArg::Policy => vec![Algorithm::Policy],
            AlgorithmArg::Value => vec![Algorithm::Value],
            AlgorithmArg::Both => vec![Algorithm::Policy, Algorithm::Value],
        };
    }

    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let runs = run_sweep(&config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
    } else {
        for run in &runs {
            println!("{}", render_run(run));
        }
    }

    Ok(())
}
