use std::path::PathBuf;

use clap::Parser;

use facet_bench::config::{BenchmarkConfig, ResolvedOutputs};
use facet_bench::logging::init_logging;
use facet_bench::runner::BenchRunner;

/// Benchmark harness for the probability-board strategies.
#[derive(Debug, Parser)]
#[command(
    name = "facet-bench",
    author,
    version,
    about = "Deterministic strategy benchmark for the probability board"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games each agent plays.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the master seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(games) = cli.games {
        config.games.count = games;
    }
    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let games = config.games.count;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({games} games)",
        if agent_count == 1 { "" } else { "s" }
    );

    let runner = BenchRunner::new(config.clone(), outputs.clone())?;
    if cli.validate_only {
        println!("Validation-only mode: benchmark execution skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let summary = runner.run()?;
    println!(
        "Benchmark complete for '{run_id}': {} games × {} agents → {} rows at {}",
        summary.games_played,
        summary.agents,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Win-rate plot: {}", plot_path.display());
    }
    if let Some(calibration) = summary.calibration.as_ref() {
        let worst = calibration
            .rows
            .iter()
            .map(|row| row.mean_abs_error())
            .fold(0.0f64, f64::max);
        println!(
            "Calibration: {} opening clicks, worst mean abs error {worst:.4}",
            calibration.rows.len()
        );
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
