use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hearts_bench::config::{AgentKind, BenchmarkConfig};
use hearts_bench::logging::init_logging;
use hearts_bench::tournament::{RunSummary, TournamentRunner};

#[derive(Debug, Parser)]
#[command(name = "hearts-bench", version, about = "Seeded Hearts tournaments between search and greedy bots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play every deal of a tournament file and write its results.
    Run {
        config: PathBuf,
        /// Replace the file's deal seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a tournament file and print the resolved agents.
    Check { config: PathBuf },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Run { config, seed } => run(&config, seed),
        Command::Check { config } => check(&config),
    }
}

fn run(path: &Path, seed: Option<u64>) -> Result<()> {
    let mut config = BenchmarkConfig::load(path)?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let outputs = config.outputs();
    let _log_guard = init_logging(config.log_level(), &outputs)?;

    let runner = TournamentRunner::new(config, outputs)?;
    let summary = runner
        .run()
        .with_context(|| format!("tournament from {}", path.display()))?;
    report(&summary);
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let config = BenchmarkConfig::load(path)?;
    for agent in &config.agents {
        let plan = match agent.kind {
            AgentKind::Greedy => "greedy rollout policy".to_string(),
            AgentKind::Mcts => {
                let search = agent.search_config()?;
                format!(
                    "{} iterations over {} samples, {} reward{}",
                    search.iterations,
                    search.samples,
                    search.reward.label(),
                    if search.parallel { ", parallel" } else { "" }
                )
            }
        };
        let marker = if agent.name == config.baseline { "*" } else { " " };
        println!("{marker} {:<20} {plan}", agent.name);
    }
    println!(
        "{} deals x {} seatings, seed {}",
        config.hands, config.seatings, config.seed
    );
    Ok(())
}

fn report(summary: &RunSummary) {
    let analytics = &summary.analytics;
    println!(
        "{} deals x {} seatings ({} rows) -> {}",
        summary.hands_played,
        summary.seatings,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!(
        "{:<20} {:>8} {:>8} {:>12} {:>12} {:>6}",
        "agent", "pts/hand", "delta", "ms/decision", "over budget", "moons"
    );
    for agent in &analytics.agents {
        println!(
            "{:<20} {:>8.2} {:>+8.2} {:>12.1} {:>12} {:>6}",
            agent.name,
            agent.mean_score,
            agent.delta_vs_baseline,
            agent.mean_decision_ms,
            format!("{}/{}", agent.over_budget, agent.decisions),
            agent.moon_shots
        );
    }
    println!("details: {}", summary.summary_path.display());
}
