use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;

use jbfields::env_config;
use jbfields::phase0_tables::build_context;
use jbfields::simulation::{histogram, simulate_batch, summarize_scores, HistogramBin, ScoreStats};
use jbfields::storage::{load_or_compute_ev_table, TableSource};
use jbfields::types::CategorySet;

const HISTOGRAM_BIN_WIDTH: i32 = 10;
const HISTOGRAM_BAR_WIDTH: usize = 50;

#[derive(Parser, Debug)]
#[command(
    name = "jbf-simulate",
    version,
    about = "Play Jumbleberry Fields games with optimal strategy and compare to the EV table"
)]
struct Args {
    /// Number of games to simulate
    #[arg(short = 'n', long = "games", default_value_t = 10_000)]
    num_games: usize,
    /// Base seed; game i uses seed + i
    #[arg(short = 's', long = "seed", default_value_t = 42)]
    seed: u64,
    /// EV table path (defaults to $JBF_EV_TABLE or data/ev_table.json)
    #[arg(long = "ev", value_name = "FILE")]
    ev: Option<PathBuf>,
    /// Print the summary as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonReport {
    num_games: usize,
    seed: u64,
    theoretical_ev: f64,
    elapsed_secs: f64,
    stats: ScoreStats,
    histogram: Vec<HistogramBin>,
}

fn main() -> ExitCode {
    env_config::init_logging();
    let args = Args::parse();

    if let Err(e) = env_config::init_base_path() {
        error!("Failed to change to base path: {}", e);
        return ExitCode::FAILURE;
    }
    env_config::init_rayon_threads();

    if args.num_games == 0 {
        error!("--games must be at least 1");
        return ExitCode::FAILURE;
    }

    let ctx = build_context();
    let path = args.ev.unwrap_or_else(env_config::ev_table_path);
    let (table, source) = load_or_compute_ev_table(&ctx, &path);
    if let TableSource::ComputedUnsaved(e) = &source {
        warn!("Computed EV table but could not save it to {}: {}", path.display(), e);
        eprintln!("Warning: EV table was computed but not saved ({})", e);
    }
    let theoretical = table.ev(CategorySet::ALL);

    info!(
        "Simulating {} games (seed {}) with optimal strategy...",
        args.num_games, args.seed
    );
    let result = simulate_batch(&ctx, &table, args.num_games, args.seed);
    let elapsed = result.elapsed.as_secs_f64();

    if args.json {
        let report = JsonReport {
            num_games: result.scores.len(),
            seed: args.seed,
            theoretical_ev: theoretical,
            elapsed_secs: elapsed,
            stats: summarize_scores(&result.scores),
            histogram: histogram(&result.scores, HISTOGRAM_BIN_WIDTH),
        };
        return match serde_json::to_string_pretty(&report) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    println!();
    println!("=== Simulation Results ===");
    println!("Games:            {}", result.scores.len());
    println!(
        "Time:             {:.2} s  ({:.0} games/s)",
        elapsed,
        result.scores.len() as f64 / elapsed.max(1e-9)
    );
    println!("Theoretical EV:   {:.4}", theoretical);
    println!("Simulated mean:   {:.4}", result.mean);
    println!(
        "Difference:       {:+.4}  ({:+.2} standard errors)",
        result.mean - theoretical,
        if result.std_error > 0.0 {
            (result.mean - theoretical) / result.std_error
        } else {
            0.0
        }
    );
    println!("Std error:        {:.4}", result.std_error);
    println!("Std dev:          {:.4}", result.std_dev);
    println!("Min / Median / Max: {} / {} / {}", result.min, result.median, result.max);

    if let Some(best) = &result.best_game {
        println!();
        println!("Best game: {} points", best.total_score);
        for (round, r) in best.rounds.iter().enumerate() {
            println!(
                "  Round {}: {:<16} {}  -> {:>2}",
                round + 1,
                r.category.name(),
                r.dice,
                r.score
            );
        }
    }

    let bins = histogram(&result.scores, HISTOGRAM_BIN_WIDTH);
    let peak = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    println!();
    println!("Score distribution:");
    for bin in &bins {
        let bar = bin.count * HISTOGRAM_BAR_WIDTH / peak;
        println!(
            "  {:>3}-{:<3} {:>7}  {}",
            bin.lower,
            bin.upper - 1,
            bin.count,
            "#".repeat(bar)
        );
    }

    ExitCode::SUCCESS
}
