use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use jbfields::env_config;
use jbfields::phase0_tables::build_context;
use jbfields::state_computation::compute_all_state_values_with_progress;
use jbfields::storage::save_ev_table;
use jbfields::types::CategorySet;

#[derive(Parser, Debug)]
#[command(
    name = "jbf-precompute",
    version,
    about = "Compute the Jumbleberry Fields EV table for every category subset"
)]
struct Args {
    /// Output path (defaults to $JBF_EV_TABLE or data/ev_table.json)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_config::init_logging();
    let args = Args::parse();

    if let Err(e) = env_config::init_base_path() {
        error!("Failed to change to base path: {}", e);
        return ExitCode::FAILURE;
    }
    env_config::init_rayon_threads();

    println!("Jumbleberry Fields precomputation tool");
    let start = Instant::now();

    let ctx = build_context();
    let table = compute_all_state_values_with_progress(&ctx, |report| {
        println!(
            "  |C|={}: {:>3} subsets in {:>8.2} ms  ({}/{} done)",
            report.size,
            report.subsets,
            report.tier_secs * 1000.0,
            report.completed,
            report.total
        );
    });

    let output = args.output.unwrap_or_else(env_config::ev_table_path);
    if let Err(e) = save_ev_table(&table, &output) {
        error!("Failed to save {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }

    info!("Wrote {}", output.display());
    println!(
        "EV(all categories) = {:.4}  ({:.2} s total)",
        table.ev(CategorySet::ALL),
        start.elapsed().as_secs_f64()
    );
    println!("Precomputation complete.");
    ExitCode::SUCCESS
}
