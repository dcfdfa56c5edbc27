use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};

use jbfields::api_computations::solve;
use jbfields::constants::MAX_REROLLS;
use jbfields::display::format_recommendation;
use jbfields::env_config;
use jbfields::notation::{parse_categories, parse_dice};
use jbfields::phase0_tables::build_context;
use jbfields::storage::{load_or_compute_ev_table, TableSource};
use jbfields::types::CategorySet;

#[derive(Parser, Debug)]
#[command(
    name = "jbf-cli",
    version,
    about = "Interactive optimal-play advisor for Jumbleberry Fields"
)]
struct Args {
    /// EV table path (defaults to $JBF_EV_TABLE or data/ev_table.json)
    #[arg(long = "ev", value_name = "FILE")]
    ev: Option<PathBuf>,
}

const USAGE: &str = "\
--- Dice ---
  Letters: J=Jumbleberry  S=Sugarberry  P=Pickleberry  M=Moonberry  X=Pest
  Sequence format:  JJSPM       (one letter per die, 5 total)
  Count format:     2J 1S 1P 1M (space-separated, omitted faces = 0)

--- Rolls Left ---
  0 = no rerolls (must score)    1 = one reroll left    2 = two rerolls left

--- Categories ---
  Shorthand: j  s  p  m  3k  4k  5k  mix  fr
  Examples:  'all'          all 9 categories
             'all-j-s'      all except Jumbleberry and Sugarberry
             'j,m,3k,fr'    only those 4 categories
";

/// Print `label`, read one trimmed line. `None` on EOF, read error or quit.
fn prompt(input: &mut impl BufRead, label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                None
            } else {
                Some(line.to_string())
            }
        }
    }
}

fn main() -> ExitCode {
    env_config::init_logging();
    let args = Args::parse();

    if let Err(e) = env_config::init_base_path() {
        error!("Failed to change to base path: {}", e);
        return ExitCode::FAILURE;
    }

    let ctx = build_context();
    let path = args.ev.unwrap_or_else(env_config::ev_table_path);
    let (table, source) = load_or_compute_ev_table(&ctx, &path);
    if let TableSource::ComputedUnsaved(e) = &source {
        warn!("Computed EV table but could not save it to {}: {}", path.display(), e);
        eprintln!("Warning: EV table was computed but not saved ({})", e);
    }
    println!(
        "EV with all categories: {:.2}\n",
        table.ev(CategorySet::ALL)
    );

    println!("=== Jumbleberry Fields Solver ===");
    println!("Enter your game state to get optimal play advice.");
    println!("Type 'quit' or 'exit' at any prompt to quit.");
    println!();
    println!("{}", USAGE);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let Some(line) = prompt(&mut input, "Dice: ") else {
            break;
        };
        let dice = match parse_dice(&line) {
            Ok(d) => d,
            Err(e) => {
                println!("  Error: {}\n", e);
                continue;
            }
        };

        let Some(line) = prompt(&mut input, "Rolls left (0-2): ") else {
            break;
        };
        let rerolls_left = match line.parse::<u8>() {
            Ok(r) if r <= MAX_REROLLS => r,
            _ => {
                println!("  Error: rolls left must be 0, 1, or 2\n");
                continue;
            }
        };

        let Some(line) = prompt(&mut input, "Categories remaining: ") else {
            break;
        };
        let categories = match parse_categories(&line) {
            Ok(cs) => cs,
            Err(e) => {
                println!("  Error: {}\n", e);
                continue;
            }
        };

        match solve(&ctx, &table, dice, rerolls_left, categories) {
            Ok(rec) => println!(
                "{}",
                format_recommendation(&rec, dice, rerolls_left, categories)
            ),
            Err(e) => println!("  Error: {}\n", e),
        }
    }

    ExitCode::SUCCESS
}
