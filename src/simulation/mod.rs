//! Game simulation and statistics.
//!
//! - [`engine`]: Core simulation (play N games with optimal strategy)
//! - [`statistics`]: Score summaries and histograms

pub mod engine;
pub mod statistics;

pub use engine::{
    roll_dice, simulate_batch, simulate_game, GameSummary, RoundSummary, SimulationResult,
};
pub use statistics::{histogram, summarize_scores, HistogramBin, ScoreStats};
