//! EV table DP: compute EV(C) for all 512 category subsets.
//!
//! Processes subsets in increasing order of |C|, from |C|=1 up to |C|=9. EV(∅) = 0
//! is the base case. Every subset of a tier reads only strictly smaller subsets,
//! which are final by the time the tier starts.
//!
//! Each tier is parallelized with rayon `par_iter`: workers own their layer
//! buffers, results are collected and then scattered into the table, which acts
//! as the barrier between tiers.

use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::constants::*;
use crate::types::{CategorySet, EvTable, SolverContext};
use crate::widget_solver::compute_expected_state_value;

/// Snapshot handed to the progress observer after each tier.
#[derive(Clone, Copy, Debug)]
pub struct TierReport {
    /// Cardinality of the tier just finished.
    pub size: usize,
    /// Subsets in that tier.
    pub subsets: usize,
    /// Subsets finished so far, all tiers.
    pub completed: usize,
    /// Subsets to compute overall (511).
    pub total: usize,
    /// Wall time of this tier.
    pub tier_secs: f64,
    /// Wall time since the start of the computation.
    pub elapsed_secs: f64,
}

/// Progress tracker for the tier loop.
struct ComputeProgress {
    total_subsets: usize,
    completed_subsets: usize,
    start_time: Instant,
    subsets_per_tier: [usize; CATEGORY_COUNT + 1],
    time_per_tier: [f64; CATEGORY_COUNT + 1],
}

impl ComputeProgress {
    fn new() -> Self {
        let mut subsets_per_tier = [0; CATEGORY_COUNT + 1];
        for (size, n) in subsets_per_tier.iter_mut().enumerate().skip(1) {
            *n = CategorySet::all_of_size(size).count();
        }
        ComputeProgress {
            total_subsets: subsets_per_tier.iter().sum(),
            completed_subsets: 0,
            start_time: Instant::now(),
            subsets_per_tier,
            time_per_tier: [0.0; CATEGORY_COUNT + 1],
        }
    }

    fn finish_tier(&mut self, size: usize, tier_secs: f64) -> TierReport {
        self.completed_subsets += self.subsets_per_tier[size];
        self.time_per_tier[size] = tier_secs;
        TierReport {
            size,
            subsets: self.subsets_per_tier[size],
            completed: self.completed_subsets,
            total: self.total_subsets,
            tier_secs,
            elapsed_secs: self.start_time.elapsed().as_secs_f64(),
        }
    }

    fn log_breakdown(&self) {
        debug!("Tier | Subsets | Time (ms)");
        for size in 1..=CATEGORY_COUNT {
            debug!(
                "  {}  | {:7} | {:9.3}",
                size,
                self.subsets_per_tier[size],
                self.time_per_tier[size] * 1000.0
            );
        }
    }
}

/// Compute the full EV table.
pub fn compute_all_state_values(ctx: &SolverContext) -> EvTable {
    compute_all_state_values_with_progress(ctx, |_| {})
}

/// Compute the full EV table, calling `on_tier` after each cardinality tier.
pub fn compute_all_state_values_with_progress<F>(ctx: &SolverContext, mut on_tier: F) -> EvTable
where
    F: FnMut(&TierReport),
{
    let mut progress = ComputeProgress::new();
    let mut table = EvTable::new();

    info!(
        "Computing EV table: {} category subsets over {} tiers",
        progress.total_subsets, CATEGORY_COUNT
    );

    for size in 1..=CATEGORY_COUNT {
        let tier_start = Instant::now();
        let subsets: Vec<CategorySet> = CategorySet::all_of_size(size).collect();

        let table_ref = &table;
        let results: Vec<(CategorySet, f64)> = subsets
            .par_iter()
            .map(|&cs| (cs, compute_expected_state_value(ctx, table_ref, cs)))
            .collect();

        for (cs, ev) in results {
            table.set(cs, ev);
        }

        let report = progress.finish_tier(size, tier_start.elapsed().as_secs_f64());
        debug!(
            "Tier {} ({} subsets) completed in {:.3} ms",
            size,
            report.subsets,
            report.tier_secs * 1000.0
        );
        on_tier(&report);
    }

    progress.log_breakdown();
    info!(
        "EV table complete in {:.3} s, EV(all) = {:.4}",
        progress.start_time.elapsed().as_secs_f64(),
        table.ev(CategorySet::ALL)
    );

    table
}
