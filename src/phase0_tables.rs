//! Phase 0: Precompute all static lookup tables.
//!
//! The orchestrator [`precompute_lookup_tables`] runs 6 sub-steps in dependency order:
//!
//! 1. **Factorials**: 0!..5! for multinomial coefficients
//! 2. **Dice combinations**: enumerate R_5 (126 5-dice multisets) + reverse lookup
//! 3. **Category scores**: precompute s(r, c) for all (r, c) pairs
//! 4. **Reroll outcomes**: every outcome of rolling n dice, n = 0..5, with probabilities
//! 5. **Keep-multiset table**: sparse CSR transition matrix P(keep→r) plus per-dice-set keeps
//! 6. **Dice set probabilities**: P(⊥→r) for each r ∈ R_5

use std::time::Instant;

use log::{debug, info};

use crate::constants::*;
use crate::dice_mechanics::{
    compute_probability_of_dice_set, enumerate_keeps, enumerate_multisets, enumerate_rerolls,
    pack_dice,
};
use crate::game_mechanics::calculate_category_score;
use crate::types::{Category, Dice, SolverContext};

/// Precompute factorials 0!..5! for multinomial coefficient calculations.
pub fn precompute_factorials(ctx: &mut SolverContext) {
    ctx.factorial[0] = 1.0;
    for i in 1..=NUM_DICE {
        ctx.factorial[i] = ctx.factorial[i - 1] * i as f64;
    }
}

/// Enumerate all C(9,4) = 126 5-dice multisets R_5 and build the reverse lookup
/// `index_lookup[pack(r)] = index`.
pub fn build_all_dice_combinations(ctx: &mut SolverContext) {
    ctx.num_combinations = 0;
    for dice in enumerate_multisets(NUM_DICE) {
        let idx = ctx.num_combinations;
        ctx.all_dice_sets[idx] = dice;
        ctx.index_lookup[pack_dice(dice)] = idx as u16;
        ctx.num_combinations += 1;
    }
}

/// Precompute s(r, c) for all r in R_5 and all 9 categories.
pub fn precompute_category_scores(ctx: &mut SolverContext) {
    for i in 0..NUM_DICE_SETS {
        let dice = ctx.all_dice_sets[i];
        for cat in Category::ALL {
            ctx.precomputed_scores[i][cat.index()] = calculate_category_score(&dice, cat);
        }
    }
}

/// Cache `enumerate_rerolls(n)` for n = 0..5.
pub fn precompute_reroll_outcomes(ctx: &mut SolverContext) {
    for n in 0..=NUM_DICE {
        ctx.reroll_outcomes[n] = enumerate_rerolls(ctx, n);
    }
}

/// Build the keep-multiset transition table.
///
/// **5a.** Enumerate all 252 keep-multisets (0–5 dice) and index them by their
/// packed count vector.
///
/// **5b.** For each keep K, walk the cached outcomes of rolling n = 5 − |K| dice
/// and accumulate P(K→K+o) in CSR format. Distinct outcomes o give distinct
/// targets, so each row has one entry per outcome and sums to 1.
///
/// **5c.** For each dice set, record the keep ids of every proper sub-multiset in
/// [`enumerate_keeps`] order. Multisets have no duplicate keeps, so no dedup
/// pass is needed.
pub fn precompute_keep_table(ctx: &mut SolverContext) {
    // 5a
    let mut keeps = Vec::with_capacity(NUM_KEEP_MULTISETS);
    for size in 0..=NUM_DICE {
        keeps.extend(enumerate_multisets(size));
    }

    let kt = &mut ctx.keep_table;
    kt.keep_lookup.iter_mut().for_each(|k| *k = u16::MAX);
    for (ki, &keep) in keeps.iter().enumerate() {
        kt.keep_lookup[pack_dice(keep)] = ki as u16;
    }

    // 5b
    kt.vals.clear();
    kt.cols.clear();
    for (ki, &keep) in keeps.iter().enumerate() {
        kt.row_start[ki] = kt.vals.len();
        let n = NUM_DICE - keep.total();
        for outcome in &ctx.reroll_outcomes[n] {
            let target = ctx.index_lookup[pack_dice(keep.add(outcome.dice))];
            kt.vals.push(outcome.probability);
            kt.cols.push(target);
        }
    }
    kt.row_start[keeps.len()] = kt.vals.len();

    // 5c
    let mut total_unique = 0;
    for ds in 0..NUM_DICE_SETS {
        let dice = ctx.all_dice_sets[ds];
        let mut n_unique = 0usize;
        for keep in enumerate_keeps(dice) {
            if keep == dice {
                continue;
            }
            kt.unique_keep_ids[ds][n_unique] = kt.keep_lookup[pack_dice(keep)];
            n_unique += 1;
        }
        kt.unique_count[ds] = n_unique;
        total_unique += n_unique;
    }
    kt.keeps = keeps;

    let nnz = kt.vals.len();
    debug!(
        "Keep-multiset table: {} keeps, {} nnz, avg {:.1} keeps/ds, {:.1} KB",
        kt.keeps.len(),
        nnz,
        total_unique as f64 / NUM_DICE_SETS as f64,
        (nnz * (std::mem::size_of::<f64>() + std::mem::size_of::<u16>())) as f64 / 1024.0
    );
}

/// Precompute P(⊥→r) for all r in R_5.
pub fn precompute_dice_set_probabilities(ctx: &mut SolverContext) {
    for ds_i in 0..NUM_DICE_SETS {
        ctx.dice_set_probabilities[ds_i] =
            compute_probability_of_dice_set(ctx, ctx.all_dice_sets[ds_i]);
    }
}

/// Phase 0 orchestrator: build all static lookup tables in dependency order.
pub fn precompute_lookup_tables(ctx: &mut SolverContext) {
    let phase0_start = Instant::now();

    macro_rules! timed {
        ($label:expr, $body:expr) => {{
            let t0 = Instant::now();
            $body;
            let dt = t0.elapsed().as_secs_f64() * 1000.0;
            debug!("  {:<36} {:>8.3} ms", $label, dt);
        }};
    }

    timed!("Factorials", precompute_factorials(ctx));
    timed!("Dice combinations (126)", build_all_dice_combinations(ctx));
    timed!("Category scores", precompute_category_scores(ctx));
    timed!("Reroll outcomes", precompute_reroll_outcomes(ctx));
    timed!("Keep-multiset table", precompute_keep_table(ctx));
    timed!(
        "Dice set probabilities",
        precompute_dice_set_probabilities(ctx)
    );

    info!(
        "Phase 0 lookup tables ready in {:.3} ms",
        phase0_start.elapsed().as_secs_f64() * 1000.0
    );
}

/// Convenience constructor: a boxed context with every Phase 0 table built.
pub fn build_context() -> Box<SolverContext> {
    let mut ctx = SolverContext::new_boxed();
    precompute_lookup_tables(&mut ctx);
    ctx
}

/// Keep `keep` looked up by its counts, if it is a multiset of at most 5 dice.
pub fn keep_index(ctx: &SolverContext, keep: Dice) -> Option<usize> {
    if keep.total() > NUM_DICE {
        return None;
    }
    match ctx.keep_table.keep_lookup[pack_dice(keep)] {
        u16::MAX => None,
        ki => Some(ki as usize),
    }
}
