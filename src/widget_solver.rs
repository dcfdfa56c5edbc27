//! Per-round ("widget") solver: value layers over the 126 outcomes.
//!
//! A layer holds, for each dice set r, the best expected future score with a fixed
//! number of rerolls left. Layer 0 scores immediately; each reroll layer takes the
//! better of keeping everything and the best proper keep.

use crate::constants::*;
use crate::types::{CategorySet, EvTable, SolverContext};

/// Value per dice-set index for one rerolls-left count.
pub type Layer = [f64; NUM_DICE_SETS];

/// E(C, r, 0) = max_{c ∈ C} [s(r,c) + EV(C \ {c})]
///
/// `categories` must be non-empty; an empty set yields `-inf`.
#[inline]
pub fn compute_best_scoring_value_for_dice_set_by_index(
    ctx: &SolverContext,
    table: &EvTable,
    categories: CategorySet,
    ds_index: usize,
) -> f64 {
    let mut best_val = f64::NEG_INFINITY;
    for c in categories.iter() {
        let scr = ctx.precomputed_scores[ds_index][c.index()];
        let val = scr as f64 + table.ev(categories.without(c));
        if val > best_val {
            best_val = val;
        }
    }
    best_val
}

/// Layer 0 for a category set: every dice set scored in its best category.
pub fn compute_scoring_layer(
    ctx: &SolverContext,
    table: &EvTable,
    categories: CategorySet,
) -> Layer {
    let mut layer = [0.0f64; NUM_DICE_SETS];
    for (ds_i, v) in layer.iter_mut().enumerate() {
        *v = compute_best_scoring_value_for_dice_set_by_index(ctx, table, categories, ds_i);
    }
    layer
}

/// Σ P(keep→r) · layer[r] over the keep's sparse row.
#[inline]
pub fn compute_expected_value_for_keep(ctx: &SolverContext, layer: &Layer, keep_id: usize) -> f64 {
    let (cols, vals) = ctx.keep_table.row(keep_id);
    let mut ev = 0.0;
    for (&c, &p) in cols.iter().zip(vals) {
        ev += p * layer[c as usize];
    }
    ev
}

/// Best proper keep for one dice set against `layer`: (keep id, EV).
///
/// Keep-all is not a candidate. Ties keep the first keep in enumeration order.
pub fn choose_best_keep(ctx: &SolverContext, layer: &Layer, ds_index: usize) -> (usize, f64) {
    let mut best_val = f64::NEG_INFINITY;
    let mut best_keep = 0usize;
    for &kid in ctx.keep_table.keeps_for(ds_index) {
        let ev = compute_expected_value_for_keep(ctx, layer, kid as usize);
        if ev > best_val {
            best_val = ev;
            best_keep = kid as usize;
        }
    }
    (best_keep, best_val)
}

/// One reroll step: cur[r] = max(prev[r], max_keep Σ P(keep→r') · prev[r']).
pub fn compute_max_ev_for_n_rerolls(ctx: &SolverContext, prev: &Layer, cur: &mut Layer) {
    for ds_i in 0..NUM_DICE_SETS {
        let mut best_val = prev[ds_i]; // keep all
        for &kid in ctx.keep_table.keeps_for(ds_i) {
            let ev = compute_expected_value_for_keep(ctx, prev, kid as usize);
            if ev > best_val {
                best_val = ev;
            }
        }
        cur[ds_i] = best_val;
    }
}

/// Allocating form of [`compute_max_ev_for_n_rerolls`].
pub fn reroll_layer(ctx: &SolverContext, prev: &Layer) -> Layer {
    let mut cur = [0.0f64; NUM_DICE_SETS];
    compute_max_ev_for_n_rerolls(ctx, prev, &mut cur);
    cur
}

/// Layer with `rerolls` rerolls left for the given categories (layer 0 plus
/// `rerolls` reroll steps), using ping-pong buffers.
pub fn compute_layer_for_rerolls(
    ctx: &SolverContext,
    table: &EvTable,
    categories: CategorySet,
    rerolls: usize,
) -> Layer {
    let mut e = [compute_scoring_layer(ctx, table, categories), [0.0; NUM_DICE_SETS]];
    let mut cur = 0;
    for _ in 0..rerolls {
        let (a, b) = e.split_at_mut(1);
        if cur == 0 {
            compute_max_ev_for_n_rerolls(ctx, &a[0], &mut b[0]);
        } else {
            compute_max_ev_for_n_rerolls(ctx, &b[0], &mut a[0]);
        }
        cur ^= 1;
    }
    e[cur]
}

/// EV(C) for one category set, given EV of every strict subset in `table`.
///
/// 1. E[0][r] = best category for each final roll
/// 2. E[1][r] = best keep from E[0] (1 reroll left)
/// 3. E[0][r] = best keep from E[1] (2 rerolls left)
/// 4. EV(C) = Σ P(⊥→r) · E[0][r]
pub fn compute_expected_state_value(
    ctx: &SolverContext,
    table: &EvTable,
    categories: CategorySet,
) -> f64 {
    if categories.is_empty() {
        return 0.0;
    }
    let top = compute_layer_for_rerolls(ctx, table, categories, MAX_REROLLS as usize);
    ctx.dice_set_probabilities
        .iter()
        .zip(top.iter())
        .map(|(p, v)| p * v)
        .sum()
}
