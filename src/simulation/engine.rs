//! Game simulation engine: plays N games using the optimal strategy.
//!
//! Uses the EV table to make the optimal decision at each step of a round:
//! roll → (reroll)* → score. The simulated mean converges to EV(all categories),
//! which makes the batch a Monte-Carlo check of the DP.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::constants::*;
use crate::dice_mechanics::find_dice_set_index;
use crate::game_mechanics::calculate_category_score;
use crate::simulation::statistics::summarize_scores;
use crate::types::{Category, CategorySet, Dice, EvTable, Face, GameState, SolverContext};
use crate::widget_solver::{choose_best_keep, compute_scoring_layer, reroll_layer, Layer};

/// One scored round of a simulated game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub category: Category,
    pub dice: Dice,
    pub score: i32,
}

/// Outcome of one simulated game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub total_score: i32,
    pub rounds: Vec<RoundSummary>,
}

/// Results of a batch simulation.
pub struct SimulationResult {
    pub scores: Vec<i32>,
    pub mean: f64,
    pub std_dev: f64,
    pub std_error: f64,
    pub min: i32,
    pub max: i32,
    pub median: i32,
    pub elapsed: Duration,
    /// Highest-scoring game (first one on ties).
    pub best_game: Option<GameSummary>,
}

/// Roll one die by inverting the cumulative face distribution.
#[inline(always)]
fn roll_face(rng: &mut SmallRng) -> Face {
    let u: f64 = rng.random();
    let mut cumulative = 0.0;
    for face in Face::ALL {
        cumulative += face.probability();
        if u < cumulative {
            return face;
        }
    }
    Face::Pest
}

/// Roll `n` fresh dice.
pub fn roll_dice(rng: &mut SmallRng, n: usize) -> Dice {
    let mut counts = [0u8; NUM_FACES];
    for _ in 0..n {
        counts[roll_face(rng).index()] += 1;
    }
    Dice(counts)
}

/// Best category for final dice: first maximum of score + EV(rest).
fn choose_category(table: &EvTable, dice: Dice, categories: CategorySet) -> (Category, i32) {
    let mut best: Option<(Category, i32, f64)> = None;
    for c in categories.iter() {
        let scr = calculate_category_score(&dice, c);
        let val = scr as f64 + table.ev(categories.without(c));
        if best.map_or(true, |(_, _, b)| val > b) {
            best = Some((c, scr, val));
        }
    }
    match best {
        Some((c, scr, _)) => (c, scr),
        None => unreachable!("choose_category called with no categories left"),
    }
}

/// Play one game with optimal decisions.
///
/// Per round, layers are built once for the open categories; a reroll is taken
/// only when the best keep strictly beats scoring the current dice.
pub fn simulate_game(ctx: &SolverContext, table: &EvTable, rng: &mut SmallRng) -> GameSummary {
    let mut state = GameState::new();
    let mut rounds = Vec::with_capacity(CATEGORY_COUNT);

    while !state.is_game_over() {
        let categories = state.categories;
        let mut layers: Vec<Layer> = Vec::with_capacity(MAX_REROLLS as usize);
        layers.push(compute_scoring_layer(ctx, table, categories));
        for r in 1..MAX_REROLLS as usize {
            let next = reroll_layer(ctx, &layers[r - 1]);
            layers.push(next);
        }

        state = state.after_roll(roll_dice(rng, NUM_DICE), true);
        while state.rerolls_left > 0 {
            let ds = match find_dice_set_index(ctx, state.dice) {
                Some(ds) => ds,
                None => break,
            };
            let layer = &layers[state.rerolls_left as usize - 1];
            let (kid, keep_ev) = choose_best_keep(ctx, layer, ds);
            if layers[0][ds] >= keep_ev {
                break;
            }
            let keep = ctx.keep_table.keeps[kid];
            let rerolled = roll_dice(rng, NUM_DICE - keep.total());
            state = state.after_roll(keep.add(rerolled), false);
        }

        let (category, score) = choose_category(table, state.dice, categories);
        rounds.push(RoundSummary {
            category,
            dice: state.dice,
            score,
        });
        state = state.after_score(category, score);
    }

    GameSummary {
        total_score: state.score as i32,
        rounds,
    }
}

/// Simulate `num_games` in parallel; game i uses `SmallRng::seed_from_u64(seed + i)`.
pub fn simulate_batch(
    ctx: &SolverContext,
    table: &EvTable,
    num_games: usize,
    seed: u64,
) -> SimulationResult {
    let start = Instant::now();

    let games: Vec<GameSummary> = (0..num_games)
        .into_par_iter()
        .map(|i| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
            simulate_game(ctx, table, &mut rng)
        })
        .collect();

    let elapsed = start.elapsed();

    let mut best_game: Option<&GameSummary> = None;
    for g in &games {
        if best_game.map_or(true, |b| g.total_score > b.total_score) {
            best_game = Some(g);
        }
    }
    let best_game = best_game.cloned();

    let scores: Vec<i32> = games.iter().map(|g| g.total_score).collect();
    let stats = summarize_scores(&scores);

    SimulationResult {
        scores,
        mean: stats.mean,
        std_dev: stats.std_dev,
        std_error: stats.std_error,
        min: stats.min,
        max: stats.max,
        median: stats.median,
        elapsed,
        best_game,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase0_tables::build_context;
    use crate::state_computation::compute_all_state_values;

    #[test]
    fn test_roll_dice_counts() {
        let mut rng = SmallRng::seed_from_u64(42);
        for n in 0..=NUM_DICE {
            assert_eq!(roll_dice(&mut rng, n).total(), n);
        }
    }

    #[test]
    fn test_face_frequencies() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut counts = [0usize; NUM_FACES];
        let rolls = 200_000;
        for _ in 0..rolls {
            counts[roll_face(&mut rng).index()] += 1;
        }
        for f in Face::ALL {
            let freq = counts[f.index()] as f64 / rolls as f64;
            assert!((freq - f.probability()).abs() < 0.01, "{}: {}", f, freq);
        }
    }

    #[test]
    fn test_simulate_game_uses_every_category() {
        let ctx = build_context();
        let table = compute_all_state_values(&ctx);
        let mut rng = SmallRng::seed_from_u64(42);
        let game = simulate_game(&ctx, &table, &mut rng);

        assert_eq!(game.rounds.len(), CATEGORY_COUNT);
        let used: CategorySet = game.rounds.iter().map(|r| r.category).collect();
        assert_eq!(used, CategorySet::ALL);
        assert_eq!(
            game.total_score,
            game.rounds.iter().map(|r| r.score).sum::<i32>()
        );
        assert!(game.total_score >= 0 && game.total_score <= 237);
        for r in &game.rounds {
            assert_eq!(r.dice.total(), NUM_DICE);
        }
    }

    #[test]
    fn test_simulate_game_deterministic() {
        let ctx = build_context();
        let table = compute_all_state_values(&ctx);
        let mut rng1 = SmallRng::seed_from_u64(123);
        let mut rng2 = SmallRng::seed_from_u64(123);
        assert_eq!(
            simulate_game(&ctx, &table, &mut rng1),
            simulate_game(&ctx, &table, &mut rng2)
        );
    }

    #[test]
    fn test_simulate_batch_summary() {
        let ctx = build_context();
        let table = compute_all_state_values(&ctx);
        let result = simulate_batch(&ctx, &table, 200, 1);
        assert_eq!(result.scores.len(), 200);
        assert!(result.min <= result.median && result.median <= result.max);
        let best = result.best_game.unwrap();
        assert_eq!(best.total_score, result.max);
    }
}
