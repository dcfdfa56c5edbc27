//! Real-time solver: the best action for one (dice, rerolls left, categories) state.
//!
//! Everything here is a pure function of its arguments. [`solve`] validates the
//! query and rejects degenerate input before any layer is built.

use std::cmp::Ordering;

use thiserror::Error;

use crate::constants::*;
use crate::dice_mechanics::find_dice_set_index;
use crate::game_mechanics::calculate_category_score;
use crate::phase0_tables::keep_index;
use crate::types::{Category, CategorySet, Dice, EvTable, SolverContext};
use crate::widget_solver::{compute_expected_value_for_keep, compute_layer_for_rerolls};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    #[error("no categories left to score")]
    EmptyCategorySet,
    #[error("rerolls left must be 0..={max}, got {0}", max = MAX_REROLLS)]
    InvalidRerolls(u8),
    #[error("dice must total {n}, got {0}", n = NUM_DICE)]
    InvalidDice(usize),
    #[error("keep {keep} is not part of dice {dice}")]
    InvalidKeep { keep: Dice, dice: Dice },
    #[error("category {0} has already been used")]
    CategoryUnavailable(Category),
}

/// What the solver tells the player to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Score { category: Category, ev: f64 },
    Reroll { keep: Dice, ev: f64 },
}

impl Action {
    pub fn ev(&self) -> f64 {
        match *self {
            Action::Score { ev, .. } | Action::Reroll { ev, .. } => ev,
        }
    }
}

/// One scoring choice: immediate points plus the EV of the categories left after it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryOption {
    pub category: Category,
    pub immediate_score: i32,
    pub future_ev: f64,
    pub total_value: f64,
}

/// One keep decision that rerolls at least one die.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RerollOption {
    pub keep: Dice,
    pub num_rerolled: usize,
    pub ev: f64,
}

/// Full solver output. `category_options` is filled for score recommendations,
/// `top_reroll_options` for reroll recommendations.
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub best_action: Action,
    pub theoretical_max: i32,
    pub category_options: Vec<CategoryOption>,
    pub top_reroll_options: Vec<RerollOption>,
}

fn validate(dice: Dice, rerolls_left: u8, categories: CategorySet) -> Result<(), SolveError> {
    if categories.is_empty() {
        return Err(SolveError::EmptyCategorySet);
    }
    if rerolls_left > MAX_REROLLS {
        return Err(SolveError::InvalidRerolls(rerolls_left));
    }
    if dice.total() != NUM_DICE {
        return Err(SolveError::InvalidDice(dice.total()));
    }
    Ok(())
}

/// Stable descending sort: equal values keep their enumeration order.
fn sort_descending<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}

/// Compute the optimal action for a game state.
///
/// `rerolls_left`: 0 = must score, 1 or 2 = may reroll. Scoring wins ties against
/// the best reroll.
pub fn solve(
    ctx: &SolverContext,
    table: &EvTable,
    dice: Dice,
    rerolls_left: u8,
    categories: CategorySet,
) -> Result<Recommendation, SolveError> {
    validate(dice, rerolls_left, categories)?;

    let scoring = solve_scoring(table, dice, categories);
    let theoretical_max = theoretical_max(dice, rerolls_left, categories);
    if rerolls_left == 0 {
        return Ok(Recommendation {
            theoretical_max,
            ..scoring
        });
    }

    let mut options = compute_reroll_options(ctx, table, dice, rerolls_left, categories);
    let best_reroll = options
        .iter()
        .fold(None::<RerollOption>, |best, o| match best {
            Some(b) if b.ev >= o.ev => Some(b),
            _ => Some(*o),
        });

    match best_reroll {
        Some(best) if best.ev > scoring.best_action.ev() => {
            sort_descending(&mut options, |o| o.ev);
            options.truncate(TOP_REROLL_OPTIONS);
            Ok(Recommendation {
                best_action: Action::Reroll {
                    keep: best.keep,
                    ev: best.ev,
                },
                theoretical_max,
                category_options: Vec::new(),
                top_reroll_options: options,
            })
        }
        _ => Ok(Recommendation {
            theoretical_max,
            ..scoring
        }),
    }
}

/// Score-now recommendation: every open category, best first.
fn solve_scoring(table: &EvTable, dice: Dice, categories: CategorySet) -> Recommendation {
    let mut options: Vec<CategoryOption> = categories
        .iter()
        .map(|c| evaluate_chosen_category(table, dice, categories, c))
        .collect();
    sort_descending(&mut options, |o| o.total_value);

    let best = options[0];
    Recommendation {
        best_action: Action::Score {
            category: best.category,
            ev: best.total_value,
        },
        theoretical_max: 0,
        category_options: options,
        top_reroll_options: Vec::new(),
    }
}

/// Every proper keep of `dice`, in enumeration order, with its EV.
fn compute_reroll_options(
    ctx: &SolverContext,
    table: &EvTable,
    dice: Dice,
    rerolls_left: u8,
    categories: CategorySet,
) -> Vec<RerollOption> {
    let layer = compute_layer_for_rerolls(ctx, table, categories, rerolls_left as usize - 1);
    let ds = match find_dice_set_index(ctx, dice) {
        Some(ds) => ds,
        None => return Vec::new(),
    };
    ctx.keep_table
        .keeps_for(ds)
        .iter()
        .map(|&kid| {
            let keep = ctx.keep_table.keeps[kid as usize];
            RerollOption {
                keep,
                num_rerolled: NUM_DICE - keep.total(),
                ev: compute_expected_value_for_keep(ctx, &layer, kid as usize),
            }
        })
        .collect()
}

/// Immediate score plus the EV of what is left after committing `dice` to `category`.
///
/// `category` is assumed to be in `categories`; [`evaluate_category_checked`]
/// enforces it.
pub fn evaluate_chosen_category(
    table: &EvTable,
    dice: Dice,
    categories: CategorySet,
    category: Category,
) -> CategoryOption {
    let immediate_score = calculate_category_score(&dice, category);
    let future_ev = table.ev(categories.without(category));
    CategoryOption {
        category,
        immediate_score,
        future_ev,
        total_value: immediate_score as f64 + future_ev,
    }
}

/// [`evaluate_chosen_category`] with the category and dice validated.
pub fn evaluate_category_checked(
    table: &EvTable,
    dice: Dice,
    categories: CategorySet,
    category: Category,
) -> Result<CategoryOption, SolveError> {
    validate(dice, 0, categories)?;
    if !categories.contains(category) {
        return Err(SolveError::CategoryUnavailable(category));
    }
    Ok(evaluate_chosen_category(table, dice, categories, category))
}

/// EV of rerolling everything except `keep`, with `rerolls_left` rerolls before
/// this one is spent.
///
/// Keeping all five dice is allowed and evaluates to the best value of the
/// current dice one reroll further down.
pub fn evaluate_chosen_keep(
    ctx: &SolverContext,
    table: &EvTable,
    dice: Dice,
    keep: Dice,
    rerolls_left: u8,
    categories: CategorySet,
) -> Result<f64, SolveError> {
    validate(dice, rerolls_left, categories)?;
    if rerolls_left == 0 {
        return Err(SolveError::InvalidRerolls(0));
    }
    if !keep.is_subset_of(dice) {
        return Err(SolveError::InvalidKeep { keep, dice });
    }
    let kid = keep_index(ctx, keep).ok_or(SolveError::InvalidKeep { keep, dice })?;
    let layer = compute_layer_for_rerolls(ctx, table, categories, rerolls_left as usize - 1);
    Ok(compute_expected_value_for_keep(ctx, &layer, kid))
}

/// Value of every dice set with `rerolls` rerolls left, indexed by dice-set index.
pub fn compute_expected_values(
    ctx: &SolverContext,
    table: &EvTable,
    categories: CategorySet,
    rerolls: u8,
) -> Result<[f64; NUM_DICE_SETS], SolveError> {
    if categories.is_empty() {
        return Err(SolveError::EmptyCategorySet);
    }
    if rerolls > MAX_REROLLS {
        return Err(SolveError::InvalidRerolls(rerolls));
    }
    Ok(compute_layer_for_rerolls(
        ctx,
        table,
        categories,
        rerolls as usize,
    ))
}

fn sum_max_scores(categories: CategorySet) -> i32 {
    categories.iter().map(Category::max_score).sum()
}

/// Score reachable from this state if every future roll came up perfect.
///
/// With rerolls left any outcome is reachable, so it is the sum of the open
/// categories' maxima. With none, the current dice must go somewhere.
pub fn theoretical_max(dice: Dice, rerolls_left: u8, categories: CategorySet) -> i32 {
    if rerolls_left > 0 {
        return sum_max_scores(categories);
    }
    categories
        .iter()
        .map(|c| calculate_category_score(&dice, c) + sum_max_scores(categories.without(c)))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase0_tables::build_context;
    use crate::types::Category::*;

    fn uniform_table(value: f64) -> EvTable {
        EvTable::from_values([value; NUM_CATEGORY_SETS])
    }

    #[test]
    fn test_rejects_degenerate_queries() {
        let ctx = build_context();
        let table = EvTable::new();
        let dice = Dice([1, 1, 1, 1, 1]);
        assert_eq!(
            solve(&ctx, &table, dice, 0, CategorySet::EMPTY),
            Err(SolveError::EmptyCategorySet)
        );
        assert_eq!(
            solve(&ctx, &table, dice, 3, CategorySet::ALL),
            Err(SolveError::InvalidRerolls(3))
        );
        assert_eq!(
            solve(&ctx, &table, Dice([1, 1, 0, 0, 0]), 0, CategorySet::ALL),
            Err(SolveError::InvalidDice(2))
        );
    }

    #[test]
    fn test_scoring_ties_keep_enumeration_order() {
        let ctx = build_context();
        let table = EvTable::new();
        // Five Pests score 0 everywhere
        let rec = solve(&ctx, &table, Dice([0, 0, 0, 0, 5]), 0, CategorySet::ALL).unwrap();
        assert_eq!(
            rec.best_action,
            Action::Score {
                category: Jumbleberry,
                ev: 0.0
            }
        );
        let order: Vec<Category> = rec.category_options.iter().map(|o| o.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_scoring_options_sorted() {
        let ctx = build_context();
        let table = uniform_table(0.0);
        let rec = solve(&ctx, &table, Dice([2, 1, 1, 1, 0]), 0, CategorySet::ALL).unwrap();
        assert_eq!(rec.category_options.len(), 9);
        assert!(rec.top_reroll_options.is_empty());
        for w in rec.category_options.windows(2) {
            assert!(w[0].total_value >= w[1].total_value);
        }
        // 17 in Mixed Basket comes before 17 in Free Roll
        assert_eq!(rec.category_options[0].category, MixedBasket);
        assert_eq!(rec.category_options[1].category, FreeRoll);
    }

    #[test]
    fn test_reroll_recommendation_shape() {
        let ctx = build_context();
        let table = EvTable::new();
        let only_moon = CategorySet::EMPTY.with(Moonberry);
        let rec = solve(&ctx, &table, Dice([2, 1, 1, 1, 0]), 2, only_moon).unwrap();
        match rec.best_action {
            Action::Reroll { keep, ev } => {
                assert_eq!(keep, Dice([0, 0, 0, 1, 0]));
                assert!(ev > 7.0);
            }
            other => panic!("expected reroll, got {:?}", other),
        }
        assert_eq!(rec.top_reroll_options.len(), TOP_REROLL_OPTIONS);
        assert!(rec.category_options.is_empty());
        for w in rec.top_reroll_options.windows(2) {
            assert!(w[0].ev >= w[1].ev);
        }
        assert!(rec
            .top_reroll_options
            .iter()
            .all(|o| o.num_rerolled >= 1 && o.keep.is_subset_of(Dice([2, 1, 1, 1, 0]))));
    }

    #[test]
    fn test_perfect_dice_score_immediately() {
        let ctx = build_context();
        let table = EvTable::new();
        let only_moon = CategorySet::EMPTY.with(Moonberry);
        let rec = solve(&ctx, &table, Dice([0, 0, 0, 5, 0]), 2, only_moon).unwrap();
        assert_eq!(
            rec.best_action,
            Action::Score {
                category: Moonberry,
                ev: 35.0
            }
        );
        assert_eq!(rec.theoretical_max, 35);
    }

    #[test]
    fn test_theoretical_max() {
        assert_eq!(theoretical_max(Dice([0, 0, 0, 0, 5]), 2, CategorySet::ALL), 237);
        assert_eq!(theoretical_max(Dice([0, 0, 0, 0, 5]), 1, CategorySet::ALL), 237);
        // Stuck with five Pests: sacrifice the cheapest category
        assert_eq!(
            theoretical_max(Dice([0, 0, 0, 0, 5]), 0, CategorySet::ALL),
            237 - 10
        );
        assert_eq!(
            theoretical_max(Dice([0, 0, 0, 5, 0]), 0, CategorySet::ALL),
            237
        );
        let cs = CategorySet::EMPTY.with(MixedBasket);
        assert_eq!(theoretical_max(Dice([2, 1, 1, 1, 0]), 0, cs), 17);
    }

    #[test]
    fn test_evaluate_chosen_keep() {
        let ctx = build_context();
        let table = EvTable::new();
        let cs = CategorySet::EMPTY.with(FreeRoll);
        let dice = Dice([2, 1, 1, 1, 0]);

        let keep_all = evaluate_chosen_keep(&ctx, &table, dice, dice, 1, cs).unwrap();
        assert_eq!(keep_all, 17.0);

        let reroll_all = evaluate_chosen_keep(&ctx, &table, dice, Dice::EMPTY, 1, cs).unwrap();
        assert!((reroll_all - 13.5).abs() < 1e-9);

        assert!(matches!(
            evaluate_chosen_keep(&ctx, &table, dice, Dice([3, 0, 0, 0, 0]), 1, cs),
            Err(SolveError::InvalidKeep { .. })
        ));
        assert_eq!(
            evaluate_chosen_keep(&ctx, &table, dice, Dice::EMPTY, 0, cs),
            Err(SolveError::InvalidRerolls(0))
        );
    }

    #[test]
    fn test_evaluate_category_checked() {
        let table = uniform_table(5.0);
        let cs = CategorySet::EMPTY.with(Moonberry).with(FreeRoll);
        let opt = evaluate_category_checked(&table, Dice([0, 0, 0, 5, 0]), cs, Moonberry).unwrap();
        assert_eq!(opt.immediate_score, 35);
        assert_eq!(opt.future_ev, 5.0);
        assert_eq!(opt.total_value, 40.0);
        assert_eq!(
            evaluate_category_checked(&table, Dice([0, 0, 0, 5, 0]), cs, Jumbleberry),
            Err(SolveError::CategoryUnavailable(Jumbleberry))
        );
    }

    #[test]
    fn test_compute_expected_values() {
        let ctx = build_context();
        let table = EvTable::new();
        let cs = CategorySet::EMPTY.with(FreeRoll);
        let v0 = compute_expected_values(&ctx, &table, cs, 0).unwrap();
        let v2 = compute_expected_values(&ctx, &table, cs, 2).unwrap();
        for ds in 0..NUM_DICE_SETS {
            assert!(v2[ds] >= v0[ds]);
        }
        assert_eq!(
            compute_expected_values(&ctx, &table, CategorySet::EMPTY, 0),
            Err(SolveError::EmptyCategorySet)
        );
    }
}
