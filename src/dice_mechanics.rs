//! Dice outcome space: packing, indexing, multinomial probabilities and the
//! enumerations of reroll outcomes and keep decisions.

use crate::constants::*;
use crate::types::{Dice, Face, RerollOutcome, SolverContext};

/// Base-6 positional encoding of a count vector (counts run 0..=5).
///
/// Injective on every multiset of at most 5 dice; the result is `< PACK_SPACE`.
#[inline(always)]
pub fn pack_dice(dice: Dice) -> usize {
    dice.0
        .iter()
        .fold(0usize, |acc, &c| acc * (NUM_DICE + 1) + c as usize)
}

/// Map a 5-dice outcome to its index in R_5 (0-125).
///
/// Returns `None` for multisets that are not a full roll.
#[inline(always)]
pub fn find_dice_set_index(ctx: &SolverContext, dice: Dice) -> Option<usize> {
    if dice.total() != NUM_DICE {
        return None;
    }
    match ctx.index_lookup[pack_dice(dice)] {
        u16::MAX => None,
        idx => Some(idx as usize),
    }
}

/// Count occurrences of each face in a sequence of rolled dice.
pub fn count_faces(faces: &[Face]) -> Dice {
    let mut counts = [0u8; NUM_FACES];
    for &f in faces {
        counts[f.index()] += 1;
    }
    Dice(counts)
}

/// P(outcome | n dice) for the n = `dice.total()` dice it contains.
///
/// Formula: n! / ∏(count_f!) · ∏(p_f ^ count_f)
pub fn compute_probability_of_dice_set(ctx: &SolverContext, dice: Dice) -> f64 {
    let mut probability = ctx.factorial[dice.total()];
    for face in Face::ALL {
        let count = dice.count(face) as usize;
        probability /= ctx.factorial[count];
        probability *= face.probability().powi(count as i32);
    }
    probability
}

/// Every multiset of exactly `n` dice over the 5 faces (stars and bars).
///
/// Fixed-depth recursion over the faces; the order is lexicographic descending
/// in the Jumbleberry count, so `n` Jumbleberries comes first.
pub fn enumerate_multisets(n: usize) -> Vec<Dice> {
    fn fill(face: usize, remaining: u8, counts: &mut [u8; NUM_FACES], out: &mut Vec<Dice>) {
        if face == NUM_FACES - 1 {
            counts[face] = remaining;
            out.push(Dice(*counts));
            return;
        }
        for c in (0..=remaining).rev() {
            counts[face] = c;
            fill(face + 1, remaining - c, counts, out);
        }
    }

    let mut out = Vec::new();
    let mut counts = [0u8; NUM_FACES];
    fill(0, n as u8, &mut counts, &mut out);
    out
}

/// All outcomes of rolling `n` dice paired with their probabilities.
pub fn enumerate_rerolls(ctx: &SolverContext, n: usize) -> Vec<RerollOutcome> {
    enumerate_multisets(n)
        .into_iter()
        .map(|dice| RerollOutcome {
            dice,
            probability: compute_probability_of_dice_set(ctx, dice),
        })
        .collect()
}

/// Every sub-multiset of `dice`: a Cartesian walk over 0..=count_f per face.
///
/// Yields ∏(count_f + 1) keeps, starting with the empty keep and ending with
/// `dice` itself.
pub fn enumerate_keeps(dice: Dice) -> Vec<Dice> {
    let c = dice.0;
    let capacity: usize = c.iter().map(|&n| n as usize + 1).product();
    let mut keeps = Vec::with_capacity(capacity);
    for j in 0..=c[0] {
        for s in 0..=c[1] {
            for p in 0..=c[2] {
                for m in 0..=c[3] {
                    for x in 0..=c[4] {
                        keeps.push(Dice([j, s, p, m, x]));
                    }
                }
            }
        }
    }
    keeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase0_tables;

    fn make_ctx() -> Box<SolverContext> {
        let mut ctx = SolverContext::new_boxed();
        phase0_tables::precompute_lookup_tables(&mut ctx);
        ctx
    }

    #[test]
    fn test_pack_dice_injective() {
        let mut seen = std::collections::HashSet::new();
        for n in 0..=NUM_DICE {
            for d in enumerate_multisets(n) {
                let key = pack_dice(d);
                assert!(key < PACK_SPACE);
                assert!(seen.insert(key), "duplicate key for {}", d);
            }
        }
        assert_eq!(seen.len(), NUM_KEEP_MULTISETS);
    }

    #[test]
    fn test_find_dice_set_index() {
        let ctx = make_ctx();
        assert_eq!(find_dice_set_index(&ctx, Dice([5, 0, 0, 0, 0])), Some(0));
        assert_eq!(find_dice_set_index(&ctx, Dice([0, 0, 0, 0, 5])), Some(125));
        assert_eq!(find_dice_set_index(&ctx, Dice([1, 0, 0, 0, 0])), None);

        for i in 0..NUM_DICE_SETS {
            assert_eq!(find_dice_set_index(&ctx, ctx.all_dice_sets[i]), Some(i));
        }
    }

    #[test]
    fn test_count_faces() {
        let d = count_faces(&[
            Face::Jumbleberry,
            Face::Moonberry,
            Face::Jumbleberry,
            Face::Pest,
            Face::Sugarberry,
        ]);
        assert_eq!(d, Dice([2, 1, 0, 1, 1]));
    }

    #[test]
    fn test_multiset_counts() {
        let expected = [1, 5, 15, 35, 70, 126];
        for (n, &count) in expected.iter().enumerate() {
            let sets = enumerate_multisets(n);
            assert_eq!(sets.len(), count);
            assert!(sets.iter().all(|d| d.total() == n));
        }
    }

    #[test]
    fn test_reroll_probabilities_sum_to_one() {
        let ctx = make_ctx();
        for n in 0..=NUM_DICE {
            let sum: f64 = enumerate_rerolls(&ctx, n).iter().map(|o| o.probability).sum();
            assert!((sum - 1.0).abs() < 1e-10, "n={} sums to {}", n, sum);
        }
    }

    #[test]
    fn test_probability() {
        let ctx = make_ctx();
        let p = compute_probability_of_dice_set(&ctx, Dice([0, 0, 0, 5, 0]));
        assert!((p - 1e-5).abs() < 1e-15);

        let p = compute_probability_of_dice_set(&ctx, Dice([1, 1, 1, 1, 1]));
        assert!((p - 120.0 * 0.3 * 0.3 * 0.2 * 0.1 * 0.1).abs() < 1e-12);

        assert_eq!(compute_probability_of_dice_set(&ctx, Dice::EMPTY), 1.0);
    }

    #[test]
    fn test_enumerate_keeps() {
        let keeps = enumerate_keeps(Dice([2, 1, 1, 1, 0]));
        assert_eq!(keeps.len(), 3 * 2 * 2 * 2);
        assert_eq!(keeps[0], Dice::EMPTY);
        assert_eq!(*keeps.last().unwrap(), Dice([2, 1, 1, 1, 0]));

        assert_eq!(enumerate_keeps(Dice([0, 0, 0, 0, 5])).len(), 6);
        assert_eq!(enumerate_keeps(Dice([1, 1, 1, 1, 1])).len(), 32);
    }
}
