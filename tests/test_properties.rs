//! Property-based tests for core game mechanics.

use std::sync::OnceLock;

use proptest::prelude::*;

use jbfields::constants::*;
use jbfields::dice_mechanics::{count_faces, enumerate_keeps, find_dice_set_index};
use jbfields::game_mechanics::calculate_category_score;
use jbfields::notation::{format_keep, parse_categories, parse_dice};
use jbfields::phase0_tables::build_context;
use jbfields::types::{Category, CategorySet, Dice, Face, SolverContext};

static CTX: OnceLock<Box<SolverContext>> = OnceLock::new();

fn context() -> &'static SolverContext {
    CTX.get_or_init(build_context)
}

/// Strategy: five faces rolled independently.
fn dice_strategy() -> impl Strategy<Value = Dice> {
    prop::array::uniform5(0..NUM_FACES).prop_map(|idx| {
        let faces: Vec<Face> = idx.iter().map(|&i| Face::ALL[i]).collect();
        count_faces(&faces)
    })
}

fn category_strategy() -> impl Strategy<Value = Category> {
    (0..CATEGORY_COUNT).prop_map(Category::from_index)
}

/// Strategy: any non-empty category set.
fn category_set_strategy() -> impl Strategy<Value = CategorySet> {
    (1u16..NUM_CATEGORY_SETS as u16).prop_filter_map("in range", CategorySet::from_bits)
}

proptest! {
    // 1. Scores stay within [0, max]
    #[test]
    fn score_within_bounds(dice in dice_strategy(), cat in category_strategy()) {
        let score = calculate_category_score(&dice, cat);
        prop_assert!(score >= 0, "score={score} for dice={dice} cat={cat}");
        prop_assert!(score <= cat.max_score(), "score={score} for dice={dice} cat={cat}");
    }

    // 2. Free Roll always scores the face-point sum and dominates every other category
    #[test]
    fn free_roll_dominates(dice in dice_strategy(), cat in category_strategy()) {
        let free = calculate_category_score(&dice, Category::FreeRoll);
        prop_assert_eq!(free, dice.points());
        prop_assert!(calculate_category_score(&dice, cat) <= free);
    }

    // 3. Baskets are nested: scoring five of a kind implies four, four implies three
    #[test]
    fn baskets_nested(dice in dice_strategy()) {
        let b3 = calculate_category_score(&dice, Category::BasketOfThree);
        let b4 = calculate_category_score(&dice, Category::BasketOfFour);
        let b5 = calculate_category_score(&dice, Category::BasketOfFive);
        prop_assert!(b5 <= b4 && b4 <= b3);
    }

    // 4. Every keep is a sub-multiset, the empty keep comes first, keep-all last
    #[test]
    fn keeps_are_subsets(dice in dice_strategy()) {
        let keeps = enumerate_keeps(dice);
        let expected: usize = dice.0.iter().map(|&c| c as usize + 1).product();
        prop_assert_eq!(keeps.len(), expected);
        prop_assert_eq!(keeps[0], Dice::EMPTY);
        prop_assert_eq!(keeps[keeps.len() - 1], dice);
        for k in &keeps {
            prop_assert!(k.is_subset_of(dice));
        }
    }

    // 5. Every roll maps to a dice-set index whose dice match
    #[test]
    fn dice_index_round_trip(dice in dice_strategy()) {
        let ctx = context();
        let idx = find_dice_set_index(ctx, dice);
        prop_assert!(idx.is_some());
        prop_assert_eq!(ctx.all_dice_sets[idx.unwrap()], dice);
    }

    // 6. The face-letter sequence of a roll parses back to the same counts
    #[test]
    fn parse_sequence_matches_counts(dice in dice_strategy()) {
        let sequence: String = Face::ALL
            .iter()
            .flat_map(|&f| std::iter::repeat(f.letter()).take(dice.count(f) as usize))
            .collect();
        prop_assert_eq!(parse_dice(&sequence), Ok(dice));
    }

    // 7. Keep notation lists each present face once, in face order
    #[test]
    fn format_keep_counts(dice in dice_strategy()) {
        let text = format_keep(dice);
        let tokens: Vec<&str> = text.split(' ').collect();
        let present = dice.0.iter().filter(|&&c| c > 0).count();
        prop_assert_eq!(tokens.len(), present);
        prop_assert_eq!(parse_dice(&text), Ok(dice));
    }

    // 8. A comma list of a set's names parses back to the same set
    #[test]
    fn category_list_round_trip(cs in category_set_strategy()) {
        let text = cs.iter().map(Category::name).collect::<Vec<_>>().join(",");
        prop_assert_eq!(parse_categories(&text), Ok(cs));
    }

    // 9. all-x-y removes exactly the listed categories
    #[test]
    fn all_minus_round_trip(cs in category_set_strategy()) {
        let removed: Vec<&str> = Category::ALL
            .iter()
            .filter(|&&c| !cs.contains(c))
            .map(|&c| c.name())
            .collect();
        let mut text = "all".to_string();
        for name in removed {
            text.push('-');
            text.push_str(name);
        }
        prop_assert_eq!(parse_categories(&text), Ok(cs));
    }
}
