//! Game constants.
//!
//! Maps the rule set to concrete values:
//! - 5 faces (Jumbleberry, Sugarberry, Pickleberry, Moonberry, Pest)
//! - |R_5| = [`NUM_DICE_SETS`] = C(9,4) = 126 distinct 5-dice outcomes
//! - |R_k| = [`NUM_KEEP_MULTISETS`] = 252 keep-multisets of 0..5 dice
//! - 9 categories, so category subsets fit in 2^9 = [`NUM_CATEGORY_SETS`] slots

/// Dice rolled each round.
pub const NUM_DICE: usize = 5;

/// Distinct die faces.
pub const NUM_FACES: usize = 5;

/// Rerolls available after the initial roll of each round.
pub const MAX_REROLLS: u8 = 2;

/// Number of distinct 5-dice multisets over 5 faces: C(5+5-1, 5-1) = 126.
pub const NUM_DICE_SETS: usize = 126;

/// Number of keep-multisets for 0-5 dice over 5 faces: 1+5+15+35+70+126 = 252.
pub const NUM_KEEP_MULTISETS: usize = 252;

/// Upper bound on proper keeps (at least one die rerolled) for one dice set.
/// Reached by one die of each face: 2^5 - 1.
pub const MAX_KEEPS_PER_DICE_SET: usize = 31;

/// Size of the base-6 packing space for face-count vectors (counts 0..=5).
pub const PACK_SPACE: usize = 7776;

/// Number of scoring categories.
pub const CATEGORY_COUNT: usize = 9;

/// Number of category subsets (EV table size).
pub const NUM_CATEGORY_SETS: usize = 1 << CATEGORY_COUNT;

/// Bitmask with every category present.
pub const ALL_CATEGORIES_MASK: u16 = (1 << CATEGORY_COUNT) - 1;

/// Point value of each face.
pub const FACE_POINTS: [i32; NUM_FACES] = [2, 2, 4, 7, 0];

/// Probability of each face on a single die (10-sided: 3 J, 3 S, 2 P, 1 M, 1 X).
pub const FACE_PROBABILITIES: [f64; NUM_FACES] = [0.3, 0.3, 0.2, 0.1, 0.1];

pub const FACE_NAMES: [&str; NUM_FACES] =
    ["Jumbleberry", "Sugarberry", "Pickleberry", "Moonberry", "Pest"];

/// One-letter notation used by the dice parser and keep formatting.
pub const FACE_LETTERS: [char; NUM_FACES] = ['J', 'S', 'P', 'M', 'X'];

/// Category indices, used as bit positions in a category-set bitmask.
pub const CATEGORY_JUMBLEBERRY: usize = 0;
pub const CATEGORY_SUGARBERRY: usize = 1;
pub const CATEGORY_PICKLEBERRY: usize = 2;
pub const CATEGORY_MOONBERRY: usize = 3;
pub const CATEGORY_BASKET_OF_THREE: usize = 4;
pub const CATEGORY_BASKET_OF_FOUR: usize = 5;
pub const CATEGORY_BASKET_OF_FIVE: usize = 6;
pub const CATEGORY_MIXED_BASKET: usize = 7;
pub const CATEGORY_FREE_ROLL: usize = 8;

/// Human-readable category names (also the names written to the EV table file).
pub const CATEGORY_NAMES: [&str; CATEGORY_COUNT] = [
    "Jumbleberry",
    "Sugarberry",
    "Pickleberry",
    "Moonberry",
    "Basket of Three",
    "Basket of Four",
    "Basket of Five",
    "Mixed Basket",
    "Free Roll",
];

/// Best achievable score per category with perfect dice.
pub const CATEGORY_MAX_SCORES: [i32; CATEGORY_COUNT] = [
    10, 10, 20, 35, // 5 of the face
    35, 35, 35, // five Moonberries
    22, // J + S + P + 2M
    35, // five Moonberries
];

/// How many reroll options the solver reports.
pub const TOP_REROLL_OPTIONS: usize = 10;

/// Default location of the persisted EV table.
pub const DEFAULT_EV_TABLE_PATH: &str = "data/ev_table.json";
