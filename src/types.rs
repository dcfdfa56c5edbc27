//! Core data structures: faces, dice, categories, the keep-multiset table, the
//! solver context and the EV table.
//!
//! The central type is [`SolverContext`], which holds every precomputed lookup table.
//! It is built once by Phase 0 ([`crate::phase0_tables::precompute_lookup_tables`])
//! and then shared immutably across threads during EV table computation and while
//! serving queries. The DP result lives in a separate [`EvTable`].

use std::fmt;

use crate::constants::*;

/// One face of a die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Face {
    Jumbleberry = 0,
    Sugarberry = 1,
    Pickleberry = 2,
    Moonberry = 3,
    Pest = 4,
}

impl Face {
    pub const ALL: [Face; NUM_FACES] = [
        Face::Jumbleberry,
        Face::Sugarberry,
        Face::Pickleberry,
        Face::Moonberry,
        Face::Pest,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub fn points(self) -> i32 {
        FACE_POINTS[self.index()]
    }

    #[inline(always)]
    pub fn probability(self) -> f64 {
        FACE_PROBABILITIES[self.index()]
    }

    pub fn letter(self) -> char {
        FACE_LETTERS[self.index()]
    }

    pub fn from_letter(letter: char) -> Option<Face> {
        let upper = letter.to_ascii_uppercase();
        FACE_LETTERS
            .iter()
            .position(|&l| l == upper)
            .map(|i| Face::ALL[i])
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(FACE_NAMES[self.index()])
    }
}

/// A multiset of dice stored as per-face counts (`counts[f]` = dice showing face f).
///
/// A full roll has total 5; keeps and partial rerolls use the same type with a
/// smaller total. Copying is a 5-byte memcpy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dice(pub [u8; NUM_FACES]);

impl Dice {
    pub const EMPTY: Dice = Dice([0; NUM_FACES]);

    #[inline(always)]
    pub fn count(self, face: Face) -> u8 {
        self.0[face.index()]
    }

    /// Number of dice in the multiset.
    #[inline(always)]
    pub fn total(self) -> usize {
        self.0.iter().map(|&c| c as usize).sum()
    }

    /// Sum of face points over all dice.
    #[inline(always)]
    pub fn points(self) -> i32 {
        self.0
            .iter()
            .zip(FACE_POINTS.iter())
            .map(|(&c, &p)| c as i32 * p)
            .sum()
    }

    /// Component-wise sum (keep + rerolled dice).
    #[inline(always)]
    pub fn add(self, other: Dice) -> Dice {
        let mut out = self.0;
        for (o, &c) in out.iter_mut().zip(other.0.iter()) {
            *o += c;
        }
        Dice(out)
    }

    /// True when `self` can be kept from `other` (component-wise ≤).
    pub fn is_subset_of(self, other: Dice) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(&a, &b)| a <= b)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.0;
        write!(
            f,
            "{{J:{} S:{} P:{} M:{} X:{}}}",
            c[0], c[1], c[2], c[3], c[4]
        )
    }
}

/// One of the 9 scoring categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Category {
    Jumbleberry = 0,
    Sugarberry = 1,
    Pickleberry = 2,
    Moonberry = 3,
    BasketOfThree = 4,
    BasketOfFour = 5,
    BasketOfFive = 6,
    MixedBasket = 7,
    FreeRoll = 8,
}

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Jumbleberry,
        Category::Sugarberry,
        Category::Pickleberry,
        Category::Moonberry,
        Category::BasketOfThree,
        Category::BasketOfFour,
        Category::BasketOfFive,
        Category::MixedBasket,
        Category::FreeRoll,
    ];

    /// Category for a bit position.
    ///
    /// # Panics
    ///
    /// On an index outside `0..9`: an out-of-range tag is a caller bug.
    #[inline(always)]
    pub fn from_index(index: usize) -> Category {
        match Self::ALL.get(index) {
            Some(&c) => c,
            None => panic!("invalid category index {index}"),
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        CATEGORY_NAMES[self.index()]
    }

    /// Highest score this category can ever award.
    pub fn max_score(self) -> i32 {
        CATEGORY_MAX_SCORES[self.index()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Category {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(value as usize).copied().ok_or(value)
    }
}

/// Set of categories as a 9-bit mask (bit i = [`Category`] with index i).
///
/// Construction never produces a value outside `[0, 512)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategorySet(u16);

impl CategorySet {
    pub const EMPTY: CategorySet = CategorySet(0);
    pub const ALL: CategorySet = CategorySet(ALL_CATEGORIES_MASK);

    /// Returns `None` for masks with bits above the 9 categories.
    pub fn from_bits(bits: u16) -> Option<CategorySet> {
        if bits & !ALL_CATEGORIES_MASK == 0 {
            Some(CategorySet(bits))
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Position in the EV table.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub fn contains(self, category: Category) -> bool {
        self.0 & (1 << category.index()) != 0
    }

    #[inline(always)]
    pub fn with(self, category: Category) -> CategorySet {
        CategorySet(self.0 | (1 << category.index()))
    }

    #[inline(always)]
    pub fn without(self, category: Category) -> CategorySet {
        CategorySet(self.0 & !(1 << category.index()))
    }

    #[inline(always)]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Categories in the set, in tag order.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |&c| self.contains(c))
    }

    /// Every subset of the 9 categories with exactly `size` members, ascending by mask.
    pub fn all_of_size(size: usize) -> impl Iterator<Item = CategorySet> {
        (0..NUM_CATEGORY_SETS as u16)
            .map(CategorySet)
            .filter(move |cs| cs.len() == size)
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        iter.into_iter().fold(CategorySet::EMPTY, CategorySet::with)
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Category::name).collect();
        f.write_str(&names.join(", "))
    }
}

/// Result of rolling `n` dice, paired with its multinomial probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RerollOutcome {
    pub dice: Dice,
    pub probability: f64,
}

/// Keep-multiset transition table with sparse CSR (Compressed Sparse Row) storage.
///
/// A "keep" is the multiset of dice retained before rerolling. Row `ki` holds
/// P(keep ki → dice set r) for every reachable full roll r.
///
/// Layout:
/// - `vals[row_start[ki]..row_start[ki+1]]`: probabilities for keep ki
/// - `cols[row_start[ki]..row_start[ki+1]]`: target dice-set indices
/// - `unique_keep_ids[ds][0..unique_count[ds]]`: proper keeps of dice set ds, in
///   Cartesian enumeration order (keep-all excluded)
/// - `keep_lookup[pack(keep)]`: keep multiset → keep index
pub struct KeepTable {
    /// Every keep multiset, indexed by keep id.
    pub keeps: Vec<Dice>,
    /// Sparse probability values for each keep row.
    pub vals: Vec<f64>,
    /// Column indices corresponding to vals entries.
    pub cols: Vec<u16>,
    /// Row boundaries: row_start[ki]..row_start[ki+1] gives range in vals/cols.
    pub row_start: [usize; NUM_KEEP_MULTISETS + 1],
    /// Per dice set: how many proper keeps.
    pub unique_count: [usize; NUM_DICE_SETS],
    /// Keep indices for each proper keep per dice set.
    pub unique_keep_ids: [[u16; MAX_KEEPS_PER_DICE_SET]; NUM_DICE_SETS],
    /// Reverse mapping from packed counts to keep index (`u16::MAX` = not a keep).
    pub keep_lookup: Vec<u16>,
}

impl Default for KeepTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeepTable {
    pub fn new() -> Self {
        Self {
            keeps: Vec::with_capacity(NUM_KEEP_MULTISETS),
            vals: Vec::new(),
            cols: Vec::new(),
            row_start: [0; NUM_KEEP_MULTISETS + 1],
            unique_count: [0; NUM_DICE_SETS],
            unique_keep_ids: [[0; MAX_KEEPS_PER_DICE_SET]; NUM_DICE_SETS],
            keep_lookup: vec![u16::MAX; PACK_SPACE],
        }
    }

    /// Sparse row for one keep: (target dice-set index, probability) pairs.
    #[inline(always)]
    pub fn row(&self, keep_id: usize) -> (&[u16], &[f64]) {
        let start = self.row_start[keep_id];
        let end = self.row_start[keep_id + 1];
        (&self.cols[start..end], &self.vals[start..end])
    }

    /// Proper keeps (at least one die rerolled) of dice set `ds`.
    #[inline(always)]
    pub fn keeps_for(&self, ds: usize) -> &[u16] {
        &self.unique_keep_ids[ds][..self.unique_count[ds]]
    }
}

/// Core context containing all precomputed tables.
pub struct SolverContext {
    /// R_5: all 126 distinct 5-dice multisets.
    pub all_dice_sets: [Dice; NUM_DICE_SETS],
    /// |R_5| (always 126 once built).
    pub num_combinations: usize,
    /// Reverse lookup: packed counts -> index in R_5.
    pub index_lookup: Vec<u16>,
    /// precomputed_scores[r][c] = s(r, c) for dice set r and category c.
    pub precomputed_scores: [[i32; CATEGORY_COUNT]; NUM_DICE_SETS],
    /// factorial[n] for n in 0..=5.
    pub factorial: [f64; NUM_DICE + 1],
    /// P(empty -> r): probability of rolling each r in R_5 from 5 fresh dice.
    pub dice_set_probabilities: [f64; NUM_DICE_SETS],
    /// reroll_outcomes[n]: every outcome of rolling n dice with its probability.
    pub reroll_outcomes: [Vec<RerollOutcome>; NUM_DICE + 1],
    /// Keep-multiset transition table.
    pub keep_table: KeepTable,
}

impl Default for SolverContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverContext {
    pub fn new() -> Self {
        Self {
            all_dice_sets: [Dice::EMPTY; NUM_DICE_SETS],
            num_combinations: 0,
            index_lookup: vec![u16::MAX; PACK_SPACE],
            precomputed_scores: [[0; CATEGORY_COUNT]; NUM_DICE_SETS],
            factorial: [0.0; NUM_DICE + 1],
            dice_set_probabilities: [0.0; NUM_DICE_SETS],
            reroll_outcomes: std::array::from_fn(|_| Vec::new()),
            keep_table: KeepTable::new(),
        }
    }

    pub fn new_boxed() -> Box<Self> {
        Box::new(Self::new())
    }
}

/// EV_table[C]: expected score still to be earned with categories C open, before
/// the first roll of a round.
///
/// Built once by [`crate::state_computation`] or [`crate::storage`] and read-only
/// afterwards.
#[derive(Clone, PartialEq)]
pub struct EvTable {
    ev: [f64; NUM_CATEGORY_SETS],
}

impl Default for EvTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EvTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvTable")
            .field("ev_all", &self.ev[CategorySet::ALL.index()])
            .finish()
    }
}

impl EvTable {
    /// All-zero table.
    pub fn new() -> Self {
        Self {
            ev: [0.0; NUM_CATEGORY_SETS],
        }
    }

    /// Table from raw values. Entry 0 (no categories left) is forced to 0.
    pub fn from_values(mut ev: [f64; NUM_CATEGORY_SETS]) -> Self {
        ev[0] = 0.0;
        Self { ev }
    }

    #[inline(always)]
    pub fn ev(&self, categories: CategorySet) -> f64 {
        self.ev[categories.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.ev
    }

    pub(crate) fn set(&mut self, categories: CategorySet, value: f64) {
        if !categories.is_empty() {
            self.ev[categories.index()] = value;
        }
    }
}

/// Caller-owned game state: the core never mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub dice: Dice,
    pub rerolls_left: u8,
    pub categories: CategorySet,
    pub score: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Start of game: all categories open, no dice rolled, score 0.
    pub fn new() -> Self {
        Self {
            dice: Dice::EMPTY,
            rerolls_left: MAX_REROLLS,
            categories: CategorySet::ALL,
            score: 0,
        }
    }

    /// Current round, 1-based.
    pub fn round(&self) -> usize {
        CATEGORY_COUNT - self.categories.len() + 1
    }

    pub fn is_game_over(&self) -> bool {
        self.categories.is_empty()
    }

    /// State after rolling: `dice` replaces the current dice, one reroll is spent
    /// unless this is the opening roll of the round.
    pub fn after_roll(self, dice: Dice, opening_roll: bool) -> Self {
        Self {
            dice,
            rerolls_left: if opening_roll {
                MAX_REROLLS
            } else {
                self.rerolls_left.saturating_sub(1)
            },
            ..self
        }
    }

    /// State after committing the current dice to `category` for `points`.
    pub fn after_score(self, category: Category, points: i32) -> Self {
        Self {
            dice: Dice::EMPTY,
            rerolls_left: MAX_REROLLS,
            categories: self.categories.without(category),
            score: self.score + points.max(0) as u32,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Round {} | Dice: {} | Rerolls left: {} | Score: {} | Categories left: {}",
            self.round(),
            self.dice,
            self.rerolls_left,
            self.score,
            self.categories.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dice_points_and_total() {
        let d = Dice([2, 1, 1, 1, 0]);
        assert_eq!(d.total(), 5);
        assert_eq!(d.points(), 17);
        assert_eq!(Dice([0, 0, 0, 5, 0]).points(), 35);
        assert_eq!(Dice([0, 0, 0, 0, 5]).points(), 0);
        assert_eq!(Dice::EMPTY.total(), 0);
    }

    #[test]
    fn test_dice_display() {
        assert_eq!(Dice([2, 1, 1, 1, 0]).to_string(), "{J:2 S:1 P:1 M:1 X:0}");
    }

    #[test]
    fn test_face_letters() {
        assert_eq!(Face::from_letter('m'), Some(Face::Moonberry));
        assert_eq!(Face::from_letter('X'), Some(Face::Pest));
        assert_eq!(Face::from_letter('q'), None);
        for f in Face::ALL {
            assert_eq!(Face::from_letter(f.letter()), Some(f));
        }
    }

    #[test]
    fn test_category_set_ops() {
        let cs = CategorySet::EMPTY
            .with(Category::Moonberry)
            .with(Category::FreeRoll);
        assert_eq!(cs.len(), 2);
        assert!(cs.contains(Category::Moonberry));
        assert!(!cs.contains(Category::Jumbleberry));
        assert_eq!(cs.without(Category::Moonberry).len(), 1);
        assert_eq!(cs.without(Category::Jumbleberry), cs);
        assert_eq!(
            cs.iter().collect::<Vec<_>>(),
            vec![Category::Moonberry, Category::FreeRoll]
        );
        assert_eq!(CategorySet::ALL.len(), 9);
        assert_eq!(CategorySet::ALL.index(), 511);
        assert_eq!(Category::ALL.into_iter().collect::<CategorySet>(), CategorySet::ALL);
    }

    #[test]
    fn test_category_set_from_bits() {
        assert_eq!(CategorySet::from_bits(511), Some(CategorySet::ALL));
        assert_eq!(CategorySet::from_bits(0), Some(CategorySet::EMPTY));
        assert_eq!(CategorySet::from_bits(512), None);
    }

    #[test]
    fn test_all_of_size() {
        assert_eq!(CategorySet::all_of_size(0).count(), 1);
        assert_eq!(CategorySet::all_of_size(1).count(), 9);
        assert_eq!(CategorySet::all_of_size(4).count(), 126);
        assert_eq!(CategorySet::all_of_size(9).count(), 1);
        let total: usize = (0..=9).map(|s| CategorySet::all_of_size(s).count()).sum();
        assert_eq!(total, 512);
    }

    #[test]
    fn test_category_try_from() {
        assert_eq!(Category::try_from(3u8), Ok(Category::Moonberry));
        assert_eq!(Category::try_from(9u8), Err(9));
    }

    #[test]
    #[should_panic(expected = "invalid category index")]
    fn test_category_from_index_out_of_range() {
        let _ = Category::from_index(9);
    }

    #[test]
    fn test_game_state_lifecycle() {
        let gs = GameState::new();
        assert_eq!(gs.round(), 1);
        assert!(!gs.is_game_over());

        let rolled = gs.after_roll(Dice([0, 0, 0, 5, 0]), true);
        assert_eq!(rolled.rerolls_left, 2);
        let rerolled = rolled.after_roll(Dice([0, 0, 0, 5, 0]), false);
        assert_eq!(rerolled.rerolls_left, 1);

        let scored = rerolled.after_score(Category::Moonberry, 35);
        assert_eq!(scored.score, 35);
        assert_eq!(scored.round(), 2);
        assert_eq!(scored.rerolls_left, 2);
        assert!(!scored.categories.contains(Category::Moonberry));
    }

    #[test]
    fn test_ev_table_empty_entry_is_zero() {
        let mut values = [1.0; NUM_CATEGORY_SETS];
        values[5] = 7.5;
        let mut table = EvTable::from_values(values);
        assert_eq!(table.ev(CategorySet::EMPTY), 0.0);
        table.set(CategorySet::EMPTY, 3.0);
        assert_eq!(table.ev(CategorySet::EMPTY), 0.0);
        assert_eq!(table.ev(CategorySet::from_bits(5).unwrap()), 7.5);
    }
}
