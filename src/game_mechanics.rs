//! Jumbleberry Fields scoring rules: s(r, c).
//!
//! Pure function of the dice counts and the category. [`Category`] is a closed enum,
//! so an out-of-range tag cannot reach this point; raw indices go through
//! [`Category::from_index`], which panics.

use crate::types::{Category, Dice, Face};

/// Compute s(r, c): the score for committing a 5-dice roll to the given category.
///
/// Categories 0–3 score count × face points for their own face. Baskets of N pay
/// the sum of all dice points if any face (Pest included) shows at least N times.
/// Mixed Basket pays the sum if every positive-value face is present. Free Roll
/// always pays the sum.
pub fn calculate_category_score(dice: &Dice, category: Category) -> i32 {
    let sum_all = dice.points();

    match category {
        Category::Jumbleberry => single_face_score(dice, Face::Jumbleberry),
        Category::Sugarberry => single_face_score(dice, Face::Sugarberry),
        Category::Pickleberry => single_face_score(dice, Face::Pickleberry),
        Category::Moonberry => single_face_score(dice, Face::Moonberry),
        Category::BasketOfThree => basket_score(dice, 3, sum_all),
        Category::BasketOfFour => basket_score(dice, 4, sum_all),
        Category::BasketOfFive => basket_score(dice, 5, sum_all),
        Category::MixedBasket => {
            let all_berries = [
                Face::Jumbleberry,
                Face::Sugarberry,
                Face::Pickleberry,
                Face::Moonberry,
            ]
            .iter()
            .all(|&f| dice.count(f) >= 1);
            if all_berries {
                sum_all
            } else {
                0
            }
        }
        Category::FreeRoll => sum_all,
    }
}

#[inline(always)]
fn single_face_score(dice: &Dice, face: Face) -> i32 {
    dice.count(face) as i32 * face.points()
}

fn basket_score(dice: &Dice, n: u8, sum_all: i32) -> i32 {
    if dice.0.iter().any(|&c| c >= n) {
        sum_all
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category::*;

    fn score(counts: [u8; 5], category: Category) -> i32 {
        calculate_category_score(&Dice(counts), category)
    }

    #[test]
    fn test_single_face() {
        assert_eq!(score([2, 1, 1, 1, 0], Jumbleberry), 4);
        assert_eq!(score([2, 1, 1, 1, 0], Sugarberry), 2);
        assert_eq!(score([2, 1, 1, 1, 0], Pickleberry), 4);
        assert_eq!(score([2, 1, 1, 1, 0], Moonberry), 7);
        assert_eq!(score([0, 0, 0, 5, 0], Moonberry), 35);
        assert_eq!(score([0, 0, 5, 0, 0], Pickleberry), 20);
        assert_eq!(score([0, 0, 0, 0, 5], Jumbleberry), 0);
    }

    #[test]
    fn test_baskets() {
        assert_eq!(score([2, 1, 1, 1, 0], BasketOfThree), 0);
        assert_eq!(score([2, 1, 1, 1, 0], BasketOfFour), 0);
        assert_eq!(score([3, 0, 0, 2, 0], BasketOfThree), 20);
        assert_eq!(score([3, 0, 0, 2, 0], BasketOfFour), 0);
        assert_eq!(score([0, 0, 0, 4, 1], BasketOfFour), 28);
        assert_eq!(score([0, 0, 0, 5, 0], BasketOfFive), 35);
        assert_eq!(score([0, 0, 0, 5, 0], BasketOfThree), 35);
    }

    #[test]
    fn test_pest_counts_toward_baskets() {
        assert_eq!(score([0, 0, 0, 2, 3], BasketOfThree), 14);
        assert_eq!(score([0, 0, 0, 0, 5], BasketOfFive), 0);
        assert_eq!(score([0, 0, 1, 0, 4], BasketOfFour), 4);
    }

    #[test]
    fn test_mixed_basket() {
        assert_eq!(score([1, 1, 1, 2, 0], MixedBasket), 22);
        assert_eq!(score([2, 1, 1, 1, 0], MixedBasket), 17);
        assert_eq!(score([1, 1, 1, 1, 1], MixedBasket), 15);
        assert_eq!(score([2, 2, 1, 0, 0], MixedBasket), 0);
        assert_eq!(score([0, 1, 1, 1, 2], MixedBasket), 0);
    }

    #[test]
    fn test_free_roll() {
        assert_eq!(score([2, 1, 1, 1, 0], FreeRoll), 17);
        assert_eq!(score([0, 0, 0, 0, 5], FreeRoll), 0);
        assert_eq!(score([0, 0, 0, 5, 0], FreeRoll), 35);
    }

    #[test]
    fn test_max_scores_are_attained() {
        use crate::dice_mechanics::enumerate_multisets;
        for c in Category::ALL {
            let best = enumerate_multisets(5)
                .iter()
                .map(|d| calculate_category_score(d, c))
                .max()
                .unwrap();
            assert_eq!(best, c.max_score(), "category {}", c);
        }
    }
}
