//! Text notation for dice, keeps and category sets.
//!
//! Dice: a 5-letter face sequence (`JJSPM`) or count tokens (`2J 1S 1P 1M`, missing
//! faces are 0). Letters are case-insensitive.
//!
//! Categories: `all`, `all-j-s` (everything except the listed ones) or a comma
//! list (`j,m,3k,fr`). Full names and short aliases are both accepted.

use thiserror::Error;

use crate::constants::*;
use crate::dice_mechanics::count_faces;
use crate::types::{Category, CategorySet, Dice, Face};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty {0} input")]
    Empty(&'static str),
    #[error("unknown die face {letter:?} at position {position} (use J, S, P, M, or X)")]
    UnknownFace { letter: char, position: usize },
    #[error("invalid token {0:?} (expected format like '2J' or '1M')")]
    InvalidToken(String),
    #[error("dice must sum to {n}, got {0}", n = NUM_DICE)]
    WrongDiceCount(usize),
    #[error("unknown category {0:?}")]
    UnknownCategory(String),
    #[error("no valid categories specified")]
    NoCategories,
}

/// Parse a full 5-dice roll.
pub fn parse_dice(input: &str) -> Result<Dice, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty("dice"));
    }

    let is_sequence =
        input.chars().count() == NUM_DICE && input.chars().all(|c| c.is_alphabetic());
    let dice = if is_sequence {
        parse_dice_sequence(input)?
    } else {
        parse_dice_counts(input)?
    };

    if dice.total() != NUM_DICE {
        return Err(ParseError::WrongDiceCount(dice.total()));
    }
    Ok(dice)
}

fn parse_dice_sequence(input: &str) -> Result<Dice, ParseError> {
    let faces = input
        .chars()
        .enumerate()
        .map(|(i, letter)| {
            Face::from_letter(letter).ok_or(ParseError::UnknownFace {
                letter,
                position: i + 1,
            })
        })
        .collect::<Result<Vec<Face>, ParseError>>()?;
    Ok(count_faces(&faces))
}

fn parse_dice_counts(input: &str) -> Result<Dice, ParseError> {
    let mut counts = [0usize; NUM_FACES];
    for token in input.split_whitespace() {
        let split = token
            .find(|c: char| !c.is_ascii_digit())
            .filter(|&i| i > 0)
            .ok_or_else(|| ParseError::InvalidToken(token.to_string()))?;
        let (digits, letter) = token.split_at(split);

        let mut letters = letter.chars();
        let face = match (letters.next(), letters.next()) {
            (Some(l), None) => Face::from_letter(l),
            _ => None,
        }
        .ok_or_else(|| ParseError::InvalidToken(token.to_string()))?;

        let count: usize = digits
            .parse()
            .map_err(|_| ParseError::InvalidToken(token.to_string()))?;
        counts[face.index()] = counts[face.index()].saturating_add(count);
    }

    let total = counts.iter().fold(0usize, |acc, &c| acc.saturating_add(c));
    if total != NUM_DICE {
        return Err(ParseError::WrongDiceCount(total));
    }
    let mut dice = [0u8; NUM_FACES];
    for (d, &c) in dice.iter_mut().zip(counts.iter()) {
        *d = c as u8;
    }
    Ok(Dice(dice))
}

/// Resolve one category name or alias (case- and space-insensitive).
pub fn parse_category(name: &str) -> Result<Category, ParseError> {
    let key: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let category = match key.as_str() {
        "jumbleberry" | "j" | "jb" => Category::Jumbleberry,
        "sugarberry" | "s" | "sb" => Category::Sugarberry,
        "pickleberry" | "p" | "pb" => Category::Pickleberry,
        "moonberry" | "m" | "mb" => Category::Moonberry,
        "basketofthree" | "3k" | "b3" | "three" => Category::BasketOfThree,
        "basketoffour" | "4k" | "b4" | "four" => Category::BasketOfFour,
        "basketoffive" | "5k" | "b5" | "five" => Category::BasketOfFive,
        "mixedbasket" | "mix" | "mixed" => Category::MixedBasket,
        "freeroll" | "fr" | "free" => Category::FreeRoll,
        _ => return Err(ParseError::UnknownCategory(name.trim().to_string())),
    };
    Ok(category)
}

/// Parse a category set.
pub fn parse_categories(input: &str) -> Result<CategorySet, ParseError> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(ParseError::Empty("categories"));
    }

    if let Some(rest) = input.strip_prefix("all") {
        let mut cs = CategorySet::ALL;
        for part in rest.split('-').map(str::trim).filter(|p| !p.is_empty()) {
            cs = cs.without(parse_category(part)?);
        }
        return Ok(cs);
    }

    let cs = input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_category)
        .collect::<Result<CategorySet, ParseError>>()?;
    if cs.is_empty() {
        return Err(ParseError::NoCategories);
    }
    Ok(cs)
}

/// Keep notation: `2M 1P`, or `nothing` for an empty keep.
pub fn format_keep(keep: Dice) -> String {
    if keep.total() == 0 {
        return "nothing".to_string();
    }
    Face::ALL
        .iter()
        .filter(|&&f| keep.count(f) > 0)
        .map(|&f| format!("{}{}", keep.count(f), f.letter()))
        .collect::<Vec<_>>()
        .join(" ")
}
