//! # Jumbleberry Fields: Optimal Dice Solver
//!
//! Computes the optimal expected final score for every set of open categories
//! using **backward induction** over the 512 category subsets, then answers
//! per-turn questions (score now, or which dice to keep) against that table.
//!
//! ## Algorithm overview
//!
//! | Phase | Rust module | Description |
//! |-------|-------------|-------------|
//! | 0 | [`phase0_tables`] | Build static lookup tables: 126 dice sets, scores, keep-multiset transition table, probabilities |
//! | 1 | [`state_computation`] | Backward induction from \|C\|=1 up to \|C\|=9, calling the widget solver per category set |
//! | 2 | [`api_computations`] | Per-turn recommendations: best action, ranked categories, top keeps |
//!
//! Each turn-start state is solved by [`widget_solver::compute_expected_state_value`],
//! which evaluates the scoring layer and then one layer per reroll using
//! ping-pong buffers.
//!
//! ## State representation
//!
//! Only the open categories matter between turns: no bonus, no running
//! totals. A state is a 9-bit [`types::CategorySet`] (Jumbleberry=bit 0 ..
//! Free Roll=bit 8), so the whole table is 512 `f64` values.
//!
//! Dice are face-count vectors over J, S, P, M, X; the 126 possible 5-dice
//! multisets are indexed in descending lexicographic count order.
//!
//! ## Surfaces
//!
//! - [`server`]: axum HTTP API over a shared table
//! - [`simulation`]: Monte-Carlo games played with the optimal strategy
//! - [`storage`]: JSON persistence of the EV table
//! - [`notation`] / [`display`]: text input parsing and output formatting

#![allow(clippy::needless_range_loop)]

pub mod api_computations;
pub mod constants;
pub mod dice_mechanics;
pub mod display;
pub mod env_config;
pub mod game_mechanics;
pub mod notation;
pub mod phase0_tables;
pub mod server;
pub mod simulation;
pub mod state_computation;
pub mod storage;
pub mod types;
pub mod widget_solver;
