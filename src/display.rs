//! Output formats for a [`Recommendation`]: a text block for the terminal and a
//! JSON-ready mirror for the HTTP API.

use std::fmt::Write;

use serde::Serialize;

use crate::api_computations::{Action, CategoryOption, Recommendation, RerollOption};
use crate::notation::format_keep;
use crate::types::{CategorySet, Dice};

#[derive(Debug, Serialize)]
pub struct RecommendationJson {
    pub best_action: ActionJson,
    pub theoretical_max: i32,
    pub category_options: Vec<CategoryOptionJson>,
    pub top_reroll_options: Vec<RerollOptionJson>,
}

/// `type` is `"score"` or `"reroll"`; the field that does not apply is empty.
#[derive(Debug, Serialize)]
pub struct ActionJson {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub keep: String,
    pub category: String,
    pub ev: f64,
}

#[derive(Debug, Serialize)]
pub struct CategoryOptionJson {
    pub category: String,
    pub immediate_score: i32,
    pub future_ev: f64,
    pub total_value: f64,
}

#[derive(Debug, Serialize)]
pub struct RerollOptionJson {
    pub keep: String,
    pub num_rerolled: usize,
    pub ev: f64,
}

impl From<&CategoryOption> for CategoryOptionJson {
    fn from(opt: &CategoryOption) -> Self {
        Self {
            category: opt.category.name().to_string(),
            immediate_score: opt.immediate_score,
            future_ev: opt.future_ev,
            total_value: opt.total_value,
        }
    }
}

impl From<&RerollOption> for RerollOptionJson {
    fn from(opt: &RerollOption) -> Self {
        Self {
            keep: format_keep(opt.keep),
            num_rerolled: opt.num_rerolled,
            ev: opt.ev,
        }
    }
}

impl From<&Recommendation> for RecommendationJson {
    fn from(rec: &Recommendation) -> Self {
        let best_action = match rec.best_action {
            Action::Score { category, ev } => ActionJson {
                kind: "score",
                keep: String::new(),
                category: category.name().to_string(),
                ev,
            },
            Action::Reroll { keep, ev } => ActionJson {
                kind: "reroll",
                keep: format_keep(keep),
                category: String::new(),
                ev,
            },
        };
        Self {
            best_action,
            theoretical_max: rec.theoretical_max,
            category_options: rec.category_options.iter().map(Into::into).collect(),
            top_reroll_options: rec.top_reroll_options.iter().map(Into::into).collect(),
        }
    }
}

/// Multi-line text block describing the recommendation.
pub fn format_recommendation(
    rec: &Recommendation,
    dice: Dice,
    rerolls_left: u8,
    categories: CategorySet,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Solver Recommendation ===");
    let _ = writeln!(
        out,
        "Dice: {}  |  Rerolls left: {}  |  Categories: {} remaining",
        dice,
        rerolls_left,
        categories.len()
    );
    let _ = writeln!(out);

    match rec.best_action {
        Action::Score { category, .. } => {
            let _ = writeln!(out, "Best action: SCORE in {}", category);
            if let Some(best) = rec.category_options.first() {
                let _ = writeln!(
                    out,
                    "  Score: {}  +  Future EV: {:.2}  =  Total: {:.2}",
                    best.immediate_score, best.future_ev, best.total_value
                );
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "All category options:");
            for (i, opt) in rec.category_options.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  #{}  {:<18}  score: {:>3}   future EV: {:>7.2}   total: {:>7.2}",
                    i + 1,
                    opt.category.name(),
                    opt.immediate_score,
                    opt.future_ev,
                    opt.total_value
                );
            }
        }
        Action::Reroll { keep, ev } => {
            let _ = writeln!(out, "Best action: REROLL");
            let _ = writeln!(
                out,
                "  Keep {}  (reroll {})",
                format_keep(keep),
                crate::constants::NUM_DICE - keep.total()
            );
            let _ = writeln!(out, "  Expected value: {:.2}", ev);
            let _ = writeln!(out);
            let _ = writeln!(out, "Top reroll options:");
            for (i, opt) in rec.top_reroll_options.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  #{}  Keep {:<24}  reroll {}  EV: {:>7.2}",
                    i + 1,
                    format_keep(opt.keep),
                    opt.num_rerolled,
                    opt.ev
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Theoretical max: {}", rec.theoretical_max);
    let _ = writeln!(out, "=============================");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn score_rec() -> Recommendation {
        Recommendation {
            best_action: Action::Score {
                category: Category::Moonberry,
                ev: 35.0,
            },
            theoretical_max: 35,
            category_options: vec![CategoryOption {
                category: Category::Moonberry,
                immediate_score: 35,
                future_ev: 0.0,
                total_value: 35.0,
            }],
            top_reroll_options: Vec::new(),
        }
    }

    #[test]
    fn test_json_score_shape() {
        let json = serde_json::to_value(RecommendationJson::from(&score_rec())).unwrap();
        assert_eq!(json["best_action"]["type"], "score");
        assert_eq!(json["best_action"]["category"], "Moonberry");
        assert_eq!(json["best_action"]["keep"], "");
        assert_eq!(json["theoretical_max"], 35);
        assert_eq!(json["category_options"][0]["immediate_score"], 35);
        // empty lists are [] rather than null
        assert_eq!(json["top_reroll_options"], serde_json::json!([]));
    }

    #[test]
    fn test_json_reroll_shape() {
        let rec = Recommendation {
            best_action: Action::Reroll {
                keep: Dice([0, 0, 0, 2, 0]),
                ev: 20.5,
            },
            theoretical_max: 237,
            category_options: Vec::new(),
            top_reroll_options: vec![RerollOption {
                keep: Dice([0, 0, 0, 2, 0]),
                num_rerolled: 3,
                ev: 20.5,
            }],
        };
        let json = serde_json::to_value(RecommendationJson::from(&rec)).unwrap();
        assert_eq!(json["best_action"]["type"], "reroll");
        assert_eq!(json["best_action"]["keep"], "2M");
        assert_eq!(json["best_action"]["category"], "");
        assert_eq!(json["top_reroll_options"][0]["num_rerolled"], 3);
        assert_eq!(json["category_options"], serde_json::json!([]));
    }

    #[test]
    fn test_text_block() {
        let text = format_recommendation(
            &score_rec(),
            Dice([0, 0, 0, 5, 0]),
            0,
            CategorySet::EMPTY.with(Category::Moonberry),
        );
        assert!(text.contains("Best action: SCORE in Moonberry"));
        assert!(text.contains("Dice: {J:0 S:0 P:0 M:5 X:0}"));
        assert!(text.contains("Theoretical max: 35"));
    }
}
