//! Axum HTTP server: stateless solver endpoints.
//!
//! All endpoints are pure lookups against the precomputed [`SolverContext`] and
//! [`EvTable`], shared as `Arc<ServerContext>` across async handlers.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/ev` | EV of a category set (`?categories=all-j`) |
//! | POST | `/solve` | Best action for dice, rolls left and categories |
//! | GET | `/expected_values` | Value of every 5-dice roll (`?categories=all&rolls_left=1`) |
//! | POST | `/evaluate_category` | Value of committing the dice to one category |

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::api_computations::{compute_expected_values, evaluate_category_checked, solve};
use crate::constants::MAX_REROLLS;
use crate::display::{CategoryOptionJson, RecommendationJson};
use crate::notation::{format_keep, parse_categories, parse_category, parse_dice};
use crate::types::{EvTable, SolverContext};

/// Everything a handler needs, built once at startup.
pub struct ServerContext {
    pub ctx: Box<SolverContext>,
    pub table: EvTable,
}

pub type AppState = Arc<ServerContext>;

type ApiResult = Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)>;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/ev", get(handle_get_ev))
        .route("/expected_values", get(handle_get_expected_values))
        .route("/solve", post(handle_solve))
        .route("/evaluate_category", post(handle_evaluate_category))
        .layer(cors)
        .with_state(state)
}

// ── Request/Response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct SolveRequest {
    dice: String,
    rolls_left: i64,
    categories: String,
}

#[derive(Deserialize)]
struct EvaluateCategoryRequest {
    dice: String,
    categories: String,
    category: String,
}

#[derive(Deserialize)]
struct EvQuery {
    categories: String,
}

#[derive(Deserialize)]
struct ExpectedValuesQuery {
    categories: String,
    rolls_left: i64,
}

fn error_response(status: StatusCode, msg: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": msg })))
}

fn bad_request(prefix: &str, err: impl std::fmt::Display) -> (StatusCode, Json<serde_json::Value>) {
    error_response(StatusCode::BAD_REQUEST, &format!("{}: {}", prefix, err))
}

fn parse_rolls_left(rolls_left: i64) -> Result<u8, (StatusCode, Json<serde_json::Value>)> {
    u8::try_from(rolls_left)
        .ok()
        .filter(|&r| r <= MAX_REROLLS)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "rolls_left must be 0, 1, or 2"))
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_get_ev(State(state): State<AppState>, Query(params): Query<EvQuery>) -> ApiResult {
    let cs = parse_categories(&params.categories)
        .map_err(|e| bad_request("invalid categories", e))?;
    let names: Vec<&str> = cs.iter().map(|c| c.name()).collect();
    Ok(Json(serde_json::json!({
        "category_set": cs.bits(),
        "categories": names,
        "ev": state.table.ev(cs),
    })))
}

// ── POST handlers ───────────────────────────────────────────────────

async fn handle_get_expected_values(
    State(state): State<AppState>,
    Query(params): Query<ExpectedValuesQuery>,
) -> ApiResult {
    let cs = parse_categories(&params.categories)
        .map_err(|e| bad_request("invalid categories", e))?;
    let rolls_left = parse_rolls_left(params.rolls_left)?;
    let values = compute_expected_values(&state.ctx, &state.table, cs, rolls_left)
        .map_err(|e| bad_request("invalid state", e))?;

    let entries: Vec<serde_json::Value> = state
        .ctx
        .all_dice_sets
        .iter()
        .zip(values.iter())
        .map(|(&dice, &ev)| serde_json::json!({ "dice": format_keep(dice), "ev": ev }))
        .collect();
    Ok(Json(serde_json::json!({
        "category_set": cs.bits(),
        "rolls_left": rolls_left,
        "values": entries,
    })))
}

async fn handle_solve(State(state): State<AppState>, Json(req): Json<SolveRequest>) -> ApiResult {
    let dice = parse_dice(&req.dice).map_err(|e| bad_request("invalid dice", e))?;
    let rolls_left = parse_rolls_left(req.rolls_left)?;
    let cs = parse_categories(&req.categories)
        .map_err(|e| bad_request("invalid categories", e))?;

    let rec = solve(&state.ctx, &state.table, dice, rolls_left, cs)
        .map_err(|e| bad_request("invalid state", e))?;
    let json = serde_json::to_value(RecommendationJson::from(&rec)).map_err(|e| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
    })?;
    Ok(Json(json))
}

async fn handle_evaluate_category(
    State(state): State<AppState>,
    Json(req): Json<EvaluateCategoryRequest>,
) -> ApiResult {
    let dice = parse_dice(&req.dice).map_err(|e| bad_request("invalid dice", e))?;
    let cs = parse_categories(&req.categories)
        .map_err(|e| bad_request("invalid categories", e))?;
    let category = parse_category(&req.category).map_err(|e| bad_request("invalid category", e))?;

    let opt = evaluate_category_checked(&state.table, dice, cs, category)
        .map_err(|e| bad_request("invalid state", e))?;
    let json = serde_json::to_value(CategoryOptionJson::from(&opt)).map_err(|e| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
    })?;
    Ok(Json(json))
}
