use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::error::AppError;
use crate::poller::PollTrigger;
use crate::state::GameBoard;
use crate::types::{BoardSource, LiveGame, OverUnderEdge, Tempo};

#[derive(Clone)]
pub struct ApiState {
    pub board: Arc<GameBoard>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
    pub trigger: PollTrigger,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/games", get(get_games))
        .route("/games/:id", get(get_game))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .route("/refresh", post(post_refresh))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
pub struct GamesQuery {
    /// hot | cold | neutral
    pub tempo: Option<String>,
    /// over_lean | under_lean | neutral
    pub edge: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardResponse {
    pub source: BoardSource,
    pub updated_at_ns: u64,
    pub games: Vec<LiveGame>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub poller_running: bool,
    pub poll_in_flight: bool,
    pub source: BoardSource,
    pub live_games: usize,
    pub last_success_at_ns: Option<u64>,
    pub polls_total: u64,
    pub polls_failed: u64,
    pub consecutive_failures: u64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub sample_count: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_games(
    State(state): State<ApiState>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<BoardResponse>, AppError> {
    let tempo = params
        .tempo
        .as_deref()
        .map(|t| {
            t.parse::<Tempo>()
                .map_err(|_| AppError::InvalidQuery(format!("unknown tempo '{t}'")))
        })
        .transpose()?;
    let edge = params
        .edge
        .as_deref()
        .map(|e| {
            e.parse::<OverUnderEdge>()
                .map_err(|_| AppError::InvalidQuery(format!("unknown edge '{e}'")))
        })
        .transpose()?;

    let board = state.board.current();
    let games = board
        .games
        .iter()
        .filter(|g| tempo.map_or(true, |t| g.metrics.game_tempo == t))
        .filter(|g| edge.map_or(true, |e| g.metrics.over_under_edge == e))
        .cloned()
        .collect();

    Ok(Json(BoardResponse {
        source: board.source,
        updated_at_ns: board.updated_at_ns,
        games,
    }))
}

async fn get_game(
    State(state): State<ApiState>,
    Path(game_id): Path<String>,
) -> Result<Json<LiveGame>, AppError> {
    state
        .board
        .find(&game_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("game {game_id} is not live")))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let last_success = state.health.last_success_at_ns();
    Json(HealthResponse {
        poller_running: state.health.poller_running(),
        poll_in_flight: state.health.poll_in_flight(),
        source: state.board.source(),
        live_games: state.board.len(),
        last_success_at_ns: (last_success > 0).then_some(last_success),
        polls_total: state.health.polls_total(),
        polls_failed: state.health.polls_failed(),
        consecutive_failures: state.health.consecutive_failures(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let s = state.latency.summary();
    Json(LatencyResponse {
        p50_ms: s.p50_ms,
        p95_ms: s.p95_ms,
        p99_ms: s.p99_ms,
        sample_count: s.sample_count,
    })
}

async fn post_refresh(State(state): State<ApiState>) -> (StatusCode, Json<serde_json::Value>) {
    state.trigger.trigger();
    (StatusCode::ACCEPTED, Json(serde_json::json!({ "queued": true })))
}
