//! HTTP leaderboard server.
//!
//! Routes:
//!
//! - `GET /scores` lists the top ten scores.
//! - `POST /scores` stores `{playerName, score}` and answers `201` with the
//!   stored row.
//! - `GET /health` answers `ok`.
//!
//! Failures answer with `{"error": "..."}`: `400` for bad submissions and
//! `500` when storage fails.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::leaderboard::{LeaderboardError, LeaderboardStore, TOP_LIMIT};

/// Message for submissions missing a name or a numeric score.
pub const REQUIRED_MESSAGE: &str = "Player name and score are required";

type SharedStore = Arc<dyn LeaderboardStore>;

/// Builds the leaderboard router over `store`.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/scores", get(list_scores).post(create_score))
        .route("/health", get(health))
        .with_state(store)
}

/// Serves the leaderboard on `host:port` until the process is stopped.
#[instrument(skip(store))]
pub async fn serve(host: String, port: u16, store: SharedStore) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(address = %listener.local_addr()?, "Leaderboard server listening");
    axum::serve(listener, router(store)).await?;
    Ok(())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(store))]
async fn list_scores(State(store): State<SharedStore>) -> Response {
    match store.list_top(TOP_LIMIT).await {
        Ok(scores) => {
            debug!(count = scores.len(), "Serving leaderboard");
            Json(scores).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to fetch scores");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch scores")
        }
    }
}

#[instrument(skip(store, body), fields(body_len = body.len()))]
async fn create_score(State(store): State<SharedStore>, body: Bytes) -> Response {
    let (player_name, score) = match parse_submission(&body) {
        Ok(submission) => submission,
        Err(message) => {
            warn!(%message, "Rejected score submission");
            return error_response(StatusCode::BAD_REQUEST, &message);
        }
    };
    match store.submit(&player_name, score).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(LeaderboardError::Validation(message)) => {
            warn!(%message, "Rejected score submission");
            error_response(StatusCode::BAD_REQUEST, &message)
        }
        Err(LeaderboardError::Storage(message)) => {
            error!(%message, "Failed to create score");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create score")
        }
    }
}

/// Extracts `(playerName, score)` from a JSON body.
///
/// Integral floats such as `4.0` are accepted; fractional, negative,
/// non-numeric or out-of-range scores are not.
pub fn parse_submission(body: &[u8]) -> Result<(String, i32), String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("Malformed JSON body: {}", e))?;
    let player_name = value
        .get("playerName")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| REQUIRED_MESSAGE.to_string())?;
    let score = value
        .get("score")
        .filter(|score| score.is_number())
        .ok_or_else(|| REQUIRED_MESSAGE.to_string())?;
    let score = match score.as_i64() {
        Some(whole) => whole,
        None => match score.as_f64() {
            Some(float) if float.is_finite() && float.fract() == 0.0 => float as i64,
            _ => return Err(format!("Score must be a whole number, got {}", score)),
        },
    };
    if score < 0 {
        return Err(format!("Score must not be negative, got {}", score));
    }
    let score = i32::try_from(score).map_err(|_| format!("Score {} is out of range", score))?;
    Ok((player_name.to_string(), score))
}
