//! Leaderboard client for a remote `/scores` server.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{LeaderboardError, LeaderboardStore};
use crate::db::ScoreRecord;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to another instance's `/scores` endpoint.
#[derive(Debug, Clone)]
pub struct RestLeaderboard {
    base_url: String,
    client: reqwest::Client,
}

impl RestLeaderboard {
    /// Creates a client for the server at `base_url` (for example
    /// `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn scores_url(&self) -> String {
        format!("{}/scores", self.base_url)
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("HTTP {}", status),
        }
    }
}

fn transport(err: reqwest::Error) -> LeaderboardError {
    LeaderboardError::Storage(err.to_string())
}

#[async_trait]
impl LeaderboardStore for RestLeaderboard {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_top(&self, limit: i64) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        debug!("Fetching remote leaderboard");
        let response = self
            .client
            .get(self.scores_url())
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            warn!(%message, "Remote leaderboard read failed");
            return Err(LeaderboardError::Storage(message));
        }
        let mut scores: Vec<ScoreRecord> = response.json().await.map_err(transport)?;
        scores.truncate(usize::try_from(limit).unwrap_or(0));
        info!(count = scores.len(), "Remote leaderboard loaded");
        Ok(scores)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn submit(&self, player_name: &str, score: i32) -> Result<ScoreRecord, LeaderboardError> {
        let body = serde_json::json!({ "playerName": player_name, "score": score });
        let response = self
            .client
            .post(self.scores_url())
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            StatusCode::CREATED | StatusCode::OK => {
                let record: ScoreRecord = response.json().await.map_err(transport)?;
                info!(score_id = record.id(), "Score submitted");
                Ok(record)
            }
            StatusCode::BAD_REQUEST => {
                Err(LeaderboardError::Validation(Self::error_message(response).await))
            }
            status => {
                let message = Self::error_message(response).await;
                warn!(%status, %message, "Remote score submission failed");
                Err(LeaderboardError::Storage(message))
            }
        }
    }
}
