//! Leaderboard storage seen from the game and the HTTP server.
//!
//! [`LeaderboardStore`] is the seam: the server and the session driver talk
//! to it without knowing whether scores live in a local SQLite file
//! ([`ScoreRepository`]) or behind a remote `/scores` endpoint
//! ([`RestLeaderboard`]).

mod rest;

pub use rest::RestLeaderboard;

use async_trait::async_trait;
use derive_more::Display;
use tracing::{error, instrument};

use crate::db::{DbError, NewScore, ScoreRecord, ScoreRepository};
use crate::games::puzzle::MAX_NAME_LEN;

/// How many entries the leaderboard shows.
pub const TOP_LIMIT: i64 = 10;

/// Leaderboard failure.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LeaderboardError {
    /// The submission was malformed and nothing was stored.
    #[display("Invalid score submission: {}", _0)]
    Validation(String),
    /// Storage could not be read or written.
    #[display("Leaderboard storage failed: {}", _0)]
    Storage(String),
}

impl std::error::Error for LeaderboardError {}

impl From<DbError> for LeaderboardError {
    fn from(err: DbError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Checks a submission and normalises the name.
///
/// The name is trimmed and must be non-empty and at most
/// [`MAX_NAME_LEN`] characters; the score must be non-negative.
pub fn validate_submission(player_name: &str, score: i32) -> Result<NewScore, LeaderboardError> {
    let name = player_name.trim();
    if name.is_empty() {
        return Err(LeaderboardError::Validation(
            "player name must not be blank".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LeaderboardError::Validation(format!(
            "player name longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    if score < 0 {
        return Err(LeaderboardError::Validation(format!(
            "score must not be negative, got {}",
            score
        )));
    }
    Ok(NewScore::new(name.to_string(), score))
}

/// Persistent high-score table.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Best `limit` scores, highest first; ties in arrival order.
    async fn list_top(&self, limit: i64) -> Result<Vec<ScoreRecord>, LeaderboardError>;

    /// Validates and stores a score, returning the stored row.
    async fn submit(&self, player_name: &str, score: i32) -> Result<ScoreRecord, LeaderboardError>;
}

#[async_trait]
impl LeaderboardStore for ScoreRepository {
    #[instrument(skip(self))]
    async fn list_top(&self, limit: i64) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.top_scores(limit))
            .await
            .map_err(|e| {
                error!(error = %e, "Leaderboard read task failed");
                LeaderboardError::Storage(e.to_string())
            })?
            .map_err(LeaderboardError::from)
    }

    #[instrument(skip(self))]
    async fn submit(&self, player_name: &str, score: i32) -> Result<ScoreRecord, LeaderboardError> {
        let new_score = validate_submission(player_name, score)?;
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.insert_score(new_score))
            .await
            .map_err(|e| {
                error!(error = %e, "Leaderboard write task failed");
                LeaderboardError::Storage(e.to_string())
            })?
            .map_err(LeaderboardError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_trims_name() {
        let score = validate_submission("  Ada  ", 3).expect("valid");
        assert_eq!(score.player_name(), "Ada");
        assert_eq!(*score.score(), 3);
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        assert!(matches!(
            validate_submission("   ", 1),
            Err(LeaderboardError::Validation(_))
        ));
        assert!(matches!(
            validate_submission("Ada", -1),
            Err(LeaderboardError::Validation(_))
        ));
        assert!(matches!(
            validate_submission(&"x".repeat(MAX_NAME_LEN + 1), 1),
            Err(LeaderboardError::Validation(_))
        ));
        assert!(validate_submission(&"x".repeat(MAX_NAME_LEN), 0).is_ok());
    }
}
