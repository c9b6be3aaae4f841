//! Database repository for leaderboard scores.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, NewScore, ScoreRecord, schema};

/// Migrations creating the `scores` table, embedded at compile time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for leaderboard operations.
#[derive(Debug, Clone)]
pub struct ScoreRepository {
    db_path: String,
}

impl ScoreRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// The schema is assumed to exist; see [`ScoreRepository::open`] to
    /// create it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating ScoreRepository");
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path must not be empty"));
        }
        Ok(Self { db_path })
    }

    /// Creates a repository and applies any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        let mut conn = repo.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(applied = applied.len(), "Database schema ready");
        Ok(repo)
    }

    /// Returns the database path this repository connects to.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Appends a score to the leaderboard.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, score), fields(player_name = %score.player_name(), score = score.score()))]
    pub fn insert_score(&self, score: NewScore) -> Result<ScoreRecord, DbError> {
        debug!("Inserting score");
        let mut conn = self.connection()?;

        let record = diesel::insert_into(schema::scores::table)
            .values(&score)
            .returning(ScoreRecord::as_returning())
            .get_result(&mut conn)?;

        info!(
            score_id = record.id(),
            player_name = %record.player_name(),
            score = record.score(),
            "Score recorded"
        );
        Ok(record)
    }

    /// Lists the highest scores, best first. Equal scores keep arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn top_scores(&self, limit: i64) -> Result<Vec<ScoreRecord>, DbError> {
        debug!(limit, "Loading top scores");
        let mut conn = self.connection()?;

        let scores = schema::scores::table
            .order((schema::scores::score.desc(), schema::scores::id.asc()))
            .limit(limit)
            .select(ScoreRecord::as_select())
            .load(&mut conn)?;

        info!(count = scores.len(), "Top scores loaded");
        Ok(scores)
    }

    /// Counts every stored score.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let total = schema::scores::table.count().get_result(&mut conn)?;
        debug!(total, "Counted scores");
        Ok(total)
    }
}
