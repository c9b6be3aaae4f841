//! Database persistence layer for the score leaderboard.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{NewScore, ScoreRecord};
pub use repository::{MIGRATIONS, ScoreRepository};
