//! Database models for leaderboard entries.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A persisted leaderboard entry.
///
/// Serializes with camelCase keys (`playerName`, `createdAt`) to match the
/// `/scores` wire format.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters, Serialize, Deserialize, new,
)]
#[diesel(table_name = schema::scores)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    id: i32,
    player_name: String,
    score: i32,
    created_at: NaiveDateTime,
}

/// Insertable leaderboard entry. `created_at` is filled by the database.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, new, Getters)]
#[diesel(table_name = schema::scores)]
pub struct NewScore {
    player_name: String,
    score: i32,
}
