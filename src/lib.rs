//! Swap Puzzle library - timed picture swap puzzle with a leaderboard
//!
//! # Architecture
//!
//! - **Games**: the puzzle state machine ([`GameSession`]) and its parts
//! - **Driver**: runs a session against real time, image loads and score uploads
//! - **Leaderboard**: score storage behind [`LeaderboardStore`], local or remote
//! - **Server**: axum router exposing `/scores`
//! - **TUI**: ratatui front end
//!
//! # Example
//!
//! ```no_run
//! use rand::SeedableRng;
//! use swap_puzzle::{Event, GameConfig, GameSession, Phase};
//!
//! # fn example() -> anyhow::Result<()> {
//! let rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut session = GameSession::new(GameConfig::default(), rng)?;
//! let effects = session.apply(Event::SubmitName("Ada".to_string()))?;
//! assert_eq!(session.phase(), Phase::Playing);
//! assert!(!effects.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod assets;
mod config;
mod db;
mod driver;
mod games;
mod leaderboard;
mod scheduler;
mod server;
mod tui;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig, MAX_BOARD_SIDE, MAX_ROUNDS};

// Crate-level exports - Database
pub use db::{DbError, MIGRATIONS, NewScore, ScoreRecord, ScoreRepository};

// Crate-level exports - Puzzle game
pub use games::puzzle::{
    ANONYMOUS, BoardLayout, CatalogEntry, Cell, CellSelector, Direction, Effect, EmptyCatalog,
    Event, Expired, GameSession, GestureTracker, GridError, ImageCatalog, MAX_NAME_LEN, Notice,
    Phase, Piece, PieceGrid, Point, Rating, RoundOutcome, RoundStatus, RoundTimer, SessionError,
    Submission, SwapOutcome, SwapRequest, Tone, Urgency,
};

// Crate-level exports - Runtime
pub use assets::{AssetError, AssetLoader, HttpAssetLoader, OfflineAssetLoader};
pub use driver::SessionDriver;
pub use scheduler::{Scheduler, TICK_INTERVAL};

// Crate-level exports - Leaderboard
pub use leaderboard::{
    LeaderboardError, LeaderboardStore, RestLeaderboard, TOP_LIMIT, validate_submission,
};
pub use server::{REQUIRED_MESSAGE, parse_submission, router, serve};

// Crate-level exports - Terminal UI
pub use tui::run_tui;
