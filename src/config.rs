//! Game configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::games::puzzle::{CatalogEntry, ImageCatalog};

/// Largest board side accepted.
pub const MAX_BOARD_SIDE: usize = 12;

/// Most rounds one game may have.
pub const MAX_ROUNDS: u32 = 100;

/// Tunables for a game. Every field has a default, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct GameConfig {
    /// Rows on the board.
    #[serde(default = "default_rows")]
    rows: usize,

    /// Columns on the board.
    #[serde(default = "default_cols")]
    cols: usize,

    /// Rounds in one game.
    #[serde(default = "default_total_rounds")]
    total_rounds: u32,

    /// Countdown length per round, in seconds.
    #[serde(default = "default_round_seconds")]
    round_seconds: u32,

    /// Pause after a solved round before the next one starts.
    #[serde(default = "default_solved_delay_ms")]
    solved_delay_ms: u64,

    /// Pause after a timed-out round before the next one starts.
    #[serde(default = "default_timeout_delay_ms")]
    timeout_delay_ms: u64,

    /// Minimum drag distance for a gesture to count as a swap.
    #[serde(default = "default_drag_threshold")]
    drag_threshold: f32,

    /// Images a round can draw from.
    #[serde(default = "ImageCatalog::builtin_entries")]
    catalog: Vec<CatalogEntry>,
}

#[instrument]
fn default_rows() -> usize {
    3
}

#[instrument]
fn default_cols() -> usize {
    3
}

#[instrument]
fn default_total_rounds() -> u32 {
    6
}

#[instrument]
fn default_round_seconds() -> u32 {
    25
}

#[instrument]
fn default_solved_delay_ms() -> u64 {
    2000
}

#[instrument]
fn default_timeout_delay_ms() -> u64 {
    1000
}

#[instrument]
fn default_drag_threshold() -> f32 {
    10.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            total_rounds: default_total_rounds(),
            round_seconds: default_round_seconds(),
            solved_delay_ms: default_solved_delay_ms(),
            timeout_delay_ms: default_timeout_delay_ms(),
            drag_threshold: default_drag_threshold(),
            catalog: ImageCatalog::builtin_entries(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            rows = config.rows,
            cols = config.cols,
            total_rounds = config.total_rounds,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Checks that the configuration describes a playable game.
    ///
    /// A zero-second round is allowed; its clock never runs, so solves in
    /// it never score.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows.saturating_mul(self.cols) < 2 {
            return Err(ConfigError::new(format!(
                "Board {}x{} needs at least two pieces",
                self.rows, self.cols
            )));
        }
        if self.rows > MAX_BOARD_SIDE || self.cols > MAX_BOARD_SIDE {
            return Err(ConfigError::new(format!(
                "Board {}x{} exceeds {} pieces per side",
                self.rows, self.cols, MAX_BOARD_SIDE
            )));
        }
        if self.total_rounds == 0 || self.total_rounds > MAX_ROUNDS {
            return Err(ConfigError::new(format!(
                "total_rounds must be between 1 and {}, got {}",
                MAX_ROUNDS, self.total_rounds
            )));
        }
        if self.drag_threshold.is_nan() || self.drag_threshold < 0.0 {
            return Err(ConfigError::new(format!(
                "drag_threshold must be a non-negative number, got {}",
                self.drag_threshold
            )));
        }
        if self.catalog.is_empty() {
            return Err(ConfigError::new("catalog must contain at least one image".to_string()));
        }
        Ok(())
    }

    /// Builds the image catalog described by this configuration.
    pub fn image_catalog(&self) -> Result<ImageCatalog, ConfigError> {
        ImageCatalog::new(self.catalog.clone()).map_err(|e| ConfigError::new(e.to_string()))
    }

    /// Pause after a solved round.
    pub fn solved_delay(&self) -> Duration {
        Duration::from_millis(self.solved_delay_ms)
    }

    /// Pause after a timed-out round.
    pub fn timeout_delay(&self) -> Duration {
        Duration::from_millis(self.timeout_delay_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
