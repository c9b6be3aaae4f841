//! Inputs and outputs of the session state machine.
//!
//! Events are everything that can happen to a session: player actions,
//! clock ticks, and completions of work the session asked for. Effects are
//! the work itself; the session never performs I/O or sleeps, it only
//! describes what its owner should do next.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::catalog::CatalogEntry;
use super::grid::Cell;
use crate::db::ScoreRecord;

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The player confirmed their name on the entry screen.
    SubmitName(String),
    /// The image for `round` finished loading.
    AssetReady {
        /// Round the load was requested for.
        round: u32,
    },
    /// The image for `round` could not be loaded.
    AssetFailed {
        /// Round the load was requested for.
        round: u32,
        /// Human-readable cause.
        reason: String,
    },
    /// The player asked to retry a failed image load.
    RetryLoad,
    /// The player asked to exchange two pieces.
    Swap {
        /// First cell.
        a: Cell,
        /// Second cell.
        b: Cell,
    },
    /// One second of wall-clock time elapsed.
    Tick,
    /// The display delay after a resolved round elapsed.
    AdvanceDue {
        /// Round that was resolved.
        round: u32,
    },
    /// The player asked for a new game from the summary screen.
    PlayAgain,
    /// The player abandoned the current game.
    Restart,
    /// The final score reached the leaderboard.
    ScoreSaved(ScoreRecord),
    /// The final score could not be stored.
    ScoreFailed(String),
}

/// Work the session's owner must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Make sure the image is available, then report
    /// [`Event::AssetReady`] or [`Event::AssetFailed`] for `round`.
    LoadAsset {
        /// Round requesting the image.
        round: u32,
        /// Image to load.
        entry: CatalogEntry,
    },
    /// Begin delivering [`Event::Tick`] once per second.
    StartTicker,
    /// Stop delivering ticks.
    StopTicker,
    /// Deliver `event` after `after`, replacing any pending delivery.
    Schedule {
        /// Delay before delivery.
        after: Duration,
        /// Event to deliver.
        event: Event,
    },
    /// Drop any pending scheduled delivery.
    CancelScheduled,
    /// Store the final score, then report [`Event::ScoreSaved`] or
    /// [`Event::ScoreFailed`].
    SubmitScore {
        /// Name to record.
        player_name: String,
        /// Final score.
        score: u32,
    },
}

/// Tone of a message shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    /// Good news.
    Success,
    /// Bad news or a failure.
    Error,
}

/// Transient message shown under the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    text: String,
    tone: Tone,
}

impl Notice {
    /// A success message.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    /// An error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
        }
    }

    /// Message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Message tone.
    pub fn tone(&self) -> Tone {
        self.tone
    }
}
