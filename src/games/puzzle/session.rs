//! Game session state machine.
//!
//! A session walks `NameEntry -> Playing -> Summary` and back to
//! `NameEntry` on replay. It is a reducer: [`GameSession::apply`] takes one
//! [`Event`], updates the session, and returns the [`Effect`]s its owner
//! must perform. Timing and I/O live with the owner; every delayed or
//! asynchronous result comes back as another event tagged with the round
//! it belongs to, and events for a round that is no longer current are
//! dropped.

use derive_more::Display;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::catalog::{CatalogEntry, ImageCatalog};
use super::events::{Effect, Event, Notice};
use super::grid::{Cell, GridError, PieceGrid, SwapOutcome};
use super::timer::RoundTimer;
use crate::config::{ConfigError, GameConfig};
use crate::db::ScoreRecord;

/// Name recorded when the player leaves the name field blank.
pub const ANONYMOUS: &str = "Anonymous";

/// Longest player name kept; longer input is truncated.
pub const MAX_NAME_LEN: usize = 64;

/// Top-level phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Phase {
    /// Waiting for the player's name.
    #[display("name entry")]
    NameEntry,
    /// Rounds in progress.
    #[display("playing")]
    Playing,
    /// All rounds done; final score on screen.
    #[display("summary")]
    Summary,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Solved with time left on the clock. Scores a point.
    SolvedInTime,
    /// Solved, but the clock already read zero.
    SolvedLate,
    /// The clock ran out first.
    TimedOut,
}

impl RoundOutcome {
    /// Whether the round earns a point.
    pub fn scored(self) -> bool {
        matches!(self, Self::SolvedInTime)
    }
}

/// Progress of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundStatus {
    /// No round running (name entry or summary).
    Idle,
    /// Waiting for the round's image.
    Loading,
    /// The image failed to load; waiting for a retry.
    LoadFailed,
    /// Pieces on the board and the clock running.
    Active,
    /// Round decided; waiting for the display delay before advancing.
    Resolved(RoundOutcome),
}

/// State of the final-score upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing submitted yet.
    Idle,
    /// Upload in flight.
    Pending,
    /// Stored on the leaderboard.
    Saved(ScoreRecord),
    /// The leaderboard rejected or failed to store the score.
    Failed(String),
}

/// Verdict shown on the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    /// Every round solved.
    Perfect,
    /// At least two thirds solved.
    Great,
    /// At least one third solved.
    Good,
    /// Fewer than one third solved.
    KeepTrying,
}

impl Rating {
    /// Rates `score` out of `total_rounds`.
    pub fn for_score(score: u32, total_rounds: u32) -> Self {
        let (score, total) = (u64::from(score), u64::from(total_rounds));
        if score >= total {
            Self::Perfect
        } else if score * 3 >= total * 2 {
            Self::Great
        } else if score * 3 >= total {
            Self::Good
        } else {
            Self::KeepTrying
        }
    }

    /// Message shown for this rating.
    pub fn message(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect! You solved all puzzles!",
            Self::Great => "Great job! Well done!",
            Self::Good => "Good effort! Keep practicing!",
            Self::KeepTrying => "Keep trying! You'll get better!",
        }
    }
}

/// Errors returned by [`GameSession::apply`]. The session is unchanged when
/// one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionError {
    /// A swap named a cell outside the grid.
    #[display("Invalid swap: {}", _0)]
    InvalidSwap(GridError),
    /// The configured grid could not be built.
    #[display("Cannot build the round's board: {}", _0)]
    BoardSetup(GridError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSwap(err) | Self::BoardSetup(err) => Some(err),
        }
    }
}

/// One player's run through all rounds.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    catalog: ImageCatalog,
    rng: StdRng,
    phase: Phase,
    player_name: String,
    score: u32,
    round: u32,
    status: RoundStatus,
    entry: Option<CatalogEntry>,
    grid: Option<PieceGrid>,
    timer: RoundTimer,
    message: Option<Notice>,
    final_score: Option<u32>,
    submission: Submission,
    outcomes: Vec<RoundOutcome>,
}

impl GameSession {
    /// Creates a session waiting for a player name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    #[instrument(skip(config, rng))]
    pub fn new(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.image_catalog()?;
        info!(
            rows = config.rows(),
            cols = config.cols(),
            total_rounds = config.total_rounds(),
            round_seconds = config.round_seconds(),
            "Creating game session"
        );
        Ok(Self {
            config,
            catalog,
            rng,
            phase: Phase::NameEntry,
            player_name: String::new(),
            score: 0,
            round: 1,
            status: RoundStatus::Idle,
            entry: None,
            grid: None,
            timer: RoundTimer::new(),
            message: None,
            final_score: None,
            submission: Submission::Idle,
            outcomes: Vec::new(),
        })
    }

    /// Feeds one event through the state machine.
    ///
    /// Events that do not apply to the current phase or round are ignored
    /// and produce no effects.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidSwap`] for a swap naming a cell
    /// outside the grid.
    #[instrument(skip(self), fields(phase = %self.phase, round = self.round))]
    pub fn apply(&mut self, event: Event) -> Result<Vec<Effect>, SessionError> {
        match event {
            Event::SubmitName(name) => Ok(self.submit_name(&name)),
            Event::AssetReady { round } => self.asset_ready(round),
            Event::AssetFailed { round, reason } => Ok(self.asset_failed(round, reason)),
            Event::RetryLoad => Ok(self.retry_load()),
            Event::Swap { a, b } => self.swap(a, b),
            Event::Tick => Ok(self.tick()),
            Event::AdvanceDue { round } => Ok(self.advance_due(round)),
            Event::PlayAgain => Ok(self.play_again()),
            Event::Restart => Ok(self.restart()),
            Event::ScoreSaved(record) => Ok(self.score_saved(record)),
            Event::ScoreFailed(reason) => Ok(self.score_failed(reason)),
        }
    }

    fn submit_name(&mut self, name: &str) -> Vec<Effect> {
        if self.phase != Phase::NameEntry {
            warn!("Ignoring name submission outside name entry");
            return Vec::new();
        }
        let trimmed = name.trim();
        self.player_name = if trimmed.is_empty() {
            ANONYMOUS.to_string()
        } else {
            trimmed.chars().take(MAX_NAME_LEN).collect()
        };
        self.score = 0;
        self.round = 1;
        self.final_score = None;
        self.submission = Submission::Idle;
        self.outcomes.clear();
        self.phase = Phase::Playing;
        info!(player_name = %self.player_name, "Game started");
        self.begin_round()
    }

    /// Picks the round's image and asks for it to be loaded. The board and
    /// clock appear once the load succeeds.
    fn begin_round(&mut self) -> Vec<Effect> {
        let entry = self.catalog.pick_random(&mut self.rng).clone();
        info!(round = self.round, title = %entry.title(), "Round starting");
        self.status = RoundStatus::Loading;
        self.grid = None;
        self.timer.stop();
        self.message = None;
        self.entry = Some(entry.clone());
        vec![
            Effect::CancelScheduled,
            Effect::StopTicker,
            Effect::LoadAsset {
                round: self.round,
                entry,
            },
        ]
    }

    fn is_current(&self, round: u32, expected: RoundStatus) -> bool {
        self.phase == Phase::Playing && self.round == round && self.status == expected
    }

    fn asset_ready(&mut self, round: u32) -> Result<Vec<Effect>, SessionError> {
        if !self.is_current(round, RoundStatus::Loading) {
            debug!(stale_round = round, "Ignoring stale asset completion");
            return Ok(Vec::new());
        }
        let grid = PieceGrid::shuffled(*self.config.rows(), *self.config.cols(), &mut self.rng)
            .map_err(SessionError::BoardSetup)?;
        self.grid = Some(grid);
        self.timer.start(*self.config.round_seconds());
        self.status = RoundStatus::Active;
        info!(round, seconds = self.timer.remaining(), "Round live");
        Ok(vec![Effect::StartTicker])
    }

    fn asset_failed(&mut self, round: u32, reason: String) -> Vec<Effect> {
        if !self.is_current(round, RoundStatus::Loading) {
            debug!(stale_round = round, "Ignoring stale asset failure");
            return Vec::new();
        }
        warn!(round, reason = %reason, "Round image failed to load");
        self.status = RoundStatus::LoadFailed;
        self.message = Some(Notice::error(format!("Error loading image: {}", reason)));
        Vec::new()
    }

    fn retry_load(&mut self) -> Vec<Effect> {
        if !self.is_current(self.round, RoundStatus::LoadFailed) {
            debug!("Nothing to retry");
            return Vec::new();
        }
        info!(round = self.round, "Retrying round setup");
        self.begin_round()
    }

    fn swap(&mut self, a: Cell, b: Cell) -> Result<Vec<Effect>, SessionError> {
        if self.phase != Phase::Playing || self.status != RoundStatus::Active {
            debug!(a, b, status = ?self.status, "Ignoring swap outside an active round");
            return Ok(Vec::new());
        }
        let Some(grid) = self.grid.as_mut() else {
            return Ok(Vec::new());
        };
        match grid.swap(a, b).map_err(SessionError::InvalidSwap)? {
            SwapOutcome::Unchanged | SwapOutcome::Moved { solved: false } => Ok(Vec::new()),
            SwapOutcome::Moved { solved: true } => Ok(self.resolve_solved()),
        }
    }

    fn resolve_solved(&mut self) -> Vec<Effect> {
        let remaining = self.timer.remaining();
        self.timer.stop();
        let outcome = if remaining > 0 {
            self.score += 1;
            self.message = Some(Notice::success(format!(
                "Excellent! +1 point! Time left: {}s",
                remaining
            )));
            RoundOutcome::SolvedInTime
        } else {
            self.message = Some(Notice::error(
                "Good job, but time's up! No points this time.",
            ));
            RoundOutcome::SolvedLate
        };
        info!(round = self.round, remaining, ?outcome, score = self.score, "Round solved");
        self.resolve(outcome, self.config.solved_delay())
    }

    fn tick(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Playing || self.status != RoundStatus::Active {
            return Vec::new();
        }
        if self.timer.tick().is_none() {
            return Vec::new();
        }
        info!(round = self.round, "Round timed out");
        self.message = Some(Notice::error("Time's up!"));
        self.resolve(RoundOutcome::TimedOut, self.config.timeout_delay())
    }

    fn resolve(&mut self, outcome: RoundOutcome, delay: std::time::Duration) -> Vec<Effect> {
        self.status = RoundStatus::Resolved(outcome);
        self.outcomes.push(outcome);
        vec![
            Effect::StopTicker,
            Effect::Schedule {
                after: delay,
                event: Event::AdvanceDue { round: self.round },
            },
        ]
    }

    fn advance_due(&mut self, round: u32) -> Vec<Effect> {
        let resolved = matches!(self.status, RoundStatus::Resolved(_));
        if self.phase != Phase::Playing || self.round != round || !resolved {
            debug!(stale_round = round, "Ignoring stale advance");
            return Vec::new();
        }
        if round + 1 > *self.config.total_rounds() {
            self.phase = Phase::Summary;
            self.status = RoundStatus::Idle;
            self.final_score = Some(self.score);
            self.grid = None;
            self.entry = None;
            self.timer.stop();
            self.message = None;
            self.submission = Submission::Pending;
            info!(player_name = %self.player_name, final_score = self.score, "Game complete");
            return vec![
                Effect::StopTicker,
                Effect::SubmitScore {
                    player_name: self.player_name.clone(),
                    score: self.score,
                },
            ];
        }
        self.round += 1;
        self.begin_round()
    }

    fn play_again(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Summary {
            debug!("Ignoring play-again outside the summary");
            return Vec::new();
        }
        self.reset()
    }

    fn restart(&mut self) -> Vec<Effect> {
        info!("Restarting session");
        self.reset()
    }

    fn reset(&mut self) -> Vec<Effect> {
        self.phase = Phase::NameEntry;
        self.player_name.clear();
        self.score = 0;
        self.round = 1;
        self.status = RoundStatus::Idle;
        self.entry = None;
        self.grid = None;
        self.timer = RoundTimer::new();
        self.message = None;
        self.final_score = None;
        self.submission = Submission::Idle;
        self.outcomes.clear();
        vec![Effect::StopTicker, Effect::CancelScheduled]
    }

    fn score_saved(&mut self, record: ScoreRecord) -> Vec<Effect> {
        if self.phase == Phase::Summary && self.submission == Submission::Pending {
            info!(score_id = record.id(), "Final score stored");
            self.submission = Submission::Saved(record);
        }
        Vec::new()
    }

    fn score_failed(&mut self, reason: String) -> Vec<Effect> {
        if self.phase == Phase::Summary && self.submission == Submission::Pending {
            warn!(reason = %reason, "Final score not stored");
            self.submission = Submission::Failed(reason);
        }
        Vec::new()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Player name (empty during name entry).
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Points earned so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// 1-based round index.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Rounds in a game.
    pub fn total_rounds(&self) -> u32 {
        *self.config.total_rounds()
    }

    /// Progress of the current round.
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Image for the current round.
    pub fn entry(&self) -> Option<&CatalogEntry> {
        self.entry.as_ref()
    }

    /// Board for the current round, once its image has loaded.
    pub fn grid(&self) -> Option<&PieceGrid> {
        self.grid.as_ref()
    }

    /// Round countdown.
    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    /// Message for the player, if any.
    pub fn message(&self) -> Option<&Notice> {
        self.message.as_ref()
    }

    /// Final score, set on entering the summary.
    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    /// Summary verdict, once the game is over.
    pub fn rating(&self) -> Option<Rating> {
        self.final_score
            .map(|score| Rating::for_score(score, self.total_rounds()))
    }

    /// Upload state of the final score.
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Outcome of each finished round, in order.
    pub fn outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    /// Configuration the session was built with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn session() -> GameSession {
        GameSession::new(GameConfig::default(), StdRng::seed_from_u64(11)).expect("valid config")
    }

    fn start(session: &mut GameSession, name: &str) {
        session.apply(Event::SubmitName(name.into())).expect("submit");
        session
            .apply(Event::AssetReady { round: session.round() })
            .expect("asset ready");
    }

    #[test]
    fn test_blank_name_becomes_anonymous() {
        let mut s = session();
        s.apply(Event::SubmitName("   ".into())).expect("submit");
        assert_eq!(s.player_name(), ANONYMOUS);
        assert_eq!(s.phase(), Phase::Playing);
    }

    #[test]
    fn test_long_name_truncated() {
        let mut s = session();
        s.apply(Event::SubmitName("x".repeat(100))).expect("submit");
        assert_eq!(s.player_name().chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_submit_name_requests_first_asset() {
        let mut s = session();
        let effects = s.apply(Event::SubmitName("Ada".into())).expect("submit");
        assert_eq!(s.status(), RoundStatus::Loading);
        assert!(s.grid().is_none());
        assert!(effects.iter().any(|e| matches!(e, Effect::LoadAsset { round: 1, .. })));
    }

    #[test]
    fn test_asset_ready_starts_clock() {
        let mut s = session();
        s.apply(Event::SubmitName("Ada".into())).expect("submit");
        let effects = s.apply(Event::AssetReady { round: 1 }).expect("ready");
        assert_eq!(effects, vec![Effect::StartTicker]);
        assert_eq!(s.status(), RoundStatus::Active);
        assert_eq!(s.timer().remaining(), 25);
        assert!(!s.grid().expect("grid").is_solved());
    }

    #[test]
    fn test_stale_asset_ready_ignored() {
        let mut s = session();
        s.apply(Event::SubmitName("Ada".into())).expect("submit");
        assert!(s.apply(Event::AssetReady { round: 4 }).expect("ok").is_empty());
        assert_eq!(s.status(), RoundStatus::Loading);
    }

    #[test]
    fn test_asset_failure_then_retry() {
        let mut s = session();
        s.apply(Event::SubmitName("Ada".into())).expect("submit");
        s.apply(Event::AssetFailed {
            round: 1,
            reason: "404".into(),
        })
        .expect("failed");
        assert_eq!(s.status(), RoundStatus::LoadFailed);
        assert_eq!(s.message().map(Notice::text), Some("Error loading image: 404"));

        // Swaps and ticks do nothing while the board is missing.
        assert!(s.apply(Event::Swap { a: 0, b: 1 }).expect("ok").is_empty());
        assert!(s.apply(Event::Tick).expect("ok").is_empty());

        let effects = s.apply(Event::RetryLoad).expect("retry");
        assert!(effects.iter().any(|e| matches!(e, Effect::LoadAsset { round: 1, .. })));
        assert_eq!(s.status(), RoundStatus::Loading);
        assert!(s.message().is_none());
    }

    #[test]
    fn test_invalid_swap_is_error_and_leaves_board() {
        let mut s = session();
        start(&mut s, "Ada");
        let before = s.grid().cloned();
        let err = s.apply(Event::Swap { a: 0, b: 9 }).expect_err("out of range");
        assert!(matches!(err, SessionError::InvalidSwap(GridError::OutOfRange { cell: 9, .. })));
        assert_eq!(s.grid().cloned(), before);
    }

    #[test]
    fn test_restart_mid_round_cancels_everything() {
        let mut s = session();
        start(&mut s, "Ada");
        let effects = s.apply(Event::Restart).expect("restart");
        assert_eq!(effects, vec![Effect::StopTicker, Effect::CancelScheduled]);
        assert_eq!(s.phase(), Phase::NameEntry);
        assert_eq!(s.player_name(), "");
        assert!(s.grid().is_none());
        assert!(!s.timer().is_active());
    }

    #[test]
    fn test_play_again_ignored_while_playing() {
        let mut s = session();
        start(&mut s, "Ada");
        assert!(s.apply(Event::PlayAgain).expect("ok").is_empty());
        assert_eq!(s.phase(), Phase::Playing);
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(Rating::for_score(6, 6), Rating::Perfect);
        assert_eq!(Rating::for_score(5, 6), Rating::Great);
        assert_eq!(Rating::for_score(4, 6), Rating::Great);
        assert_eq!(Rating::for_score(3, 6), Rating::Good);
        assert_eq!(Rating::for_score(2, 6), Rating::Good);
        assert_eq!(Rating::for_score(1, 6), Rating::KeepTrying);
        assert_eq!(Rating::for_score(0, 6), Rating::KeepTrying);
        assert_eq!(Rating::for_score(u32::MAX - 1, u32::MAX), Rating::Great);
    }
}
