//! Runs a [`GameSession`] against real time and real I/O.
//!
//! The driver owns the session, the [`Scheduler`] and the collaborators that
//! effects need. Image loads and score uploads run as tokio tasks and post
//! their results back on a channel; [`SessionDriver::pump`] feeds those
//! results, plus any due ticks or delayed events, into the session on the
//! caller's task. The session itself is only ever touched from there.
//! Leaderboard reads for display go through the same kind of task so a slow
//! store never stalls the caller.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, instrument, warn};

use crate::assets::AssetLoader;
use crate::db::ScoreRecord;
use crate::games::puzzle::{Effect, Event, GameSession, SessionError};
use crate::leaderboard::{LeaderboardError, LeaderboardStore, TOP_LIMIT};
use crate::scheduler::Scheduler;

/// Session plus everything needed to carry out its effects.
pub struct SessionDriver {
    session: GameSession,
    scheduler: Scheduler,
    assets: Arc<dyn AssetLoader>,
    leaderboard: Arc<dyn LeaderboardStore>,
    completions_tx: UnboundedSender<Event>,
    completions_rx: UnboundedReceiver<Event>,
    standings_tx: UnboundedSender<Result<Vec<ScoreRecord>, LeaderboardError>>,
    standings_rx: UnboundedReceiver<Result<Vec<ScoreRecord>, LeaderboardError>>,
    standings_in_flight: bool,
}

impl std::fmt::Debug for SessionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDriver")
            .field("session", &self.session)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl SessionDriver {
    /// Wraps `session` with the given collaborators.
    pub fn new(
        session: GameSession,
        scheduler: Scheduler,
        assets: Arc<dyn AssetLoader>,
        leaderboard: Arc<dyn LeaderboardStore>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (standings_tx, standings_rx) = mpsc::unbounded_channel();
        Self {
            session,
            scheduler,
            assets,
            leaderboard,
            completions_tx,
            completions_rx,
            standings_tx,
            standings_rx,
            standings_in_flight: false,
        }
    }

    /// The driven session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The scheduler holding the ticker and pending delayed event.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Applies a player event now.
    pub fn dispatch(&mut self, event: Event) -> Result<(), SessionError> {
        self.dispatch_at(event, Instant::now())
    }

    /// Applies an event as of `now` and carries out its effects.
    ///
    /// Must be called from within a tokio runtime; load and upload effects
    /// spawn tasks.
    #[instrument(skip(self, now))]
    pub fn dispatch_at(&mut self, event: Event, now: Instant) -> Result<(), SessionError> {
        let effects = self.session.apply(event)?;
        self.run_effects(effects, now);
        Ok(())
    }

    fn run_effects(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            debug!(?effect, "Running effect");
            match effect {
                Effect::LoadAsset { round, entry } => {
                    let assets = Arc::clone(&self.assets);
                    let tx = self.completions_tx.clone();
                    tokio::spawn(async move {
                        let event = match assets.ensure_loaded(&entry).await {
                            Ok(()) => Event::AssetReady { round },
                            Err(e) => Event::AssetFailed {
                                round,
                                reason: e.message,
                            },
                        };
                        if tx.send(event).is_err() {
                            debug!("Driver gone before image load finished");
                        }
                    });
                }
                Effect::StartTicker => self.scheduler.start_ticker(now),
                Effect::StopTicker => self.scheduler.stop_ticker(),
                Effect::Schedule { after, event } => self.scheduler.schedule(now, after, event),
                Effect::CancelScheduled => self.scheduler.cancel(),
                Effect::SubmitScore { player_name, score } => {
                    let leaderboard = Arc::clone(&self.leaderboard);
                    let tx = self.completions_tx.clone();
                    let score = i32::try_from(score).unwrap_or(i32::MAX);
                    tokio::spawn(async move {
                        let event = match leaderboard.submit(&player_name, score).await {
                            Ok(record) => Event::ScoreSaved(record),
                            Err(e) => {
                                warn!(error = %e, "Score upload failed");
                                Event::ScoreFailed(e.to_string())
                            }
                        };
                        if tx.send(event).is_err() {
                            debug!("Driver gone before score upload finished");
                        }
                    });
                }
            }
        }
    }

    /// Feeds finished background work and every event due at `now` into
    /// the session. Returns how many events were applied.
    ///
    /// A rejected event is logged and skipped; the rest still run.
    pub fn pump(&mut self, now: Instant) -> usize {
        let mut events = Vec::new();
        while let Ok(event) = self.completions_rx.try_recv() {
            events.push(event);
        }
        events.extend(self.scheduler.due(now));

        let mut applied = 0;
        for event in events {
            match self.dispatch_at(event, now) {
                Ok(()) => applied += 1,
                Err(e) => warn!(error = %e, "Session rejected a queued event"),
            }
        }
        applied
    }

    /// Starts fetching the top scores in the background.
    ///
    /// Does nothing while a fetch is already running. The result is picked
    /// up with [`SessionDriver::take_standings`].
    #[instrument(skip(self))]
    pub fn refresh_standings(&mut self) {
        if self.standings_in_flight {
            return;
        }
        self.standings_in_flight = true;
        let leaderboard = Arc::clone(&self.leaderboard);
        let tx = self.standings_tx.clone();
        tokio::spawn(async move {
            let result = leaderboard.list_top(TOP_LIMIT).await;
            if let Err(e) = &result {
                warn!(error = %e, "Leaderboard fetch failed");
            }
            if tx.send(result).is_err() {
                debug!("Driver gone before leaderboard fetch finished");
            }
        });
    }

    /// Whether a leaderboard fetch is still running.
    pub fn standings_loading(&self) -> bool {
        self.standings_in_flight
    }

    /// Returns the finished leaderboard fetch, if one has arrived.
    pub fn take_standings(&mut self) -> Option<Result<Vec<ScoreRecord>, LeaderboardError>> {
        let result = self.standings_rx.try_recv().ok()?;
        self.standings_in_flight = false;
        Some(result)
    }

    /// Waits for the next background completion and applies it as of
    /// `now`.
    pub async fn next_completion(&mut self, now: Instant) -> Result<(), SessionError> {
        // The driver holds a sender, so the channel never closes.
        if let Some(event) = self.completions_rx.recv().await {
            self.dispatch_at(event, now)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::OfflineAssetLoader;
    use crate::config::GameConfig;
    use crate::db::ScoreRepository;
    use crate::games::puzzle::RoundStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    #[tokio::test]
    async fn test_rejected_completion_does_not_drop_due_ticks() {
        let db_file = tempfile::NamedTempFile::new().expect("temp file");
        let db_path = db_file.path().to_str().expect("path").to_string();
        let repo = ScoreRepository::open(db_path).expect("open");
        let session =
            GameSession::new(GameConfig::default(), StdRng::seed_from_u64(3)).expect("session");
        let mut driver = SessionDriver::new(
            session,
            Scheduler::default(),
            Arc::new(OfflineAssetLoader),
            Arc::new(repo),
        );
        let t0 = Instant::now();
        driver
            .dispatch_at(Event::SubmitName("Ada".to_string()), t0)
            .expect("submit");
        driver.next_completion(t0).await.expect("asset");
        assert_eq!(driver.session().status(), RoundStatus::Active);

        driver
            .completions_tx
            .send(Event::Swap { a: 0, b: 99 })
            .expect("send");
        assert_eq!(driver.pump(t0 + Duration::from_secs(2)), 2);
        assert_eq!(driver.session().timer().remaining(), 23);
    }
}
