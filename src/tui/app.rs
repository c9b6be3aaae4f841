//! Application state and key handling.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use tracing::{debug, info};

use super::input::{POINTER_UNITS_PER_CELL, direction_for, track_mouse};
use crate::db::ScoreRecord;
use crate::games::puzzle::{
    BoardLayout, CellSelector, Event, GameSession, GestureTracker, MAX_NAME_LEN, Phase,
    RoundStatus, SwapRequest,
};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Nothing to do.
    None,
    /// Feed this event to the session.
    Dispatch(Event),
    /// Leave the game.
    Quit,
}

impl From<SwapRequest> for AppCommand {
    fn from(request: SwapRequest) -> Self {
        AppCommand::Dispatch(Event::Swap {
            a: *request.a(),
            b: *request.b(),
        })
    }
}

/// Terminal-side state that the session does not track.
#[derive(Debug)]
pub struct App {
    name_input: String,
    selector: CellSelector,
    gestures: GestureTracker,
    layout: BoardLayout,
    leaderboard: Vec<ScoreRecord>,
    leaderboard_error: Option<String>,
    leaderboard_stale: bool,
    leaderboard_loading: bool,
    board_seen: (u32, RoundStatus),
}

impl App {
    /// Creates UI state for a board of `rows` × `cols`.
    pub fn new(rows: usize, cols: usize, drag_threshold: f32) -> Self {
        Self {
            name_input: String::new(),
            selector: CellSelector::new(rows, cols),
            gestures: GestureTracker::new(drag_threshold / POINTER_UNITS_PER_CELL),
            layout: BoardLayout::default(),
            leaderboard: Vec::new(),
            leaderboard_error: None,
            leaderboard_stale: true,
            leaderboard_loading: false,
            board_seen: (0, RoundStatus::Idle),
        }
    }

    /// Text typed on the name screen.
    pub fn name_input(&self) -> &str {
        &self.name_input
    }

    /// Keyboard cursor and pick.
    pub fn selector(&self) -> &CellSelector {
        &self.selector
    }

    /// Cell being dragged with the mouse.
    pub fn dragged_cell(&self) -> Option<usize> {
        self.gestures.dragged_cell()
    }

    /// Last leaderboard fetched.
    pub fn leaderboard(&self) -> &[ScoreRecord] {
        &self.leaderboard
    }

    /// Why the last leaderboard fetch failed.
    pub fn leaderboard_error(&self) -> Option<&str> {
        self.leaderboard_error.as_deref()
    }

    /// Records where the board was drawn, for mouse hit-testing.
    pub fn set_layout(&mut self, layout: BoardLayout) {
        self.layout = layout;
    }

    /// Whether the leaderboard should be fetched again.
    pub fn leaderboard_stale(&self) -> bool {
        self.leaderboard_stale
    }

    /// Marks the leaderboard for a refetch.
    pub fn invalidate_leaderboard(&mut self) {
        self.leaderboard_stale = true;
    }

    /// Whether a leaderboard fetch is on its way.
    pub fn leaderboard_loading(&self) -> bool {
        self.leaderboard_loading
    }

    /// Notes that a fetch was started.
    pub fn begin_leaderboard_fetch(&mut self) {
        self.leaderboard_stale = false;
        self.leaderboard_loading = true;
    }

    /// Stores a leaderboard fetch result.
    pub fn set_leaderboard(&mut self, result: Result<Vec<ScoreRecord>, String>) {
        match result {
            Ok(scores) => {
                self.leaderboard = scores;
                self.leaderboard_error = None;
            }
            Err(e) => self.leaderboard_error = Some(e),
        }
        self.leaderboard_loading = false;
    }

    /// Drops any pick or drag made on a board that is no longer live.
    ///
    /// Called every frame; a change of round or round status means the
    /// grid the pick referred to is gone or frozen.
    pub fn sync_board(&mut self, session: &GameSession) {
        let seen = (session.round(), session.status());
        if seen != self.board_seen {
            debug!(round = seen.0, status = ?seen.1, "Board changed, clearing pick");
            self.selector.clear();
            self.gestures.cancel();
            self.board_seen = seen;
        }
    }

    /// Handles a key press for the session's current phase.
    pub fn handle_key(&mut self, key: KeyEvent, session: &GameSession) -> AppCommand {
        match session.phase() {
            Phase::NameEntry => self.handle_name_key(key),
            Phase::Playing => self.handle_board_key(key, session),
            Phase::Summary => match key.code {
                KeyCode::Enter | KeyCode::Char('p') | KeyCode::Char('P') => {
                    info!("Player chose to play again");
                    AppCommand::Dispatch(Event::PlayAgain)
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => AppCommand::Quit,
                _ => AppCommand::None,
            },
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Char(c) => {
                if self.name_input.chars().count() < MAX_NAME_LEN {
                    self.name_input.push(c);
                }
                AppCommand::None
            }
            KeyCode::Backspace => {
                self.name_input.pop();
                AppCommand::None
            }
            KeyCode::Enter => {
                let name = std::mem::take(&mut self.name_input);
                self.selector.clear();
                AppCommand::Dispatch(Event::SubmitName(name))
            }
            KeyCode::Esc => AppCommand::Quit,
            _ => AppCommand::None,
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent, session: &GameSession) -> AppCommand {
        self.sync_board(session);
        if let Some(direction) = direction_for(key.code) {
            self.selector.move_cursor(direction);
            return AppCommand::None;
        }
        let live = session.status() == RoundStatus::Active;
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter if !live => AppCommand::None,
            KeyCode::Char(' ') | KeyCode::Enter => match self.selector.toggle() {
                Some(request) => {
                    debug!(?request, "Keyboard swap");
                    request.into()
                }
                None => AppCommand::None,
            },
            KeyCode::Esc => {
                self.selector.clear();
                AppCommand::None
            }
            KeyCode::Char('r') | KeyCode::Char('R')
                if session.status() == RoundStatus::LoadFailed =>
            {
                AppCommand::Dispatch(Event::RetryLoad)
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.selector.clear();
                self.gestures.cancel();
                AppCommand::Dispatch(Event::Restart)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => AppCommand::Quit,
            _ => AppCommand::None,
        }
    }

    /// Handles a mouse event; only drags on a live board count.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, session: &GameSession) -> AppCommand {
        self.sync_board(session);
        if session.status() != RoundStatus::Active {
            self.gestures.cancel();
            return AppCommand::None;
        }
        match track_mouse(&mut self.gestures, &self.layout, mouse) {
            Some(request) => {
                debug!(?request, "Mouse swap");
                self.selector.clear();
                request.into()
            }
            None => AppCommand::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crossterm::event::KeyModifiers;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn session() -> GameSession {
        GameSession::new(GameConfig::default(), StdRng::seed_from_u64(5)).expect("session")
    }

    #[test]
    fn test_typing_a_name_submits_it() {
        let session = session();
        let mut app = App::new(3, 3, 10.0);
        for c in "Ada".chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c)), &session), AppCommand::None);
        }
        app.handle_key(key(KeyCode::Char('x')), &session);
        app.handle_key(key(KeyCode::Backspace), &session);
        assert_eq!(
            app.handle_key(key(KeyCode::Enter), &session),
            AppCommand::Dispatch(Event::SubmitName("Ada".into()))
        );
        assert_eq!(app.name_input(), "");
    }

    #[test]
    fn test_keyboard_pick_pair_swaps() {
        let mut session = session();
        session.apply(Event::SubmitName("Ada".into())).expect("submit");
        session.apply(Event::AssetReady { round: 1 }).expect("ready");
        let mut app = App::new(3, 3, 10.0);
        assert_eq!(app.handle_key(key(KeyCode::Char(' ')), &session), AppCommand::None);
        app.handle_key(key(KeyCode::Down), &session);
        assert_eq!(
            app.handle_key(key(KeyCode::Enter), &session),
            AppCommand::Dispatch(Event::Swap { a: 0, b: 3 })
        );
    }

    #[test]
    fn test_pick_from_previous_round_is_dropped() {
        let mut session = session();
        session.apply(Event::SubmitName("Ada".into())).expect("submit");
        session.apply(Event::AssetReady { round: 1 }).expect("ready");
        let mut app = App::new(3, 3, 10.0);
        app.sync_board(&session);
        for _ in 0..25 {
            session.apply(Event::Tick).expect("tick");
        }
        assert!(matches!(session.status(), RoundStatus::Resolved(_)));

        // Picking on a frozen board does nothing.
        assert_eq!(app.handle_key(key(KeyCode::Char(' ')), &session), AppCommand::None);
        assert_eq!(app.selector().picked(), None);

        session.apply(Event::AdvanceDue { round: 1 }).expect("advance");
        session.apply(Event::AssetReady { round: 2 }).expect("ready");
        assert_eq!(session.status(), RoundStatus::Active);
        app.handle_key(key(KeyCode::Right), &session);
        assert_eq!(app.handle_key(key(KeyCode::Enter), &session), AppCommand::None);
        assert_eq!(app.selector().picked(), Some(1));
    }

    #[test]
    fn test_pick_is_cleared_when_the_round_resolves() {
        let mut session = session();
        session.apply(Event::SubmitName("Ada".into())).expect("submit");
        session.apply(Event::AssetReady { round: 1 }).expect("ready");
        let mut app = App::new(3, 3, 10.0);
        app.handle_key(key(KeyCode::Char(' ')), &session);
        assert_eq!(app.selector().picked(), Some(0));

        for _ in 0..25 {
            session.apply(Event::Tick).expect("tick");
        }
        app.sync_board(&session);
        assert_eq!(app.selector().picked(), None);
    }

    #[test]
    fn test_mouse_press_on_frozen_board_is_ignored() {
        use crossterm::event::{MouseButton, MouseEventKind};
        let mut session = session();
        session.apply(Event::SubmitName("Ada".into())).expect("submit");
        let mut app = App::new(3, 3, 10.0);
        app.set_layout(BoardLayout::new(0, 0, 10, 4, 3, 3));
        let down = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        // Still loading: no drag starts.
        assert_eq!(app.handle_mouse(down, &session), AppCommand::None);
        assert_eq!(app.dragged_cell(), None);
    }

    #[test]
    fn test_leaderboard_refresh_bookkeeping() {
        let mut app = App::new(3, 3, 10.0);
        assert!(app.leaderboard_stale());
        app.begin_leaderboard_fetch();
        assert!(!app.leaderboard_stale());
        assert!(app.leaderboard_loading());
        app.set_leaderboard(Err("offline".into()));
        assert!(!app.leaderboard_loading());
        assert_eq!(app.leaderboard_error(), Some("offline"));
        app.invalidate_leaderboard();
        assert!(app.leaderboard_stale());
    }
}
