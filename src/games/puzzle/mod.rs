//! Swap puzzle: a shuffled image grid restored by exchanging pieces against
//! a per-round countdown.

mod catalog;
mod events;
mod grid;
mod input;
mod session;
mod timer;

pub use catalog::{CatalogEntry, EmptyCatalog, ImageCatalog};
pub use events::{Effect, Event, Notice, Tone};
pub use grid::{Cell, GridError, Piece, PieceGrid, SwapOutcome};
pub use input::{BoardLayout, CellSelector, Direction, GestureTracker, Point, SwapRequest};
pub use session::{
    ANONYMOUS, GameSession, MAX_NAME_LEN, Phase, Rating, RoundOutcome, RoundStatus,
    SessionError, Submission,
};
pub use timer::{Expired, RoundTimer, Urgency};
