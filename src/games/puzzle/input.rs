//! Input adapters that turn raw pointer or keyboard input into swap requests.
//!
//! Neither adapter knows about the session. They only produce a
//! [`SwapRequest`] or nothing; a gesture too small to count is a non-event.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::grid::Cell;

/// Request to exchange the pieces in two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
pub struct SwapRequest {
    /// Cell where the gesture started.
    a: Cell,
    /// Cell where the gesture ended.
    b: Cell,
}

/// Pointer position in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, new)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Point {
    fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Turns press/drag/release sequences into swap requests.
///
/// A release produces a request only if the pointer travelled strictly
/// farther than the threshold, landed on a cell, and that cell differs from
/// the one it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTracker {
    threshold: f32,
    origin: Option<(Cell, Point)>,
}

impl GestureTracker {
    /// Creates a tracker with the given minimum drag distance.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            origin: None,
        }
    }

    /// Pointer pressed over `cell` at `at`.
    pub fn press(&mut self, cell: Cell, at: Point) {
        self.origin = Some((cell, at));
    }

    /// Gesture aborted (pointer left the board or the press was cancelled).
    pub fn cancel(&mut self) {
        self.origin = None;
    }

    /// Whether a press is in progress.
    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    /// Cell the current press started on.
    pub fn dragged_cell(&self) -> Option<Cell> {
        self.origin.map(|(cell, _)| cell)
    }

    /// Pointer released at `at`, over `target` if it is on the board.
    #[instrument(skip(self))]
    pub fn release(&mut self, target: Option<Cell>, at: Point) -> Option<SwapRequest> {
        let (source, start) = self.origin.take()?;
        let travelled = start.distance(at);
        if travelled <= self.threshold {
            debug!(travelled, threshold = self.threshold, "Drag below threshold");
            return None;
        }
        let target = target?;
        if target == source {
            debug!(cell = source, "Released on the starting cell");
            return None;
        }
        Some(SwapRequest::new(source, target))
    }
}

/// Cursor movement on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// One column left.
    Left,
    /// One column right.
    Right,
}

/// Keyboard selection: move a cursor, pick a cell, pick another to swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSelector {
    rows: usize,
    cols: usize,
    cursor: Cell,
    picked: Option<Cell>,
}

impl CellSelector {
    /// Creates a selector for a `rows` × `cols` board with the cursor on
    /// cell 0.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cursor: 0,
            picked: None,
        }
    }

    /// Cell under the cursor.
    pub fn cursor(&self) -> Cell {
        self.cursor
    }

    /// Cell picked as the first half of a swap.
    pub fn picked(&self) -> Option<Cell> {
        self.picked
    }

    /// Moves the cursor one step, stopping at the board edge.
    pub fn move_cursor(&mut self, direction: Direction) {
        let (row, col) = (self.cursor / self.cols, self.cursor % self.cols);
        let (row, col) = match direction {
            Direction::Up => (row.saturating_sub(1), col),
            Direction::Down => ((row + 1).min(self.rows - 1), col),
            Direction::Left => (row, col.saturating_sub(1)),
            Direction::Right => (row, (col + 1).min(self.cols - 1)),
        };
        self.cursor = row * self.cols + col;
    }

    /// Picks the cell under the cursor.
    ///
    /// The first pick marks a cell. A second pick on a different cell
    /// yields a swap; a second pick on the same cell unmarks it.
    pub fn toggle(&mut self) -> Option<SwapRequest> {
        match self.picked.take() {
            None => {
                self.picked = Some(self.cursor);
                None
            }
            Some(cell) if cell == self.cursor => None,
            Some(cell) => Some(SwapRequest::new(cell, self.cursor)),
        }
    }

    /// Drops any half-made selection.
    pub fn clear(&mut self) {
        self.picked = None;
    }
}

/// Screen geometry of the board, used to map pointer positions to cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters, new)]
pub struct BoardLayout {
    /// Left edge of the board.
    origin_x: u16,
    /// Top edge of the board.
    origin_y: u16,
    /// Width of one cell.
    cell_width: u16,
    /// Height of one cell.
    cell_height: u16,
    /// Rows on the board.
    rows: u16,
    /// Columns on the board.
    cols: u16,
}

impl BoardLayout {
    /// Cell containing the point `(x, y)`, if it is on the board.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Cell> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return None;
        }
        let dx = x.checked_sub(self.origin_x)?;
        let dy = y.checked_sub(self.origin_y)?;
        let col = dx / self.cell_width;
        let row = dy / self.cell_height;
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(usize::from(row) * usize::from(self.cols) + usize::from(col))
    }

    /// Top-left corner of `cell`.
    pub fn cell_origin(&self, cell: Cell) -> (u16, u16) {
        let cols = usize::from(self.cols.max(1));
        let row = u16::try_from(cell / cols).unwrap_or(u16::MAX);
        let col = u16::try_from(cell % cols).unwrap_or(u16::MAX);
        (
            self.origin_x.saturating_add(col.saturating_mul(self.cell_width)),
            self.origin_y.saturating_add(row.saturating_mul(self.cell_height)),
        )
    }
}
