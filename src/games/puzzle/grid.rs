//! Piece grid: an image cut into `rows × cols` pieces that the player swaps
//! back into place.
//!
//! Pieces are stored in row-major order by the cell they currently occupy.
//! Each piece remembers its origin cell, fixed when the grid is built, so
//! the grid is solved exactly when every piece sits on its origin.

use derive_more::Display;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Position index within the grid, `0..rows * cols`, row-major.
pub type Cell = usize;

/// One piece of the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    id: usize,
    origin: Cell,
    current: Cell,
}

impl Piece {
    /// Stable identity of the piece (equal to its origin cell).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Cell this piece belongs in.
    pub fn origin_cell(&self) -> Cell {
        self.origin
    }

    /// Cell this piece currently occupies.
    pub fn current_cell(&self) -> Cell {
        self.current
    }

    /// Returns true if the piece sits on its origin cell.
    pub fn is_home(&self) -> bool {
        self.origin == self.current
    }
}

/// Errors raised when building or mutating a grid.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GridError {
    /// The grid would hold fewer than two pieces.
    #[display("Grid {}x{} is too small to shuffle (need at least two pieces)", rows, cols)]
    TooSmall {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// A cell index lies outside the grid.
    #[display("Cell {} is out of range (grid has {} cells)", cell, len)]
    OutOfRange {
        /// Offending cell.
        cell: Cell,
        /// Number of cells in the grid.
        len: usize,
    },

    /// The supplied origins are not a permutation of `0..len`.
    #[display("Origins are not a permutation of 0..{}", len)]
    NotAPermutation {
        /// Expected length.
        len: usize,
    },
}

impl std::error::Error for GridError {}

/// What a swap did to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Both cells were the same; nothing moved and the win check was skipped.
    Unchanged,
    /// Two pieces traded places.
    Moved {
        /// Whether every piece is now home.
        solved: bool,
    },
}

/// The board for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceGrid {
    rows: usize,
    cols: usize,
    /// Indexed by current cell.
    pieces: Vec<Piece>,
}

impl PieceGrid {
    /// Builds a shuffled grid.
    ///
    /// Origins start as the identity, then a uniform Fisher–Yates shuffle
    /// assigns pieces to cells. A shuffle that lands on the solved
    /// arrangement is redrawn, so a fresh grid is never already solved.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::TooSmall`] if the grid has fewer than two cells.
    #[instrument(skip(rng))]
    pub fn shuffled<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Self, GridError> {
        let len = Self::checked_len(rows, cols)?;
        let mut origins: Vec<Cell> = (0..len).collect();
        let mut draws = 0u32;
        loop {
            origins.shuffle(rng);
            draws += 1;
            if origins.iter().enumerate().any(|(cell, origin)| cell != *origin) {
                break;
            }
            debug!(draws, "Shuffle landed on the solved arrangement, redrawing");
        }
        debug!(rows, cols, draws, "Shuffled grid");
        Self::from_permutation(rows, cols, &origins)
    }

    /// Builds a grid where `origins[cell]` is the origin of the piece placed
    /// at `cell`. The identity permutation gives a solved grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the grid is too small or `origins` is not a
    /// permutation of `0..rows * cols`.
    #[instrument(skip(origins))]
    pub fn from_permutation(rows: usize, cols: usize, origins: &[Cell]) -> Result<Self, GridError> {
        let len = Self::checked_len(rows, cols)?;
        if origins.len() != len {
            return Err(GridError::NotAPermutation { len });
        }
        let mut seen = vec![false; len];
        for &origin in origins {
            match seen.get_mut(origin) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(GridError::NotAPermutation { len }),
            }
        }

        let pieces = origins
            .iter()
            .enumerate()
            .map(|(current, &origin)| Piece {
                id: origin,
                origin,
                current,
            })
            .collect();

        Ok(Self { rows, cols, pieces })
    }

    fn checked_len(rows: usize, cols: usize) -> Result<usize, GridError> {
        match rows.checked_mul(cols) {
            Some(len) if rows >= 1 && cols >= 1 && len >= 2 => Ok(len),
            _ => Err(GridError::TooSmall { rows, cols }),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells (and pieces).
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Always false; a grid holds at least two pieces.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Pieces in cell order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// The piece occupying `cell`.
    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        self.pieces.get(cell)
    }

    /// `(row, col)` of a cell.
    pub fn row_col(&self, cell: Cell) -> (usize, usize) {
        (cell / self.cols, cell % self.cols)
    }

    /// Where a piece's slice sits inside the source image, as horizontal and
    /// vertical percentages (0 for the first row/column, 100 for the last).
    pub fn image_offset(&self, piece: &Piece) -> (u32, u32) {
        let (row, col) = self.row_col(piece.origin);
        let pct = |index: usize, count: usize| {
            if count <= 1 {
                0
            } else {
                (index * 100 / (count - 1)) as u32
            }
        };
        (pct(col, self.cols), pct(row, self.rows))
    }

    /// Number of pieces on their origin cell.
    pub fn correct_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_home()).count()
    }

    /// Returns true when every piece is home.
    pub fn is_solved(&self) -> bool {
        self.pieces.iter().all(Piece::is_home)
    }

    /// Exchanges the pieces at two cells.
    ///
    /// Swapping a cell with itself changes nothing and skips the win check.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfRange`] if either cell is outside the grid;
    /// the grid is left untouched.
    #[instrument(skip(self), fields(rows = self.rows, cols = self.cols))]
    pub fn swap(&mut self, a: Cell, b: Cell) -> Result<SwapOutcome, GridError> {
        let len = self.pieces.len();
        for cell in [a, b] {
            if cell >= len {
                warn!(cell, len, "Rejected swap outside the grid");
                return Err(GridError::OutOfRange { cell, len });
            }
        }
        if a == b {
            return Ok(SwapOutcome::Unchanged);
        }

        self.pieces.swap(a, b);
        self.pieces[a].current = a;
        self.pieces[b].current = b;

        let solved = self.is_solved();
        debug!(a, b, solved, correct = self.correct_count(), "Swapped pieces");
        Ok(SwapOutcome::Moved { solved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn origins(grid: &PieceGrid) -> Vec<Cell> {
        grid.pieces().iter().map(Piece::origin_cell).collect()
    }

    fn is_permutation(values: &[Cell]) -> bool {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, v)| i == *v)
    }

    #[test]
    fn test_shuffled_cells_and_origins_are_permutations() {
        let mut rng = StdRng::seed_from_u64(7);
        for (rows, cols) in [(1, 2), (2, 2), (3, 3), (4, 5), (6, 1)] {
            let grid = PieceGrid::shuffled(rows, cols, &mut rng).expect("valid grid");
            assert_eq!(grid.len(), rows * cols);
            let current: Vec<Cell> = grid.pieces().iter().map(Piece::current_cell).collect();
            assert!(is_permutation(&current));
            assert!(is_permutation(&origins(&grid)));
            assert!(grid.pieces().iter().all(|p| p.id() == p.origin_cell()));
        }
    }

    #[test]
    fn test_shuffled_grid_is_never_solved() {
        let mut rng = StdRng::seed_from_u64(1);
        // A 1x2 grid has a 50% chance of drawing the identity every time.
        for _ in 0..200 {
            let grid = PieceGrid::shuffled(1, 2, &mut rng).expect("valid grid");
            assert!(!grid.is_solved());
            assert_eq!(origins(&grid), vec![1, 0]);
        }
    }

    #[test]
    fn test_too_small_grids_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            PieceGrid::shuffled(1, 1, &mut rng),
            Err(GridError::TooSmall { rows: 1, cols: 1 })
        );
        assert!(PieceGrid::shuffled(0, 5, &mut rng).is_err());
    }

    #[test]
    fn test_from_permutation_rejects_bad_input() {
        assert!(PieceGrid::from_permutation(2, 2, &[0, 1, 2]).is_err());
        assert!(PieceGrid::from_permutation(2, 2, &[0, 1, 1, 3]).is_err());
        assert!(PieceGrid::from_permutation(2, 2, &[0, 1, 2, 4]).is_err());
        assert!(PieceGrid::from_permutation(2, 2, &[3, 2, 1, 0]).is_ok());
    }

    #[test]
    fn test_swap_twice_restores_grid() {
        let mut rng = StdRng::seed_from_u64(42);
        let original = PieceGrid::shuffled(3, 3, &mut rng).expect("valid grid");
        for a in 0..9 {
            for b in 0..9 {
                if a == b {
                    continue;
                }
                let mut grid = original.clone();
                grid.swap(a, b).expect("in range");
                grid.swap(a, b).expect("in range");
                assert_eq!(grid, original, "swap({a}, {b}) twice");
            }
        }
    }

    #[test]
    fn test_swap_same_cell_is_noop() {
        let mut grid = PieceGrid::from_permutation(2, 2, &[1, 0, 2, 3]).expect("valid");
        let before = grid.clone();
        assert_eq!(grid.swap(2, 2), Ok(SwapOutcome::Unchanged));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_swap_out_of_range_leaves_grid_untouched() {
        let mut grid = PieceGrid::from_permutation(2, 2, &[1, 0, 2, 3]).expect("valid");
        let before = grid.clone();
        assert_eq!(
            grid.swap(0, 4),
            Err(GridError::OutOfRange { cell: 4, len: 4 })
        );
        assert_eq!(grid.swap(9, 9), Err(GridError::OutOfRange { cell: 9, len: 4 }));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_swap_reports_solved_only_when_all_home() {
        let mut grid = PieceGrid::from_permutation(2, 2, &[1, 0, 3, 2]).expect("valid");
        assert_eq!(grid.correct_count(), 0);
        assert_eq!(grid.swap(0, 1), Ok(SwapOutcome::Moved { solved: false }));
        assert_eq!(grid.correct_count(), 2);
        assert_eq!(grid.swap(2, 3), Ok(SwapOutcome::Moved { solved: true }));
        assert!(grid.is_solved());
        assert!(grid.pieces().iter().enumerate().all(|(cell, p)| p.current_cell() == cell));
    }

    #[test]
    fn test_image_offset_spans_corners() {
        let grid = PieceGrid::from_permutation(3, 3, &[8, 1, 2, 3, 4, 5, 6, 7, 0]).expect("valid");
        let first = grid.piece_at(0).copied().expect("cell 0");
        let last = grid.piece_at(8).copied().expect("cell 8");
        assert_eq!(grid.image_offset(&first), (100, 100));
        assert_eq!(grid.image_offset(&last), (0, 0));
        let middle = grid.piece_at(4).copied().expect("cell 4");
        assert_eq!(grid.image_offset(&middle), (50, 50));
    }
}
