use core::fmt;
use serde::{Deserialize, Serialize};

pub const ROWS: usize = 3;
pub const COLS: usize = 10;
pub const CELL_COUNT: usize = ROWS * COLS;

/// Coordinates of a single cell on the 3 × 10 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Builds a position, panicking when the coordinates fall outside the board.
    ///
    /// Out-of-range coordinates are caller bugs rather than game situations, so they are
    /// rejected loudly instead of surfacing as a recoverable [`crate::game::GameError`].
    pub fn new(row: usize, col: usize) -> Self {
        assert!(
            row < ROWS && col < COLS,
            "position ({row}, {col}) is outside the {ROWS}x{COLS} board"
        );
        Self { row, col }
    }

    pub const fn try_new(row: usize, col: usize) -> Option<Self> {
        if row < ROWS && col < COLS {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Flat action label in `0..30` (`row * 10 + col`).
    pub const fn label(self) -> usize {
        self.row * COLS + self.col
    }

    pub const fn from_label(label: usize) -> Option<Self> {
        if label < CELL_COUNT {
            Some(Self {
                row: label / COLS,
                col: label % COLS,
            })
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT).filter_map(Position::from_label)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
