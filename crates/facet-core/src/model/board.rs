use crate::model::position::{COLS, Position, ROWS};
use serde::{Deserialize, Serialize};

pub const INITIAL_PROBABILITY: f64 = 0.75;
pub const PROBABILITY_FLOOR: f64 = 0.25;
pub const PROBABILITY_CEILING: f64 = 0.75;
pub const DRIFT_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub clicked: bool,
    pub probability: f64,
    pub outcome: Option<bool>,
}

impl Cell {
    pub const fn fresh() -> Self {
        Self {
            clicked: false,
            probability: INITIAL_PROBABILITY,
            outcome: None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::fresh()
    }
}

/// The 3 × 10 grid. Clicked cells in each row always form a left prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    pub const fn new() -> Self {
        Self {
            cells: [[Cell::fresh(); COLS]; ROWS],
        }
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.row][pos.col]
    }

    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    /// Leftmost unclicked cell of `row`, if any remain.
    pub fn frontier(&self, row: usize) -> Option<Position> {
        self.cells[row]
            .iter()
            .position(|cell| !cell.clicked)
            .map(|col| Position::new(row, col))
    }

    pub fn available_positions(&self) -> Vec<Position> {
        (0..ROWS).filter_map(|row| self.frontier(row)).collect()
    }

    pub fn remaining_in_row(&self, row: usize) -> usize {
        self.cells[row].iter().filter(|cell| !cell.clicked).count()
    }

    pub fn clicked_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.clicked)
            .count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|cell| cell.clicked)
    }

    pub fn unclicked_probabilities(&self, row: usize) -> impl Iterator<Item = f64> + '_ {
        self.cells[row]
            .iter()
            .filter(|cell| !cell.clicked)
            .map(|cell| cell.probability)
    }

    /// Mean probability of the unclicked cells in `row`, `None` when the row is full.
    pub fn row_mean_probability(&self, row: usize) -> Option<f64> {
        mean(self.unclicked_probabilities(row))
    }

    /// Mean probability over every unclicked cell on the board.
    pub fn board_mean_probability(&self) -> Option<f64> {
        mean((0..ROWS).flat_map(|row| self.unclicked_probabilities(row)))
    }

    pub fn clicked_matrix(&self) -> [[bool; COLS]; ROWS] {
        self.cells.map(|row| row.map(|cell| cell.clicked))
    }

    pub fn probability_matrix(&self) -> [[f64; COLS]; ROWS] {
        self.cells.map(|row| row.map(|cell| cell.probability))
    }

    pub fn outcome_matrix(&self) -> [[Option<bool>; COLS]; ROWS] {
        self.cells.map(|row| row.map(|cell| cell.outcome))
    }

    /// Returns true when every row's clicked cells form a contiguous left prefix.
    pub fn is_prefix_ordered(&self) -> bool {
        self.cells.iter().all(|row| {
            let revealed = row.iter().take_while(|cell| cell.clicked).count();
            row[revealed..].iter().all(|cell| !cell.clicked)
        })
    }

    pub(crate) fn reveal(&mut self, pos: Position, success: bool) {
        let cell = &mut self.cells[pos.row][pos.col];
        cell.clicked = true;
        cell.outcome = Some(success);
    }

    /// Shifts every unclicked probability on the board in one pass. Each cell is
    /// clamped independently, so iteration order cannot change the result.
    pub(crate) fn drift(&mut self, success: bool) {
        for cell in self.cells.iter_mut().flatten().filter(|c| !c.clicked) {
            cell.probability = if success {
                (cell.probability - DRIFT_STEP).max(PROBABILITY_FLOOR)
            } else {
                (cell.probability + DRIFT_STEP).min(PROBABILITY_CEILING)
            };
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), p| (sum + p, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::{Board, INITIAL_PROBABILITY, PROBABILITY_CEILING, PROBABILITY_FLOOR};
    use crate::model::position::Position;

    #[test]
    fn fresh_board_offers_first_column() {
        let board = Board::new();
        assert_eq!(
            board.available_positions(),
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(2, 0)
            ]
        );
        assert_eq!(board.clicked_count(), 0);
        assert_eq!(board.board_mean_probability(), Some(INITIAL_PROBABILITY));
    }

    #[test]
    fn reveal_moves_frontier_right() {
        let mut board = Board::new();
        board.reveal(Position::new(1, 0), true);
        assert_eq!(board.frontier(1), Some(Position::new(1, 1)));
        assert_eq!(board.remaining_in_row(1), 9);
        assert_eq!(board.cell(Position::new(1, 0)).outcome, Some(true));
        assert!(board.is_prefix_ordered());
    }

    #[test]
    fn drift_skips_revealed_cells_and_clamps() {
        let mut board = Board::new();
        board.reveal(Position::new(0, 0), true);
        for _ in 0..8 {
            board.drift(true);
        }
        assert_eq!(
            board.cell(Position::new(0, 0)).probability,
            INITIAL_PROBABILITY
        );
        assert_eq!(board.cell(Position::new(2, 9)).probability, PROBABILITY_FLOOR);

        board.drift(false);
        board.drift(false);
        board.drift(false);
        board.drift(false);
        board.drift(false);
        board.drift(false);
        assert_eq!(
            board.cell(Position::new(2, 9)).probability,
            PROBABILITY_CEILING
        );
    }

    #[test]
    fn full_row_has_no_frontier_or_mean() {
        let mut board = Board::new();
        for col in 0..10 {
            board.reveal(Position::new(2, col), false);
        }
        assert_eq!(board.frontier(2), None);
        assert_eq!(board.row_mean_probability(2), None);
        assert_eq!(board.available_positions().len(), 2);
    }

    #[test]
    fn gap_breaks_prefix_order() {
        let mut board = Board::new();
        board.reveal(Position::new(0, 2), true);
        assert!(!board.is_prefix_ordered());
    }
}
