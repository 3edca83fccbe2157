use crate::game::GameError;
use crate::model::board::Board;
use crate::model::position::{Position, ROWS};
use crate::model::victory::{Achievements, check_goals_achieved};

/// Row whose successes cost points instead of earning them.
pub const PENALTY_ROW: usize = 2;

/// Complete game state without history. It is `Copy`, so hypothetical branches
/// (advisor lookahead, simulator rollouts) are plain value copies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    board: Board,
    success_counts: [u8; ROWS],
    score: i32,
    game_over: bool,
}

impl GameState {
    pub const fn new() -> Self {
        Self {
            board: Board::new(),
            success_counts: [0; ROWS],
            score: 0,
            game_over: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn success_counts(&self) -> [u8; ROWS] {
        self.success_counts
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn available_positions(&self) -> Vec<Position> {
        self.board.available_positions()
    }

    pub fn probability(&self, pos: Position) -> f64 {
        self.board.cell(pos).probability
    }

    pub fn is_clicked(&self, pos: Position) -> bool {
        self.board.cell(pos).clicked
    }

    pub fn achievements(&self) -> Achievements {
        check_goals_achieved(self.success_counts)
    }

    /// Applies a known outcome at an unrevealed `pos`, for hypothetical branches.
    ///
    /// The reveal order is not checked, so what-if queries may look past a row's
    /// frontier. A cell that is already revealed is rejected.
    pub fn apply_outcome(&mut self, pos: Position, success: bool) -> Result<(), GameError> {
        if self.is_clicked(pos) {
            return Err(GameError::AlreadyClicked(pos));
        }
        self.apply_unchecked(pos, success);
        Ok(())
    }

    /// Reveal the cell, update counters and score, drift every unclicked cell, then
    /// recompute the terminal flag. Callers validate legality beforehand.
    pub(crate) fn apply_unchecked(&mut self, pos: Position, success: bool) {
        self.board.reveal(pos, success);
        if success {
            self.success_counts[pos.row] += 1;
        }
        self.score += score_delta(pos.row, success);
        self.board.drift(success);
        self.game_over = self.board.is_full();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows 0 and 1 reward successes; the penalty row rewards failures.
pub const fn score_delta(row: usize, success: bool) -> i32 {
    match (row == PENALTY_ROW, success) {
        (false, true) | (true, false) => 1,
        (false, false) | (true, true) => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::{GameState, score_delta};
    use crate::game::GameError;
    use crate::model::position::Position;

    #[test]
    fn score_delta_inverts_penalty_row() {
        assert_eq!(score_delta(0, true), 1);
        assert_eq!(score_delta(1, false), -1);
        assert_eq!(score_delta(2, true), -1);
        assert_eq!(score_delta(2, false), 1);
    }

    #[test]
    fn apply_outcome_updates_counters_and_drift() {
        let mut state = GameState::new();
        state.apply_outcome(Position::new(2, 0), false).expect("unclicked");
        assert_eq!(state.success_counts(), [0, 0, 0]);
        assert_eq!(state.score(), 1);
        assert_eq!(state.probability(Position::new(0, 0)), 0.75);

        state.apply_outcome(Position::new(0, 0), true).expect("unclicked");
        assert_eq!(state.success_counts(), [1, 0, 0]);
        assert_eq!(state.score(), 2);
        assert!((state.probability(Position::new(1, 0)) - 0.65).abs() < 1e-12);
        assert_eq!(state.probability(Position::new(0, 0)), 0.75);
    }

    #[test]
    fn copies_do_not_alias() {
        let live = GameState::new();
        let mut branch = live;
        branch.apply_outcome(Position::new(0, 0), true).expect("unclicked");
        assert_eq!(live, GameState::new());
        assert_ne!(live, branch);
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        let mut state = GameState::new();
        for pos in Position::all() {
            assert!(!state.is_game_over());
            state.apply_outcome(pos, pos.col % 2 == 0).expect("unclicked");
        }
        assert!(state.is_game_over());
        assert_eq!(state.success_counts(), [5, 5, 5]);
    }

    #[test]
    fn revealed_cell_cannot_be_applied_twice() {
        let mut state = GameState::new();
        state
            .apply_outcome(Position::new(0, 0), true)
            .expect("unclicked");
        let before = state;

        assert_eq!(
            state.apply_outcome(Position::new(0, 0), true),
            Err(GameError::AlreadyClicked(Position::new(0, 0)))
        );
        assert_eq!(state, before);
        assert_eq!(state.success_counts(), [1, 0, 0]);
        assert_eq!(state.score(), 1);
    }
}
