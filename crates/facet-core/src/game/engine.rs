use crate::game::error::GameError;
use crate::game::snapshot::GameSnapshot;
use crate::model::history::History;
use crate::model::position::{Position, ROWS};
use crate::model::state::GameState;
use crate::model::victory::Achievements;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Result of a successful click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickOutcome {
    pub position: Position,
    pub success: bool,
    pub score: i32,
    pub new_probability: f64,
    pub success_counts: [u8; ROWS],
    pub game_over: bool,
}

/// Checks the reveal rules for `pos` against `state`.
pub fn validate_click(state: &GameState, pos: Position) -> Result<(), GameError> {
    if state.is_clicked(pos) {
        return Err(GameError::AlreadyClicked(pos));
    }
    match state.board().frontier(pos.row) {
        Some(expected) if expected != pos => Err(GameError::OutOfOrder {
            position: pos,
            expected,
        }),
        _ => Ok(()),
    }
}

/// Validates, draws a Bernoulli outcome from the cell's current probability and
/// applies it. Does not touch any undo history.
pub fn play_click<R: Rng + ?Sized>(
    state: &mut GameState,
    pos: Position,
    rng: &mut R,
) -> Result<ClickOutcome, GameError> {
    validate_click(state, pos)?;
    let success = rng.gen_bool(state.probability(pos));
    state.apply_unchecked(pos, success);
    Ok(ClickOutcome {
        position: pos,
        success,
        score: state.score(),
        new_probability: state.probability(pos),
        success_counts: state.success_counts(),
        game_over: state.is_game_over(),
    })
}

/// Owns the live game: state, bounded undo history and the outcome RNG.
///
/// One engine is meant for a single owner; parallel exploration copies
/// [`GameState`] values instead of sharing the engine.
#[derive(Debug, Clone)]
pub struct GameEngine {
    state: GameState,
    history: History<GameState>,
    rng: StdRng,
    seed: u64,
}

impl GameEngine {
    pub fn new() -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_state(GameState::new(), seed)
    }

    /// Starts an engine from an existing position with an empty history.
    pub fn from_state(state: GameState, seed: u64) -> Self {
        Self {
            state,
            history: History::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Fresh board and cleared history. The RNG keeps its stream position.
    pub fn reset(&mut self) {
        self.state = GameState::new();
        self.history.clear();
    }

    pub fn available_positions(&self) -> Vec<Position> {
        self.state.available_positions()
    }

    pub fn click_position(&mut self, row: usize, col: usize) -> Result<ClickOutcome, GameError> {
        let pos = Position::new(row, col);
        validate_click(&self.state, pos)?;
        self.history.push(self.state);
        play_click(&mut self.state, pos, &mut self.rng)
    }

    /// Same as [`GameEngine::click_position`] with a caller-supplied random source.
    pub fn click_with_rng<R: Rng + ?Sized>(
        &mut self,
        pos: Position,
        rng: &mut R,
    ) -> Result<ClickOutcome, GameError> {
        validate_click(&self.state, pos)?;
        self.history.push(self.state);
        play_click(&mut self.state, pos, rng)
    }

    pub fn undo_last_move(&mut self) -> Result<(), GameError> {
        let previous = self.history.pop().ok_or(GameError::EmptyHistory)?;
        self.state = previous;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn check_goals_achieved(&self) -> Achievements {
        self.state.achievements()
    }

    pub fn get_state(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.state, self.can_undo())
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::GameEngine;
    use crate::game::error::GameError;
    use crate::model::position::Position;
    use rand::rngs::mock::StepRng;

    fn always_succeed() -> StepRng {
        StepRng::new(0, 0)
    }

    fn always_fail() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn first_success_drifts_whole_board() {
        let mut engine = GameEngine::with_seed(1);
        let outcome = engine
            .click_with_rng(Position::new(0, 0), &mut always_succeed())
            .expect("legal click");

        assert!(outcome.success);
        assert_eq!(outcome.success_counts, [1, 0, 0]);
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.new_probability, 0.75);
        assert!(!outcome.game_over);

        for pos in Position::all().filter(|pos| *pos != Position::new(0, 0)) {
            let p = engine.state().probability(pos);
            assert!((p - 0.65).abs() < 1e-12, "{pos} drifted to {p}");
        }
    }

    #[test]
    fn failure_on_penalty_row_scores_positive() {
        let mut engine = GameEngine::with_seed(1);
        let outcome = engine
            .click_with_rng(Position::new(2, 0), &mut always_fail())
            .expect("legal click");
        assert!(!outcome.success);
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.success_counts, [0, 0, 0]);
        assert_eq!(engine.state().probability(Position::new(0, 0)), 0.75);
    }

    #[test]
    fn skipping_ahead_is_out_of_order() {
        let mut engine = GameEngine::with_seed(3);
        let err = engine.click_position(0, 2).expect_err("must reveal left to right");
        assert_eq!(
            err,
            GameError::OutOfOrder {
                position: Position::new(0, 2),
                expected: Position::new(0, 0),
            }
        );
        assert!(!engine.can_undo());
    }

    #[test]
    fn double_click_is_rejected_without_history() {
        let mut engine = GameEngine::with_seed(3);
        engine.click_position(1, 0).expect("first click");
        assert_eq!(engine.history_len(), 1);
        assert_eq!(
            engine.click_position(1, 0),
            Err(GameError::AlreadyClicked(Position::new(1, 0)))
        );
        assert_eq!(engine.history_len(), 1);
    }

    #[test]
    fn undo_restores_exact_state() {
        let mut engine = GameEngine::with_seed(9);
        engine.click_position(0, 0).expect("click");
        let before = *engine.state();
        engine.click_position(2, 0).expect("click");
        engine.undo_last_move().expect("undo");
        assert_eq!(*engine.state(), before);
    }

    #[test]
    fn undo_on_fresh_engine_is_empty_history() {
        let mut engine = GameEngine::with_seed(0);
        assert_eq!(engine.undo_last_move(), Err(GameError::EmptyHistory));
    }

    #[test]
    fn same_seed_plays_same_outcomes() {
        let mut a = GameEngine::with_seed(77);
        let mut b = GameEngine::with_seed(77);
        for pos in Position::all() {
            let left = a.click_position(pos.row, pos.col).expect("legal");
            let right = b.click_position(pos.row, pos.col).expect("legal");
            assert_eq!(left, right);
        }
        assert!(a.is_game_over());
        assert_eq!(a.seed(), 77);
    }

    #[test]
    fn reset_clears_board_and_history() {
        let mut engine = GameEngine::with_seed(5);
        engine.click_position(0, 0).expect("click");
        engine.reset();
        assert!(!engine.can_undo());
        assert_eq!(engine.state().board().clicked_count(), 0);
    }
}
