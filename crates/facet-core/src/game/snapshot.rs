use crate::model::position::{COLS, Position, ROWS};
use crate::model::state::GameState;
use crate::model::victory::{VICTORY_BANDS, VictoryBand};
use serde::{Deserialize, Serialize};

/// Read-only projection of the live game handed to drivers, data pipelines and UIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub clicked: [[bool; COLS]; ROWS],
    pub probabilities: [[f64; COLS]; ROWS],
    pub outcomes: [[Option<bool>; COLS]; ROWS],
    pub success_counts: [u8; ROWS],
    pub victory_bands: Vec<VictoryBand>,
    pub score: i32,
    pub available_positions: Vec<Position>,
    pub game_over: bool,
    pub can_undo: bool,
}

impl GameSnapshot {
    pub fn capture(state: &GameState, can_undo: bool) -> Self {
        let board = state.board();
        GameSnapshot {
            clicked: board.clicked_matrix(),
            probabilities: board.probability_matrix(),
            outcomes: board.outcome_matrix(),
            success_counts: state.success_counts(),
            victory_bands: VICTORY_BANDS.to_vec(),
            score: state.score(),
            available_positions: state.available_positions(),
            game_over: state.is_game_over(),
            can_undo,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::GameSnapshot;
    use crate::game::engine::GameEngine;
    use crate::model::position::Position;

    #[test]
    fn fresh_snapshot_matches_initial_rules() {
        let engine = GameEngine::with_seed(12);
        let snapshot = engine.get_state();
        assert!(snapshot.clicked.iter().flatten().all(|c| !c));
        assert!(snapshot.probabilities.iter().flatten().all(|p| *p == 0.75));
        assert_eq!(snapshot.available_positions.len(), 3);
        assert_eq!(snapshot.victory_bands.len(), 4);
        assert!(!snapshot.can_undo);
        assert!(!snapshot.game_over);
    }

    #[test]
    fn repeated_capture_is_identical() {
        let mut engine = GameEngine::with_seed(12);
        engine.click_position(1, 0).expect("click");
        assert_eq!(engine.get_state(), engine.get_state());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut engine = GameEngine::with_seed(4);
        engine.click_position(0, 0).expect("click");
        let json = engine.get_state().to_json().expect("serialize");
        assert!(json.contains("\"success_counts\""));
        assert!(json.contains("\"can_undo\": true"));

        let decoded = GameSnapshot::from_json(&json).expect("deserialize");
        assert_eq!(decoded.available_positions[0], Position::new(0, 1));
        assert_eq!(decoded, engine.get_state());
    }
}
