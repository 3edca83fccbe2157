use super::{Policy, log_decision};
use facet_core::model::position::Position;
use facet_core::model::state::{GameState, PENALTY_ROW};

/// Maximises the immediate expected score change of a single click:
/// `2p - 1` on scoring rows, `1 - 2p` on the penalty row.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyScorePolicy;

impl GreedyScorePolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn expected_score(state: &GameState, pos: Position) -> f64 {
        let p = state.probability(pos);
        if pos.row == PENALTY_ROW {
            1.0 - 2.0 * p
        } else {
            2.0 * p - 1.0
        }
    }
}

impl Policy for GreedyScorePolicy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn suggest(&mut self, state: &GameState) -> Option<Position> {
        let mut best: Option<(Position, f64)> = None;
        for pos in state.available_positions() {
            let value = Self::expected_score(state, pos);
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((pos, value));
            }
        }
        let (position, value) = best?;
        log_decision(self.name(), state, position, value);
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::GreedyScorePolicy;
    use crate::policy::Policy;
    use facet_core::model::position::Position;
    use facet_core::model::state::GameState;

    #[test]
    fn high_probability_favours_scoring_rows() {
        let state = GameState::new();
        assert_eq!(
            GreedyScorePolicy::new().suggest(&state),
            Some(Position::new(0, 0))
        );
        assert!((GreedyScorePolicy::expected_score(&state, Position::new(2, 0)) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn low_probability_favours_penalty_row() {
        let mut state = GameState::new();
        for col in 0..5 {
            state.apply_outcome(Position::new(0, col), true).expect("unclicked");
        }
        // Every unclicked cell now sits at the floor.
        assert_eq!(
            GreedyScorePolicy::new().suggest(&state),
            Some(Position::new(2, 0))
        );
    }
}
