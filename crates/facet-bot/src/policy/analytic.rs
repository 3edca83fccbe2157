use super::{Policy, log_decision};
use crate::advisor::evaluate_click_expected_value;
use facet_core::model::position::Position;
use facet_core::model::state::GameState;

/// Picks the frontier cell whose one-ply lookahead gives the best victory probability
/// over any band. Earlier positions win ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticPolicy;

impl AnalyticPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for AnalyticPolicy {
    fn name(&self) -> &str {
        "analytic"
    }

    fn suggest(&mut self, state: &GameState) -> Option<Position> {
        let mut best: Option<(Position, f64)> = None;
        for pos in state.available_positions() {
            let Ok(eval) = evaluate_click_expected_value(state, pos.row, pos.col) else {
                continue;
            };
            if best.is_none_or(|(_, value)| eval.max_expected_value > value) {
                best = Some((pos, eval.max_expected_value));
            }
        }
        let (position, value) = best?;
        log_decision(self.name(), state, position, value);
        Some(position)
    }
}
