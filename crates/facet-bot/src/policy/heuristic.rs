use super::{Policy, log_decision};
use crate::heuristic::{HeuristicParams, recommend_next_click};
use facet_core::model::position::Position;
use facet_core::model::state::GameState;

/// Adapter exposing the phase-based recommender through [`Policy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy {
    params: HeuristicParams,
}

impl HeuristicPolicy {
    pub fn new(params: HeuristicParams) -> Self {
        Self { params }
    }

    pub fn from_env() -> Self {
        Self::new(HeuristicParams::from_env())
    }

    pub fn params(&self) -> &HeuristicParams {
        &self.params
    }
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn suggest(&mut self, state: &GameState) -> Option<Position> {
        let recommendation = recommend_next_click(state, &self.params)?;
        log_decision(
            self.name(),
            state,
            recommendation.position,
            recommendation.details.best_score,
        );
        Some(recommendation.position)
    }
}
