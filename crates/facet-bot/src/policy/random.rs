use super::Policy;
use facet_core::model::position::Position;
use facet_core::model::state::GameState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform choice among the available cells; the baseline every other strategy is
/// measured against.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn suggest(&mut self, state: &GameState) -> Option<Position> {
        let available = state.available_positions();
        if available.is_empty() {
            return None;
        }
        Some(available[self.rng.gen_range(0..available.len())])
    }
}
