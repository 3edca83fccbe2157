mod analytic;
mod greedy;
mod heuristic;
mod random;

pub use analytic::AnalyticPolicy;
pub use greedy::GreedyScorePolicy;
pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;

use facet_core::model::position::Position;
use facet_core::model::state::GameState;
use tracing::{Level, event};

/// Unified move-suggestion interface. Each strategy stays a separate implementation so
/// callers pick one explicitly.
pub trait Policy: Send {
    /// Short stable identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Suggest the next cell to reveal, or `None` when the board is full.
    fn suggest(&mut self, state: &GameState) -> Option<Position>;
}

pub(crate) fn log_decision(policy: &str, state: &GameState, position: Position, score: f64) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    let counts = state.success_counts();
    event!(
        target: "facet_bot::decision",
        Level::INFO,
        policy,
        row = position.row as u32,
        col = position.col as u32,
        score,
        successes = %format!("{}/{}/{}", counts[0], counts[1], counts[2]),
        clicked = state.board().clicked_count() as u32
    );
}
