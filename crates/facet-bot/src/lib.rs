pub mod advisor;
pub mod autoplay;
pub mod heuristic;
pub mod policy;
pub mod simulator;

pub use advisor::{
    ClickEvaluation, calculate_victory_probability, evaluate_click_expected_value,
    select_optimal_condition,
};
pub use autoplay::{AutoPlayMove, auto_play, play_out};
pub use heuristic::{HeuristicParams, Phase, Recommendation, recommend_next_click};
pub use policy::{AnalyticPolicy, GreedyScorePolicy, HeuristicPolicy, Policy, RandomPolicy};
pub use simulator::{SimulationReport, monte_carlo_parallel, monte_carlo_simulation};
