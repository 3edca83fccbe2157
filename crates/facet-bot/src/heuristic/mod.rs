mod params;

pub use params::HeuristicParams;

use core::fmt;
use facet_core::model::position::{COLS, Position};
use facet_core::model::state::{GameState, PENALTY_ROW};
use tracing::{Level, event};

/// Game stage inferred from how far drift has pulled the board's probabilities down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Early,
    Middle,
    Late,
}

impl Phase {
    pub fn from_average(avg_probability: f64, params: &HeuristicParams) -> Self {
        if avg_probability >= params.early_threshold {
            Phase::Early
        } else if avg_probability >= params.middle_threshold {
            Phase::Middle
        } else {
            Phase::Late
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Early => "early",
            Phase::Middle => "middle",
            Phase::Late => "late",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationDetails {
    pub best_score: f64,
    pub current_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub position: Position,
    /// `p` for the scoring rows, `1 - p` for the penalty row.
    pub expected_value: f64,
    pub phase: Phase,
    pub avg_probability: f64,
    pub details: RecommendationDetails,
}

/// Phase-based rule-of-thumb recommendation. Returns `None` once the board is full.
///
/// Positions are scored in the order [`GameState::available_positions`] yields them and
/// only a strictly greater score replaces the current pick.
pub fn recommend_next_click(state: &GameState, params: &HeuristicParams) -> Option<Recommendation> {
    let available = state.available_positions();
    let avg_probability = state.board().board_mean_probability()?;
    let phase = Phase::from_average(avg_probability, params);

    let mut best: Option<(Position, f64)> = None;
    for pos in available {
        let score = score_position(state, pos, phase, params);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
        }
    }
    let (position, best_score) = best?;

    let p = state.probability(position);
    let expected_value = if position.row == PENALTY_ROW { 1.0 - p } else { p };
    let recommendation = Recommendation {
        position,
        expected_value,
        phase,
        avg_probability,
        details: RecommendationDetails {
            best_score,
            current_probability: p,
        },
    };

    if tracing::enabled!(Level::DEBUG) {
        event!(
            target: "facet_bot::heuristic",
            Level::DEBUG,
            phase = phase.as_str(),
            row = position.row as u32,
            col = position.col as u32,
            avg_probability,
            best_score,
            expected_value
        );
    }

    Some(recommendation)
}

fn score_position(state: &GameState, pos: Position, phase: Phase, params: &HeuristicParams) -> f64 {
    let p = state.probability(pos);
    let successes = i32::from(state.success_counts()[pos.row]);
    let penalty_quota = i32::from(params.penalty_row_quota);
    let is_penalty_row = pos.row == PENALTY_ROW;

    match phase {
        Phase::Early if is_penalty_row => params.early_penalty_row_score,
        Phase::Early => {
            let missing = COLS as i32 - successes;
            p * params.early_probability_weight + f64::from(missing) * params.early_missing_weight
        }
        Phase::Middle if is_penalty_row => {
            if p < params.middle_penalty_row_ceiling && successes < penalty_quota {
                (1.0 - p) * params.middle_penalty_row_weight
            } else {
                params.middle_penalty_row_score
            }
        }
        Phase::Middle => {
            let needed = i32::from(params.middle_target) - successes;
            if needed > 0 {
                p * params.middle_probability_weight
                    + f64::from(needed) * params.middle_needed_weight
            } else {
                p * params.middle_satisfied_weight
            }
        }
        Phase::Late if is_penalty_row => {
            if successes < penalty_quota {
                (1.0 - p) * params.late_penalty_row_weight
                    + f64::from(penalty_quota - successes) * params.late_quota_weight
            } else {
                params.late_penalty_row_score
            }
        }
        Phase::Late => {
            let needed = i32::from(params.late_target) - successes;
            if needed > 0 {
                p * params.late_probability_weight + f64::from(needed) * params.late_needed_weight
            } else {
                params.late_satisfied_score
            }
        }
    }
}
