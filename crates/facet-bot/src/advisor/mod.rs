//! Analytic win-probability estimates and one-ply expected values.
//!
//! Each row is modelled as a homogeneous binomial over its remaining clicks, using the
//! mean of the row's unclicked probabilities, and rows are multiplied together as if
//! independent. Both are approximations: drift couples every row after each click, so
//! the product is not the true joint probability. Downstream consumers rely on these
//! numbers as they are.

mod binomial;

pub use binomial::{binomial_at_most, binomial_coefficient, binomial_range};

use facet_core::game::GameError;
use facet_core::model::board::Board;
use facet_core::model::position::{Position, ROWS};
use facet_core::model::state::GameState;
use facet_core::model::victory::{CONDITION_COUNT, RowRange, VICTORY_BANDS};

/// Probability that the given victory band holds once the board is full.
///
/// Panics if `condition_index` is not below [`CONDITION_COUNT`].
pub fn calculate_victory_probability(state: &GameState, condition_index: usize) -> f64 {
    let band = &VICTORY_BANDS[condition_index];
    let counts = state.success_counts();
    (0..ROWS)
        .map(|row| row_probability(state.board(), row, counts[row], band.rows[row]))
        .product()
}

fn row_probability(board: &Board, row: usize, current: u8, target: RowRange) -> f64 {
    let current = usize::from(current);
    let (min, max) = (usize::from(target.min), usize::from(target.max));
    if current > max {
        return 0.0;
    }

    let remaining = board.remaining_in_row(row);
    let Some(p) = board.row_mean_probability(row) else {
        return if current >= min { 1.0 } else { 0.0 };
    };

    if current >= min {
        return binomial_at_most(remaining, p, max - current);
    }

    let need_min = min - current;
    if need_min > remaining {
        return 0.0;
    }
    binomial_range(remaining, p, need_min, max - current)
}

/// Victory probabilities for all four bands.
pub fn victory_probabilities(state: &GameState) -> [f64; CONDITION_COUNT] {
    std::array::from_fn(|idx| calculate_victory_probability(state, idx))
}

/// Index of the band most likely to be reached from `state` (first wins on ties).
pub fn select_optimal_condition(state: &GameState) -> usize {
    argmax(&victory_probabilities(state)).0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvaluation {
    pub position: Position,
    pub expected_values: [f64; CONDITION_COUNT],
    pub success_probabilities: [f64; CONDITION_COUNT],
    pub failure_probabilities: [f64; CONDITION_COUNT],
    pub best_condition: usize,
    pub max_expected_value: f64,
}

/// One-ply lookahead: victory probabilities after a success and after a failure at
/// `(row, col)`, weighted by the cell's current probability.
pub fn evaluate_click_expected_value(
    state: &GameState,
    row: usize,
    col: usize,
) -> Result<ClickEvaluation, GameError> {
    let position = Position::new(row, col);
    let p = state.probability(position);
    let mut on_success = *state;
    on_success.apply_outcome(position, true)?;
    let mut on_failure = *state;
    on_failure.apply_outcome(position, false)?;

    let success_probabilities = victory_probabilities(&on_success);
    let failure_probabilities = victory_probabilities(&on_failure);
    let expected_values = std::array::from_fn(|idx| {
        p * success_probabilities[idx] + (1.0 - p) * failure_probabilities[idx]
    });
    let (best_condition, max_expected_value) = argmax(&expected_values);

    Ok(ClickEvaluation {
        position,
        expected_values,
        success_probabilities,
        failure_probabilities,
        best_condition,
        max_expected_value,
    })
}

fn argmax(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (idx, value)| {
            if value > best.1 { (idx, value) } else { best }
        })
}

#[cfg(test)]
mod tests {
    use super::{
        binomial_at_most, binomial_range, calculate_victory_probability,
        evaluate_click_expected_value, select_optimal_condition, victory_probabilities,
    };
    use facet_core::game::GameError;
    use facet_core::model::position::Position;
    use facet_core::model::state::GameState;

    fn fill_row(state: &mut GameState, row: usize, successes: usize) {
        for col in 0..10 {
            state.apply_outcome(Position::new(row, col), col < successes).expect("unclicked");
        }
    }

    #[test]
    fn fresh_board_first_band_matches_closed_form() {
        let state = GameState::new();
        let p = 0.75;
        let expected = binomial_range(10, p, 10, 10)
            * binomial_range(10, p, 6, 10)
            * binomial_at_most(10, p, 4);
        let actual = calculate_victory_probability(&state, 0);
        assert!((actual - expected).abs() < 1e-15);
    }

    #[test]
    fn probability_is_pure() {
        let mut state = GameState::new();
        state.apply_outcome(Position::new(0, 0), true).expect("unclicked");
        state.apply_outcome(Position::new(2, 0), false).expect("unclicked");
        let copy = state;
        let first = calculate_victory_probability(&state, 2);
        let second = calculate_victory_probability(&state, 2);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(state, copy);
    }

    #[test]
    fn overshooting_penalty_row_zeroes_every_band() {
        let mut state = GameState::new();
        for col in 0..5 {
            state.apply_outcome(Position::new(2, col), true).expect("unclicked");
        }
        assert_eq!(victory_probabilities(&state), [0.0; 4]);
    }

    #[test]
    fn unreachable_minimum_is_zero() {
        let mut state = GameState::new();
        state.apply_outcome(Position::new(0, 0), false).expect("unclicked");
        // Row 0 can reach at most 9 successes, so the first band is gone.
        assert_eq!(calculate_victory_probability(&state, 0), 0.0);
        assert!(calculate_victory_probability(&state, 1) > 0.0);
    }

    #[test]
    fn finished_board_is_certain_or_impossible() {
        let mut won = GameState::new();
        fill_row(&mut won, 0, 10);
        fill_row(&mut won, 1, 6);
        fill_row(&mut won, 2, 4);
        assert_eq!(victory_probabilities(&won), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(select_optimal_condition(&won), 0);

        let mut lost = GameState::new();
        fill_row(&mut lost, 0, 5);
        fill_row(&mut lost, 1, 5);
        fill_row(&mut lost, 2, 5);
        assert_eq!(victory_probabilities(&lost), [0.0; 4]);
        assert_eq!(select_optimal_condition(&lost), 0);
    }

    #[test]
    fn expected_value_blends_both_branches() {
        let state = GameState::new();
        let eval = evaluate_click_expected_value(&state, 1, 0).expect("unclicked");
        for idx in 0..4 {
            let blended = 0.75 * eval.success_probabilities[idx]
                + 0.25 * eval.failure_probabilities[idx];
            assert!((eval.expected_values[idx] - blended).abs() < 1e-15);
        }
        assert_eq!(
            eval.max_expected_value,
            eval.expected_values[eval.best_condition]
        );
        assert!(
            eval.expected_values
                .iter()
                .all(|value| *value <= eval.max_expected_value)
        );
        // Branches are evaluated on copies.
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn failure_branch_on_row_zero_kills_first_band() {
        let state = GameState::new();
        let eval = evaluate_click_expected_value(&state, 0, 0).expect("unclicked");
        assert_eq!(eval.failure_probabilities[0], 0.0);
        assert!(eval.success_probabilities[0] > 0.0);
    }

    #[test]
    fn clicked_cell_cannot_be_evaluated() {
        let mut state = GameState::new();
        state.apply_outcome(Position::new(1, 0), true).expect("unclicked");
        assert_eq!(
            evaluate_click_expected_value(&state, 1, 0),
            Err(GameError::AlreadyClicked(Position::new(1, 0)))
        );
    }
}
