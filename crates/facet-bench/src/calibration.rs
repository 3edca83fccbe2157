//! Compares the analytic advisor with Monte Carlo rollouts on the opening board.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use facet_bot::advisor::evaluate_click_expected_value;
use facet_bot::simulator::monte_carlo_parallel;
use facet_core::game::GameError;
use facet_core::model::position::Position;
use facet_core::model::state::GameState;
use facet_core::model::victory::CONDITION_COUNT;
use serde::Serialize;

use crate::analytics::AnalyticsError;

#[derive(Debug, Clone, Serialize)]
pub struct CalibrationRow {
    pub position: Position,
    pub advisor_expected_values: [f64; CONDITION_COUNT],
    pub advisor_max: f64,
    pub simulated_condition_rates: [f64; CONDITION_COUNT],
    pub simulated_total: f64,
}

impl CalibrationRow {
    /// Mean absolute gap between advisor and rollout, per band.
    pub fn mean_abs_error(&self) -> f64 {
        self.advisor_expected_values
            .iter()
            .zip(self.simulated_condition_rates)
            .map(|(advisor, simulated)| (advisor - simulated).abs())
            .sum::<f64>()
            / CONDITION_COUNT as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub trials: usize,
    pub seed: u64,
    pub rows: Vec<CalibrationRow>,
}

/// Evaluates every legal opening click with both estimators.
pub fn run_calibration(trials: usize, seed: u64) -> Result<CalibrationReport, GameError> {
    let state = GameState::new();
    let rows = state
        .available_positions()
        .into_iter()
        .map(|pos| {
            let eval = evaluate_click_expected_value(&state, pos.row, pos.col)?;
            let simulated = monte_carlo_parallel(&state, pos.row, pos.col, trials, seed)?;
            Ok(CalibrationRow {
                position: pos,
                advisor_expected_values: eval.expected_values,
                advisor_max: eval.max_expected_value,
                simulated_condition_rates: simulated.condition_win_rates,
                simulated_total: simulated.total_win_rate,
            })
        })
        .collect::<Result<Vec<_>, GameError>>()?;

    Ok(CalibrationReport { trials, seed, rows })
}

impl CalibrationReport {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("\n## Advisor calibration\n\n");
        out.push_str(&format!(
            "Opening board, {} rollouts per click (seed {}). Rollouts continue with uniformly random moves.\n\n",
            self.trials, self.seed
        ));
        out.push_str("| Click | Advisor max EV | Rollout win % | Band 1 EV / sim | Band 2 EV / sim | Band 3 EV / sim | Band 4 EV / sim | Mean abs error |\n");
        out.push_str("|-------|----------------|---------------|-----------------|-----------------|-----------------|-----------------|----------------|\n");
        for row in &self.rows {
            let bands: Vec<String> = row
                .advisor_expected_values
                .iter()
                .zip(row.simulated_condition_rates)
                .map(|(advisor, simulated)| format!("{advisor:.4} / {simulated:.4}"))
                .collect();
            out.push_str(&format!(
                "| {} | {:.4} | {:.2}% | {} | {:.4} |\n",
                row.position,
                row.advisor_max,
                row.simulated_total * 100.0,
                bands.join(" | "),
                row.mean_abs_error()
            ));
        }
        out
    }

    pub fn append_to_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let io_err = |source| AnalyticsError::Io {
            context: "appending calibration to summary",
            source,
        };
        let mut file = OpenOptions::new()
            .append(true)
            .open(path.as_ref())
            .map_err(io_err)?;
        file.write_all(self.to_markdown().as_bytes())
            .map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_opening_click() {
        let report = run_calibration(50, 3).expect("opening clicks are legal");
        let positions: Vec<Position> = report.rows.iter().map(|row| row.position).collect();
        assert_eq!(
            positions,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]
        );
        for row in &report.rows {
            assert!((0.0..=1.0).contains(&row.advisor_max));
            assert!((0.0..=1.0).contains(&row.simulated_total));
            assert!(row.mean_abs_error() <= 1.0);
        }
    }

    #[test]
    fn markdown_lists_each_row() {
        let report = run_calibration(10, 1).expect("legal");
        let markdown = report.to_markdown();
        assert!(markdown.contains("## Advisor calibration"));
        assert!(markdown.contains("| (0, 0) |"));
        assert!(markdown.contains("| (2, 0) |"));
    }

    #[test]
    fn same_seed_same_report() {
        let first = run_calibration(40, 9).expect("legal");
        let second = run_calibration(40, 9).expect("legal");
        assert_eq!(first.to_markdown(), second.to_markdown());
    }
}
