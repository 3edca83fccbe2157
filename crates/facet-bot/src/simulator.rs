//! Monte Carlo rollouts used to check the analytic advisor against actual play.

use facet_core::game::{GameError, play_click, validate_click};
use facet_core::model::position::Position;
use facet_core::model::state::GameState;
use facet_core::model::victory::CONDITION_COUNT;
use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationReport {
    pub total_win_rate: f64,
    pub condition_win_rates: [f64; CONDITION_COUNT],
    pub trials: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct WinTally {
    wins: usize,
    condition_wins: [usize; CONDITION_COUNT],
}

impl WinTally {
    fn merge(mut self, other: WinTally) -> WinTally {
        self.wins += other.wins;
        for (acc, add) in self.condition_wins.iter_mut().zip(other.condition_wins) {
            *acc += add;
        }
        self
    }

    fn into_report(self, trials: usize) -> SimulationReport {
        let rate = |count: usize| {
            if trials == 0 {
                0.0
            } else {
                count as f64 / trials as f64
            }
        };
        SimulationReport {
            total_win_rate: rate(self.wins),
            condition_win_rates: self.condition_wins.map(rate),
            trials,
        }
    }
}

/// Plays `pos` and then uniformly random moves until the board is full.
fn rollout<R: Rng + ?Sized>(mut state: GameState, pos: Position, rng: &mut R) -> WinTally {
    let mut tally = WinTally::default();
    if play_click(&mut state, pos, rng).is_err() {
        return tally;
    }

    while !state.is_game_over() {
        let available = state.available_positions();
        let next = available[rng.gen_range(0..available.len())];
        // Frontier cells are always legal; an unfinished rollout counts as a loss.
        if play_click(&mut state, next, rng).is_err() {
            debug_assert!(false, "frontier cell {next} rejected");
            return tally;
        }
    }

    let achievements = state.achievements();
    if achievements.all_goals {
        tally.wins = 1;
        for idx in achievements.satisfied_conditions() {
            tally.condition_wins[idx] = 1;
        }
    }
    tally
}

/// Empirical win rates for clicking `(row, col)` and finishing the game at random.
///
/// The first click must be legal: a revealed cell gives `AlreadyClicked` and a cell
/// past its row's frontier gives `OutOfOrder`, instead of a report of zero rates.
///
/// Every trial starts from a copy of `state`; the caller's random source drives both the
/// cell outcomes and the move choices, so a seeded RNG reproduces the report exactly.
pub fn monte_carlo_simulation<R: Rng + ?Sized>(
    state: &GameState,
    row: usize,
    col: usize,
    trials: usize,
    rng: &mut R,
) -> Result<SimulationReport, GameError> {
    let pos = Position::new(row, col);
    validate_click(state, pos)?;

    let tally = (0..trials)
        .map(|_| rollout(*state, pos, &mut *rng))
        .fold(WinTally::default(), WinTally::merge);
    let report = tally.into_report(trials);
    log_report(pos, &report, "sequential");
    Ok(report)
}

/// Parallel variant. Each trial gets its own generator seeded from a master stream, so
/// the result depends only on `seed`, not on how rayon splits the work.
pub fn monte_carlo_parallel(
    state: &GameState,
    row: usize,
    col: usize,
    trials: usize,
    seed: u64,
) -> Result<SimulationReport, GameError> {
    let pos = Position::new(row, col);
    validate_click(state, pos)?;

    let mut master = StdRng::seed_from_u64(seed);
    let trial_seeds: Vec<u64> = (0..trials).map(|_| master.next_u64()).collect();
    let tally = trial_seeds
        .into_par_iter()
        .map(|trial_seed| rollout(*state, pos, &mut SmallRng::seed_from_u64(trial_seed)))
        .reduce(WinTally::default, WinTally::merge);
    let report = tally.into_report(trials);
    log_report(pos, &report, "parallel");
    Ok(report)
}

fn log_report(pos: Position, report: &SimulationReport, mode: &'static str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    event!(
        target: "facet_bot::simulator",
        Level::DEBUG,
        mode,
        row = pos.row as u32,
        col = pos.col as u32,
        trials = report.trials as u64,
        total_win_rate = report.total_win_rate
    );
}
