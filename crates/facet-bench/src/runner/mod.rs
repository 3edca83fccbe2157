mod agents;

pub use agents::AgentError;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use facet_bot::autoplay::auto_play;
use facet_core::game::{GameEngine, GameError};
use facet_core::model::position::ROWS;
use facet_core::model::victory::CONDITION_COUNT;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::calibration::{CalibrationReport, run_calibration};
use crate::config::{AgentKind, BenchmarkConfig, ResolvedOutputs};
use agents::AgentBlueprint;

/// Plays every configured agent through the same sequence of seeded games.
pub struct BenchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Paths and counts reported after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub games_played: usize,
    pub agents: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub calibration: Option<CalibrationReport>,
}

impl BenchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Execute the benchmark, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        let mut rows_written = 0usize;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let mut results = Vec::with_capacity(self.agents.len());
            for agent in &self.agents {
                let result = self.play_game(agent, game_index, game_seed)?;
                write_row(&mut writer, &self.config.run_id, game_index, game_seed, &result)?;
                rows_written += 1;
                results.push(result);
            }
            analytics.record_game(game_index, &results)?;
        }
        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {err}");
                None
            }
        };

        let calibration = match &self.config.calibration {
            Some(settings) => {
                let report = run_calibration(settings.trials, settings.seed)
                    .map_err(RunnerError::Calibration)?;
                report.append_to_markdown(&self.outputs.summary_md)?;
                Some(report)
            }
            None => None,
        };

        Ok(RunSummary {
            games_played: self.config.games.count,
            agents: self.agents.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            calibration,
        })
    }

    fn play_game(
        &self,
        agent: &AgentBlueprint,
        game_index: usize,
        game_seed: u64,
    ) -> Result<AgentGameResult, RunnerError> {
        let mut engine = GameEngine::with_seed(game_seed);
        let mut policy = agent.spawn_policy(game_seed);
        let mut metrics = DecisionMetrics::default();

        while !engine.is_game_over() {
            let step = auto_play(&mut engine, policy.as_mut()).map_err(|source| {
                RunnerError::Game {
                    agent: agent.name.clone(),
                    game_index,
                    source,
                }
            })?;
            metrics.record(step.decision_time);
        }

        let state = engine.state();
        let achievements = state.achievements();
        let result = AgentGameResult {
            agent: agent.name.clone(),
            kind: agent.kind,
            score: state.score(),
            success_counts: state.success_counts(),
            won: achievements.all_goals,
            conditions: achievements.victory_conditions,
            metrics: metrics.finalize(),
        };

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "facet_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                agent = %result.agent,
                score = result.score,
                won = result.won,
                avg_ms = result.metrics.avg_ms_per_move
            );
        }

        Ok(result)
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    game_index: usize,
    game_seed: u64,
    result: &AgentGameResult,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id,
        game_id: format!("G{game_index:05}"),
        game_index,
        game_seed,
        agent: &result.agent,
        kind: result.kind,
        score: result.score,
        success_counts: result.success_counts,
        won: result.won,
        conditions_met: result
            .conditions
            .iter()
            .enumerate()
            .filter_map(|(idx, met)| met.then_some(idx))
            .collect(),
        moves: result.metrics.moves,
        speed_ms_move: result.metrics.avg_ms_per_move,
    };
    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// One agent's finished game.
#[derive(Debug, Clone)]
pub struct AgentGameResult {
    pub agent: String,
    pub kind: AgentKind,
    pub score: i32,
    pub success_counts: [u8; ROWS],
    pub won: bool,
    pub conditions: [bool; CONDITION_COUNT],
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    moves: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.moves += 1;
    }

    fn finalize(self) -> DecisionSummary {
        let total_ms = self.total.as_secs_f64() * 1000.0;
        DecisionSummary {
            moves: self.moves,
            avg_ms_per_move: if self.moves == 0 {
                0.0
            } else {
                total_ms / f64::from(self.moves)
            },
            total_ms,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecisionSummary {
    pub moves: u32,
    pub avg_ms_per_move: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    agent: &'a str,
    kind: AgentKind,
    score: i32,
    success_counts: [u8; ROWS],
    won: bool,
    conditions_met: Vec<usize>,
    moves: u32,
    speed_ms_move: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("agent '{agent}' failed in game {game_index}: {source}")]
    Game {
        agent: String,
        game_index: usize,
        #[source]
        source: GameError,
    },
    #[error("calibration failed: {0}")]
    Calibration(#[source] GameError),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_metrics_average() {
        let mut metrics = DecisionMetrics::default();
        metrics.record(Duration::from_millis(2));
        metrics.record(Duration::from_millis(4));
        let summary = metrics.finalize();
        assert_eq!(summary.moves, 2);
        assert!((summary.avg_ms_per_move - 3.0).abs() < 1e-9);
        assert!((summary.total_ms - 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_metrics_report_zero() {
        let summary = DecisionMetrics::default().finalize();
        assert_eq!(summary.moves, 0);
        assert_eq!(summary.avg_ms_per_move, 0.0);
    }
}
