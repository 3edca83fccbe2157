use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use facet_core::model::victory::CONDITION_COUNT;
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::runner::AgentGameResult;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in benchmark results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Accumulates per-agent outcomes game by game.
pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    score_diffs: HashMap<String, Vec<f64>>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind),
            );
            order.push(agent.name.clone());
        }

        Ok(Self {
            baseline,
            agents,
            score_diffs: HashMap::new(),
            agent_order: order,
        })
    }

    /// Records one seeded game played by every agent.
    pub fn record_game(
        &mut self,
        game_index: usize,
        results: &[AgentGameResult],
    ) -> Result<(), AnalyticsError> {
        let baseline_score = results
            .iter()
            .find(|result| result.agent == self.baseline)
            .map(|result| f64::from(result.score))
            .ok_or_else(|| {
                AnalyticsError::MissingBaseline(format!("{} (game {game_index})", self.baseline))
            })?;

        for result in results {
            self.agents
                .get_mut(&result.agent)
                .ok_or_else(|| AnalyticsError::UnknownAgent(result.agent.clone()))?
                .record(result);

            if result.agent != self.baseline {
                self.score_diffs
                    .entry(result.agent.clone())
                    .or_default()
                    .push(f64::from(result.score) - baseline_score);
            }
        }
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let mut agents = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                agents.push(acc.into_report());
            }
        }

        let comparisons = agents
            .iter()
            .map(|report| {
                let (p_value, sample_size) = self
                    .score_diffs
                    .remove(&report.name)
                    .map(|diffs| wilcoxon_signed_rank(&diffs))
                    .unwrap_or((1.0, 0));
                ComparisonReport {
                    agent: report.name.clone(),
                    p_value,
                    sample_size,
                }
            })
            .collect();

        AnalyticsSummary {
            baseline: self.baseline,
            agents,
            comparisons,
        }
        .enrich()
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    games: usize,
    wins: usize,
    condition_wins: [usize; CONDITION_COUNT],
    total_score: f64,
    total_ms: f64,
    total_moves: u64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            games: 0,
            wins: 0,
            condition_wins: [0; CONDITION_COUNT],
            total_score: 0.0,
            total_ms: 0.0,
            total_moves: 0,
        }
    }

    fn record(&mut self, result: &AgentGameResult) {
        self.games += 1;
        if result.won {
            self.wins += 1;
        }
        for (count, met) in self.condition_wins.iter_mut().zip(result.conditions) {
            if met {
                *count += 1;
            }
        }
        self.total_score += f64::from(result.score);
        self.total_ms += result.metrics.total_ms;
        self.total_moves += u64::from(result.metrics.moves);
    }

    fn into_report(self) -> AgentReport {
        let win_rate = ratio(self.wins as f64, self.games as f64);
        AgentReport {
            name: self.name,
            kind: self.kind,
            games: self.games,
            wins: self.wins,
            win_rate,
            ci95: wilson_interval(self.wins, self.games),
            condition_wins: self.condition_wins,
            mean_score: ratio(self.total_score, self.games as f64),
            average_ms_per_move: ratio(self.total_ms, self.total_moves as f64),
            delta_vs_baseline: 0.0,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Two-sided critical value for the configured confidence level.
fn critical_z() -> f64 {
    standard_normal()
        .map(|normal| normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
        .unwrap_or(1.96)
}

/// Wilson score interval for `wins` out of `games`.
pub fn wilson_interval(wins: usize, games: usize) -> (f64, f64) {
    if games == 0 {
        return (0.0, 0.0);
    }
    let n = games as f64;
    let p = wins as f64 / n;
    let z = critical_z();
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denom;
    let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((centre - half).max(0.0), (centre + half).min(1.0))
}

/// Normal-approximation Wilcoxon signed-rank test on paired differences.
///
/// Zero differences are dropped; tied magnitudes share their average rank. Returns the
/// two-sided p-value and the number of non-zero pairs.
pub fn wilcoxon_signed_rank(diffs: &[f64]) -> (f64, usize) {
    let mut magnitudes: Vec<(f64, bool)> = diffs
        .iter()
        .filter(|d| d.abs() > f64::EPSILON)
        .map(|d| (d.abs(), *d > 0.0))
        .collect();
    let n = magnitudes.len();
    if n == 0 {
        return (1.0, 0);
    }
    magnitudes.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut w_plus = 0.0;
    let mut w_minus = 0.0;
    let mut tie_adjustment = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && (magnitudes[end + 1].0 - magnitudes[start].0).abs() < 1e-12 {
            end += 1;
        }
        let rank = (start + end + 2) as f64 / 2.0;
        for &(_, positive) in &magnitudes[start..=end] {
            if positive {
                w_plus += rank;
            } else {
                w_minus += rank;
            }
        }
        let tied = (end - start + 1) as f64;
        if tied > 1.0 {
            tie_adjustment += (tied.powi(3) - tied) / 48.0;
        }
        start = end + 1;
    }

    let n_f = n as f64;
    let mean_w = n_f * (n_f + 1.0) / 4.0;
    let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
    let Some(normal) = standard_normal().filter(|_| variance_w > 0.0) else {
        return (1.0, n);
    };

    let w = f64::min(w_plus, w_minus);
    let z = (((w - mean_w).abs() - 0.5) / variance_w.sqrt()).max(0.0);
    let p = 2.0 * (1.0 - normal.cdf(z));
    (p.clamp(0.0, 1.0), n)
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    fn enrich(mut self) -> Self {
        let baseline_rate = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.win_rate)
            .unwrap_or(0.0);
        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.win_rate - baseline_rate;
        }
        self
    }

    fn p_value(&self, agent: &str) -> f64 {
        self.comparisons
            .iter()
            .find(|c| c.agent == agent)
            .map(|c| c.p_value)
            .unwrap_or(1.0)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Benchmark Summary\n\n");
        out.push_str(&format!(
            "Baseline: `{}`. p-values are paired Wilcoxon signed-rank tests on final score.\n\n",
            self.baseline
        ));
        out.push_str("| Agent | Kind | Games | Wins | Win % | 95% CI | Δ win % | Band 1 | Band 2 | Band 3 | Band 4 | Mean score | Avg ms/move | p-value |\n");
        out.push_str("|-------|------|-------|------|-------|--------|---------|--------|--------|--------|--------|------------|-------------|---------|\n");

        for agent in &self.agents {
            let [b1, b2, b3, b4] = agent.condition_wins;
            out.push_str(&format!(
                "| {name} | {kind:?} | {games} | {wins} | {win:.1}% | [{lo:.1}%, {hi:.1}%] | {delta:+.1} | {b1} | {b2} | {b3} | {b4} | {score:+.2} | {ms:.3} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                wins = agent.wins,
                win = agent.win_rate * 100.0,
                lo = agent.ci95.0 * 100.0,
                hi = agent.ci95.1 * 100.0,
                delta = agent.delta_vs_baseline * 100.0,
                score = agent.mean_score,
                ms = agent.average_ms_per_move,
                pval = self.p_value(&agent.name),
            ));
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.to_markdown()).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }

    /// Renders `win_rate.png`. Plotters may panic without font support, so the
    /// drawing runs under `catch_unwind` and any failure becomes an error.
    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|source| AnalyticsError::Io {
                context: "creating plots directory",
                source,
            })?;
        }

        let output_path = dir.join("win_rate.png");
        let baseline = self.baseline.clone();
        let agents = self.agents.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let attempt = std::panic::catch_unwind(move || {
            let plot_err = |e: &dyn std::fmt::Display| AnalyticsError::Plot(e.to_string());
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| plot_err(&e))?;

            let y_max = agents
                .iter()
                .map(|a| a.ci95.1)
                .fold(0.0f64, f64::max)
                .max(0.05)
                * 1.1;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Win rate by agent (95% Wilson CI)", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..agents.len(), 0.0..y_max.min(1.0))
                .map_err(|e| plot_err(&e))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Win rate")
                .x_desc("Agent")
                .x_label_formatter(&|idx| {
                    agents
                        .get(*idx)
                        .map(|agent| agent.name.clone())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| plot_err(&e))?;

            chart
                .draw_series(agents.iter().enumerate().map(|(idx, agent)| {
                    let color = if agent.name == baseline {
                        &BLUE
                    } else if agent.delta_vs_baseline >= 0.0 {
                        &GREEN
                    } else {
                        &RED
                    };
                    Rectangle::new([(idx, 0.0), (idx + 1, agent.win_rate)], color.filled())
                }))
                .map_err(|e| plot_err(&e))?;

            drop(chart);
            root.present().map_err(|e| plot_err(&e))?;
            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub condition_wins: [usize; CONDITION_COUNT],
    pub mean_score: f64,
    pub average_ms_per_move: f64,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}
