use facet_bot::heuristic::HeuristicParams;
use facet_bot::policy::{AnalyticPolicy, GreedyScorePolicy, HeuristicPolicy, Policy, RandomPolicy};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid {kind:?} parameter for agent '{name}': {message}")]
    InvalidParam {
        name: String,
        kind: AgentKind,
        message: String,
    },
}

/// Parsed agent definition; spawns a fresh policy for every game.
#[derive(Debug, Clone)]
pub(super) struct AgentBlueprint {
    pub(super) name: String,
    pub(super) kind: AgentKind,
    implementation: AgentImplementation,
}

#[derive(Debug, Clone)]
enum AgentImplementation {
    Heuristic(HeuristicParams),
    Analytic,
    Greedy,
    Random { seed: u64 },
}

impl AgentBlueprint {
    pub(super) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let params = ParamReader::new(config)?;
        let implementation = match config.kind {
            AgentKind::Heuristic => AgentImplementation::Heuristic(heuristic_params(&params)?),
            AgentKind::Analytic => AgentImplementation::Analytic,
            AgentKind::Greedy => AgentImplementation::Greedy,
            AgentKind::Random => AgentImplementation::Random {
                seed: params.u64("seed")?.unwrap_or(0),
            },
        };
        Ok(Self {
            name: config.name.clone(),
            kind: config.kind,
            implementation,
        })
    }

    /// Random agents mix their own seed with the game seed so each game draws
    /// different moves while staying reproducible.
    pub(super) fn spawn_policy(&self, game_seed: u64) -> Box<dyn Policy> {
        match &self.implementation {
            AgentImplementation::Heuristic(params) => Box::new(HeuristicPolicy::new(*params)),
            AgentImplementation::Analytic => Box::new(AnalyticPolicy::new()),
            AgentImplementation::Greedy => Box::new(GreedyScorePolicy::new()),
            AgentImplementation::Random { seed } => {
                Box::new(RandomPolicy::with_seed(seed ^ game_seed))
            }
        }
    }
}

fn heuristic_params(params: &ParamReader<'_>) -> Result<HeuristicParams, AgentError> {
    let defaults = HeuristicParams::default();
    let early = params.unit_f64("early_threshold")?.unwrap_or(defaults.early_threshold);
    let middle = params.unit_f64("middle_threshold")?.unwrap_or(defaults.middle_threshold);
    if middle > early {
        return Err(params.error(format!(
            "middle_threshold {middle} is above early_threshold {early}"
        )));
    }
    Ok(defaults.with_thresholds(early, middle))
}

struct ParamReader<'a> {
    config: &'a AgentConfig,
    mapping: Option<&'a serde_yaml::Mapping>,
}

impl<'a> ParamReader<'a> {
    fn new(config: &'a AgentConfig) -> Result<Self, AgentError> {
        let reader = Self {
            config,
            mapping: None,
        };
        if config.params.is_null() {
            return Ok(reader);
        }
        let mapping = config
            .params
            .as_mapping()
            .ok_or_else(|| reader.error("expected mapping for agent params".to_string()))?;
        Ok(Self {
            mapping: Some(mapping),
            ..reader
        })
    }

    fn get(&self, key: &str) -> Option<&'a serde_yaml::Value> {
        self.mapping?
            .iter()
            .find_map(|(k, value)| (k.as_str() == Some(key)).then_some(value))
    }

    fn u64(&self, key: &str) -> Result<Option<u64>, AgentError> {
        self.get(key)
            .map(|value| {
                value
                    .as_u64()
                    .ok_or_else(|| self.error(format!("{key} must be a non-negative integer")))
            })
            .transpose()
    }

    fn unit_f64(&self, key: &str) -> Result<Option<f64>, AgentError> {
        self.get(key)
            .map(|value| {
                value
                    .as_f64()
                    .filter(|v| (0.0..=1.0).contains(v))
                    .ok_or_else(|| self.error(format!("{key} must be a number between 0 and 1")))
            })
            .transpose()
    }

    fn error(&self, message: String) -> AgentError {
        AgentError::InvalidParam {
            name: self.config.name.clone(),
            kind: self.config.kind,
            message,
        }
    }
}
