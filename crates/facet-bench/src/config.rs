use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_CALIBRATION_TRIALS: usize = 1_000;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub games: GamesConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub calibration: Option<CalibrationConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let mut cfg: BenchmarkConfig = serde_yaml::from_reader(BufReader::new(file)).map_err(
            |source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            },
        )?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.games.validate()?;
        self.outputs.validate(&self.run_id)?;
        validate_agents(&mut self.agents)?;
        self.metrics.validate(&self.agents)?;
        if let Some(calibration) = &self.calibration {
            calibration.validate()?;
        }
        self.logging.normalize();
        Ok(())
    }

    /// Resolve `{run_id}` placeholders in the output templates.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// How many games to play and how their seeds are derived.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamesConfig {
    pub seed: Option<u64>,
    pub count: usize,
}

impl GamesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::field(
                "games.count",
                "number of games must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// One competing strategy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Heuristic,
    Analytic,
    Greedy,
    Random,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::field(label, "path must not be empty"));
            }
            if resolve_template(run_id, value).components().count() == 0 {
                return Err(ValidationError::field(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
}

impl MetricsConfig {
    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        let Some(baseline) = self.baseline.as_ref() else {
            return Err(ValidationError::field(
                "metrics.baseline",
                "baseline agent must be specified",
            ));
        };

        if !agents.iter().any(|a| &a.name == baseline) {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: format!("baseline agent '{baseline}' is not defined in agents list"),
            });
        }
        Ok(())
    }
}

/// Advisor-versus-rollout comparison on the opening position.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CalibrationConfig {
    #[serde(default = "default_calibration_trials")]
    pub trials: usize,
    #[serde(default)]
    pub seed: u64,
}

impl CalibrationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.trials == 0 {
            return Err(ValidationError::field(
                "calibration.trials",
                "calibration needs at least one trial",
            ));
        }
        Ok(())
    }
}

fn default_calibration_trials() -> usize {
    DEFAULT_CALIBRATION_TRIALS
}

/// Structured logs are off unless asked for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::field("run_id", "run_id must not be empty"));
    }
    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::field(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }
    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig]) -> Result<(), ValidationError> {
    if agents.is_empty() {
        return Err(ValidationError::field(
            "agents",
            "at least one agent must be specified",
        ));
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        if agent.name.trim().is_empty() {
            return Err(ValidationError::field(
                "agents.name",
                "agent name must not be empty",
            ));
        }
        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("agents[{}].name", agent.name),
                message: "agent name contains invalid characters".to_string(),
            });
        }
        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "agents".to_string(),
                message: format!("agent name '{}' defined more than once", agent.name),
            });
        }
        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Output paths with templates substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

impl ResolvedOutputs {
    /// Directory holding the summary; telemetry lands next to it.
    pub fn summary_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn field(field: &str, message: &str) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "nightly"
games:
  seed: 123
  count: 50
agents:
  - name: "heuristic"
    kind: "heuristic"
    params:
      early_threshold: 0.7
  - name: "coin"
    kind: "random"
    params:
      seed: 9
outputs:
  jsonl: "bench/out/{run_id}/games.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
  plots_dir: "bench/out/{run_id}/plots"
metrics:
  baseline: "heuristic"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    fn parse(yaml: &str) -> BenchmarkConfig {
        serde_yaml::from_str(yaml).expect("parse yaml")
    }

    fn invalid_field(err: ValidationError) -> String {
        let ValidationError::InvalidField { field, .. } = err;
        field
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg = parse(BASIC_YAML);
        cfg.validate().expect("validate");

        assert_eq!(cfg.games.count, 50);
        assert!(cfg.calibration.is_none());
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(outputs.jsonl, PathBuf::from("bench/out/nightly/games.jsonl"));
        assert_eq!(outputs.summary_dir(), PathBuf::from("bench/out/nightly"));
    }

    #[test]
    fn rejects_missing_baseline() {
        let mut cfg = parse(&BASIC_YAML.replace("  baseline: \"heuristic\"\n", ""));
        assert_eq!(invalid_field(cfg.validate().expect_err("fails")), "metrics.baseline");
    }

    #[test]
    fn rejects_unknown_baseline() {
        let mut cfg = parse(&BASIC_YAML.replace("baseline: \"heuristic\"", "baseline: \"oracle\""));
        assert_eq!(invalid_field(cfg.validate().expect_err("fails")), "metrics.baseline");
    }

    #[test]
    fn rejects_duplicate_agents() {
        let mut cfg = parse(&BASIC_YAML.replace("name: \"coin\"", "name: \"heuristic\""));
        assert_eq!(invalid_field(cfg.validate().expect_err("fails")), "agents");
    }

    #[test]
    fn rejects_invalid_run_id() {
        let mut cfg = parse(&BASIC_YAML.replace("run_id: \"nightly\"", "run_id: \"night ly\""));
        assert_eq!(invalid_field(cfg.validate().expect_err("fails")), "run_id");
    }

    #[test]
    fn rejects_zero_games() {
        let mut cfg = parse(&BASIC_YAML.replace("count: 50", "count: 0"));
        assert_eq!(invalid_field(cfg.validate().expect_err("fails")), "games.count");
    }

    #[test]
    fn calibration_defaults_and_validation() {
        let mut cfg = parse(&format!("{BASIC_YAML}calibration:\n  seed: 4\n"));
        cfg.validate().expect("valid");
        let calibration = cfg.calibration.clone().expect("present");
        assert_eq!(calibration.trials, DEFAULT_CALIBRATION_TRIALS);
        assert_eq!(calibration.seed, 4);

        let mut cfg = parse(&format!("{BASIC_YAML}calibration:\n  trials: 0\n"));
        assert_eq!(
            invalid_field(cfg.validate().expect_err("fails")),
            "calibration.trials"
        );
    }

    #[test]
    fn empty_params_become_mapping() {
        let yaml = BASIC_YAML.replace("    params:\n      seed: 9\n", "");
        let mut cfg = parse(&yaml);
        cfg.validate().expect("valid");
        assert!(cfg.agents[1].params.is_mapping());
    }

    #[test]
    fn blank_level_falls_back_to_info() {
        let mut cfg = parse(&BASIC_YAML.replace("tracing_level: \"debug\"", "tracing_level: \" \""));
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.tracing_level, "info");
    }
}
