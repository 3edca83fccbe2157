/// Tunable weights for the phase-based recommender.
///
/// The defaults are hand-tuned and have no derivation from the analytic model; they pin
/// the recommender's current behaviour rather than describe optimal play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicParams {
    // === Phase selection ===
    /// Board-wide mean probability at or above which play is "early" (default: 0.65)
    pub early_threshold: f64,

    /// Mean probability at or above which play is "middle" (default: 0.45)
    pub middle_threshold: f64,

    // === Early phase ===
    /// Weight on the cell probability for rows 0/1 (default: 100)
    pub early_probability_weight: f64,

    /// Weight per missing success (out of 10) for rows 0/1 (default: 10)
    pub early_missing_weight: f64,

    /// Score given to the penalty row, effectively excluding it (default: -1000)
    pub early_penalty_row_score: f64,

    // === Middle phase ===
    /// Per-row success target for rows 0/1 (default: 7)
    pub middle_target: u8,

    /// Weight on probability while the target is unmet (default: 50)
    pub middle_probability_weight: f64,

    /// Weight per success still needed (default: 20)
    pub middle_needed_weight: f64,

    /// Weight on probability once the target is met (default: 10)
    pub middle_satisfied_weight: f64,

    /// Penalty row is only considered below this probability (default: 0.4)
    pub middle_penalty_row_ceiling: f64,

    /// Weight on failure probability for the penalty row (default: 30)
    pub middle_penalty_row_weight: f64,

    /// Score when the penalty row is not worth touching (default: -500)
    pub middle_penalty_row_score: f64,

    // === Late phase ===
    /// Per-row success target for rows 0/1 (default: 6)
    pub late_target: u8,

    /// Weight on probability while the target is unmet (default: 20)
    pub late_probability_weight: f64,

    /// Weight per success still needed (default: 15)
    pub late_needed_weight: f64,

    /// Score for rows 0/1 that already met their target (default: -100)
    pub late_satisfied_score: f64,

    /// Weight on failure probability for the penalty row (default: 50)
    pub late_penalty_row_weight: f64,

    /// Weight per unused penalty-row success allowance (default: 20)
    pub late_quota_weight: f64,

    /// Score once the penalty row has used its allowance (default: -1000)
    pub late_penalty_row_score: f64,

    // === Shared ===
    /// Successes the penalty row may take before it ruins every band (default: 4)
    pub penalty_row_quota: u8,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            early_threshold: 0.65,
            middle_threshold: 0.45,

            early_probability_weight: 100.0,
            early_missing_weight: 10.0,
            early_penalty_row_score: -1000.0,

            middle_target: 7,
            middle_probability_weight: 50.0,
            middle_needed_weight: 20.0,
            middle_satisfied_weight: 10.0,
            middle_penalty_row_ceiling: 0.4,
            middle_penalty_row_weight: 30.0,
            middle_penalty_row_score: -500.0,

            late_target: 6,
            late_probability_weight: 20.0,
            late_needed_weight: 15.0,
            late_satisfied_score: -100.0,
            late_penalty_row_weight: 50.0,
            late_quota_weight: 20.0,
            late_penalty_row_score: -1000.0,

            penalty_row_quota: 4,
        }
    }
}

impl HeuristicParams {
    /// Defaults with phase thresholds overridden from `FACET_HEURISTIC_EARLY_THRESHOLD`
    /// and `FACET_HEURISTIC_MIDDLE_THRESHOLD`. Unparseable or out-of-range values are ignored.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_thresholds(mut self, early: f64, middle: f64) -> Self {
        self.early_threshold = early;
        self.middle_threshold = middle;
        self
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |raw: Option<String>| {
            raw.and_then(|value| value.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
        };

        let early = parse(read("FACET_HEURISTIC_EARLY_THRESHOLD")).unwrap_or(defaults.early_threshold);
        let middle =
            parse(read("FACET_HEURISTIC_MIDDLE_THRESHOLD")).unwrap_or(defaults.middle_threshold);

        if middle > early {
            return defaults;
        }
        defaults.with_thresholds(early, middle)
    }
}
