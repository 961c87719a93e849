//! Stage and pipeline configuration
//!
//! `backend_ids`, `temperature`, `max_output_size`, `timeout_ms` and
//! `consensus_threshold` are the only externally tunable knobs of a stage.

use super::stage::Stage;
use super::validation::{ConfigIssue, ConfigIssueCode, Severity};
use crate::core::backend::BackendId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_OUTPUT_SIZE: u32 = 2048;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CONSENSUS_THRESHOLD: f64 = 0.6;

/// Configuration of one stage's fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Backends queried in parallel; order is irrelevant
    pub backend_ids: BTreeSet<BackendId>,
    pub temperature: f32,
    /// Upper bound on the reply size requested from each backend (tokens)
    pub max_output_size: u32,
    /// Per-adapter deadline
    pub timeout_ms: u64,
    /// Scores below this are flagged low-confidence, never discarded
    pub consensus_threshold: f64,
}

impl StageConfig {
    pub fn new<I, B>(backend_ids: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<BackendId>,
    {
        Self {
            backend_ids: backend_ids.into_iter().map(Into::into).collect(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_size(mut self, max_output_size: u32) -> Self {
        self.max_output_size = max_output_size;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    fn validate(&self, stage: Stage, is_known: &dyn Fn(&BackendId) -> bool) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.backend_ids.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyBackendSet { stage },
                format!("{} stage has no backends configured", stage.as_str()),
            ));
        }

        for id in self.backend_ids.iter().filter(|id| !is_known(id)) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownBackend {
                    stage,
                    backend: id.clone(),
                },
                format!("{} stage refers to unknown backend '{}'", stage.as_str(), id),
            ));
        }

        if self.timeout_ms == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout { stage },
                format!("{} stage timeout_ms must be greater than 0", stage.as_str()),
            ));
        }

        if self.max_output_size == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroMaxOutputSize { stage },
                format!("{} stage max_output_size must be greater than 0", stage.as_str()),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                ConfigIssueCode::TemperatureOutOfRange { stage },
                format!(
                    "{} stage temperature {} is outside 0.0-2.0; backends may reject it",
                    stage.as_str(),
                    self.temperature
                ),
            ));
        }

        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange {
                    field: format!("pipeline.{}.consensus_threshold", stage.as_str()),
                },
                format!(
                    "{} stage consensus_threshold {} is outside 0.0-1.0",
                    stage.as_str(),
                    self.consensus_threshold
                ),
            ));
        }

        issues
    }
}

/// Configuration of a full three-stage run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub knowledge: StageConfig,
    pub data: StageConfig,
    pub reasoning: StageConfig,
    /// Floor applied to the final (reasoning) result on top of its stage threshold
    pub consensus_threshold: f64,
}

impl PipelineConfig {
    pub fn new(knowledge: StageConfig, data: StageConfig, reasoning: StageConfig) -> Self {
        Self {
            knowledge,
            data,
            reasoning,
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
        }
    }

    /// Same backend set and settings for every stage
    pub fn uniform(stage: StageConfig) -> Self {
        Self::new(stage.clone(), stage.clone(), stage)
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    pub fn stage(&self, stage: Stage) -> &StageConfig {
        match stage {
            Stage::Knowledge => &self.knowledge,
            Stage::Data => &self.data,
            Stage::Reasoning => &self.reasoning,
        }
    }

    /// Threshold a stage's consensus is checked against
    pub fn threshold_for(&self, stage: Stage) -> f64 {
        let stage_threshold = self.stage(stage).consensus_threshold;
        if stage.is_final() {
            stage_threshold.max(self.consensus_threshold)
        } else {
            stage_threshold
        }
    }

    /// Every backend referenced by any stage
    pub fn all_backend_ids(&self) -> BTreeSet<BackendId> {
        Stage::ALL
            .iter()
            .flat_map(|s| self.stage(*s).backend_ids.iter().cloned())
            .collect()
    }

    /// Validate the configuration against the set of backends that exist.
    ///
    /// Returns all detected issues; see [`ConfigIssue::has_errors`].
    pub fn validate(&self, is_known: impl Fn(&BackendId) -> bool) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> = Stage::ALL
            .iter()
            .flat_map(|stage| self.stage(*stage).validate(*stage, &is_known))
            .collect();

        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange {
                    field: "pipeline.consensus_threshold".to_string(),
                },
                format!(
                    "pipeline consensus_threshold {} is outside 0.0-1.0",
                    self.consensus_threshold
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(id: &BackendId) -> bool {
        matches!(id.as_str(), "a" | "b" | "c")
    }

    #[test]
    fn test_valid_config_has_no_issues() {
        let config = PipelineConfig::uniform(StageConfig::new(["a", "b"]));
        assert!(config.validate(known).is_empty());
    }

    #[test]
    fn test_backend_ids_are_a_set() {
        let stage = StageConfig::new(["b", "a", "b"]);
        let ids: Vec<_> = stage.backend_ids.iter().map(|b| b.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_and_unknown_backends_are_errors() {
        let config = PipelineConfig::new(
            StageConfig::new(Vec::<&str>::new()),
            StageConfig::new(["a", "zzz"]),
            StageConfig::new(["c"]),
        );
        let issues = config.validate(known);

        assert_eq!(issues.len(), 2);
        assert!(ConfigIssue::has_errors(&issues));
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::EmptyBackendSet { stage: Stage::Knowledge }
        )));
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::UnknownBackend { stage: Stage::Data, backend } if backend.as_str() == "zzz"
        )));
    }

    #[test]
    fn test_zero_timeout_and_threshold_range() {
        let config = PipelineConfig::uniform(
            StageConfig::new(["a"])
                .with_timeout_ms(0)
                .with_consensus_threshold(1.5),
        )
        .with_consensus_threshold(-0.1);
        let issues = config.validate(known);

        // 3 stages × (timeout + threshold) + global threshold
        assert_eq!(issues.len(), 7);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn test_temperature_is_only_a_warning() {
        let config = PipelineConfig::uniform(StageConfig::new(["a"]).with_temperature(3.0));
        let issues = config.validate(known);
        assert_eq!(issues.len(), 3);
        assert!(!ConfigIssue::has_errors(&issues));
    }

    #[test]
    fn test_threshold_for_final_stage_uses_global_floor() {
        let config = PipelineConfig::uniform(StageConfig::new(["a"]).with_consensus_threshold(0.5))
            .with_consensus_threshold(0.7);
        assert_eq!(config.threshold_for(Stage::Knowledge), 0.5);
        assert_eq!(config.threshold_for(Stage::Reasoning), 0.7);
    }

    #[test]
    fn test_all_backend_ids() {
        let config = PipelineConfig::new(
            StageConfig::new(["a"]),
            StageConfig::new(["b", "a"]),
            StageConfig::new(["c"]),
        );
        assert_eq!(config.all_backend_ids().len(), 3);
    }
}
