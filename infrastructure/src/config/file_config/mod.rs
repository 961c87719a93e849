//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backends;
mod output;
mod pipeline;

pub use backends::{BackendKind, FileBackendConfig};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use pipeline::{FilePipelineConfig, FileStageConfig};

use consensus_application::HeuristicsConfig;
use consensus_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Stage settings
    pub pipeline: FilePipelineConfig,
    /// Overrides of the confidence/merge/fact-basis constants
    pub heuristics: HeuristicsConfig,
    /// Backend definitions, keyed by backend id
    pub backends: BTreeMap<String, FileBackendConfig>,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks every backend definition, the pipeline against the defined
    /// backends, and the heuristic bounds.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> = self
            .backends
            .iter()
            .flat_map(|(id, backend)| backend.validate(id))
            .collect();

        issues.extend(
            self.pipeline
                .to_pipeline_config()
                .validate(|id| self.backends.contains_key(id.as_str())),
        );

        let confidence = &self.heuristics.confidence;
        if !(0.0..=1.0).contains(&confidence.floor)
            || !(0.0..=1.0).contains(&confidence.ceiling)
            || confidence.floor > confidence.ceiling
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange {
                    field: "heuristics.confidence".to_string(),
                },
                format!(
                    "heuristics.confidence: floor {} and ceiling {} must satisfy 0 <= floor <= ceiling <= 1",
                    confidence.floor, confidence.ceiling
                ),
            ));
        }

        let penalty = self.heuristics.reconcile.disagreement_penalty;
        if !(0.0..=1.0).contains(&penalty) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange {
                    field: "heuristics.reconcile.disagreement_penalty".to_string(),
                },
                format!(
                    "heuristics.reconcile.disagreement_penalty {} is outside 0.0-1.0",
                    penalty
                ),
            ));
        }

        issues
    }
}
