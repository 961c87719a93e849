//! Pipeline configuration from TOML (`[pipeline]` section)
//!
//! `[pipeline]` holds the defaults every stage inherits; `[pipeline.knowledge]`,
//! `[pipeline.data]` and `[pipeline.reasoning]` override them per stage.

use consensus_domain::pipeline::config::{
    DEFAULT_CONSENSUS_THRESHOLD, DEFAULT_MAX_OUTPUT_SIZE, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_MS,
};
use consensus_domain::{PipelineConfig, StageConfig};
use serde::{Deserialize, Serialize};

/// Raw pipeline configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    /// Global threshold, also the fallback for stages without their own
    pub consensus_threshold: f64,
    /// Require JSON-object replies (false = free text)
    pub structured: bool,
    /// Backends used by stages that don't list their own
    pub backends: Vec<String>,
    pub temperature: f32,
    pub max_output_size: u32,
    pub timeout_ms: u64,
    pub knowledge: FileStageConfig,
    pub data: FileStageConfig,
    pub reasoning: FileStageConfig,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        Self {
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            structured: true,
            backends: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            knowledge: FileStageConfig::default(),
            data: FileStageConfig::default(),
            reasoning: FileStageConfig::default(),
        }
    }
}

/// Per-stage overrides; unset fields inherit from `[pipeline]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backends: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus_threshold: Option<f64>,
}

impl FilePipelineConfig {
    /// Convert to the domain configuration, resolving inherited values
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(
            self.resolve(&self.knowledge),
            self.resolve(&self.data),
            self.resolve(&self.reasoning),
        )
        .with_consensus_threshold(self.consensus_threshold)
    }

    fn resolve(&self, stage: &FileStageConfig) -> StageConfig {
        let backends = stage.backends.as_ref().unwrap_or(&self.backends);
        StageConfig::new(backends.iter().map(String::as_str))
            .with_temperature(stage.temperature.unwrap_or(self.temperature))
            .with_max_output_size(stage.max_output_size.unwrap_or(self.max_output_size))
            .with_timeout_ms(stage.timeout_ms.unwrap_or(self.timeout_ms))
            .with_consensus_threshold(
                stage
                    .consensus_threshold
                    .unwrap_or(self.consensus_threshold),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_inherit_pipeline_defaults() {
        let config = FilePipelineConfig {
            backends: vec!["a".to_string()],
            timeout_ms: 1234,
            ..Default::default()
        };
        let pipeline = config.to_pipeline_config();

        assert_eq!(pipeline.knowledge, pipeline.reasoning);
        assert_eq!(pipeline.data.timeout_ms, 1234);
        assert_eq!(pipeline.data.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(pipeline.consensus_threshold, DEFAULT_CONSENSUS_THRESHOLD);
    }

    #[test]
    fn test_stage_overrides_win() {
        let config: FilePipelineConfig = toml::from_str(
            r#"
backends = ["a", "b"]
consensus_threshold = 0.5

[data]
backends = ["c"]
temperature = 0.9
"#,
        )
        .unwrap();
        let pipeline = config.to_pipeline_config();

        let data_ids: Vec<_> = pipeline.data.backend_ids.iter().map(|b| b.as_str()).collect();
        assert_eq!(data_ids, vec!["c"]);
        assert_eq!(pipeline.data.temperature, 0.9);
        assert_eq!(pipeline.knowledge.backend_ids.len(), 2);
        assert_eq!(pipeline.reasoning.consensus_threshold, 0.5);
    }

    #[test]
    fn test_empty_stage_list_is_kept_empty() {
        let config: FilePipelineConfig = toml::from_str(
            r#"
backends = ["a"]

[reasoning]
backends = []
"#,
        )
        .unwrap();
        assert!(config.to_pipeline_config().reasoning.backend_ids.is_empty());
    }
}
