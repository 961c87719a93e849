//! Analysis request sent to every backend of a stage

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A backend-agnostic analysis request
///
/// Built once per stage by the pipeline strategy and handed unchanged to
/// every adapter of that stage. `stage_hints` are opaque to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Prompt text built for this stage
    pub prompt: String,
    /// Opaque domain data supplied by the caller
    pub payload: serde_json::Value,
    /// Whether replies must parse as a field→value mapping
    pub require_structured: bool,
    /// Pass-through metadata, never interpreted by the engine
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stage_hints: BTreeMap<String, String>,
}

impl AnalysisRequest {
    pub fn new(prompt: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            payload,
            require_structured: false,
            stage_hints: BTreeMap::new(),
        }
    }

    /// Require replies to be structured (JSON object) data
    pub fn structured(mut self, require: bool) -> Self {
        self.require_structured = require;
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.stage_hints.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = AnalysisRequest::new("Assess the team", json!({"team": "core"}))
            .structured(true)
            .with_hint("stage", "knowledge");

        assert!(request.require_structured);
        assert_eq!(request.stage_hints.get("stage").unwrap(), "knowledge");
        assert_eq!(request.payload["team"], "core");
    }

    #[test]
    fn test_defaults_to_unstructured() {
        let request = AnalysisRequest::new("q", json!(null));
        assert!(!request.require_structured);
        assert!(request.stage_hints.is_empty());
    }
}
