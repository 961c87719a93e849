//! Scored analysis result of one backend

use crate::core::backend::BackendId;
use crate::core::value::AnalysisValue;
use serde::{Deserialize, Serialize};

/// A successful backend reply after parsing and confidence extraction.
///
/// Fields are private: a result is never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    backend_id: BackendId,
    parsed_value: AnalysisValue,
    confidence: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    parse_failed: bool,
    #[serde(default)]
    elapsed_ms: u64,
}

impl AnalysisResult {
    pub fn new(backend_id: BackendId, parsed_value: AnalysisValue, confidence: f64) -> Self {
        Self {
            backend_id,
            parsed_value,
            confidence: confidence.clamp(0.0, 1.0),
            parse_failed: false,
            elapsed_ms: 0,
        }
    }

    /// Mark this result as a raw-text fallback for an unparseable structured reply
    pub fn with_parse_failure(mut self) -> Self {
        self.parse_failed = true;
        self
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn backend_id(&self) -> &BackendId {
        &self.backend_id
    }

    pub fn parsed_value(&self) -> &AnalysisValue {
        &self.parsed_value
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn parse_failed(&self) -> bool {
        self.parse_failed
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let result = AnalysisResult::new(BackendId::from("a"), "x".into(), 1.4);
        assert_eq!(result.confidence(), 1.0);
    }

    #[test]
    fn test_parse_failure_flag() {
        let result = AnalysisResult::new(BackendId::from("a"), "x".into(), 0.4)
            .with_parse_failure()
            .with_elapsed_ms(30);
        assert!(result.parse_failed());
        assert_eq!(result.elapsed_ms(), 30);
    }
}
