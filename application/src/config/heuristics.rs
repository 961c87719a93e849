//! Heuristic constants used by the consensus core.
//!
//! The defaults are the engine's documented behavior; a `[heuristics]`
//! configuration section may override any of them.

use consensus_domain::{
    ConfidenceExtractor, ConfidencePolicy, FactBasisValidator, ReconcilePolicy, Reconciler,
    consensus::fact_basis::SPECULATIVE_TERMS,
};
use serde::{Deserialize, Serialize};

/// Tunable heuristics for confidence, reconciliation and fact-basis checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub confidence: ConfidencePolicy,
    pub reconcile: ReconcilePolicy,
    /// Qualifiers the fact-basis validator treats as speculative
    pub speculative_terms: Vec<String>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidencePolicy::default(),
            reconcile: ReconcilePolicy::default(),
            speculative_terms: SPECULATIVE_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl HeuristicsConfig {
    pub fn extractor(&self) -> ConfidenceExtractor {
        ConfidenceExtractor::new(self.confidence)
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.reconcile)
    }

    pub fn validator(&self) -> FactBasisValidator {
        FactBasisValidator::with_vocabulary(self.speculative_terms.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::AnalysisValue;

    #[test]
    fn test_defaults_match_domain_policies() {
        let heuristics = HeuristicsConfig::default();
        assert_eq!(heuristics.confidence.base, 0.7);
        assert_eq!(heuristics.reconcile.disagreement_penalty, 0.85);
        assert!(heuristics.speculative_terms.iter().any(|t| t == "might be"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let heuristics: HeuristicsConfig =
            serde_json::from_str(r#"{"confidence": {"floor": 0.2}}"#).unwrap();
        assert_eq!(heuristics.confidence.floor, 0.2);
        assert_eq!(heuristics.confidence.ceiling, 0.95);
        assert_eq!(heuristics.reconcile, ReconcilePolicy::default());
    }

    #[test]
    fn test_custom_vocabulary_reaches_validator() {
        let heuristics = HeuristicsConfig {
            speculative_terms: vec!["rumour".to_string()],
            ..Default::default()
        };
        let validator = heuristics.validator();
        let payload = serde_json::json!({"x": 1});
        assert!(!validator.validate(&AnalysisValue::from("a rumour says"), &payload));
        assert!(validator.validate(&AnalysisValue::from("probably fine"), &payload));
    }
}
