//! Consensus result types
//!
//! A [`ConsensusResult`] is the reconciled answer of one stage. It is
//! immutable once produced; warnings are attached by consuming the value.

use crate::analysis::AnalysisResult;
use crate::core::error::DomainError;
use crate::core::value::AnalysisValue;
use serde::{Deserialize, Serialize};

/// How the final value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Methodology {
    /// Exactly one backend contributed; no merge logic ran
    #[serde(rename = "single-backend")]
    SingleBackend,
    /// Several backends contributed and were merged
    #[serde(rename = "multi-backend-merge")]
    MultiBackendMerge,
}

impl Methodology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Methodology::SingleBackend => "single-backend",
            Methodology::MultiBackendMerge => "multi-backend-merge",
        }
    }
}

impl std::fmt::Display for Methodology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Non-fatal annotation on a consensus result.
///
/// A flagged result is still usable; callers decide how much to trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsensusWarning {
    /// `consensus_score` fell below the configured threshold
    LowConsensus { score: f64, threshold: f64 },
    /// The fact-basis validator found speculative qualifiers
    SpeculativeLanguage { terms: Vec<String> },
    /// The caller supplied no source data, so nothing backs the value
    EmptySource,
}

impl std::fmt::Display for ConsensusWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusWarning::LowConsensus { score, threshold } => write!(
                f,
                "low consensus: score {:.2} below threshold {:.2}",
                score, threshold
            ),
            ConsensusWarning::SpeculativeLanguage { terms } => {
                write!(f, "speculative language: {}", terms.join(", "))
            }
            ConsensusWarning::EmptySource => write!(f, "no source data supplied"),
        }
    }
}

/// Reconciled answer of one stage, with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    final_value: AnalysisValue,
    consensus_score: f64,
    /// Completion order of the contributing backends
    contributing_results: Vec<AnalysisResult>,
    methodology: Methodology,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    divergent_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<ConsensusWarning>,
}

impl ConsensusResult {
    /// Build a result; refuses an empty contributor list.
    pub(crate) fn new(
        final_value: AnalysisValue,
        consensus_score: f64,
        contributing_results: Vec<AnalysisResult>,
        methodology: Methodology,
        divergent_keys: Vec<String>,
    ) -> Result<Self, DomainError> {
        if contributing_results.is_empty() {
            return Err(DomainError::NoResults);
        }
        Ok(Self {
            final_value,
            consensus_score: consensus_score.clamp(0.0, 1.0),
            contributing_results,
            methodology,
            divergent_keys,
            warnings: Vec::new(),
        })
    }

    /// Attach a [`ConsensusWarning::LowConsensus`] if the score is below `threshold`
    pub fn flag_below(self, threshold: f64) -> Self {
        if self.consensus_score < threshold {
            let score = self.consensus_score;
            self.with_warning(ConsensusWarning::LowConsensus { score, threshold })
        } else {
            self
        }
    }

    pub fn with_warning(mut self, warning: ConsensusWarning) -> Self {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
        self
    }

    pub fn final_value(&self) -> &AnalysisValue {
        &self.final_value
    }

    pub fn consensus_score(&self) -> f64 {
        self.consensus_score
    }

    pub fn contributing_results(&self) -> &[AnalysisResult] {
        &self.contributing_results
    }

    pub fn methodology(&self) -> Methodology {
        self.methodology
    }

    pub fn divergent_keys(&self) -> &[String] {
        &self.divergent_keys
    }

    pub fn warnings(&self) -> &[ConsensusWarning] {
        &self.warnings
    }

    pub fn is_low_consensus(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ConsensusWarning::LowConsensus { .. }))
    }

    /// Usable but flagged: any warning is attached
    pub fn is_flagged(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Ids of the contributing backends, in completion order
    pub fn backend_ids(&self) -> Vec<String> {
        self.contributing_results
            .iter()
            .map(|r| r.backend_id().to_string())
            .collect()
    }
}
