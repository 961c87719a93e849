//! Pipeline provenance: what each stage concluded and who was excluded.

use super::stage::Stage;
use super::state::PipelineState;
use crate::consensus::{ConsensusResult, FactBasisVerdict, FailedBackend};
use serde::{Deserialize, Serialize};

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub consensus: ConsensusResult,
    /// Backends excluded from this stage's consensus
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedBackend>,
}

impl StageReport {
    pub fn new(stage: Stage, consensus: ConsensusResult, failures: Vec<FailedBackend>) -> Self {
        Self {
            stage,
            consensus,
            failures,
        }
    }
}

/// Complete result of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Knowledge, Data and Reasoning, in order
    pub stages: Vec<StageReport>,
    /// Fact-basis verdict on the final value
    pub fact_basis: FactBasisVerdict,
    /// States the run went through
    pub transitions: Vec<PipelineState>,
}

impl PipelineReport {
    pub fn new(
        stages: Vec<StageReport>,
        fact_basis: FactBasisVerdict,
        transitions: Vec<PipelineState>,
    ) -> Self {
        Self {
            stages,
            fact_basis,
            transitions,
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// The reasoning stage's consensus
    pub fn final_result(&self) -> Option<&ConsensusResult> {
        self.stage(Stage::Reasoning).map(|s| &s.consensus)
    }

    pub fn into_final_result(self) -> Option<ConsensusResult> {
        self.stages
            .into_iter()
            .find(|s| s.stage == Stage::Reasoning)
            .map(|s| s.consensus)
    }

    /// Every backend failure across all stages
    pub fn all_failures(&self) -> impl Iterator<Item = (Stage, &FailedBackend)> {
        self.stages
            .iter()
            .flat_map(|s| s.failures.iter().map(move |f| (s.stage, f)))
    }
}
