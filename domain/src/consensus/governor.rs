//! Failure/timeout governor
//!
//! A stateless policy consulted by the orchestrator once a stage fan-out has
//! settled. A single success is enough for the stage to proceed.

use crate::analysis::{AnalysisResult, BackendFailure, FailureKind};
use crate::core::backend::BackendId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal state of one adapter task
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterOutcome {
    Success(AnalysisResult),
    Failed {
        backend_id: BackendId,
        failure: BackendFailure,
    },
}

impl AdapterOutcome {
    pub fn backend_id(&self) -> &BackendId {
        match self {
            AdapterOutcome::Success(result) => result.backend_id(),
            AdapterOutcome::Failed { backend_id, .. } => backend_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AdapterOutcome::Success(_))
    }
}

/// A backend that was excluded from a stage's consensus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedBackend {
    pub backend_id: BackendId,
    pub kind: FailureKind,
    pub message: String,
}

impl std::fmt::Display for FailedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}: {})", self.backend_id, self.kind, self.message)
    }
}

/// Governor classification of a settled fan-out
#[derive(Debug, Clone, PartialEq)]
pub struct GovernorVerdict {
    /// Successful results, in completion order
    pub successes: Vec<AnalysisResult>,
    pub failures: Vec<FailedBackend>,
    /// True only when every adapter of the stage errored or timed out
    pub all_failed: bool,
}

impl GovernorVerdict {
    pub fn timeout_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.kind == FailureKind::Timeout)
            .count()
    }
}

/// Shared partial-failure policy
pub struct FailureGovernor;

impl FailureGovernor {
    /// Split outcomes into successes and failures, preserving order
    pub fn assess(outcomes: Vec<AdapterOutcome>) -> GovernorVerdict {
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                AdapterOutcome::Success(result) => successes.push(result),
                AdapterOutcome::Failed {
                    backend_id,
                    failure,
                } => failures.push(FailedBackend {
                    backend_id,
                    kind: failure.kind,
                    message: failure.message,
                }),
            }
        }

        let all_failed = successes.is_empty();
        GovernorVerdict {
            successes,
            failures,
            all_failed,
        }
    }

    /// Per-call bound applied to every adapter of a stage
    pub fn call_deadline(timeout_ms: u64) -> Duration {
        Duration::from_millis(timeout_ms)
    }
}
