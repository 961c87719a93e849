//! Per-invocation pipeline state machine
//!
//! ```text
//! KNOWLEDGE_RUNNING → KNOWLEDGE_DONE → DATA_RUNNING → DATA_DONE
//!        │                                  │
//!        ▼                                  ▼            REASONING_RUNNING → REASONING_DONE
//!      FAILED ◀──────────────────────────────────────────────────┘
//! ```
//!
//! One [`PipelineRun`] exists per call; nothing is shared across calls.

use super::stage::Stage;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// State of a pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    Running(Stage),
    Done(Stage),
    /// Terminal failure reached from the given stage's running state
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Done(Stage::Reasoning) | PipelineState::Failed(_)
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineState::Done(Stage::Reasoning))
    }

    pub fn label(&self) -> String {
        match self {
            PipelineState::Running(stage) => format!("{}_RUNNING", stage.as_str().to_uppercase()),
            PipelineState::Done(stage) => format!("{}_DONE", stage.as_str().to_uppercase()),
            PipelineState::Failed(_) => "FAILED".to_string(),
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tracks the state of one invocation together with its history
#[derive(Debug, Clone)]
pub struct PipelineRun {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::start()
    }
}

impl PipelineRun {
    /// A fresh run in `KNOWLEDGE_RUNNING`
    pub fn start() -> Self {
        let state = PipelineState::Running(Stage::Knowledge);
        Self {
            state,
            history: vec![state],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// The stage currently running, if any
    pub fn running_stage(&self) -> Option<Stage> {
        match self.state {
            PipelineState::Running(stage) => Some(stage),
            _ => None,
        }
    }

    /// `X_RUNNING → X_DONE`: the stage produced at least one success
    pub fn complete(&mut self, stage: Stage) -> Result<PipelineState, DomainError> {
        match self.state {
            PipelineState::Running(current) if current == stage => {
                self.transition(PipelineState::Done(stage))
            }
            _ => Err(self.invalid(format!("complete({})", stage.as_str()))),
        }
    }

    /// `X_DONE → NEXT_RUNNING`
    pub fn advance(&mut self) -> Result<PipelineState, DomainError> {
        match self.state {
            PipelineState::Done(stage) => match stage.next() {
                Some(next) => self.transition(PipelineState::Running(next)),
                None => Err(self.invalid("advance".to_string())),
            },
            _ => Err(self.invalid("advance".to_string())),
        }
    }

    /// `X_RUNNING → FAILED`: the stage had zero successes
    pub fn fail(&mut self, stage: Stage) -> Result<PipelineState, DomainError> {
        match self.state {
            PipelineState::Running(current) if current == stage => {
                self.transition(PipelineState::Failed(stage))
            }
            _ => Err(self.invalid(format!("fail({})", stage.as_str()))),
        }
    }

    fn transition(&mut self, next: PipelineState) -> Result<PipelineState, DomainError> {
        self.state = next;
        self.history.push(next);
        Ok(next)
    }

    fn invalid(&self, event: String) -> DomainError {
        DomainError::InvalidTransition {
            from: self.state.label(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut run = PipelineRun::start();
        for stage in Stage::ALL {
            assert_eq!(run.running_stage(), Some(stage));
            run.complete(stage).unwrap();
            if !stage.is_final() {
                run.advance().unwrap();
            }
        }

        assert!(run.state().is_success());
        assert!(run.state().is_terminal());
        let labels: Vec<_> = run.history().iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec![
                "KNOWLEDGE_RUNNING",
                "KNOWLEDGE_DONE",
                "DATA_RUNNING",
                "DATA_DONE",
                "REASONING_RUNNING",
                "REASONING_DONE"
            ]
        );
    }

    #[test]
    fn test_fail_from_running() {
        let mut run = PipelineRun::start();
        run.complete(Stage::Knowledge).unwrap();
        run.advance().unwrap();
        run.fail(Stage::Data).unwrap();

        assert_eq!(run.state(), PipelineState::Failed(Stage::Data));
        assert!(run.state().is_terminal());
        assert!(!run.state().is_success());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut run = PipelineRun::start();
        assert!(run.complete(Stage::Data).is_err());
        assert!(run.advance().is_err());

        run.complete(Stage::Knowledge).unwrap();
        assert!(run.fail(Stage::Knowledge).is_err());
        assert!(run.complete(Stage::Knowledge).is_err());
    }

    #[test]
    fn test_no_advance_past_reasoning() {
        let mut run = PipelineRun::start();
        for stage in Stage::ALL {
            run.complete(stage).unwrap();
            if !stage.is_final() {
                run.advance().unwrap();
            }
        }
        let err = run.advance().unwrap_err();
        assert!(err.to_string().contains("REASONING_DONE"));
    }
}
