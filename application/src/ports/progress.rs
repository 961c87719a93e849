//! Progress notification port
//!
//! Defines the interface for reporting progress during a pipeline run.

use consensus_domain::{BackendId, ConsensusResult, Stage};

/// Callback for progress updates during a pipeline run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage's fan-out starts
    fn on_stage_start(&self, stage: Stage, total_backends: usize);

    /// Called when one backend of the stage reaches a terminal state
    fn on_backend_complete(&self, stage: Stage, backend: &BackendId, success: bool);

    /// Called when a stage produced its consensus
    fn on_stage_complete(&self, stage: Stage, consensus: &ConsensusResult);

    /// Called when every backend of a stage failed
    fn on_stage_failed(&self, _stage: Stage) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total_backends: usize) {}
    fn on_backend_complete(&self, _stage: Stage, _backend: &BackendId, _success: bool) {}
    fn on_stage_complete(&self, _stage: Stage, _consensus: &ConsensusResult) {}
}
