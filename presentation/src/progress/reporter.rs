//! Progress reporting for pipeline runs

use colored::Colorize;
use consensus_application::ProgressNotifier;
use consensus_domain::{BackendId, ConsensusResult, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a pipeline run with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: Stage) -> String {
        format!("Stage {}: {}", stage.number(), stage.display_name())
    }

    fn stage_short_name(stage: Stage) -> String {
        format!("Stage {}", stage.number())
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.stage_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.stage_bar.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, total_backends: usize) {
        let pb = self.multi.add(ProgressBar::new(total_backends as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_display_name(stage));
        pb.set_message("Starting...");

        if let Ok(mut guard) = self.stage_bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_backend_complete(&self, _stage: Stage, backend: &BackendId, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} {}", "v".green(), backend)
            } else {
                format!("{} {}", "x".red(), backend)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_stage_complete(&self, stage: Stage, consensus: &ConsensusResult) {
        if let Some(pb) = self.take_bar() {
            pb.finish_with_message(format!(
                "{} complete (consensus {:.2})",
                Self::stage_short_name(stage).green(),
                consensus.consensus_score()
            ));
        }
    }

    fn on_stage_failed(&self, stage: Stage) {
        if let Some(pb) = self.take_bar() {
            pb.abandon_with_message(format!(
                "{} failed: every backend errored",
                Self::stage_short_name(stage).red()
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, total_backends: usize) {
        eprintln!(
            "{} {} ({} backends)",
            "->".cyan(),
            ProgressReporter::stage_display_name(stage).bold(),
            total_backends
        );
    }

    fn on_backend_complete(&self, _stage: Stage, backend: &BackendId, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), backend);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), backend);
        }
    }

    fn on_stage_complete(&self, _stage: Stage, consensus: &ConsensusResult) {
        eprintln!("  consensus {:.2}", consensus.consensus_score());
        eprintln!();
    }

    fn on_stage_failed(&self, stage: Stage) {
        eprintln!("  {} {} failed", "x".red(), stage.display_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::{AnalysisResult, AnalysisValue, Reconciler};

    fn consensus() -> ConsensusResult {
        let result = AnalysisResult::new(BackendId::new("alpha"), AnalysisValue::from("ok"), 0.8);
        Reconciler::default().reconcile(vec![result], false).unwrap()
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(
            ProgressReporter::stage_display_name(Stage::Data),
            "Stage 2: Data"
        );
        assert_eq!(ProgressReporter::stage_short_name(Stage::Reasoning), "Stage 3");
    }

    #[test]
    fn test_reporter_lifecycle_clears_bar() {
        let reporter = ProgressReporter::new();
        let backend = BackendId::new("alpha");

        reporter.on_stage_start(Stage::Knowledge, 2);
        reporter.on_backend_complete(Stage::Knowledge, &backend, true);
        reporter.on_backend_complete(Stage::Knowledge, &backend, false);
        {
            let guard = reporter.stage_bar.lock().unwrap();
            assert_eq!(guard.as_ref().map(|pb| pb.position()), Some(2));
        }

        reporter.on_stage_complete(Stage::Knowledge, &consensus());
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_failed_stage_clears_bar() {
        let reporter = ProgressReporter::new();
        reporter.on_stage_start(Stage::Data, 1);
        reporter.on_stage_failed(Stage::Data);
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_backend_complete_without_stage_is_ignored() {
        let reporter = ProgressReporter::new();
        reporter.on_backend_complete(Stage::Data, &BackendId::new("alpha"), true);
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }
}
