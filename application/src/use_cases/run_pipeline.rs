//! Run Pipeline use case
//!
//! The stage orchestrator. Runs Knowledge → Data → Reasoning; each stage
//! fans the same request out to its backends in parallel, waits for every
//! adapter to reach a terminal state, and reconciles the successes. A stage's
//! consensus is handed to the next stage's prompt builder.

use crate::config::HeuristicsConfig;
use crate::ports::backend_adapter::BackendRegistry;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use crate::use_cases::shared::check_cancelled;
use consensus_domain::util::truncate_str;
use consensus_domain::{
    AdapterOutcome, AnalysisRequest, AnalysisResult, BackendFailure, BackendId, ConfigIssue,
    ConsensusResult, ConsensusWarning, DomainError, FailedBackend, FailureGovernor,
    GovernorVerdict, PipelineConfig, PipelineReport, PipelineRun, PipelineStrategy, RawReply,
    Severity, Stage, StageConfig, StageContext, StageReport, parse_text_reply,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reply text kept in run log events
const REPLY_PREVIEW_BYTES: usize = 240;

/// Errors that can occur during a pipeline run
#[derive(Error, Debug)]
pub enum RunPipelineError {
    #[error("All backends failed in {stage} stage: {}", describe_failures(.failures))]
    AllBackendsFailed {
        stage: Stage,
        failures: Vec<FailedBackend>,
    },

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RunPipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunPipelineError::Cancelled)
    }
}

fn describe_failures(failures: &[FailedBackend]) -> String {
    if failures.is_empty() {
        return "no backend replied".to_string();
    }
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input for the RunPipeline use case
#[derive(Debug, Clone)]
pub struct RunPipelineInput {
    /// Caller's domain data, opaque to the engine
    pub payload: Value,
    pub config: PipelineConfig,
    /// Prompt builder and reply parser for this call
    pub strategy: PipelineStrategy,
}

impl RunPipelineInput {
    pub fn new(payload: Value, config: PipelineConfig) -> Self {
        Self {
            payload,
            config,
            strategy: PipelineStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: PipelineStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Use case for running the three-stage consensus pipeline
///
/// Holds no per-run state; concurrent `execute` calls are fully isolated.
pub struct RunPipelineUseCase {
    registry: Arc<BackendRegistry>,
    heuristics: HeuristicsConfig,
    cancellation_token: Option<CancellationToken>,
    run_logger: Arc<dyn RunLogger>,
}

impl RunPipelineUseCase {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            heuristics: HeuristicsConfig::default(),
            cancellation_token: None,
            run_logger: Arc::new(NoRunLogger),
        }
    }

    pub fn with_heuristics(mut self, heuristics: HeuristicsConfig) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_run_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.run_logger = logger;
        self
    }

    /// Run the pipeline with the default strategy and return the final consensus
    pub async fn execute(
        &self,
        payload: Value,
        config: PipelineConfig,
    ) -> Result<ConsensusResult, RunPipelineError> {
        let report = self
            .execute_with_report(RunPipelineInput::new(payload, config), &NoProgress)
            .await?;
        report
            .into_final_result()
            .ok_or(RunPipelineError::Domain(DomainError::NoResults))
    }

    /// Run the pipeline and return every stage's consensus with provenance
    pub async fn execute_with_report(
        &self,
        input: RunPipelineInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineReport, RunPipelineError> {
        self.check_config(&input.config)?;
        check_cancelled(&self.cancellation_token)?;

        let reconciler = self.heuristics.reconciler();
        let mut run = PipelineRun::start();
        let mut reports: Vec<StageReport> = Vec::with_capacity(Stage::ALL.len());

        for stage in Stage::ALL {
            let stage_config = input.config.stage(stage);
            let request = input.strategy.build_request(&StageContext {
                stage,
                payload: &input.payload,
                prior: &reports,
            });
            let structured = request.require_structured;

            let verdict = self
                .fan_out(stage, stage_config, request, &input.strategy, progress)
                .await?;

            if verdict.all_failed {
                run.fail(stage)?;
                warn!(
                    "Stage {}: all {} backends failed",
                    stage,
                    verdict.failures.len()
                );
                progress.on_stage_failed(stage);
                self.run_logger.log(RunEvent::new(
                    "pipeline_failed",
                    json!({
                        "stage": stage.as_str(),
                        "failures": verdict.failures,
                    }),
                ));
                return Err(RunPipelineError::AllBackendsFailed {
                    stage,
                    failures: verdict.failures,
                });
            }

            if !verdict.failures.is_empty() {
                info!(
                    "Stage {}: proceeding with {} of {} backends ({} timed out)",
                    stage,
                    verdict.successes.len(),
                    verdict.successes.len() + verdict.failures.len(),
                    verdict.timeout_count()
                );
            }

            let threshold = input.config.threshold_for(stage);
            let consensus = reconciler
                .reconcile(verdict.successes, structured)?
                .flag_below(threshold);

            if consensus.is_low_consensus() {
                warn!(
                    "Stage {}: low consensus {:.2} (threshold {:.2})",
                    stage,
                    consensus.consensus_score(),
                    threshold
                );
            }

            run.complete(stage)?;
            info!(
                "Stage {} done: {} via {} (score {:.2})",
                stage,
                consensus.backend_ids().join(", "),
                consensus.methodology(),
                consensus.consensus_score()
            );
            progress.on_stage_complete(stage, &consensus);
            self.run_logger.log(RunEvent::new(
                "stage_consensus",
                json!({
                    "stage": stage.as_str(),
                    "methodology": consensus.methodology(),
                    "consensus_score": consensus.consensus_score(),
                    "backends": consensus.backend_ids(),
                    "divergent_keys": consensus.divergent_keys(),
                    "warnings": consensus.warnings(),
                }),
            ));

            reports.push(StageReport::new(stage, consensus, verdict.failures));
            if !stage.is_final() {
                run.advance()?;
            }
        }

        let last = reports.pop().ok_or(DomainError::NoResults)?;
        let fact_basis = self
            .heuristics
            .validator()
            .inspect(last.consensus.final_value(), &input.payload);

        let mut consensus = last.consensus;
        if !fact_basis.speculative_terms.is_empty() {
            consensus = consensus.with_warning(ConsensusWarning::SpeculativeLanguage {
                terms: fact_basis.speculative_terms.clone(),
            });
        }
        if fact_basis.empty_source {
            consensus = consensus.with_warning(ConsensusWarning::EmptySource);
        }
        if !fact_basis.evidence_based || fact_basis.empty_source {
            warn!(
                "Final result may not be evidence-based (speculative: [{}], empty source: {})",
                fact_basis.speculative_terms.join(", "),
                fact_basis.empty_source
            );
        }

        self.run_logger.log(RunEvent::new(
            "pipeline_completed",
            json!({
                "final_value": consensus.final_value(),
                "consensus_score": consensus.consensus_score(),
                "evidence_based": fact_basis.evidence_based,
                "warnings": consensus.warnings(),
            }),
        ));

        reports.push(StageReport::new(last.stage, consensus, last.failures));
        Ok(PipelineReport::new(
            reports,
            fact_basis,
            run.history().to_vec(),
        ))
    }

    /// Refuse to start on any configuration error; warnings are logged
    fn check_config(&self, config: &PipelineConfig) -> Result<(), RunPipelineError> {
        let issues = config.validate(|id| self.registry.contains(id));

        for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
            warn!("{}", issue);
        }

        if ConfigIssue::has_errors(&issues) {
            let message = issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RunPipelineError::InvalidConfig(message));
        }
        Ok(())
    }

    /// Query every backend of a stage in parallel and classify the outcomes
    async fn fan_out(
        &self,
        stage: Stage,
        config: &StageConfig,
        request: AnalysisRequest,
        strategy: &PipelineStrategy,
        progress: &dyn ProgressNotifier,
    ) -> Result<GovernorVerdict, RunPipelineError> {
        info!(
            "Stage {}: querying {} backends",
            stage,
            config.backend_ids.len()
        );
        progress.on_stage_start(stage, config.backend_ids.len());
        self.run_logger.log(RunEvent::new(
            "stage_started",
            json!({
                "stage": stage.as_str(),
                "backends": config.backend_ids,
                "timeout_ms": config.timeout_ms,
            }),
        ));

        let structured = request.require_structured;
        let deadline = FailureGovernor::call_deadline(config.timeout_ms);
        let shared_request = Arc::new(request);
        let shared_config = Arc::new(config.clone());
        let mut join_set = JoinSet::new();
        let mut task_backends: HashMap<task::Id, BackendId> = HashMap::new();

        for backend_id in &config.backend_ids {
            let adapter = self.registry.get(backend_id).ok_or_else(|| {
                RunPipelineError::InvalidConfig(format!("unknown backend '{}'", backend_id))
            })?;
            let request = Arc::clone(&shared_request);
            let config = Arc::clone(&shared_config);
            let task_backend = backend_id.clone();

            let handle = join_set.spawn(async move {
                // Backstop for adapters that overrun their own deadline
                let reply = match tokio::time::timeout(deadline, adapter.invoke(&request, &config))
                    .await
                {
                    Ok(reply) => reply,
                    Err(_) => RawReply::timeout(task_backend.clone(), config.timeout_ms),
                };
                (task_backend, reply)
            });
            // Panicked tasks only report their task id
            task_backends.insert(handle.id(), backend_id.clone());
        }

        let mut outcomes = Vec::with_capacity(config.backend_ids.len());

        loop {
            let joined = if let Some(ref token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        join_set.abort_all();
                        info!("Stage {}: cancelled with {} backends in flight", stage, join_set.len());
                        return Err(RunPipelineError::Cancelled);
                    }
                    joined = join_set.join_next_with_id() => joined,
                }
            } else {
                join_set.join_next_with_id().await
            };

            let Some(joined) = joined else {
                break;
            };

            let outcome = match joined {
                Ok((_, (backend_id, reply))) => {
                    self.interpret(stage, backend_id, reply, structured, strategy)
                }
                Err(e) => {
                    let Some(backend_id) = task_backends.get(&e.id()).cloned() else {
                        warn!("Task join error for an untracked task: {}", e);
                        continue;
                    };
                    let message = if e.is_panic() {
                        "adapter task panicked"
                    } else {
                        "adapter task aborted"
                    };
                    let reply =
                        RawReply::failure(backend_id.clone(), BackendFailure::error(message), 0);
                    self.interpret(stage, backend_id, reply, structured, strategy)
                }
            };
            progress.on_backend_complete(stage, outcome.backend_id(), outcome.is_success());
            outcomes.push(outcome);
        }

        Ok(FailureGovernor::assess(outcomes))
    }

    /// Turn a raw reply into a scored result, or a classified failure
    fn interpret(
        &self,
        stage: Stage,
        backend_id: BackendId,
        reply: RawReply,
        structured: bool,
        strategy: &PipelineStrategy,
    ) -> AdapterOutcome {
        let failure = match reply.error {
            Some(failure) => Some(failure),
            None if reply.text.trim().is_empty() => Some(BackendFailure::error("empty reply")),
            None => None,
        };

        if let Some(failure) = failure {
            warn!("Backend {} failed: {}", backend_id, failure);
            self.run_logger.log(RunEvent::new(
                "backend_reply",
                json!({
                    "stage": stage.as_str(),
                    "backend": backend_id,
                    "success": false,
                    "elapsed_ms": reply.elapsed_ms,
                    "error": failure,
                }),
            ));
            return AdapterOutcome::Failed {
                backend_id,
                failure,
            };
        }

        let extractor = self.heuristics.extractor();
        let result = if structured {
            match strategy.parse(&reply.text) {
                Ok(value) => {
                    AnalysisResult::new(backend_id, value, extractor.extract(&reply.text))
                }
                Err(e) => {
                    warn!("Backend {} reply kept as raw text: {}", backend_id, e);
                    AnalysisResult::new(
                        backend_id,
                        parse_text_reply(&reply.text),
                        extractor.extract_unparsed(&reply.text),
                    )
                    .with_parse_failure()
                }
            }
        } else {
            AnalysisResult::new(
                backend_id,
                parse_text_reply(&reply.text),
                extractor.extract(&reply.text),
            )
        };
        let result = result.with_elapsed_ms(reply.elapsed_ms);

        debug!(
            "Backend {} replied in {}ms (confidence {:.2})",
            result.backend_id(),
            reply.elapsed_ms,
            result.confidence()
        );
        self.run_logger.log(RunEvent::new(
            "backend_reply",
            json!({
                "stage": stage.as_str(),
                "backend": result.backend_id(),
                "success": true,
                "elapsed_ms": reply.elapsed_ms,
                "confidence": result.confidence(),
                "parse_failed": result.parse_failed(),
                "preview": truncate_str(&reply.text, REPLY_PREVIEW_BYTES),
            }),
        ));

        AdapterOutcome::Success(result)
    }
}
