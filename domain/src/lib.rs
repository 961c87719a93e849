//! Domain layer for consensus-engine
//!
//! This crate contains the pure core of the multi-backend consensus engine:
//! value types, confidence heuristics, reconciliation rules and the pipeline
//! state machine. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Consensus
//!
//! The same question is sent to several independent backends. Their replies
//! are scored ([`ConfidenceExtractor`]), filtered ([`FailureGovernor`]) and
//! merged ([`Reconciler`]) into one [`ConsensusResult`], much like quorum
//! read repair in a replicated store.
//!
//! ## Pipeline
//!
//! Three stages run in order: Knowledge → Data → Reasoning. Each stage's
//! consensus becomes context for the next; the last one is checked by the
//! [`FactBasisValidator`] before it is returned.

pub mod analysis;
pub mod config;
pub mod consensus;
pub mod core;
pub mod pipeline;
pub mod prompt;
pub mod util;

// Re-export commonly used types
pub use analysis::{AnalysisRequest, AnalysisResult, BackendFailure, FailureKind, RawReply};
pub use consensus::{
    AdapterOutcome, ConfidenceExtractor, ConfidencePolicy, ConsensusResult, ConsensusWarning,
    FactBasisValidator, FactBasisVerdict, FailedBackend, FailureGovernor, GovernorVerdict,
    Methodology, ParseFailure, ReconcilePolicy, Reconciler, parse_structured_reply,
    parse_text_reply,
};
pub use config::OutputFormat;
pub use core::{backend::BackendId, error::DomainError, value::AnalysisValue};
pub use pipeline::{
    ConfigIssue, ConfigIssueCode, PipelineConfig, PipelineReport, PipelineRun, PipelineState,
    PipelineStrategy, Severity, Stage, StageConfig, StageContext, StageReport,
};
pub use prompt::PromptTemplate;
