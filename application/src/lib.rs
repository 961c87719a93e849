//! Application layer for consensus-engine
//!
//! This crate contains the stage orchestrator use case, port definitions,
//! and engine-level configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::HeuristicsConfig;
pub use ports::{
    backend_adapter::{BackendAdapter, BackendRegistry},
    progress::{NoProgress, ProgressNotifier},
    run_logger::{NoRunLogger, RunEvent, RunLogger},
};
pub use use_cases::run_pipeline::{RunPipelineError, RunPipelineInput, RunPipelineUseCase};
