//! Pipeline domain
//!
//! The fixed three-stage pipeline (Knowledge → Data → Reasoning), its
//! configuration, its per-invocation state machine and the provenance it
//! returns. Execution itself lives in the application layer.

pub mod config;
pub mod report;
pub mod stage;
pub mod state;
pub mod strategy;
pub mod validation;

pub use config::{PipelineConfig, StageConfig};
pub use report::{PipelineReport, StageReport};
pub use stage::Stage;
pub use state::{PipelineRun, PipelineState};
pub use strategy::{PipelineStrategy, StageContext};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
