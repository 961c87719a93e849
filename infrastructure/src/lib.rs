//! Infrastructure layer for consensus-engine
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backends;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use backends::{
    BackendError, BackendFactory, FixtureBackendAdapter, HttpBackendAdapter, WireFormat,
};
pub use config::{
    BackendKind, ConfigLoader, FileBackendConfig, FileConfig, FileOutputConfig, FileOutputFormat,
    FilePipelineConfig, FileStageConfig,
};
pub use logging::JsonlRunLogger;
