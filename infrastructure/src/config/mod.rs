//! Configuration file loading for consensus-engine
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./consensus.toml` or `./.consensus.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/consensus-engine/config.toml`
//! 4. Fallback: `~/.config/consensus-engine/config.toml`
//! 5. Default values
//!
//! Environment variables are never merged; only adapters read API keys.

mod file_config;
mod loader;

pub use file_config::{
    BackendKind, FileBackendConfig, FileConfig, FileOutputConfig, FileOutputFormat,
    FilePipelineConfig, FileStageConfig,
};
pub use loader::ConfigLoader;
