//! Use cases (application services)

pub mod run_pipeline;
pub(crate) mod shared;
