//! Port definitions (interfaces for external dependencies)
//!
//! Ports define how the application layer interacts with the outside world.
//! Adapters in the infrastructure layer implement these ports.

pub mod backend_adapter;
pub mod progress;
pub mod run_logger;
