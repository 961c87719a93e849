//! Engine-level configuration consumed by use cases

mod heuristics;

pub use heuristics::HeuristicsConfig;
