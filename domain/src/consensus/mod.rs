//! Consensus domain
//!
//! The pure half of the engine: everything that turns a set of backend
//! replies into one trustworthy answer without touching the network.
//!
//! # Flow
//!
//! ```text
//! RawReply ──parse──▶ AnalysisValue ──ConfidenceExtractor──▶ AnalysisResult
//!                                                               │
//!                           FailureGovernor (≥1 success?) ◀─────┘
//!                                     │
//!                                Reconciler ──▶ ConsensusResult ──FactBasisValidator──▶ flags
//! ```
//!
//! Every function here is deterministic: given the same set of results the
//! reconciler produces the same value regardless of arrival order.

pub mod confidence;
pub mod fact_basis;
pub mod governor;
pub mod parsing;
pub mod reconciler;
pub mod result;

pub use confidence::{ConfidenceExtractor, ConfidencePolicy};
pub use fact_basis::{FactBasisValidator, FactBasisVerdict};
pub use governor::{AdapterOutcome, FailedBackend, FailureGovernor, GovernorVerdict};
pub use parsing::{ParseFailure, parse_structured_reply, parse_text_reply};
pub use reconciler::{ReconcilePolicy, Reconciler};
pub use result::{ConsensusResult, ConsensusWarning, Methodology};
