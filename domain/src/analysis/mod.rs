//! Analysis request/reply value objects.
//!
//! These types carry a single backend round-trip:
//! - [`AnalysisRequest`] - what a stage asks every backend
//! - [`RawReply`] - what one backend answered (or why it did not)
//! - [`AnalysisResult`] - a successful reply, parsed and scored

pub mod reply;
pub mod request;
pub mod result;

pub use reply::{BackendFailure, FailureKind, RawReply};
pub use request::AnalysisRequest;
pub use result::AnalysisResult;
