//! Raw backend replies and failure classification

use crate::core::backend::BackendId;
use serde::{Deserialize, Serialize};

/// Why a backend call did not produce a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The adapter's deadline elapsed
    Timeout,
    /// Remote failure or malformed transport
    Error,
    /// The pipeline was cancelled while the call was in flight
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Error => "error",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A captured backend failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendFailure {
    pub fn timeout(after_ms: u64) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: format!("timed out after {}ms", after_ms),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Error,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            kind: FailureKind::Cancelled,
            message: "cancelled".to_string(),
        }
    }
}

impl std::fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Reply from a single backend, in the uniform shape every adapter produces.
///
/// `error` is present iff the call failed; `text` is empty in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReply {
    pub backend_id: BackendId,
    pub text: String,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BackendFailure>,
}

impl RawReply {
    pub fn success(backend_id: BackendId, text: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            backend_id,
            text: text.into(),
            elapsed_ms,
            error: None,
        }
    }

    pub fn failure(backend_id: BackendId, failure: BackendFailure, elapsed_ms: u64) -> Self {
        Self {
            backend_id,
            text: String::new(),
            elapsed_ms,
            error: Some(failure),
        }
    }

    pub fn timeout(backend_id: BackendId, after_ms: u64) -> Self {
        Self::failure(backend_id, BackendFailure::timeout(after_ms), after_ms)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_error() {
        let reply = RawReply::success(BackendId::from("a"), "ok", 12);
        assert!(reply.is_success());
        assert_eq!(reply.text, "ok");
    }

    #[test]
    fn test_timeout_reply() {
        let reply = RawReply::timeout(BackendId::from("a"), 500);
        assert!(!reply.is_success());
        let failure = reply.error.unwrap();
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.to_string(), "timeout: timed out after 500ms");
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FailureKind::Cancelled).unwrap(),
            r#""cancelled""#
        );
    }
}
