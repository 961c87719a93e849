//! Configuration validation issues.
//!
//! Some pipeline configurations cannot work at all (no backends, unknown
//! backend ids, zero timeouts); others work but may not behave as expected.
//! Validation returns structured issues with severity levels instead of
//! failing on the first problem.

use super::stage::Stage;
use crate::core::backend::BackendId;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    EmptyBackendSet { stage: Stage },
    UnknownBackend { stage: Stage, backend: BackendId },
    ZeroTimeout { stage: Stage },
    ZeroMaxOutputSize { stage: Stage },
    TemperatureOutOfRange { stage: Stage },
    ThresholdOutOfRange { field: String },
    /// A `[backends.<id>]` entry could not be turned into an adapter
    InvalidBackend { backend: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(severity: Severity, code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Whether any issue is fatal
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
