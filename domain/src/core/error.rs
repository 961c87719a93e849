//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No analysis results to reconcile")]
    NoResults,

    #[error("Invalid pipeline transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_results_display() {
        assert_eq!(
            DomainError::NoResults.to_string(),
            "No analysis results to reconcile"
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = DomainError::InvalidTransition {
            from: "KNOWLEDGE_RUNNING".to_string(),
            event: "complete(data)".to_string(),
        };
        assert!(error.to_string().contains("KNOWLEDGE_RUNNING"));
    }
}
