//! Backend adapter error types

use thiserror::Error;

/// Errors raised while building or calling a backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend '{backend}': environment variable {env} is not set")]
    MissingApiKey { backend: String, env: String },

    #[error("backend '{backend}': {reason}")]
    InvalidBackend { backend: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

impl BackendError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Transport(e) => !e.is_decode() && !e.is_builder(),
            BackendError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
