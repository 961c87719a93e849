//! Port for structured run logging.
//!
//! Defines the [`RunLogger`] trait for recording pipeline events (stage
//! boundaries, backend replies, consensus outcomes) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the run's
//! provenance in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured pipeline event for logging.
pub struct RunEvent {
    /// Event type identifier (e.g., "stage_started", "backend_reply").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging pipeline events to a structured log.
///
/// `log` is synchronous and non-fallible; logging failures never disturb a run.
pub trait RunLogger: Send + Sync {
    /// Record a pipeline event.
    fn log(&self, event: RunEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoRunLogger;

impl RunLogger for NoRunLogger {
    fn log(&self, _event: RunEvent) {}
}
