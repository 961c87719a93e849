//! Shared utilities for use cases.

use crate::use_cases::run_pipeline::RunPipelineError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunPipelineError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunPipelineError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunPipelineError::Cancelled);
    }
    Ok(())
}
