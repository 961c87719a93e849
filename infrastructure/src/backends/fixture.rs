//! Offline backend adapter with a canned reply

use async_trait::async_trait;
use consensus_application::BackendAdapter;
use consensus_domain::{AnalysisRequest, BackendFailure, BackendId, RawReply, StageConfig};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum FixtureOutcome {
    Reply(String),
    Fail(String),
}

/// Adapter that answers every request with the same configured outcome
///
/// Used for offline runs and tests. The simulated delay is bounded by the
/// stage timeout like any remote call.
#[derive(Debug, Clone)]
pub struct FixtureBackendAdapter {
    id: BackendId,
    outcome: FixtureOutcome,
    delay: Duration,
}

impl FixtureBackendAdapter {
    pub fn replying(id: impl Into<BackendId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: FixtureOutcome::Reply(text.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(id: impl Into<BackendId>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: FixtureOutcome::Fail(message.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl BackendAdapter for FixtureBackendAdapter {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn invoke(&self, _request: &AnalysisRequest, config: &StageConfig) -> RawReply {
        let started = Instant::now();
        let deadline = Duration::from_millis(config.timeout_ms);

        if tokio::time::timeout(deadline, tokio::time::sleep(self.delay))
            .await
            .is_err()
        {
            return RawReply::timeout(self.id.clone(), config.timeout_ms);
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &self.outcome {
            FixtureOutcome::Reply(text) => RawReply::success(self.id.clone(), text.clone(), elapsed_ms),
            FixtureOutcome::Fail(message) => RawReply::failure(
                self.id.clone(),
                BackendFailure::error(message.clone()),
                elapsed_ms,
            ),
        }
    }
}
