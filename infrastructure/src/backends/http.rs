//! HTTP backend adapter for OpenAI-compatible and Anthropic APIs

use super::error::BackendError;
use super::wire::{ANTHROPIC_VERSION, WireFormat};
use async_trait::async_trait;
use consensus_application::BackendAdapter;
use consensus_domain::util::truncate_str;
use consensus_domain::{AnalysisRequest, BackendFailure, BackendId, RawReply, StageConfig};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Base delay between attempts; grows linearly with the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Error bodies are cut to this many bytes
const ERROR_BODY_BYTES: usize = 512;

/// Adapter for a remote chat/messages API
///
/// The API key is resolved once at construction. The adapter keeps no
/// per-call state; the `reqwest::Client` only pools connections.
pub struct HttpBackendAdapter {
    id: BackendId,
    wire: WireFormat,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    max_retries: u32,
    client: reqwest::Client,
}

impl HttpBackendAdapter {
    pub fn new(
        id: impl Into<BackendId>,
        wire: WireFormat,
        model: impl Into<String>,
        base_url: &str,
        api_key: Option<String>,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            id: id.into(),
            wire,
            model: model.into(),
            endpoint: wire.endpoint(base_url),
            api_key,
            max_retries: 0,
            client,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, body: &Value) -> Result<String, BackendError> {
        let mut builder = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            builder = match self.wire {
                WireFormat::OpenAi => builder.bearer_auth(key),
                WireFormat::Anthropic => builder
                    .header("x-api-key", key)
                    .header("anthropic-version", ANTHROPIC_VERSION),
            };
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate_str(&body, ERROR_BODY_BYTES).to_string(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedReply(e.to_string()))?;
        self.wire.reply_text(body)
    }

    /// Retry transient failures; the caller bounds the total time
    async fn send_with_retry(&self, body: &Value) -> Result<String, BackendError> {
        let mut attempt = 0u32;
        loop {
            match self.send_once(body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Backend {} attempt {} failed, retrying: {}",
                        self.id, attempt, e
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl BackendAdapter for HttpBackendAdapter {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn invoke(&self, request: &AnalysisRequest, config: &StageConfig) -> RawReply {
        let started = Instant::now();
        let body = self.wire.request_body(&self.model, request, config);
        let deadline = Duration::from_millis(config.timeout_ms);

        debug!(
            backend = %self.id,
            model = %self.model,
            endpoint = %self.endpoint,
            "Sending request"
        );

        let outcome = tokio::time::timeout(deadline, self.send_with_retry(&body)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(text)) => RawReply::success(self.id.clone(), text, elapsed_ms),
            Ok(Err(e)) => {
                RawReply::failure(self.id.clone(), BackendFailure::error(e.to_string()), elapsed_ms)
            }
            Err(_) => RawReply::timeout(self.id.clone(), config.timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::FailureKind;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("Summarize the data", json!({"headcount": 12})).structured(true)
    }

    fn stage(timeout_ms: u64) -> StageConfig {
        StageConfig::new(["remote"]).with_timeout_ms(timeout_ms)
    }

    #[tokio::test]
    async fn test_openai_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-test",
                "max_tokens": 2048
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "{\"k\": 1}"}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let adapter = HttpBackendAdapter::new(
            "remote",
            WireFormat::OpenAi,
            "gpt-test",
            &server.url(),
            Some("test-key".to_string()),
        )
        .unwrap();

        let reply = adapter.invoke(&request(), &stage(5_000)).await;
        assert!(reply.is_success(), "{:?}", reply.error);
        assert_eq!(reply.text, "{\"k\": 1}");
        assert_eq!(reply.backend_id, BackendId::from("remote"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anthropic_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "msg_01",
                    "type": "message",
                    "role": "assistant",
                    "content": [{"type": "text", "text": "confidence: 80%"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let adapter = HttpBackendAdapter::new(
            "remote",
            WireFormat::Anthropic,
            "claude-test",
            &server.url(),
            Some("test-key".to_string()),
        )
        .unwrap();

        let reply = adapter.invoke(&request(), &stage(5_000)).await;
        assert!(reply.is_success());
        assert_eq!(reply.text, "confidence: 80%");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_captured() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .expect(2)
            .create_async()
            .await;

        let adapter =
            HttpBackendAdapter::new("remote", WireFormat::OpenAi, "gpt-test", &server.url(), None)
                .unwrap()
                .with_max_retries(1);

        let reply = adapter.invoke(&request(), &stage(5_000)).await;
        let failure = reply.error.expect("reply should carry the failure");
        assert_eq!(failure.kind, FailureKind::Error);
        assert!(failure.message.contains("HTTP 503"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("bad key")
            .expect(1)
            .create_async()
            .await;

        let adapter =
            HttpBackendAdapter::new("remote", WireFormat::OpenAi, "gpt-test", &server.url(), None)
                .unwrap()
                .with_max_retries(3);

        let reply = adapter.invoke(&request(), &stage(5_000)).await;
        assert!(reply.error.unwrap().message.contains("HTTP 401"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_captured() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let adapter =
            HttpBackendAdapter::new("remote", WireFormat::OpenAi, "gpt-test", &server.url(), None)
                .unwrap();

        let reply = adapter.invoke(&request(), &stage(5_000)).await;
        assert!(reply.error.unwrap().message.contains("malformed reply"));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let adapter =
            HttpBackendAdapter::new("remote", WireFormat::OpenAi, "gpt-test", &base_url, None)
                .unwrap();

        let started = Instant::now();
        let reply = adapter.invoke(&request(), &stage(100)).await;

        assert_eq!(reply.error.unwrap().kind, FailureKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }
}
