//! Builds adapters and registries from `[backends.<id>]` configuration

use super::error::BackendError;
use super::fixture::FixtureBackendAdapter;
use super::http::HttpBackendAdapter;
use super::wire::WireFormat;
use crate::config::{BackendKind, FileBackendConfig};
use consensus_application::{BackendAdapter, BackendRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Constructs backend adapters from configuration
pub struct BackendFactory;

impl BackendFactory {
    /// Build one adapter; API keys are read from the environment here, once
    pub fn create(
        id: &str,
        config: &FileBackendConfig,
    ) -> Result<Arc<dyn BackendAdapter>, BackendError> {
        let wire = match config.kind {
            BackendKind::OpenAi => WireFormat::OpenAi,
            BackendKind::Anthropic => WireFormat::Anthropic,
            BackendKind::Fixture => return Self::fixture(id, config),
        };

        if config.model.trim().is_empty() {
            return Err(BackendError::InvalidBackend {
                backend: id.to_string(),
                reason: format!("{} backend requires a model", config.kind.as_str()),
            });
        }

        let api_key = match config.api_key_env() {
            Some(env) => Some(std::env::var(env).map_err(|_| BackendError::MissingApiKey {
                backend: id.to_string(),
                env: env.to_string(),
            })?),
            None => None,
        };

        let adapter = HttpBackendAdapter::new(
            id,
            wire,
            config.model.clone(),
            config.base_url(),
            api_key,
        )?
        .with_max_retries(config.max_retries);

        debug!(
            "Backend {}: {} model {} at {}",
            id,
            config.kind.as_str(),
            config.model,
            adapter.endpoint()
        );
        Ok(Arc::new(adapter))
    }

    fn fixture(id: &str, config: &FileBackendConfig) -> Result<Arc<dyn BackendAdapter>, BackendError> {
        let adapter = match (&config.fail, &config.reply) {
            (Some(message), _) => FixtureBackendAdapter::failing(id, message.clone()),
            (None, Some(reply)) => FixtureBackendAdapter::replying(id, reply.clone()),
            (None, None) => {
                return Err(BackendError::InvalidBackend {
                    backend: id.to_string(),
                    reason: "fixture backend requires `reply` or `fail`".to_string(),
                });
            }
        };
        Ok(Arc::new(
            adapter.with_delay(Duration::from_millis(config.delay_ms)),
        ))
    }

    /// Build a registry holding every configured backend
    pub fn build_registry(
        backends: &BTreeMap<String, FileBackendConfig>,
    ) -> Result<BackendRegistry, BackendError> {
        let mut registry = BackendRegistry::new();
        for (id, config) in backends {
            registry.register(Self::create(id, config)?);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::{AnalysisRequest, BackendId, StageConfig};

    #[test]
    fn test_build_registry_from_fixtures() {
        let mut backends = BTreeMap::new();
        backends.insert("a".to_string(), FileBackendConfig::fixture("{}"));
        backends.insert("b".to_string(), FileBackendConfig::fixture("{}"));

        let registry = BackendFactory::build_registry(&backends).unwrap();
        assert_eq!(registry.ids(), vec![BackendId::from("a"), BackendId::from("b")]);
    }

    #[test]
    fn test_remote_backend_with_explicit_key_env() {
        let mut config = FileBackendConfig::new(BackendKind::OpenAi);
        config.model = "gpt-test".to_string();
        config.base_url = Some("http://localhost:1/v1".to_string());
        config.api_key_env = Some("PATH".to_string());

        let adapter = BackendFactory::create("remote", &config).unwrap();
        assert_eq!(adapter.id().as_str(), "remote");
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let mut config = FileBackendConfig::new(BackendKind::Anthropic);
        config.model = "claude-test".to_string();
        config.api_key_env = Some("CONSENSUS_ENGINE_TEST_UNSET_KEY".to_string());

        match BackendFactory::create("claude", &config) {
            Err(BackendError::MissingApiKey { backend, env }) => {
                assert_eq!(backend, "claude");
                assert_eq!(env, "CONSENSUS_ENGINE_TEST_UNSET_KEY");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected MissingApiKey"),
        }
    }

    #[test]
    fn test_remote_backend_requires_model() {
        let config = FileBackendConfig::new(BackendKind::OpenAi);
        assert!(matches!(
            BackendFactory::create("gpt", &config),
            Err(BackendError::InvalidBackend { .. })
        ));
    }

    #[tokio::test]
    async fn test_fixture_failure_takes_precedence() {
        let mut config = FileBackendConfig::fixture("{}");
        config.fail = Some("down".to_string());

        let adapter = BackendFactory::create("f", &config).unwrap();
        let reply = adapter
            .invoke(&AnalysisRequest::new("q", serde_json::json!({})), &StageConfig::new(["f"]))
            .await;
        assert_eq!(reply.error.unwrap().message, "down");
    }
}
