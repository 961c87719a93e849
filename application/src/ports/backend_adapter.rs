//! Backend adapter port
//!
//! Defines the interface for calling one analysis backend, and the registry
//! the orchestrator resolves stage backend ids against.

use async_trait::async_trait;
use consensus_domain::{AnalysisRequest, BackendId, RawReply, StageConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// One analysis backend
///
/// Implementations live in the infrastructure layer. `invoke` never fails:
/// remote errors and timeouts are captured in [`RawReply::error`]. Each
/// implementation enforces `config.timeout_ms` on its own and keeps no reply
/// state between calls.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Id this adapter is registered under
    fn id(&self) -> &BackendId;

    /// Send one request and normalize the reply
    async fn invoke(&self, request: &AnalysisRequest, config: &StageConfig) -> RawReply;
}

/// Explicitly constructed set of adapters, keyed by backend id
#[derive(Default, Clone)]
pub struct BackendRegistry {
    adapters: HashMap<BackendId, Arc<dyn BackendAdapter>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own id, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn BackendAdapter>) {
        self.adapters.insert(adapter.id().clone(), adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn BackendAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn get(&self, id: &BackendId) -> Option<Arc<dyn BackendAdapter>> {
        self.adapters.get(id).cloned()
    }

    pub fn contains(&self, id: &BackendId) -> bool {
        self.adapters.contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<BackendId> {
        let mut ids: Vec<_> = self.adapters.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(BackendId);

    #[async_trait]
    impl BackendAdapter for Echo {
        fn id(&self) -> &BackendId {
            &self.0
        }

        async fn invoke(&self, request: &AnalysisRequest, _config: &StageConfig) -> RawReply {
            RawReply::success(self.0.clone(), request.prompt.clone(), 0)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = BackendRegistry::new()
            .with_adapter(Arc::new(Echo(BackendId::from("b"))))
            .with_adapter(Arc::new(Echo(BackendId::from("a"))));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&BackendId::from("a")));
        assert!(registry.get(&BackendId::from("zzz")).is_none());
        assert_eq!(
            registry.ids(),
            vec![BackendId::from("a"), BackendId::from("b")]
        );
    }

    #[tokio::test]
    async fn test_registered_adapter_is_callable() {
        let registry = BackendRegistry::new().with_adapter(Arc::new(Echo(BackendId::from("a"))));
        let adapter = registry.get(&BackendId::from("a")).unwrap();

        let request = AnalysisRequest::new("hello", serde_json::json!({}));
        let reply = adapter.invoke(&request, &StageConfig::new(["a"])).await;
        assert!(reply.is_success());
        assert_eq!(reply.text, "hello");
    }
}
