//! Backend definitions from TOML (`[backends.<id>]` tables)

use consensus_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Which adapter serves a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI-compatible chat completions API
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Canned reply, no network
    Fixture,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
            BackendKind::Fixture => "fixture",
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, BackendKind::Fixture)
    }
}

fn default_max_retries() -> u32 {
    1
}

/// Raw backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBackendConfig {
    pub kind: BackendKind,
    /// Remote model name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// API base URL (kind-specific default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Environment variable holding the API key (kind-specific default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Extra attempts on transport errors, HTTP 5xx and 429
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixture: reply text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Fixture: simulated latency
    #[serde(default)]
    pub delay_ms: u64,
    /// Fixture: fail with this message instead of replying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
}

impl FileBackendConfig {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            model: String::new(),
            base_url: None,
            api_key_env: None,
            max_retries: default_max_retries(),
            reply: None,
            delay_ms: 0,
            fail: None,
        }
    }

    /// A fixture backend answering `reply`
    pub fn fixture(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::new(BackendKind::Fixture)
        }
    }

    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.kind) {
            (Some(url), _) => url,
            (None, BackendKind::OpenAi) => "https://api.openai.com/v1",
            (None, BackendKind::Anthropic) => "https://api.anthropic.com",
            (None, BackendKind::Fixture) => "",
        }
    }

    pub fn api_key_env(&self) -> Option<&str> {
        match (&self.api_key_env, self.kind) {
            (Some(env), _) => Some(env),
            (None, BackendKind::OpenAi) => Some("OPENAI_API_KEY"),
            (None, BackendKind::Anthropic) => Some("ANTHROPIC_API_KEY"),
            (None, BackendKind::Fixture) => None,
        }
    }

    /// Issues with this backend's definition
    pub fn validate(&self, id: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let invalid = |message: String| {
            ConfigIssue::error(
                ConfigIssueCode::InvalidBackend {
                    backend: id.to_string(),
                },
                message,
            )
        };

        if id.trim().is_empty() {
            issues.push(invalid("backend id must not be empty".to_string()));
        }
        if self.kind.is_remote() && self.model.trim().is_empty() {
            issues.push(invalid(format!(
                "backends.{}: {} backend requires a model",
                id,
                self.kind.as_str()
            )));
        }
        if self.kind == BackendKind::Fixture && self.reply.is_none() && self.fail.is_none() {
            issues.push(invalid(format!(
                "backends.{}: fixture backend requires `reply` or `fail`",
                id
            )));
        }

        issues
    }
}
