//! Wire formats of the supported remote APIs

use super::error::BackendError;
use consensus_domain::{AnalysisRequest, PromptTemplate, StageConfig};
use serde::Deserialize;
use serde_json::{Value, json};

/// `anthropic-version` header sent with every messages request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request/response shape of a remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `POST {base}/chat/completions`, bearer auth
    OpenAi,
    /// `POST {base}/v1/messages`, `x-api-key` auth
    Anthropic,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl WireFormat {
    pub fn endpoint(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            WireFormat::OpenAi => format!("{}/chat/completions", base),
            WireFormat::Anthropic => format!("{}/v1/messages", base),
        }
    }

    /// Request body for one call
    pub fn request_body(&self, model: &str, request: &AnalysisRequest, config: &StageConfig) -> Value {
        let system = PromptTemplate::system(request.require_structured);
        match self {
            WireFormat::OpenAi => json!({
                "model": model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": request.prompt},
                ],
                "temperature": config.temperature,
                "max_tokens": config.max_output_size,
            }),
            WireFormat::Anthropic => json!({
                "model": model,
                "system": system,
                "messages": [
                    {"role": "user", "content": request.prompt},
                ],
                "temperature": config.temperature,
                "max_tokens": config.max_output_size,
            }),
        }
    }

    /// Extract the reply text from a response body
    pub fn reply_text(&self, body: Value) -> Result<String, BackendError> {
        match self {
            WireFormat::OpenAi => {
                let completion: ChatCompletion = serde_json::from_value(body)
                    .map_err(|e| BackendError::MalformedReply(e.to_string()))?;
                completion
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| {
                        BackendError::MalformedReply("no choices[0].message.content".to_string())
                    })
            }
            WireFormat::Anthropic => {
                let reply: MessagesReply = serde_json::from_value(body)
                    .map_err(|e| BackendError::MalformedReply(e.to_string()))?;
                let text: String = reply
                    .content
                    .into_iter()
                    .filter(|block| block.kind == "text")
                    .filter_map(|block| block.text)
                    .collect();
                if text.is_empty() {
                    return Err(BackendError::MalformedReply(
                        "no text content blocks".to_string(),
                    ));
                }
                Ok(text)
            }
        }
    }
}
