//! Reply parsing.
//!
//! Backends are asked for a JSON object but routinely wrap it in prose or a
//! markdown fence. These functions dig the object out. They are pure domain
//! logic: no I/O, just text pattern matching.
//!
//! | Form | Example |
//! |------|---------|
//! | Bare JSON | `{"gap": "high"}` |
//! | Fenced block | ```` ```json\n{...}\n``` ```` |
//! | Embedded span | `Here is my answer: {...} Thanks.` |

use crate::core::value::AnalysisValue;
use thiserror::Error;

/// A reply could not be interpreted as the requested structured shape.
///
/// Recovered by the orchestrator: the raw text is kept with capped confidence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Reply could not be parsed: {reason}")]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Parse a structured (field→value) reply.
///
/// # Examples
///
/// ```
/// use consensus_domain::consensus::parsing::parse_structured_reply;
///
/// let value = parse_structured_reply("Result:\n```json\n{\"gap\": \"high\"}\n```").unwrap();
/// assert_eq!(value.get("gap").and_then(|v| v.as_str()), Some("high"));
///
/// assert!(parse_structured_reply("no json here").is_err());
/// ```
pub fn parse_structured_reply(text: &str) -> Result<AnalysisValue, ParseFailure> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::new("empty reply"));
    }

    let candidates = [
        Some(trimmed),
        fenced_block(trimmed),
        outer_braces(trimmed),
    ];

    let mut last_kind = None;
    for candidate in candidates.into_iter().flatten() {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(candidate) {
            let value = AnalysisValue::from(json);
            if value.is_object() {
                return Ok(value);
            }
            last_kind = Some(value.kind());
        }
    }

    Err(match last_kind {
        Some(kind) => ParseFailure::new(format!("expected a JSON object, got {}", kind)),
        None => ParseFailure::new("no JSON object found"),
    })
}

/// Parse a free-text reply: the trimmed text itself
pub fn parse_text_reply(text: &str) -> AnalysisValue {
    AnalysisValue::String(text.trim().to_string())
}

/// Contents of the first ``` fence, with an optional language tag
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// The span from the first `{` to the last `}`
fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json() {
        let value = parse_structured_reply(r#"{"gap": "high", "score": 70}"#).unwrap();
        assert_eq!(value.to_json(), json!({"gap": "high", "score": 70}));
    }

    #[test]
    fn test_fenced_json() {
        let reply = "Here is my evaluation:\n```json\n{\"score\": 7}\n```\nThanks";
        let value = parse_structured_reply(reply).unwrap();
        assert_eq!(value.to_json(), json!({"score": 7}));
    }

    #[test]
    fn test_embedded_object() {
        let reply = "Sure. {\"gap\": \"low\"} Let me know if you need more.";
        let value = parse_structured_reply(reply).unwrap();
        assert_eq!(value.to_json(), json!({"gap": "low"}));
    }

    #[test]
    fn test_non_object_json_is_a_failure() {
        let err = parse_structured_reply("[1, 2, 3]").unwrap_err();
        assert_eq!(err.reason, "expected a JSON object, got array");
    }

    #[test]
    fn test_prose_is_a_failure() {
        let err = parse_structured_reply("The team looks healthy.").unwrap_err();
        assert_eq!(err.reason, "no JSON object found");
        assert!(parse_structured_reply("   ").is_err());
    }

    #[test]
    fn test_text_reply_is_trimmed() {
        assert_eq!(parse_text_reply("  answer \n"), AnalysisValue::from("answer"));
    }
}
