//! Parsed value model for backend replies.
//!
//! Backends answer with loosely structured JSON. [`AnalysisValue`] is the
//! tagged form the reconciler works on, so every merge rule is an exhaustive
//! `match` instead of a runtime type probe.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A parsed reply value (Value Object)
///
/// Objects keep their keys ordered so that merging and serialization are
/// deterministic regardless of which backend answered first.
///
/// # Example
///
/// ```
/// use consensus_domain::AnalysisValue;
///
/// let value = AnalysisValue::from(serde_json::json!({"gap": "high", "score": 70}));
/// assert_eq!(value.get("score"), Some(&AnalysisValue::Number(70.0)));
/// assert_eq!(value.to_json(), serde_json::json!({"gap": "high", "score": 70}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum AnalysisValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<AnalysisValue>),
    Object(BTreeMap<String, AnalysisValue>),
}

impl AnalysisValue {
    /// Short name of the variant, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisValue::Null => "null",
            AnalysisValue::Bool(_) => "bool",
            AnalysisValue::Number(_) => "number",
            AnalysisValue::String(_) => "string",
            AnalysisValue::Array(_) => "array",
            AnalysisValue::Object(_) => "object",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnalysisValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnalysisValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, AnalysisValue>> {
        match self {
            AnalysisValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, AnalysisValue::Object(_))
    }

    /// Look up a field of an object value
    pub fn get(&self, key: &str) -> Option<&AnalysisValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Convert back to plain JSON.
    ///
    /// Whole numbers are emitted as integers so that a merged `80.0`
    /// reads as `80` to downstream consumers.
    pub fn to_json(&self) -> Value {
        match self {
            AnalysisValue::Null => Value::Null,
            AnalysisValue::Bool(b) => Value::Bool(*b),
            AnalysisValue::Number(n) => number_to_json(*n),
            AnalysisValue::String(s) => Value::String(s.clone()),
            AnalysisValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            AnalysisValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// Text form scanned by the fact-basis validator.
    ///
    /// Plain strings are returned as-is; everything else is compact JSON.
    pub fn to_text(&self) -> String {
        match self {
            AnalysisValue::String(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<Value> for AnalysisValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AnalysisValue::Null,
            Value::Bool(b) => AnalysisValue::Bool(b),
            Value::Number(n) => n
                .as_f64()
                .map(AnalysisValue::Number)
                .unwrap_or(AnalysisValue::Null),
            Value::String(s) => AnalysisValue::String(s),
            Value::Array(items) => {
                AnalysisValue::Array(items.into_iter().map(AnalysisValue::from).collect())
            }
            Value::Object(map) => AnalysisValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, AnalysisValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<AnalysisValue> for Value {
    fn from(value: AnalysisValue) -> Self {
        value.to_json()
    }
}

impl From<&str> for AnalysisValue {
    fn from(s: &str) -> Self {
        AnalysisValue::String(s.to_string())
    }
}

impl From<String> for AnalysisValue {
    fn from(s: String) -> Self {
        AnalysisValue::String(s)
    }
}

impl From<f64> for AnalysisValue {
    fn from(n: f64) -> Self {
        AnalysisValue::Number(n)
    }
}

impl std::fmt::Display for AnalysisValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object_is_ordered() {
        let value = AnalysisValue::from(json!({"b": 1, "a": [true, null]}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(
            value.get("a"),
            Some(&AnalysisValue::Array(vec![
                AnalysisValue::Bool(true),
                AnalysisValue::Null
            ]))
        );
    }

    #[test]
    fn test_whole_numbers_render_as_integers() {
        assert_eq!(AnalysisValue::Number(80.0).to_json(), json!(80));
        assert_eq!(AnalysisValue::Number(80.5).to_json(), json!(80.5));
    }

    #[test]
    fn test_serde_uses_plain_json() {
        let value = AnalysisValue::from(json!({"gap": "high", "score": 85}));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"gap":"high","score":85}"#);

        let back: AnalysisValue = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(AnalysisValue::from("plain reply").to_text(), "plain reply");
        assert_eq!(
            AnalysisValue::from(json!({"k": "v"})).to_text(),
            r#"{"k":"v"}"#
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(AnalysisValue::Null.kind(), "null");
        assert_eq!(AnalysisValue::from(json!([1])).kind(), "array");
        assert_eq!(AnalysisValue::from(json!({})).kind(), "object");
    }
}
