//! Backend identifier value object

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Identifier of an analysis backend (Value Object)
///
/// Backend ids are the keys of the `[backends.<id>]` configuration table and
/// the names stage configurations refer to. They carry no semantics beyond
/// identity; which remote service sits behind an id is an adapter concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BackendId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BackendId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for BackendId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_display_and_lookup_by_str() {
        let id = BackendId::from("openai");
        assert_eq!(id.to_string(), "openai");

        let mut map = HashMap::new();
        map.insert(id, 1);
        assert_eq!(map.get("openai"), Some(&1));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = BackendId::new("claude");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""claude""#);
    }
}
