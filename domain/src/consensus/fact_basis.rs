//! Fact-basis validation of a final consensus value.
//!
//! A post-hoc lint: it never blocks a result, it only flags it.

use crate::core::value::AnalysisValue;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Qualifiers that indicate unsupported speculation
pub const SPECULATIVE_TERMS: &[&str] = &[
    "probably",
    "likely",
    "might be",
    "assume",
    "guess",
    "estimate",
    "typical",
];

/// Outcome of a fact-basis check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FactBasisVerdict {
    /// True when no speculative qualifier was found
    pub evidence_based: bool,
    /// Speculative qualifiers found in the value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub speculative_terms: Vec<String>,
    /// True when the caller supplied no source data at all
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub empty_source: bool,
}

/// Scans a serialized value for speculative vocabulary.
///
/// Terms match whole words only, so `likely` does not fire on `unlikely`
/// and `estimate` does not fire on an `estimated_cost` key.
#[derive(Debug, Clone)]
pub struct FactBasisValidator {
    vocabulary: Vec<(String, Regex)>,
}

impl Default for FactBasisValidator {
    fn default() -> Self {
        Self::with_vocabulary(SPECULATIVE_TERMS.iter().copied())
    }
}

impl FactBasisValidator {
    pub fn with_vocabulary<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary = terms
            .into_iter()
            .map(|t| t.into().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .filter_map(|term| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(&term));
                Regex::new(&pattern).ok().map(|re| (term, re))
            })
            .collect();
        Self { vocabulary }
    }

    /// `true` when `final_value` contains none of the speculative qualifiers
    pub fn validate(&self, final_value: &AnalysisValue, source_payload: &serde_json::Value) -> bool {
        self.inspect(final_value, source_payload).evidence_based
    }

    /// Full verdict including the offending terms.
    ///
    /// `empty_source` is reported alongside but does not affect `evidence_based`.
    pub fn inspect(
        &self,
        final_value: &AnalysisValue,
        source_payload: &serde_json::Value,
    ) -> FactBasisVerdict {
        let text = final_value.to_text();
        let speculative_terms: Vec<String> = self
            .vocabulary
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(term, _)| term.clone())
            .collect();

        FactBasisVerdict {
            evidence_based: speculative_terms.is_empty(),
            speculative_terms,
            empty_source: is_empty_payload(source_payload),
        }
    }
}

fn is_empty_payload(payload: &serde_json::Value) -> bool {
    match payload {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({"employees": 42})
    }

    #[test]
    fn test_clean_value_is_evidence_based() {
        let value = AnalysisValue::from(json!({"gap": "high", "score": 80}));
        assert!(FactBasisValidator::default().validate(&value, &payload()));
    }

    #[test]
    fn test_speculative_terms_flagged() {
        let value = AnalysisValue::from(json!({"summary": "The team is Probably understaffed"}));
        let verdict = FactBasisValidator::default().inspect(&value, &payload());
        assert!(!verdict.evidence_based);
        assert_eq!(verdict.speculative_terms, vec!["probably"]);
    }

    #[test]
    fn test_multi_word_and_nested_terms() {
        let value = AnalysisValue::from(json!({
            "notes": ["this might be a gap", "we estimate 3 hires"]
        }));
        let verdict = FactBasisValidator::default().inspect(&value, &payload());
        assert_eq!(verdict.speculative_terms, vec!["might be", "estimate"]);
    }

    #[test]
    fn test_plain_text_value() {
        let value = AnalysisValue::from("A typical org chart");
        assert!(!FactBasisValidator::default().validate(&value, &payload()));
    }

    #[test]
    fn test_empty_source_is_reported_separately() {
        let value = AnalysisValue::from(json!({"gap": "high"}));
        let validator = FactBasisValidator::default();
        let verdict = validator.inspect(&value, &json!({}));
        assert!(verdict.evidence_based);
        assert!(verdict.empty_source);
        assert!(verdict.speculative_terms.is_empty());
        assert!(validator.validate(&value, &serde_json::Value::Null));
    }

    #[test]
    fn test_terms_match_whole_words_only() {
        let value = AnalysisValue::from(json!({
            "estimated_cost": 1200,
            "note": "an unlikely outcome, as assumed by finance"
        }));
        let verdict = FactBasisValidator::default().inspect(&value, &payload());
        assert!(verdict.evidence_based);
        assert!(verdict.speculative_terms.is_empty());
    }

    #[test]
    fn test_whole_word_match_ignores_case_and_punctuation() {
        let value = AnalysisValue::from("Likely, the gap is structural.");
        let verdict = FactBasisValidator::default().inspect(&value, &payload());
        assert_eq!(verdict.speculative_terms, vec!["likely"]);
    }

    #[test]
    fn test_custom_vocabulary() {
        let validator = FactBasisValidator::with_vocabulary(["Rumour"]);
        let value = AnalysisValue::from("rumour has it");
        assert!(!validator.validate(&value, &payload()));
    }
}
