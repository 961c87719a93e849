//! Heuristic confidence extraction for a single backend reply.
//!
//! The score is derived from cheap lexical signals, never from semantics:
//!
//! | Rule | Signal | Effect |
//! |------|--------|--------|
//! | 1 | `confidence: NN%` marker | returned directly |
//! | 2 | "based on", "according to" | `+citation_bonus` |
//! | 3 | any numeral | `+numeral_bonus` |
//! | 4 | "uncertain", "unclear", "insufficient data", "missing" | `-hedge_penalty` |
//! | 5 | always | clamp to `[floor, ceiling]` |

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)confidence(?:\s+(?:level|score))?"?\s*[:=]\s*"?(\d{1,3}(?:\.\d+)?)\s*(%)?"#)
        .expect("confidence marker pattern is valid")
});

const CITATION: usize = 0;
const NUMERAL: usize = 1;
const HEDGE: usize = 2;

static SIGNALS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)\b(?:based on|according to)\b",
        r"[0-9]",
        r"(?i)\b(?:uncertain|unclear|insufficient data|missing)",
    ])
    .expect("confidence signal patterns are valid")
});

/// Tunable constants of the confidence heuristic.
///
/// The defaults bound heuristic confidence away from both absolute
/// certainty and total distrust.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    pub base: f64,
    pub citation_bonus: f64,
    pub numeral_bonus: f64,
    pub hedge_penalty: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Upper bound for replies that failed structured parsing
    pub parse_failure_cap: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            base: 0.7,
            citation_bonus: 0.1,
            numeral_bonus: 0.1,
            hedge_penalty: 0.2,
            floor: 0.3,
            ceiling: 0.95,
            parse_failure_cap: 0.5,
        }
    }
}

/// Derives a bounded trust score from a reply's text.
///
/// # Example
///
/// ```
/// use consensus_domain::ConfidenceExtractor;
///
/// let extractor = ConfidenceExtractor::default();
/// assert_eq!(extractor.extract("Overall confidence: 42%"), 0.42);
///
/// let score = extractor.extract("The data is unclear");
/// assert!((score - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceExtractor {
    policy: ConfidencePolicy,
}

impl ConfidenceExtractor {
    pub fn new(policy: ConfidencePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    /// Score a reply. Always within `[floor, ceiling]`.
    pub fn extract(&self, text: &str) -> f64 {
        if let Some(explicit) = explicit_marker(text) {
            return self.clamp(explicit);
        }

        let matched = SIGNALS.matches(text);
        let mut score = self.policy.base;
        if matched.matched(CITATION) {
            score += self.policy.citation_bonus;
        }
        if matched.matched(NUMERAL) {
            score += self.policy.numeral_bonus;
        }
        if matched.matched(HEDGE) {
            score -= self.policy.hedge_penalty;
        }

        self.clamp(score)
    }

    /// Score a structured reply that could only be kept as raw text
    pub fn extract_unparsed(&self, text: &str) -> f64 {
        self.extract(text).min(self.policy.parse_failure_cap)
    }

    fn clamp(&self, score: f64) -> f64 {
        score.clamp(self.policy.floor, self.policy.ceiling)
    }
}

/// Machine-readable confidence marker: `confidence: 42%`, `confidence = 0.8`,
/// `"confidence": 85`. Percentages and bare numbers above 1 are read as percent.
fn explicit_marker(text: &str) -> Option<f64> {
    let caps = MARKER.captures(text)?;
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    let is_percent = caps.get(2).is_some() || number > 1.0;
    let value = if is_percent { number / 100.0 } else { number };
    (0.0..=1.0).contains(&value).then_some(value)
}
