//! Result reconciliation (consensus building)
//!
//! Merges the successful results of one stage into a single
//! [`ConsensusResult`]. The merge is a pure function of the *set* of
//! results: permuting the input changes only `contributing_results` order.
//!
//! # Rules
//!
//! - One result: returned unchanged, `single-backend`.
//! - Several text results: highest confidence wins, score is the mean confidence.
//! - Several structured results: merged key by key:
//!   1. all present values deep-equal → kept
//!   2. all numeric → arithmetic mean
//!   3. otherwise → most frequent value, ties to the highest-confidence contributor
//!
//!   The score is the mean confidence, multiplied by the disagreement
//!   penalty when more than `divergence_ratio` of the keys diverged.

use super::result::{ConsensusResult, Methodology};
use crate::analysis::AnalysisResult;
use crate::core::backend::BackendId;
use crate::core::error::DomainError;
use crate::core::value::AnalysisValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Tunable constants of the structured merge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilePolicy {
    /// Multiplier applied to the score when too many keys diverged
    pub disagreement_penalty: f64,
    /// Fraction of diverged keys above which the penalty applies
    pub divergence_ratio: f64,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            disagreement_penalty: 0.85,
            divergence_ratio: 0.5,
        }
    }
}

/// Deterministic merger of analysis results
///
/// # Example
///
/// ```
/// use consensus_domain::{AnalysisResult, BackendId, Reconciler};
/// use serde_json::json;
///
/// let a = AnalysisResult::new(BackendId::from("a"), json!({"gap": "high", "score": 70}).into(), 0.8);
/// let b = AnalysisResult::new(BackendId::from("b"), json!({"gap": "high", "score": 90}).into(), 0.6);
///
/// let consensus = Reconciler::default().reconcile(vec![a, b], true).unwrap();
/// assert_eq!(consensus.final_value().to_json(), json!({"gap": "high", "score": 80}));
/// assert!((consensus.consensus_score() - 0.7).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReconcilePolicy {
        &self.policy
    }

    /// Merge `results` (in completion order) into one consensus.
    ///
    /// `structured` mirrors the stage request's `require_structured` flag.
    pub fn reconcile(
        &self,
        results: Vec<AnalysisResult>,
        structured: bool,
    ) -> Result<ConsensusResult, DomainError> {
        match results.len() {
            0 => Err(DomainError::NoResults),
            1 => {
                let only = &results[0];
                let value = only.parsed_value().clone();
                let score = only.confidence();
                ConsensusResult::new(value, score, results, Methodology::SingleBackend, vec![])
            }
            _ if structured && results.iter().any(|r| r.parsed_value().is_object()) => {
                self.merge_structured(results)
            }
            _ => self.pick_best(results),
        }
    }

    /// Unstructured merge: highest confidence wins
    fn pick_best(&self, results: Vec<AnalysisResult>) -> Result<ConsensusResult, DomainError> {
        let score = mean(results.iter().map(|r| r.confidence()));
        let best = results
            .iter()
            .max_by(|a, b| rank(a.confidence(), a.backend_id(), b.confidence(), b.backend_id()))
            .map(|r| r.parsed_value().clone())
            .ok_or(DomainError::NoResults)?;

        ConsensusResult::new(best, score, results, Methodology::MultiBackendMerge, vec![])
    }

    /// Structured merge: key by key over the object-shaped results.
    ///
    /// Results that fell back to raw text still count towards the mean
    /// confidence but contribute no keys.
    fn merge_structured(
        &self,
        results: Vec<AnalysisResult>,
    ) -> Result<ConsensusResult, DomainError> {
        let mut keys: BTreeSet<&str> = BTreeSet::new();
        for result in &results {
            if let Some(map) = result.parsed_value().as_object() {
                keys.extend(map.keys().map(String::as_str));
            }
        }

        let mut merged = BTreeMap::new();
        let mut divergent_keys = Vec::new();

        for key in &keys {
            let present: Vec<Contribution<'_>> = results
                .iter()
                .filter_map(|r| {
                    r.parsed_value().get(key).map(|value| Contribution {
                        value,
                        confidence: r.confidence(),
                        backend_id: r.backend_id(),
                    })
                })
                .collect();

            let (value, diverged) = merge_key(&present);
            if diverged {
                divergent_keys.push((*key).to_string());
            }
            merged.insert((*key).to_string(), value);
        }

        let mut score = mean(results.iter().map(|r| r.confidence()));
        if !keys.is_empty()
            && divergent_keys.len() as f64 > keys.len() as f64 * self.policy.divergence_ratio
        {
            score *= self.policy.disagreement_penalty;
        }

        ConsensusResult::new(
            AnalysisValue::Object(merged),
            score,
            results,
            Methodology::MultiBackendMerge,
            divergent_keys,
        )
    }
}

/// One backend's value for a key
struct Contribution<'a> {
    value: &'a AnalysisValue,
    confidence: f64,
    backend_id: &'a BackendId,
}

/// Merge the present values of one key. Returns the value and whether it diverged.
fn merge_key(present: &[Contribution<'_>]) -> (AnalysisValue, bool) {
    let Some(first) = present.first() else {
        return (AnalysisValue::Null, false);
    };

    if present.iter().all(|c| c.value == first.value) {
        return (first.value.clone(), false);
    }

    let numbers: Option<Vec<f64>> = present.iter().map(|c| c.value.as_number()).collect();
    if let Some(numbers) = numbers {
        return (AnalysisValue::Number(mean(numbers.into_iter())), true);
    }

    (most_frequent(present), true)
}

/// Candidate value with its support
struct Tally<'a> {
    value: &'a AnalysisValue,
    count: usize,
    best_confidence: f64,
    best_backend: &'a BackendId,
}

/// Most frequent value; ties go to the value backed by the highest-confidence contributor.
fn most_frequent(present: &[Contribution<'_>]) -> AnalysisValue {
    let mut tallies: Vec<Tally<'_>> = Vec::new();

    for c in present {
        match tallies.iter_mut().find(|t| t.value == c.value) {
            Some(tally) => {
                tally.count += 1;
                if rank(c.confidence, c.backend_id, tally.best_confidence, tally.best_backend)
                    == Ordering::Greater
                {
                    tally.best_confidence = c.confidence;
                    tally.best_backend = c.backend_id;
                }
            }
            None => tallies.push(Tally {
                value: c.value,
                count: 1,
                best_confidence: c.confidence,
                best_backend: c.backend_id,
            }),
        }
    }

    tallies
        .iter()
        .max_by(|a, b| {
            a.count.cmp(&b.count).then_with(|| {
                rank(a.best_confidence, a.best_backend, b.best_confidence, b.best_backend)
            })
        })
        .map(|t| t.value.clone())
        .unwrap_or(AnalysisValue::Null)
}

/// Order contributors by confidence, then by the lexicographically smaller
/// backend id so that equal confidences resolve the same way for any input order.
fn rank(conf_a: f64, id_a: &BackendId, conf_b: f64, id_b: &BackendId) -> Ordering {
    conf_a.total_cmp(&conf_b).then_with(|| id_b.cmp(id_a))
}

/// Arithmetic mean, summed in sorted order so the result does not depend on arrival order
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}
