use canonical::CanonicalError;
use index::IndexError;
use perceptual::PerceptualError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accuracy::ScoreAccumulator;

/// One candidate scored against a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    pub id: String,
    pub title: String,
    /// Fraction of signature positions where query and candidate agree.
    pub lsh_similarity: f64,
    /// Exact Jaccard similarity of the two shingle sets.
    pub jaccard_similarity: f64,
}

/// Decision for a single query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The top candidate's estimate reached the threshold.
    Matched { hit: ScoredCandidate },
    /// Candidates existed but the best one fell short. It is reported for
    /// inspection only and never counts as a match.
    BelowThreshold {
        best: ScoredCandidate,
        threshold: f64,
    },
    /// No indexed document shares a band with the query.
    NoCandidates,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }

    /// The accepted candidate, if any.
    pub fn hit(&self) -> Option<&ScoredCandidate> {
        match self {
            MatchOutcome::Matched { hit } => Some(hit),
            _ => None,
        }
    }

    /// The top-ranked candidate whether or not it was accepted.
    pub fn best(&self) -> Option<&ScoredCandidate> {
        match self {
            MatchOutcome::Matched { hit } => Some(hit),
            MatchOutcome::BelowThreshold { best, .. } => Some(best),
            MatchOutcome::NoCandidates => None,
        }
    }
}

/// Running counters for a batch of queries.
///
/// Every processed query lands in exactly one of `matched`,
/// `unmatched_no_candidates`, `unmatched_below_threshold` or `failed`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchStats {
    pub request_count: u64,
    pub matched: u64,
    pub unmatched_no_candidates: u64,
    pub unmatched_below_threshold: u64,
    pub failed: u64,
}

impl MatchStats {
    pub fn merge(&mut self, other: &MatchStats) {
        self.request_count += other.request_count;
        self.matched += other.matched;
        self.unmatched_no_candidates += other.unmatched_no_candidates;
        self.unmatched_below_threshold += other.unmatched_below_threshold;
        self.failed += other.failed;
    }

    pub fn unmatched(&self) -> u64 {
        self.unmatched_no_candidates + self.unmatched_below_threshold
    }
}

/// Mutable state owned by one matching worker.
///
/// Sessions are never shared; parallel workers each own one and the caller
/// merges them afterwards.
#[derive(Debug, Clone, Default)]
pub struct MatchSession {
    pub stats: MatchStats,
    pub scores: ScoreAccumulator,
}

impl MatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: MatchSession) {
        self.stats.merge(&other.stats);
        self.scores.merge(other.scores);
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    #[error("query signature has {query} values, candidate has {candidate}")]
    SignatureLengthMismatch { query: usize, candidate: usize },
    #[error("no indexed document with id {0:?}")]
    UnknownCandidate(String),
    #[error("canonical error: {0}")]
    Canonical(#[from] CanonicalError),
    #[error("perceptual error: {0}")]
    Perceptual(#[from] PerceptualError),
    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, lsh: f64) -> ScoredCandidate {
        ScoredCandidate {
            id: id.into(),
            title: id.to_uppercase(),
            lsh_similarity: lsh,
            jaccard_similarity: lsh,
        }
    }

    #[test]
    fn outcome_accessors() {
        let matched = MatchOutcome::Matched {
            hit: candidate("a", 0.9),
        };
        assert!(matched.is_match());
        assert_eq!(matched.hit().map(|c| c.id.as_str()), Some("a"));

        let below = MatchOutcome::BelowThreshold {
            best: candidate("b", 0.1),
            threshold: 0.25,
        };
        assert!(!below.is_match());
        assert!(below.hit().is_none());
        assert_eq!(below.best().map(|c| c.id.as_str()), Some("b"));

        assert!(MatchOutcome::NoCandidates.best().is_none());
    }

    #[test]
    fn stats_merge_adds_counters() {
        let mut a = MatchStats {
            request_count: 3,
            matched: 1,
            unmatched_no_candidates: 1,
            unmatched_below_threshold: 1,
            failed: 0,
        };
        let b = MatchStats {
            request_count: 2,
            matched: 1,
            failed: 1,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.request_count, 5);
        assert_eq!(a.matched, 2);
        assert_eq!(a.failed, 1);
        assert_eq!(a.unmatched(), 2);
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(MatchOutcome::NoCandidates).unwrap();
        assert_eq!(json["outcome"], "no_candidates");
    }

    #[test]
    fn errors_convert_from_stage_errors() {
        let err: MatchError = IndexError::InvalidBanding { bands: 0, rows: 1 }.into();
        assert!(err.to_string().starts_with("index error"));
        let err: MatchError = CanonicalError::MissingDocId.into();
        assert!(matches!(err, MatchError::Canonical(_)));
    }
}
