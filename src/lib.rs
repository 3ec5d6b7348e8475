//! Workspace umbrella crate for LSH document matching.
//!
//! This crate stitches together record ingestion, feature extraction,
//! MinHash signing, the band index and the matcher so callers can index a
//! corpus and match queries through a single [`Engine`].
//!
//! ```
//! use lshmatch::{read_json_lines, Engine, LshMatchConfig};
//! use std::io::Cursor;
//!
//! let corpus = r#"{"Id":"m-1","Title":"Heat","Director":"Michael Mann","Cast":"Al Pacino, Robert De Niro","ReleaseYear":1995,"Duration":170,"Language":"English"}"#;
//! let queries = r#"{"Id":"q-1","Title":"HEAT","Director":"michael mann","Cast":"al pacino, robert de niro","ReleaseYear":"1995","Duration":"170"}"#;
//!
//! let mut engine = Engine::new(LshMatchConfig::default()).unwrap();
//! let stats = engine.index_corpus(read_json_lines(Cursor::new(corpus)));
//! assert_eq!(stats.indexed_count, 1);
//!
//! let report = engine.match_queries(read_json_lines(Cursor::new(queries))).unwrap();
//! assert_eq!(report.results[0].matched_id(), Some("m-1"));
//! assert_eq!(report.results[0].score(), Some(1.0));
//! ```

pub mod config;
pub mod record;

use std::fmt;
use std::sync::Arc;

pub use canonical::{
    extract_features, normalize, CanonicalError, Document, DocumentRole, FeatureConfig,
    FeatureDocument, ShingleSet,
};
pub use config::{ConfigLoadError, LshMatchConfig};
pub use index::{similarity_threshold, Banding, IndexError, LshIndex};
pub use matcher::{
    fingerprint, AccuracyReport, MatchError, MatchOutcome, MatchSession, MatchStats, Matcher,
    ScoredCandidate,
};
pub use perceptual::{HashFamily, MinHashSignature, PerceptualConfig, PerceptualError, XxHashFamily};
pub use record::{open_json_lines, read_json_lines, RawRecord, RecordError};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while building the engine or processing records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("record error: {0}")]
    Record(#[from] RecordError),
    #[error("canonical error: {0}")]
    Canonical(#[from] CanonicalError),
    #[error("perceptual error: {0}")]
    Perceptual(#[from] PerceptualError),
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    #[error("match error: {0}")]
    Match(#[from] MatchError),
}

/// A record that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// 1-based source line, `None` for in-memory records and I/O errors.
    pub line: Option<usize>,
    /// Set once the record decoded far enough to carry an id.
    pub id: Option<String>,
    pub reason: String,
}

impl RecordFailure {
    fn new(line: Option<usize>, id: Option<String>, err: &impl fmt::Display) -> Self {
        Self {
            line: line.filter(|&line| line > 0),
            id,
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.line, &self.id) {
            (Some(line), Some(id)) => write!(f, "line {line} ({id}): {}", self.reason),
            (Some(line), None) => write!(f, "line {line}: {}", self.reason),
            (None, Some(id)) => write!(f, "{id}: {}", self.reason),
            (None, None) => f.write_str(&self.reason),
        }
    }
}

/// Decode one record and convert it with `convert`, keeping its source line.
fn convert_record(
    record: Result<RawRecord, RecordError>,
    convert: fn(RawRecord) -> Result<Document, RecordError>,
) -> Result<(usize, Document), RecordFailure> {
    let record = record.map_err(|err| RecordFailure::new(err.line(), None, &err))?;
    let line = record.line;
    let id = record.id.clone();
    convert(record)
        .map(|doc| (line, doc))
        .map_err(|err| RecordFailure::new(Some(line), id, &err))
}

/// Counters for one or more corpus sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Records seen, including ones that failed to decode.
    pub total_count: u64,
    pub indexed_count: u64,
    pub failed_count: u64,
    /// One entry per failed record, in input order.
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

impl CorpusStats {
    pub fn merge(&mut self, other: &CorpusStats) {
        self.total_count += other.total_count;
        self.indexed_count += other.indexed_count;
        self.failed_count += other.failed_count;
        self.failures.extend(other.failures.iter().cloned());
    }

    fn fail(&mut self, failure: RecordFailure) {
        self.failed_count += 1;
        self.failures.push(failure);
    }
}

/// Decision for one query, with the query's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query_id: String,
    pub query_title: String,
    pub outcome: MatchOutcome,
}

impl QueryResult {
    pub fn matched_id(&self) -> Option<&str> {
        self.outcome.hit().map(|hit| hit.id.as_str())
    }

    pub fn matched_title(&self) -> Option<&str> {
        self.outcome.hit().map(|hit| hit.title.as_str())
    }

    /// LSH estimate of the accepted candidate.
    pub fn score(&self) -> Option<f64> {
        self.outcome.hit().map(|hit| hit.lsh_similarity)
    }
}

/// Everything a batch of queries produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per query that could be fingerprinted, in input order.
    pub results: Vec<QueryResult>,
    pub stats: MatchStats,
    /// `None` when no candidate was scored.
    pub accuracy: Option<AccuracyReport>,
    /// Queries left out of `results`: decode failures first, then
    /// fingerprinting failures, each group in input order.
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

/// Batch orchestration: index corpus sources, then match queries.
///
/// Indexing takes `&mut self` and matching takes `&self`, so a batch of
/// queries always sees a corpus that cannot change under it.
pub struct Engine {
    config: LshMatchConfig,
    family: Arc<XxHashFamily>,
    index: Arc<LshIndex>,
    corpus: CorpusStats,
}

impl Engine {
    pub fn new(config: LshMatchConfig) -> Result<Self, PipelineError> {
        config.features.validate()?;
        let family = XxHashFamily::from_config(&config.lsh)?;
        let banding = Banding::from_config(&config.lsh)?;
        Ok(Self {
            config,
            family: Arc::new(family),
            index: Arc::new(LshIndex::new(banding)),
            corpus: CorpusStats::default(),
        })
    }

    pub fn config(&self) -> &LshMatchConfig {
        &self.config
    }

    pub fn index(&self) -> &LshIndex {
        &self.index
    }

    /// Totals across every [`Engine::index_corpus`] call.
    pub fn corpus_stats(&self) -> &CorpusStats {
        &self.corpus
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.index.similarity_threshold()
    }

    /// Index one corpus source.
    ///
    /// Records that fail to decode, convert or fingerprint are logged,
    /// counted, listed in [`CorpusStats::failures`] and skipped; they never
    /// abort the source. With `use_parallel` fingerprinting runs on the
    /// rayon pool and insertion stays sequential in input order.
    pub fn index_corpus<I>(&mut self, records: I) -> CorpusStats
    where
        I: IntoIterator<Item = Result<RawRecord, RecordError>>,
    {
        let mut stats = CorpusStats::default();
        let docs: Vec<(usize, Document)> = records
            .into_iter()
            .filter_map(|record| {
                stats.total_count += 1;
                match convert_record(record, RawRecord::into_corpus_document) {
                    Ok(doc) => Some(doc),
                    Err(failure) => {
                        warn!(%failure, "skipping corpus record");
                        stats.fail(failure);
                        None
                    }
                }
            })
            .collect();

        let fingerprint_one = |(_, doc): &(usize, Document)| {
            fingerprint(
                doc,
                DocumentRole::Corpus,
                &self.config.features,
                self.family.as_ref(),
                &self.config.lsh,
            )
        };
        let fingerprinted: Vec<_> = if self.config.lsh.use_parallel {
            docs.par_iter().map(fingerprint_one).collect()
        } else {
            docs.iter().map(fingerprint_one).collect()
        };

        let index = Arc::make_mut(&mut self.index);
        for ((line, doc), result) in docs.into_iter().zip(fingerprinted) {
            let inserted = result.and_then(|(features, signature)| {
                index.insert(features, signature).map_err(MatchError::from)
            });
            match inserted {
                Ok(_) => stats.indexed_count += 1,
                Err(err) => {
                    warn!(doc_id = %doc.id, error = %err, "skipping corpus document");
                    stats.fail(RecordFailure::new(Some(line), Some(doc.id), &err));
                }
            }
        }

        info!(
            total = stats.total_count,
            indexed = stats.indexed_count,
            failed = stats.failed_count,
            stored = index.len(),
            "corpus indexed"
        );
        self.corpus.merge(&stats);
        stats
    }

    /// Build a matcher over the current corpus.
    pub fn matcher(&self) -> Result<Matcher, PipelineError> {
        let family: Arc<dyn HashFamily> = self.family.clone();
        Ok(Matcher::with_index_arc(
            Arc::clone(&self.index),
            family,
            self.config.features.clone(),
            self.config.lsh.clone(),
        )?)
    }

    /// Match every query record against the indexed corpus.
    ///
    /// Records that fail to decode count as failed requests and are left out
    /// of `results`, as are queries whose fingerprinting fails. Both land in
    /// [`BatchReport::failures`].
    pub fn match_queries<I>(&self, records: I) -> Result<BatchReport, PipelineError>
    where
        I: IntoIterator<Item = Result<RawRecord, RecordError>>,
    {
        let matcher = self.matcher()?;

        let mut rejected = MatchStats::default();
        let mut failures = Vec::new();
        let mut lines = Vec::new();
        let queries: Vec<Document> = records
            .into_iter()
            .filter_map(|record| match convert_record(record, RawRecord::into_query_document) {
                Ok((line, doc)) => {
                    lines.push(line);
                    Some(doc)
                }
                Err(failure) => {
                    warn!(%failure, "skipping query record");
                    rejected.request_count += 1;
                    rejected.failed += 1;
                    failures.push(failure);
                    None
                }
            })
            .collect();

        let (outcomes, mut session) = matcher.match_batch(&queries);
        session.stats.merge(&rejected);

        let mut results = Vec::with_capacity(queries.len());
        for ((query, line), outcome) in queries.into_iter().zip(lines).zip(outcomes) {
            match outcome {
                Ok(outcome) => results.push(QueryResult {
                    query_id: query.id,
                    query_title: query.title,
                    outcome,
                }),
                Err(err) => {
                    warn!(query_id = %query.id, error = %err, "query failed");
                    failures.push(RecordFailure::new(Some(line), Some(query.id), &err));
                }
            }
        }

        let accuracy = session.scores.report();
        if let Some(report) = &accuracy {
            info!(pairs = report.pairs, mse = report.mse, rmse = report.rmse, "accuracy");
        }
        Ok(BatchReport {
            results,
            stats: session.stats,
            accuracy,
            failures,
        })
    }
}
