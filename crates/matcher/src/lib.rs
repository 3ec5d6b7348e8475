//! # LSH Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits on top of the feature layer (`canonical`), the signing
//! layer (`perceptual`) and the band index (`index`). Given a query document
//! it retrieves candidates that share a band, scores each one, ranks them and
//! decides whether the best one clears the similarity threshold.
//!
//! In a typical run you will:
//! - Fingerprint every corpus document with [`fingerprint`] and insert the
//!   result into an [`index::LshIndex`].
//! - Hand the finished index to a [`Matcher`] and match queries through it.
//!   The matcher never mutates the index.
//!
//! ## Core Types
//!
//! - [`Matcher`]: query-side engine over a frozen index.
//! - [`MatchOutcome`]: `Matched`, `BelowThreshold` (best candidate still
//!   reported) or `NoCandidates`.
//! - [`ScoredCandidate`]: candidate id, title, LSH estimate and exact Jaccard.
//! - [`MatchSession`]: per-worker counters ([`MatchStats`]) and the
//!   estimate-versus-exact [`ScoreAccumulator`].
//! - [`AccuracyReport`]: MSE and RMSE over every scored pair.
//!
//! ## Scoring
//!
//! The ranking score is the fraction of equal signature positions. Exact
//! Jaccard over the stored shingle sets is computed alongside for the error
//! report only; it never influences acceptance.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use canonical::{Document, DocumentRole, FeatureConfig};
//! use index::{Banding, LshIndex};
//! use matcher::{fingerprint, MatchSession, Matcher};
//! use perceptual::{PerceptualConfig, XxHashFamily};
//!
//! let features = FeatureConfig::default();
//! let lsh = PerceptualConfig::default();
//! let family = XxHashFamily::from_config(&lsh).unwrap();
//!
//! let mut index = LshIndex::new(Banding::from_config(&lsh).unwrap());
//! let heat = Document::new("m-1", "Heat")
//!     .with_directors("Michael Mann")
//!     .with_release_year("1995")
//!     .with_language("English");
//! let (doc, signature) = fingerprint(&heat, DocumentRole::Corpus, &features, &family, &lsh).unwrap();
//! index.insert(doc, signature).unwrap();
//!
//! let matcher = Matcher::new(index, Arc::new(family), features, lsh).unwrap();
//! let mut session = MatchSession::new();
//! let query = Document::new("q-1", "HEAT").with_directors("michael mann").with_release_year("1995");
//! let outcome = matcher.match_document(&query, &mut session).unwrap();
//!
//! assert_eq!(outcome.hit().map(|hit| hit.id.as_str()), Some("m-1"));
//! assert_eq!(session.stats.matched, 1);
//! ```

pub mod accuracy;
pub mod engine;
pub mod types;

pub use crate::accuracy::{AccuracyReport, ScoreAccumulator};
pub use crate::engine::{fingerprint, rank_candidates, Matcher};
pub use crate::types::{MatchError, MatchOutcome, MatchSession, MatchStats, ScoredCandidate};
