//! # LSH Index
//!
//! This crate stores fingerprinted corpus documents and answers the one
//! question the matcher asks of it: which documents share at least one band
//! with this signature?
//!
//! ## Core Features
//!
//! - **Banding**: a signature of length `bands × rows` is cut into contiguous
//!   chunks and each chunk is hashed to a 64-bit band key ([`convert_to_bands`]).
//! - **Bucket tables**: one `hashbrown` table per band maps a key to the
//!   documents that produced it.
//! - **Corpus store**: id, title, blob, shingle set and signature of every
//!   indexed document, addressed by slot.
//! - **Threshold**: [`similarity_threshold`] derives the accept/reject cutoff
//!   from `(bands, rows)` on every call.
//!
//! ## Phases
//!
//! [`LshIndex::insert`] takes `&mut self` and every lookup takes `&self`, so
//! the borrow checker keeps indexing and matching apart: once the index is
//! shared for matching it can no longer change.
//!
//! ## Example Usage
//!
//! ```
//! use canonical::{extract_features, Document, DocumentRole, FeatureConfig};
//! use index::{Banding, LshIndex};
//! use perceptual::{sign_shingles, PerceptualConfig, XxHashFamily};
//!
//! let lsh = PerceptualConfig::new().with_minhash_bands(20).with_minhash_rows_per_band(5);
//! let family = XxHashFamily::from_config(&lsh).unwrap();
//! let mut index = LshIndex::new(Banding::from_config(&lsh).unwrap());
//!
//! let doc = Document::new("m-1", "Heat").with_release_year("1995");
//! let features = extract_features(&doc, DocumentRole::Corpus, &FeatureConfig::default()).unwrap();
//! let signature = sign_shingles(features.shingles.as_slice(), &family, &lsh).unwrap();
//! index.insert(features, signature.clone()).unwrap();
//!
//! let hits = index.candidates(&signature).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id, "m-1");
//! ```

mod bands;
mod bucket;
mod store;

pub use crate::bands::{convert_to_bands, similarity_threshold, Banding};
pub use crate::bucket::{BandIndex, Slot};
pub use crate::store::{CorpusStore, InsertOutcome, StoredDocument};

use canonical::FeatureDocument;
use perceptual::MinHashSignature;
use thiserror::Error;
use tracing::debug;

/// Errors raised while indexing or looking up candidates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("signature has {actual} values, banding expects {expected}")]
    SignatureLength { expected: usize, actual: usize },
    #[error("invalid banding: bands={bands} rows={rows}")]
    InvalidBanding { bands: usize, rows: usize },
    #[error("corpus store full at {len} documents")]
    CapacityExceeded { len: usize },
}

/// Indexing context: band tables plus the corpus store they point into.
#[derive(Debug, Clone)]
pub struct LshIndex {
    banding: Banding,
    buckets: BandIndex,
    store: CorpusStore,
}

impl LshIndex {
    pub fn new(banding: Banding) -> Self {
        Self {
            banding,
            buckets: BandIndex::new(banding.bands()),
            store: CorpusStore::new(),
        }
    }

    pub fn banding(&self) -> Banding {
        self.banding
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.banding.similarity_threshold()
    }

    /// Number of distinct ids stored.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Add one fingerprinted document.
    ///
    /// A document whose id is already stored replaces the stored entry.
    /// Bucket postings made for the earlier signature are kept and resolve to
    /// the replacement. A sentinel signature (empty shingle set) is stored but
    /// never posted, so it cannot band-match anything.
    pub fn insert(
        &mut self,
        features: FeatureDocument,
        signature: MinHashSignature,
    ) -> Result<InsertOutcome, IndexError> {
        let band_hashes = self.banding.band_hashes(signature.as_slice())?;
        let sentinel = signature.is_sentinel();
        let (slot, outcome) = self.store.upsert(StoredDocument::new(features, signature))?;
        if !sentinel {
            self.buckets.insert(&band_hashes, slot);
        }
        debug!(slot, ?outcome, sentinel, "indexed document");
        Ok(outcome)
    }

    /// Insert a batch in order; stops at the first error.
    pub fn insert_batch<I>(&mut self, docs: I) -> Result<usize, IndexError>
    where
        I: IntoIterator<Item = (FeatureDocument, MinHashSignature)>,
    {
        let mut inserted = 0;
        for (features, signature) in docs {
            self.insert(features, signature)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Documents sharing at least one band with `signature`, in slot order.
    ///
    /// A sentinel signature has no candidates.
    pub fn candidates(&self, signature: &MinHashSignature) -> Result<Vec<&StoredDocument>, IndexError> {
        let band_hashes = self.banding.band_hashes(signature.as_slice())?;
        if signature.is_sentinel() {
            return Ok(Vec::new());
        }
        Ok(self.candidates_for_bands(&band_hashes))
    }

    /// Documents sharing at least one of the precomputed `band_hashes`.
    pub fn candidates_for_bands(&self, band_hashes: &[u64]) -> Vec<&StoredDocument> {
        self.buckets
            .candidates(band_hashes)
            .into_iter()
            .filter_map(|slot| self.store.get(slot))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&StoredDocument> {
        self.store.get_by_id(id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &StoredDocument> + '_ {
        self.store.iter()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonical::{extract_features, Document, DocumentRole, FeatureConfig, ShingleSet};
    use perceptual::{sign_shingles, PerceptualConfig, XxHashFamily};

    fn features(id: &str, tokens: &[&str]) -> FeatureDocument {
        FeatureDocument {
            id: id.to_string(),
            title: id.to_uppercase(),
            blob: tokens.join(" "),
            shingles: tokens.iter().copied().collect::<ShingleSet>(),
        }
    }

    fn banding() -> Banding {
        Banding::new(3, 2).expect("banding")
    }

    #[test]
    fn insert_then_find_by_shared_band() {
        let mut index = LshIndex::new(banding());
        index
            .insert(features("a", &["X"]), MinHashSignature::new(vec![1, 2, 3, 4, 5, 6]))
            .unwrap();
        index
            .insert(features("b", &["Y"]), MinHashSignature::new(vec![9, 9, 9, 9, 5, 6]))
            .unwrap();

        let query = MinHashSignature::new(vec![1, 2, 0, 0, 0, 0]);
        let hits: Vec<&str> = index
            .candidates(&query)
            .unwrap()
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(hits, vec!["a"]);

        let query = MinHashSignature::new(vec![1, 2, 0, 0, 5, 6]);
        assert_eq!(index.candidates(&query).unwrap().len(), 2);
    }

    #[test]
    fn partial_band_overlap_is_not_a_candidate() {
        let mut index = LshIndex::new(banding());
        index
            .insert(features("a", &["X"]), MinHashSignature::new(vec![1, 2, 3, 4, 5, 6]))
            .unwrap();
        // Agrees on one row of every band but never on a whole band.
        let query = MinHashSignature::new(vec![1, 0, 3, 0, 5, 0]);
        assert!(index.candidates(&query).unwrap().is_empty());
    }

    #[test]
    fn empty_index_has_no_candidates() {
        let index = LshIndex::new(banding());
        let query = MinHashSignature::new(vec![0; 6]);
        assert!(index.candidates(&query).unwrap().is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn signature_length_checked_on_insert_and_query() {
        let mut index = LshIndex::new(banding());
        let err = index
            .insert(features("a", &["X"]), MinHashSignature::new(vec![1, 2]))
            .unwrap_err();
        assert_eq!(
            err,
            IndexError::SignatureLength {
                expected: 6,
                actual: 2
            }
        );
        assert!(index.is_empty());
        assert!(index.candidates(&MinHashSignature::new(vec![1])).is_err());
    }

    #[test]
    fn sentinel_documents_are_stored_but_never_retrieved() {
        let mut index = LshIndex::new(banding());
        let sentinel = MinHashSignature::new(vec![perceptual::SENTINEL; 6]);
        index
            .insert(features("blank", &[]), sentinel.clone())
            .unwrap();
        index
            .insert(features("a", &["X"]), MinHashSignature::new(vec![1, 2, 3, 4, 5, 6]))
            .unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.get("blank").is_some());
        assert_eq!(index.bucket_count(), 3);
        assert!(index.candidates(&sentinel).unwrap().is_empty());

        // A query agreeing with the sentinel on one band still misses it.
        let query = MinHashSignature::new(vec![u32::MAX, u32::MAX, 3, 4, 0, 0]);
        let hits: Vec<&str> = index
            .candidates(&query)
            .unwrap()
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(hits, vec!["a"]);
    }

    #[test]
    fn sentinel_query_of_wrong_length_is_still_rejected() {
        let index = LshIndex::new(banding());
        let query = MinHashSignature::new(vec![perceptual::SENTINEL; 4]);
        assert_eq!(
            index.candidates(&query).unwrap_err(),
            IndexError::SignatureLength {
                expected: 6,
                actual: 4
            }
        );
    }

    #[test]
    fn duplicate_id_resolves_to_latest_entry() {
        let mut index = LshIndex::new(banding());
        let old = MinHashSignature::new(vec![1, 1, 1, 1, 1, 1]);
        let new = MinHashSignature::new(vec![2, 2, 2, 2, 2, 2]);
        assert_eq!(
            index.insert(features("a", &["OLD"]), old.clone()).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            index.insert(features("a", &["NEW"]), new.clone()).unwrap(),
            InsertOutcome::Replaced
        );
        assert_eq!(index.len(), 1);

        for query in [&old, &new] {
            let hits = index.candidates(query).unwrap();
            assert_eq!(hits.len(), 1);
            assert!(hits[0].shingles.contains(b"NEW"));
        }
    }

    #[test]
    fn batch_insert_counts_documents() {
        let mut index = LshIndex::new(banding());
        let inserted = index
            .insert_batch(vec![
                (features("a", &["X"]), MinHashSignature::new(vec![1; 6])),
                (features("b", &["Y"]), MinHashSignature::new(vec![2; 6])),
            ])
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(index.bucket_count(), 6);
        assert_eq!(index.documents().count(), 2);
        assert_eq!(index.get("b").map(|d| d.title.as_str()), Some("B"));
    }

    #[test]
    fn identical_documents_are_always_candidates() {
        let lsh = PerceptualConfig::new()
            .with_minhash_bands(50)
            .with_minhash_rows_per_band(4);
        let family = XxHashFamily::from_config(&lsh).unwrap();
        let cfg = FeatureConfig::default();
        let mut index = LshIndex::new(Banding::from_config(&lsh).unwrap());

        let doc = Document::new("m-1", "The Matrix")
            .with_directors("Lana Wachowski, Lilly Wachowski")
            .with_cast("Keanu Reeves, Laurence Fishburne")
            .with_release_year("1999")
            .with_duration("136")
            .with_language("English");
        let corpus = extract_features(&doc, DocumentRole::Corpus, &cfg).unwrap();
        let signature = sign_shingles(corpus.shingles.as_slice(), &family, &lsh).unwrap();
        index.insert(corpus, signature).unwrap();

        let query = extract_features(&doc, DocumentRole::Query, &cfg).unwrap();
        let query_sig = sign_shingles(query.shingles.as_slice(), &family, &lsh).unwrap();
        let hits = index.candidates(&query_sig).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].signature, query_sig);
    }
}
