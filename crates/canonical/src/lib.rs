//! Feature extraction layer.
//!
//! This crate turns raw movie-like records into the one artifact every later
//! stage depends on: a normalized feature blob and the shingle set recovered
//! from it.
//!
//! ## What we do
//!
//! - Character-window shingles over the raw title (bigrams by default)
//! - Comma-list splitting for directors and cast, with a cast cap
//! - Per-field normalization (possessives, apostrophes, `&`, `w/`, uppercase)
//! - Two-level join into a blob, then split back into a deduplicated set
//! - Exact Jaccard similarity between shingle sets
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no global state. The same document and config
//! produce the same blob and the same shingle set on any machine.
//!
//! ## Invariants worth knowing
//!
//! - Shingle sets have set semantics: duplicates collapse, order is irrelevant
//! - The blob alone is enough to rebuild the shingle set
//! - A document with an empty title is rejected, absent fields are not

mod config;
mod document;
mod error;
mod normalize;
mod pipeline;
mod shingle;

pub use crate::config::FeatureConfig;
pub use crate::document::{Document, DocumentRole, FeatureDocument};
pub use crate::error::CanonicalError;
pub use crate::normalize::normalize;
pub use crate::pipeline::extract_features;
pub use crate::shingle::{title_shingles, ShingleSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_documents_produce_identical_features() {
        let cfg = FeatureConfig::default();
        let make = |id: &str| {
            Document::new(id, "Amélie")
                .with_directors("Jean-Pierre Jeunet")
                .with_cast("Audrey Tautou, Mathieu Kassovitz")
                .with_release_year("2001")
                .with_duration("122")
                .with_language("French")
        };

        let a = extract_features(&make("a"), DocumentRole::Corpus, &cfg).expect("a");
        let b = extract_features(&make("b"), DocumentRole::Corpus, &cfg).expect("b");

        assert_eq!(a.blob, b.blob);
        assert_eq!(a.shingles, b.shingles);
        assert_eq!(a.shingles.jaccard(&b.shingles), 1.0);
    }

    #[test]
    fn blob_round_trips_to_the_same_shingles() {
        let cfg = FeatureConfig::default();
        let doc = Document::new("x", "Tom & Jerry's Movie")
            .with_cast("Tom, Jerry")
            .with_release_year("1992");
        let features = extract_features(&doc, DocumentRole::Query, &cfg).expect("features");
        let rebuilt =
            ShingleSet::from_blob(&features.blob, cfg.outer_separator, cfg.inner_separator);
        assert_eq!(rebuilt, features.shingles);
    }

    #[test]
    fn custom_separators_are_respected() {
        let cfg = FeatureConfig::default().with_separators(';', '_');
        let doc = Document::new("x", "Up").with_cast("Ed Asner, Jordan Nagai");
        let features = extract_features(&doc, DocumentRole::Corpus, &cfg).expect("features");
        assert_eq!(features.blob, "UP;;ED ASNER_ JORDAN NAGAI;;;");
        assert!(features.shingles.contains(b"ED ASNER"));
        assert!(features.shingles.contains(b" JORDAN NAGAI"));
    }
}
