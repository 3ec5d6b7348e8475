//! Document records and the features extracted from them.
//!
//! A [`Document`] is the raw, partially filled record handed over by ingestion.
//! [`extract_features`](crate::extract_features) turns it into a
//! [`FeatureDocument`], which carries the normalized feature blob and the
//! shingle set derived from it. Nothing downstream looks at the raw fields
//! again; the blob is the sole carrier of similarity information.
//!
//! # Examples
//!
//! ```rust
//! use canonical::{extract_features, Document, DocumentRole, FeatureConfig};
//!
//! let doc = Document::new("tt0133093", "The Matrix")
//!     .with_directors("Lana Wachowski, Lilly Wachowski")
//!     .with_cast("Keanu Reeves, Laurence Fishburne, Carrie-Anne Moss")
//!     .with_release_year("1999");
//!
//! let features = extract_features(&doc, DocumentRole::Query, &FeatureConfig::default()).unwrap();
//! assert_eq!(features.id, "tt0133093");
//! assert!(features.blob.ends_with("|ENGLISH"));
//! assert!(features.shingles.contains(b"KEANU"));
//! ```

use serde::{Deserialize, Serialize};

use crate::shingle::ShingleSet;

/// Whether a document is being indexed or matched.
///
/// The role only changes how absent fields are filled: query documents fall
/// back to [`FeatureConfig::default_query_language`](crate::FeatureConfig)
/// when they carry no language, corpus documents never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    Corpus,
    Query,
}

/// One raw movie-like record.
///
/// `directors` and `cast` are comma-separated lists exactly as the source
/// provides them. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within its source.
    pub id: String,
    pub title: String,
    pub directors: String,
    pub cast: String,
    pub release_year: String,
    pub duration: String,
    pub language: String,
    /// Carried for reporting only; it never contributes shingles.
    pub description: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_directors(mut self, directors: impl Into<String>) -> Self {
        self.directors = directors.into();
        self
    }

    pub fn with_cast(mut self, cast: impl Into<String>) -> Self {
        self.cast = cast.into();
        self
    }

    pub fn with_release_year(mut self, year: impl Into<String>) -> Self {
        self.release_year = year.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Features extracted from a [`Document`].
///
/// Built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDocument {
    pub id: String,
    /// Raw title, kept for reporting.
    pub title: String,
    /// Normalized feature blob: per-field tokens joined with the inner
    /// separator, fields joined with the outer separator.
    pub blob: String,
    /// Deduplicated shingles recovered from `blob`.
    pub shingles: ShingleSet,
}
