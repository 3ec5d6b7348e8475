//! Configuration types for feature extraction.
//!
//! [`FeatureConfig`] controls how a [`Document`](crate::Document) is turned
//! into a feature blob and a shingle set.
//!
//! # Versioning
//!
//! Any change that can alter the produced blob (separators, title window,
//! cast cap) changes which shingles a document yields, and therefore every
//! signature computed downstream. Bump `version` whenever the extraction
//! behavior changes so that stale corpora are not compared against fresh
//! queries by accident.
//!
//! # Examples
//!
//! ```rust
//! use canonical::FeatureConfig;
//!
//! let config = FeatureConfig::default();
//! assert_eq!(config.title_shingle_size, 2);
//! assert_eq!(config.cast_limit, 2);
//! assert_eq!(config.outer_separator, '|');
//! assert_eq!(config.inner_separator, ' ');
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Configuration for the feature extraction pipeline.
///
/// The separator pair defines the two-level token partition of the feature
/// blob: fields are joined with `outer_separator`, tokens inside a field with
/// `inner_separator`. Splitting the blob on both recovers the shingle set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureConfig {
    /// Semantic version of the extraction behavior. Must be >= 1.
    pub version: u32,
    /// Character window used to shingle titles. A title shorter than the
    /// window is padded with trailing spaces so it yields one shingle.
    pub title_shingle_size: usize,
    /// Number of leading cast entries kept. Directors are never capped.
    pub cast_limit: usize,
    /// Separator placed between feature fields.
    pub outer_separator: char,
    /// Separator placed between tokens of one field.
    pub inner_separator: char,
    /// Language assumed for query documents that omit one.
    pub default_query_language: String,
}

impl FeatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title_shingle_size(mut self, size: usize) -> Self {
        self.title_shingle_size = size;
        self
    }

    pub fn with_cast_limit(mut self, limit: usize) -> Self {
        self.cast_limit = limit;
        self
    }

    pub fn with_separators(mut self, outer: char, inner: char) -> Self {
        self.outer_separator = outer;
        self.inner_separator = inner;
        self
    }

    pub fn with_default_query_language(mut self, language: impl Into<String>) -> Self {
        self.default_query_language = language.into();
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.title_shingle_size == 0 {
            return Err(CanonicalError::InvalidConfig(
                "title_shingle_size must be >= 1".into(),
            ));
        }
        if self.outer_separator == self.inner_separator {
            return Err(CanonicalError::InvalidConfig(format!(
                "outer and inner separators must differ (both {:?})",
                self.outer_separator
            )));
        }
        Ok(())
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            version: 1,
            title_shingle_size: 2,
            cast_limit: 2,
            outer_separator: '|',
            inner_separator: ' ',
            default_query_language: "English".to_string(),
        }
    }
}
