//! Configuration and error types for MinHash signing.
//!
//! This module defines the public configuration surface for the signature
//! layer. It is free of any I/O or environment-dependent behavior so that a
//! signature is a pure function of `(shingles, hash family)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LSH parameters and signing options.
///
/// The signature length is derived, never configured directly:
/// `H = minhash_bands × minhash_rows_per_band`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any change that can affect a signature must bump this version, so
    /// that signatures computed under different rules are never mixed.
    pub version: u32,
    /// Number of LSH bands.
    pub minhash_bands: usize,
    /// Number of signature rows in each band.
    pub minhash_rows_per_band: usize,
    /// Seed basis for the hash family.
    ///
    /// When two configs share the same seed and banding parameters, equal
    /// shingle sets produce bit-identical signatures across runs.
    pub seed: u64,
    /// Spread signing and batch work over the rayon pool.
    pub use_parallel: bool,
}

impl PerceptualConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// More bands = higher recall and a lower similarity threshold.
    pub fn with_minhash_bands(mut self, bands: usize) -> Self {
        self.minhash_bands = bands;
        self
    }

    /// More rows = fewer false-positive candidates and a higher threshold.
    pub fn with_minhash_rows_per_band(mut self, rows: usize) -> Self {
        self.minhash_rows_per_band = rows;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Total signature length `H`, guarding against overflow.
    pub fn num_hashes(&self) -> Result<usize, PerceptualError> {
        self.minhash_bands
            .checked_mul(self.minhash_rows_per_band)
            .ok_or(PerceptualError::InvalidConfigMinhashLength {
                bands: self.minhash_bands,
                rows: self.minhash_rows_per_band,
            })
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.minhash_bands < 1 {
            return Err(PerceptualError::InvalidConfigBands {
                bands: self.minhash_bands,
            });
        }
        if self.minhash_rows_per_band < 1 {
            return Err(PerceptualError::InvalidConfigRows {
                rows: self.minhash_rows_per_band,
            });
        }
        self.num_hashes()?;
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            minhash_bands: 250,
            minhash_rows_per_band: 4,
            seed: 0,
            use_parallel: false,
        }
    }
}

/// Errors returned by the signing layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: minhash_bands must be >= 1 (got {bands})")]
    InvalidConfigBands { bands: usize },

    #[error("invalid config: minhash_rows_per_band must be >= 1 (got {rows})")]
    InvalidConfigRows { rows: usize },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: minhash length overflow for bands={bands} rows={rows}")]
    InvalidConfigMinhashLength { bands: usize, rows: usize },

    #[error("hash family has {actual} functions, signature needs {expected}")]
    HashFamilyLength { expected: usize, actual: usize },

    #[error("signature length mismatch: {expected} vs {actual}")]
    SignatureLength { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = PerceptualConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.minhash_bands, 250);
        assert_eq!(cfg.minhash_rows_per_band, 4);
        assert_eq!(cfg.seed, 0);
        assert!(!cfg.use_parallel);
        assert_eq!(cfg.num_hashes(), Ok(1000));
    }

    #[test]
    fn config_builder_chain() {
        let cfg = PerceptualConfig::new()
            .with_minhash_bands(8)
            .with_minhash_rows_per_band(4)
            .with_seed(42)
            .with_parallel(true);

        assert_eq!(cfg.minhash_bands, 8);
        assert_eq!(cfg.minhash_rows_per_band, 4);
        assert_eq!(cfg.seed, 42);
        assert!(cfg.use_parallel);
        assert_eq!(cfg.num_hashes(), Ok(32));
    }

    #[test]
    fn config_validate_valid() {
        assert!(PerceptualConfig::default().validate().is_ok());
    }

    #[test]
    fn config_validate_invalid_bands_zero() {
        let cfg = PerceptualConfig::new().with_minhash_bands(0);
        assert!(matches!(
            cfg.validate(),
            Err(PerceptualError::InvalidConfigBands { bands: 0 })
        ));
    }

    #[test]
    fn config_validate_invalid_rows_zero() {
        let cfg = PerceptualConfig::new().with_minhash_rows_per_band(0);
        assert!(matches!(
            cfg.validate(),
            Err(PerceptualError::InvalidConfigRows { rows: 0 })
        ));
    }

    #[test]
    fn config_validate_invalid_version_zero() {
        let cfg = PerceptualConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PerceptualError::InvalidConfigVersion { version: 0 })
        ));
    }

    #[test]
    fn config_validate_overflow() {
        let cfg = PerceptualConfig::new()
            .with_minhash_bands(usize::MAX)
            .with_minhash_rows_per_band(2);
        assert!(matches!(
            cfg.validate(),
            Err(PerceptualError::InvalidConfigMinhashLength { .. })
        ));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = PerceptualConfig::new().with_seed(12345).with_parallel(true);
        let serialized = serde_json::to_string(&cfg).unwrap();
        let deserialized: PerceptualConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }

    #[test]
    fn error_display_mentions_counts() {
        let err = PerceptualError::HashFamilyLength {
            expected: 1000,
            actual: 16,
        };
        assert!(err.to_string().contains("16"));
        assert!(err.to_string().contains("1000"));
    }
}
