//! Band conversion and the derived similarity threshold.

use perceptual::PerceptualConfig;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::IndexError;

/// LSH banding layout: `bands` contiguous groups of `rows` signature slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Banding {
    bands: usize,
    rows: usize,
}

impl Banding {
    /// Both counts must be at least 1 and their product must fit in `usize`.
    pub fn new(bands: usize, rows: usize) -> Result<Self, IndexError> {
        if bands == 0 || rows == 0 || bands.checked_mul(rows).is_none() {
            return Err(IndexError::InvalidBanding { bands, rows });
        }
        Ok(Self { bands, rows })
    }

    pub fn from_config(cfg: &PerceptualConfig) -> Result<Self, IndexError> {
        Self::new(cfg.minhash_bands, cfg.minhash_rows_per_band)
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Signature length `H` this layout expects.
    pub fn signature_len(&self) -> usize {
        self.bands * self.rows
    }

    /// `(1/bands)^(1/rows)`, the Jaccard similarity at which a pair shares at
    /// least one band with probability of roughly one half.
    pub fn similarity_threshold(&self) -> f64 {
        similarity_threshold(self.bands, self.rows)
    }

    /// Hash each band of `signature` into one key.
    pub fn band_hashes(&self, signature: &[u32]) -> Result<Vec<u64>, IndexError> {
        convert_to_bands(signature, self.bands, self.rows)
    }
}

/// Split a signature into `bands` contiguous chunks of `rows` values and hash
/// each chunk.
///
/// Band `b` covers positions `[b * rows, b * rows + rows)`. Equal chunks hash
/// equal, so two signatures that agree on every row of band `b` share that
/// band's key.
pub fn convert_to_bands(signature: &[u32], bands: usize, rows: usize) -> Result<Vec<u64>, IndexError> {
    let expected = bands
        .checked_mul(rows)
        .filter(|_| bands > 0 && rows > 0)
        .ok_or(IndexError::InvalidBanding { bands, rows })?;
    if signature.len() != expected {
        return Err(IndexError::SignatureLength {
            expected,
            actual: signature.len(),
        });
    }

    let mut bytes = Vec::with_capacity(rows * 4);
    let band_hashes = signature
        .chunks_exact(rows)
        .map(|chunk| {
            bytes.clear();
            for value in chunk {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            xxh3_64(&bytes)
        })
        .collect();
    Ok(band_hashes)
}

/// Accept/reject cutoff derived from the banding parameters alone.
///
/// Always computed from the arguments, so a changed layout never sees a
/// stale value.
pub fn similarity_threshold(bands: usize, rows: usize) -> f64 {
    (1.0 / bands as f64).powf(1.0 / rows as f64)
}
