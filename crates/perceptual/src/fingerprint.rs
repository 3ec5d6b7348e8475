//! Signature type produced by the signing layer.
//!
//! The signature schema is part of the public contract: it is stored next to
//! each indexed document and compared position by position at query time.

use serde::{Deserialize, Serialize};

use crate::config::PerceptualError;

/// Slot value of a signature computed from an empty shingle set.
pub const SENTINEL: u32 = u32::MAX;

/// Fixed-length MinHash signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinHashSignature {
    values: Vec<u32>,
}

impl MinHashSignature {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<u32> {
        self.values
    }

    /// True when every slot holds the sentinel, i.e. the signed set was empty.
    pub fn is_sentinel(&self) -> bool {
        !self.values.is_empty() && self.values.iter().all(|&v| v == SENTINEL)
    }

    /// Fraction of positions where both signatures agree.
    ///
    /// This is the unbiased MinHash estimate of the Jaccard similarity of the
    /// underlying shingle sets. Signatures of different length cannot be
    /// compared.
    pub fn estimate_jaccard(&self, other: &MinHashSignature) -> Result<f64, PerceptualError> {
        if self.len() != other.len() {
            return Err(PerceptualError::SignatureLength {
                expected: self.len(),
                actual: other.len(),
            });
        }
        if self.is_empty() {
            return Ok(0.0);
        }
        let equal = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a == b)
            .count();
        Ok(equal as f64 / self.len() as f64)
    }
}

impl From<Vec<u32>> for MinHashSignature {
    fn from(values: Vec<u32>) -> Self {
        Self::new(values)
    }
}

impl AsRef<[u32]> for MinHashSignature {
    fn as_ref(&self) -> &[u32] {
        &self.values
    }
}
