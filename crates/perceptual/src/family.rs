//! Hash families for MinHash.
//!
//! A [`HashFamily`] is a fixed, indexed set of deterministic functions mapping
//! a shingle to a `u32`. Function `i` of a family built from the same seed
//! basis returns the same value for the same shingle in every run and on
//! every machine.
//!
//! [`XxHashFamily`] is the production family. It hashes each shingle once
//! with xxh3 and then derives all `H` values from that base with a cheap
//! keyed mix, so [`HashFamily::hash_all`] costs one pass over the shingle
//! bytes instead of `H`.
//!
//! [`TableHashFamily`] returns values from a fixed table and exists so that
//! band and ranking behavior can be tested with hand-picked signatures.

use std::collections::HashMap;

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::{PerceptualConfig, PerceptualError};

/// An indexed family of deterministic 32-bit hash functions.
pub trait HashFamily: Send + Sync {
    /// Number of functions `H` in the family.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply function `index` to `shingle`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`. Asking for a function the family does
    /// not have is a caller bug.
    fn hash(&self, index: usize, shingle: &[u8]) -> u32;

    /// Apply every function to `shingle`; `out[i] == self.hash(i, shingle)`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != self.len()`.
    fn hash_all(&self, shingle: &[u8], out: &mut [u32]) {
        assert_eq!(out.len(), self.len(), "output buffer must hold one value per function");
        for (index, slot) in out.iter_mut().enumerate() {
            *slot = self.hash(index, shingle);
        }
    }
}

/// Seeded family built on xxh3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XxHashFamily {
    seed: u64,
    keys: Vec<u64>,
}

impl XxHashFamily {
    /// Build `len` functions from `seed`.
    pub fn new(len: usize, seed: u64) -> Self {
        let keys = (0..len as u64)
            .map(|j| splitmix64(seed.wrapping_add(j.wrapping_mul(0x9E37_79B9_7F4A_7C15))))
            .collect();
        Self { seed, keys }
    }

    /// Build a family sized for `cfg` (`H = bands × rows`).
    pub fn from_config(cfg: &PerceptualConfig) -> Result<Self, PerceptualError> {
        cfg.validate()?;
        Ok(Self::new(cfg.num_hashes()?, cfg.seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    fn base(&self, shingle: &[u8]) -> u64 {
        xxh3_64_with_seed(shingle, self.seed)
    }
}

impl HashFamily for XxHashFamily {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn hash(&self, index: usize, shingle: &[u8]) -> u32 {
        assert!(
            index < self.keys.len(),
            "hash function index {index} out of range 0..{}",
            self.keys.len()
        );
        mix32(self.base(shingle), self.keys[index])
    }

    fn hash_all(&self, shingle: &[u8], out: &mut [u32]) {
        assert_eq!(out.len(), self.keys.len(), "output buffer must hold one value per function");
        let base = self.base(shingle);
        for (slot, &key) in out.iter_mut().zip(&self.keys) {
            *slot = mix32(base, key);
        }
    }
}

/// Fixed-table family: known shingles map to explicit per-function values,
/// anything else maps to `fallback` in every slot.
#[derive(Debug, Clone, Default)]
pub struct TableHashFamily {
    len: usize,
    rows: HashMap<Vec<u8>, Vec<u32>>,
    fallback: u32,
}

impl TableHashFamily {
    pub fn new(len: usize, fallback: u32) -> Self {
        Self {
            len,
            rows: HashMap::new(),
            fallback,
        }
    }

    /// Register the values of every function for `shingle`.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from the family length.
    pub fn with_row(mut self, shingle: impl AsRef<[u8]>, values: Vec<u32>) -> Self {
        assert_eq!(values.len(), self.len, "table row must hold one value per function");
        self.rows.insert(shingle.as_ref().to_vec(), values);
        self
    }
}

impl HashFamily for TableHashFamily {
    fn len(&self) -> usize {
        self.len
    }

    fn hash(&self, index: usize, shingle: &[u8]) -> u32 {
        assert!(
            index < self.len,
            "hash function index {index} out of range 0..{}",
            self.len
        );
        self.rows
            .get(shingle)
            .map_or(self.fallback, |values| values[index])
    }
}

/// Keyed finalizer; the high half of a murmur3 fmix64 over `x ^ key`.
#[inline]
pub(crate) fn mix32(x: u64, key: u64) -> u32 {
    let mut h = x ^ key;
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    (h >> 32) as u32
}

/// A 64-bit hash function that is fast and has good distribution.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
