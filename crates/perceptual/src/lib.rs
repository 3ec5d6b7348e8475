//! # MinHash Signing
//!
//! This crate turns a shingle set into a fixed-length MinHash signature whose
//! position-wise agreement with another signature estimates the Jaccard
//! similarity of the two sets.
//!
//! ## Contract
//!
//! - The signing layer only consumes shingles produced upstream. It never
//!   normalizes or splits text.
//! - A signature is a pure function of `(shingles, hash family)`: no I/O, no
//!   clocks, no global state.
//! - The family length must equal `bands × rows`; every signature compared
//!   in one run comes from the same family.
//!
//! ## Core Pipeline
//!
//! 1.  **Hash family**: `H` seeded functions ([`XxHashFamily`]). Each shingle
//!     is hashed once with xxh3; the `H` values are derived from that base.
//! 2.  **MinHash**: slot `i` keeps the minimum of function `i` over all
//!     shingles. Large sets can be folded in parallel with rayon.
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{sign_shingles, PerceptualConfig, XxHashFamily};
//!
//! let cfg = PerceptualConfig::new()
//!     .with_minhash_bands(4)
//!     .with_minhash_rows_per_band(2);
//! let family = XxHashFamily::from_config(&cfg).unwrap();
//!
//! let a = sign_shingles(&["HE", "EA", "AT", "1995"], &family, &cfg).unwrap();
//! let b = sign_shingles(&["AT", "1995", "EA", "HE"], &family, &cfg).unwrap();
//!
//! assert_eq!(a.len(), 8);
//! assert_eq!(a.estimate_jaccard(&b).unwrap(), 1.0);
//! ```
pub mod config;
pub mod family;
pub mod fingerprint;
mod minhash;

pub use crate::config::{PerceptualConfig, PerceptualError};
pub use crate::family::{HashFamily, TableHashFamily, XxHashFamily};
pub use crate::fingerprint::{MinHashSignature, SENTINEL};
pub use crate::minhash::minhash_signature;

/// Sign a shingle set after checking the config and family agree.
///
/// Returns [`PerceptualError::HashFamilyLength`] when the family does not
/// hold exactly `bands × rows` functions.
pub fn sign_shingles<S, F>(
    shingles: &[S],
    family: &F,
    cfg: &PerceptualConfig,
) -> Result<MinHashSignature, PerceptualError>
where
    S: AsRef<[u8]> + Sync,
    F: HashFamily + ?Sized,
{
    cfg.validate()?;
    let expected = cfg.num_hashes()?;
    if family.len() != expected {
        return Err(PerceptualError::HashFamilyLength {
            expected,
            actual: family.len(),
        });
    }
    Ok(MinHashSignature::new(minhash_signature(
        shingles,
        family,
        cfg.use_parallel,
    )))
}
