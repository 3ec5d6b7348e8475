//! MinHash computation over shingle sets.
//!
//! Each slot `i` of the signature is the minimum of hash function `i` over
//! every shingle in the set. Shingles are fed through
//! [`HashFamily::hash_all`] one at a time and merged into the running
//! minimum, so the whole family is applied in one pass per shingle.

use rayon::prelude::*;

use crate::family::HashFamily;
use crate::fingerprint::SENTINEL;

/// Shingles handed to one rayon task in parallel mode.
const PAR_CHUNK: usize = 64;

/// Compute a MinHash signature of length `family.len()`.
///
/// An empty shingle set yields the sentinel (`u32::MAX`) in every slot.
/// Parallel and sequential modes produce identical output because `min` is
/// associative and commutative.
pub fn minhash_signature<S, F>(shingles: &[S], family: &F, use_parallel: bool) -> Vec<u32>
where
    S: AsRef<[u8]> + Sync,
    F: HashFamily + ?Sized,
{
    let m = family.len();
    if m == 0 {
        return Vec::new();
    }
    if shingles.is_empty() {
        return vec![SENTINEL; m];
    }

    if use_parallel && shingles.len() > PAR_CHUNK {
        shingles
            .par_chunks(PAR_CHUNK)
            .map(|chunk| fold_chunk(chunk, family))
            .reduce(|| vec![SENTINEL; m], merge_min)
    } else {
        fold_chunk(shingles, family)
    }
}

/// Sequential min-fold of a run of shingles.
fn fold_chunk<S, F>(shingles: &[S], family: &F) -> Vec<u32>
where
    S: AsRef<[u8]>,
    F: HashFamily + ?Sized,
{
    let m = family.len();
    let mut signature = vec![SENTINEL; m];
    let mut scratch = vec![0u32; m];
    for shingle in shingles {
        family.hash_all(shingle.as_ref(), &mut scratch);
        for (slot, &value) in signature.iter_mut().zip(&scratch) {
            if value < *slot {
                *slot = value;
            }
        }
    }
    signature
}

#[inline]
fn merge_min(mut acc: Vec<u32>, other: Vec<u32>) -> Vec<u32> {
    for (slot, value) in acc.iter_mut().zip(other) {
        if value < *slot {
            *slot = value;
        }
    }
    acc
}
