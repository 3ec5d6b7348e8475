//! Shingle sets and exact Jaccard similarity.
//!
//! A [`ShingleSet`] is kept sorted and deduplicated, so set operations are a
//! single merge walk and two sets built from the same tokens compare equal
//! regardless of the order the tokens were seen in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Deduplicated set of byte-string shingles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct ShingleSet {
    shingles: Vec<Vec<u8>>,
}

impl ShingleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the shingle set from a feature blob by splitting on the outer
    /// separator, then the inner one, and dropping empty tokens.
    pub fn from_blob(blob: &str, outer: char, inner: char) -> Self {
        blob.split(outer)
            .flat_map(|field| field.split(inner))
            .filter(|token| !token.is_empty())
            .map(|token| token.as_bytes().to_vec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shingles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shingles.is_empty()
    }

    pub fn contains(&self, shingle: &[u8]) -> bool {
        self.shingles
            .binary_search_by(|entry| entry.as_slice().cmp(shingle))
            .is_ok()
    }

    /// Iterate shingles in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.shingles.iter().map(Vec::as_slice)
    }

    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.shingles
    }

    /// Number of shingles present in both sets.
    pub fn intersection_len(&self, other: &ShingleSet) -> usize {
        let (mut i, mut j, mut common) = (0, 0, 0);
        let (a, b) = (&self.shingles, &other.shingles);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    common += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        common
    }

    /// Exact Jaccard similarity `|A ∩ B| / |A ∪ B|`.
    ///
    /// Always within `[0, 1]`. Two empty sets score 0.0.
    pub fn jaccard(&self, other: &ShingleSet) -> f64 {
        let intersection = self.intersection_len(other);
        let union = self.len() + other.len() - intersection;
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }
}

impl From<Vec<Vec<u8>>> for ShingleSet {
    fn from(mut shingles: Vec<Vec<u8>>) -> Self {
        shingles.sort_unstable();
        shingles.dedup();
        Self { shingles }
    }
}

impl From<ShingleSet> for Vec<Vec<u8>> {
    fn from(set: ShingleSet) -> Self {
        set.shingles
    }
}

impl FromIterator<Vec<u8>> for ShingleSet {
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> FromIterator<&'a str> for ShingleSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(|s| s.as_bytes().to_vec()).collect()
    }
}

/// Overlapping character windows of `size` over `title`.
///
/// A non-empty title shorter than the window is padded with trailing spaces
/// so at least one window exists. An empty title yields nothing.
pub fn title_shingles(title: &str, size: usize) -> Vec<String> {
    let mut chars: Vec<char> = title.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }
    if chars.len() < size {
        chars.resize(size, ' ');
    }
    chars
        .windows(size)
        .map(|window| window.iter().collect())
        .collect()
}
