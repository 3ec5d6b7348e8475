//! Per-band bucket tables.
//!
//! One hash table per band maps a band key to the slots of every corpus
//! document whose signature produced that key in that band. A slot appears
//! at most once per bucket and every bucket stays sorted by slot.

use hashbrown::HashMap;

/// Position of a document in the corpus store.
pub type Slot = u32;

#[derive(Debug, Clone, Default)]
pub struct BandIndex {
    tables: Vec<HashMap<u64, Vec<Slot>>>,
}

impl BandIndex {
    pub fn new(bands: usize) -> Self {
        Self {
            tables: (0..bands).map(|_| HashMap::new()).collect(),
        }
    }

    pub fn bands(&self) -> usize {
        self.tables.len()
    }

    /// Record `slot` under each of its band keys.
    ///
    /// Callers guarantee `band_hashes.len() == self.bands()`. Fresh slots
    /// are larger than any posted one and append in O(1); a re-posted slot
    /// is located by binary search.
    pub fn insert(&mut self, band_hashes: &[u64], slot: Slot) {
        debug_assert_eq!(band_hashes.len(), self.tables.len());
        for (table, &key) in self.tables.iter_mut().zip(band_hashes) {
            let bucket = table.entry(key).or_default();
            match bucket.last() {
                Some(&last) if last >= slot => {
                    if let Err(pos) = bucket.binary_search(&slot) {
                        bucket.insert(pos, slot);
                    }
                }
                _ => bucket.push(slot),
            }
        }
    }

    /// Slots sharing at least one band key with `band_hashes`, ascending and
    /// deduplicated.
    pub fn candidates(&self, band_hashes: &[u64]) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .tables
            .iter()
            .zip(band_hashes)
            .filter_map(|(table, key)| table.get(key))
            .flatten()
            .copied()
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Number of non-empty buckets across all bands.
    pub fn bucket_count(&self) -> usize {
        self.tables.iter().map(HashMap::len).sum()
    }
}
