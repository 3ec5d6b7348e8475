use canonical::{FeatureDocument, ShingleSet};
use hashbrown::HashMap;
use perceptual::MinHashSignature;
use serde::{Deserialize, Serialize};

use crate::bucket::Slot;
use crate::IndexError;

/// Everything kept per indexed document.
///
/// The shingle set is retained for exact Jaccard scoring at query time; the
/// signature for the position-wise estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    pub blob: String,
    pub shingles: ShingleSet,
    pub signature: MinHashSignature,
}

impl StoredDocument {
    pub fn new(features: FeatureDocument, signature: MinHashSignature) -> Self {
        Self {
            id: features.id,
            title: features.title,
            blob: features.blob,
            shingles: features.shingles,
            signature,
        }
    }
}

/// Whether an insert created a new entry or replaced one with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Replaced,
}

/// Append-only document table addressed by slot, with an id lookup.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    docs: Vec<StoredDocument>,
    by_id: HashMap<String, Slot>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Store `doc`, reusing the slot of an existing entry with the same id.
    pub fn upsert(&mut self, doc: StoredDocument) -> Result<(Slot, InsertOutcome), IndexError> {
        if let Some(&slot) = self.by_id.get(&doc.id) {
            self.docs[slot as usize] = doc;
            return Ok((slot, InsertOutcome::Replaced));
        }
        let slot = Slot::try_from(self.docs.len()).map_err(|_| IndexError::CapacityExceeded {
            len: self.docs.len(),
        })?;
        self.by_id.insert(doc.id.clone(), slot);
        self.docs.push(doc);
        Ok((slot, InsertOutcome::Inserted))
    }

    pub fn get(&self, slot: Slot) -> Option<&StoredDocument> {
        self.docs.get(slot as usize)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&StoredDocument> {
        self.by_id.get(id).and_then(|&slot| self.get(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredDocument> + '_ {
        self.docs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            title: title.to_string(),
            blob: title.to_uppercase(),
            shingles: ShingleSet::from_blob(&title.to_uppercase(), '|', ' '),
            signature: MinHashSignature::new(vec![1, 2]),
        }
    }

    #[test]
    fn slots_are_sequential() {
        let mut store = CorpusStore::new();
        assert_eq!(store.upsert(doc("a", "A")).unwrap(), (0, InsertOutcome::Inserted));
        assert_eq!(store.upsert(doc("b", "B")).unwrap(), (1, InsertOutcome::Inserted));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).map(|d| d.id.as_str()), Some("b"));
    }

    #[test]
    fn duplicate_id_replaces_in_place() {
        let mut store = CorpusStore::new();
        store.upsert(doc("a", "Old")).unwrap();
        let (slot, outcome) = store.upsert(doc("a", "New")).unwrap();
        assert_eq!((slot, outcome), (0, InsertOutcome::Replaced));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_id("a").map(|d| d.title.as_str()), Some("New"));
    }

    #[test]
    fn missing_lookups_return_none() {
        let store = CorpusStore::new();
        assert!(store.get(0).is_none());
        assert!(store.get_by_id("nope").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn stored_document_serde_roundtrip() {
        let original = doc("x", "Heat");
        let json = serde_json::to_string(&original).unwrap();
        let back: StoredDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
