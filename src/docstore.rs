//! Insertion-ordered id → Fragment table.

use serde::{Deserialize, Serialize};

use crate::types::{Fragment, FragmentId};

/// One stored fragment with its assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocEntry {
    pub id: FragmentId,
    pub fragment: Fragment,
}

/// The docstore half of the index: fragments in insertion order.
///
/// Ids are assigned monotonically by the index, so the entry sequence is
/// sorted by id and lookups can binary-search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Docstore {
    entries: Vec<DocEntry>,
}

impl Docstore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Caller guarantees `id` is greater than every id
    /// already stored; checked in debug builds.
    pub fn push(&mut self, id: FragmentId, fragment: Fragment) {
        debug_assert!(
            self.entries.last().is_none_or(|last| last.id < id),
            "docstore ids must be appended in increasing order"
        );
        self.entries.push(DocEntry { id, fragment });
    }

    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.entries
            .binary_search_by_key(&id, |entry| entry.id)
            .ok()
            .map(|pos| &self.entries[pos].fragment)
    }

    /// Entry at a given insertion position.
    pub fn at(&self, position: usize) -> Option<&DocEntry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FragmentId, &Fragment)> {
        self.entries
            .iter()
            .map(|entry| (entry.id, &entry.fragment))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = FragmentId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_id(&self) -> Option<FragmentId> {
        self.entries.last().map(|entry| entry.id)
    }
}
