//! Reverse reference index, used for "referenced in" navigation.

use indexmap::{IndexMap, IndexSet};

use litloom_core::fragment::Key;

/// Maps a fragment key to the keys of the fragments referencing it.
///
/// The index is purely additive and never takes part in resolution.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReferenceIndex {
    referencers: IndexMap<Key, IndexSet<Key>>,
}

impl ReferenceIndex {
    /// Records that `referencer` references `referencee`.
    ///
    /// Returns `false` if the reference was already known.
    pub fn add(&mut self, referencer: Key, referencee: Key) -> bool {
        self.referencers
            .entry(referencee)
            .or_default()
            .insert(referencer)
    }

    pub fn referencers(&self, referencee: &Key) -> impl Iterator<Item = &Key> {
        self.referencers.get(referencee).into_iter().flatten()
    }

    /// Adds every reference of `other`.
    pub fn union(&mut self, other: &ReferenceIndex) {
        for (referencee, referencers) in &other.referencers {
            self.referencers
                .entry(*referencee)
                .or_default()
                .extend(referencers.iter().copied());
        }
    }
}
