//! Process-local mirror of the last-synchronized filter set.

use crate::core::FilterDescriptor;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Mapping from filter id to the last-synchronized descriptor.
///
/// The sync engine is the sole writer; the filter-resolution collaborator
/// reads concurrently. Reads return cloned values so a reader never observes
/// a torn descriptor while an upsert is in flight.
#[derive(Debug, Default)]
pub struct FilterStore {
    filters: RwLock<HashMap<String, FilterDescriptor>>,
}

impl FilterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored descriptor for an id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<FilterDescriptor> {
        self.filters.read().get(id).cloned()
    }

    /// Returns true if the store already holds a value-equal copy.
    ///
    /// This is the change check of the sync engine: any field difference
    /// counts as a new revision.
    #[must_use]
    pub fn is_current(&self, descriptor: &FilterDescriptor) -> bool {
        self.filters
            .read()
            .get(&descriptor.id)
            .is_some_and(|existing| existing == descriptor)
    }

    /// Inserts or replaces the descriptor under its id.
    pub fn upsert(&self, descriptor: FilterDescriptor) {
        self.filters
            .write()
            .insert(descriptor.id.clone(), descriptor);
    }

    /// Returns a copy of the whole set.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, FilterDescriptor> {
        self.filters.read().clone()
    }

    /// Returns the number of synchronized filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.read().len()
    }

    /// Returns true if nothing has been synchronized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FilterKind;

    fn descriptor(content: &str) -> FilterDescriptor {
        FilterDescriptor::new("F1", FilterKind::Pre, "f1", content)
    }

    #[test]
    fn test_starts_empty() {
        let store = FilterStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("F1"), None);
    }

    #[test]
    fn test_upsert_and_get() {
        let store = FilterStore::new();
        store.upsert(descriptor("v1"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("F1"), Some(descriptor("v1")));
    }

    #[test]
    fn test_upsert_replaces_same_id() {
        let store = FilterStore::new();
        store.upsert(descriptor("v1"));
        store.upsert(descriptor("v2"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("F1"), Some(descriptor("v2")));
    }

    #[test]
    fn test_is_current_requires_full_value_equality() {
        let store = FilterStore::new();
        assert!(!store.is_current(&descriptor("v1")));

        store.upsert(descriptor("v1"));
        assert!(store.is_current(&descriptor("v1")));
        assert!(!store.is_current(&descriptor("v2")));

        let renamed = FilterDescriptor::new("F1", FilterKind::Pre, "other", "v1");
        assert!(!store.is_current(&renamed));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = FilterStore::new();
        store.upsert(descriptor("v1"));

        let snapshot = store.snapshot();
        store.upsert(descriptor("v2"));

        assert_eq!(snapshot.get("F1"), Some(&descriptor("v1")));
    }
}
