//! # Keyed Entity Store
//!
//! A map from an opaque string key to the [`ProcessState`] of the entity stored under it.
//! Carts are keyed by cart id, configurations by owner key. The store itself knows nothing
//! about either.
//!
//! Reducers receive `&mut KeyedStore<T>` and mutate it only through [`KeyedStore::apply`],
//! [`KeyedStore::update_value`] and [`KeyedStore::remove`]. Each of those records the key as
//! *touched*, so the owning [`EntityStore`](crate::EntityStore) republishes exactly the keys a
//! reduction changed and nothing else.

use crate::process_state::{ProcessState, Transition};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Key → [`ProcessState`] map with per-key change tracking.
#[derive(Debug, Clone)]
pub struct KeyedStore<T> {
    entries: HashMap<String, ProcessState<T>>,
    touched: BTreeSet<String>,
}

impl<T> Default for KeyedStore<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            touched: BTreeSet::new(),
        }
    }
}

impl<T: Clone> KeyedStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state for `key`, or the zeroed default when the key was never written.
    pub fn get(&self, key: &str) -> ProcessState<T> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Borrowing lookup, `None` for absent keys.
    pub fn entry(&self, key: &str) -> Option<&ProcessState<T>> {
        self.entries.get(key)
    }

    /// Applies `transition` to the entry for `key`, creating the entry if needed.
    pub fn apply(&mut self, key: &str, transition: Transition<T>) {
        if let Transition::Fail(reason) = &transition {
            warn!(key, error = %reason, "Process failed");
        } else {
            debug!(key, transition = transition.kind(), "Transition");
        }
        self.entries
            .entry(key.to_string())
            .or_default()
            .apply(transition);
        self.touched.insert(key.to_string());
    }

    /// Mutates the cached value in place without changing any flag.
    ///
    /// Returns `false` (and touches nothing) when no value is cached for `key`.
    pub fn update_value(&mut self, key: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.entries.get_mut(key).and_then(|state| state.value.as_mut()) {
            Some(value) => {
                f(value);
                self.touched.insert(key.to_string());
                true
            }
            None => false,
        }
    }

    /// Drops the entry for `key`. Observers of the key see the zeroed default afterwards.
    pub fn remove(&mut self, key: &str) -> Option<ProcessState<T>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            debug!(key, "Removed");
            self.touched.insert(key.to_string());
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A plain copy of the whole map, the store's persisted layout.
    pub fn snapshot(&self) -> HashMap<String, ProcessState<T>> {
        self.entries.clone()
    }

    /// Keys changed since the last call, in key order.
    pub(crate) fn take_touched(&mut self) -> Vec<String> {
        std::mem::take(&mut self.touched).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_reads_default() {
        let store = KeyedStore::<String>::new();
        assert_eq!(store.get("never-written"), ProcessState::default());
        assert!(store.entry("never-written").is_none());
    }

    #[test]
    fn test_keys_are_isolated() {
        let mut store = KeyedStore::new();
        store.apply("a", Transition::Start);
        store.apply("b", Transition::Start);
        store.apply("b", Transition::Success(2));

        let a = store.get("a");
        assert!(a.loading);
        assert_eq!(a.value, None);

        let b = store.get("b");
        assert!(!b.loading);
        assert_eq!(b.value, Some(2));
    }

    #[test]
    fn test_touched_keys_drain() {
        let mut store = KeyedStore::new();
        store.apply("b", Transition::Start);
        store.apply("a", Transition::Success(1));
        store.apply("b", Transition::Success(2));

        assert_eq!(store.take_touched(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.take_touched().is_empty());
    }

    #[test]
    fn test_update_value_requires_cached_value() {
        let mut store = KeyedStore::new();
        assert!(!store.update_value("a", |v: &mut u32| *v += 1));
        assert!(store.take_touched().is_empty());

        store.apply("a", Transition::Success(1));
        store.take_touched();
        assert!(store.update_value("a", |v| *v += 1));
        assert_eq!(store.get("a").value, Some(2));
        assert_eq!(store.take_touched(), vec!["a".to_string()]);
    }

    #[test]
    fn test_remove_clears_entry() {
        let mut store = KeyedStore::new();
        store.apply("a", Transition::Success("x"));
        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(store.is_empty());
        assert_eq!(store.get("a"), ProcessState::default());
    }
}
