// ── Generic reactive entity collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via `watch` channels.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection for a single entity type, keyed by the
/// backend identifier.
///
/// Uses `DashMap` for O(1) concurrent lookups and a `watch` channel for
/// push-based change notification. Snapshots are rebuilt only when a batch
/// actually changes something, so subscribers are not woken by identical
/// poll results.
pub(crate) struct EntityCollection<T: Clone + PartialEq + Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,

    /// Full snapshot, ordered by key, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Upsert every incoming entity, then prune keys the batch did not
    /// mention. The collection never passes through an empty state.
    ///
    /// Returns `true` if anything changed.
    pub(crate) fn replace_all(&self, items: impl IntoIterator<Item = (String, T)>) -> bool {
        let mut changed = false;
        let mut incoming = HashSet::new();

        for (key, entity) in items {
            incoming.insert(key.clone());
            changed |= self.store(key, entity);
        }

        let stale: Vec<String> = self
            .by_key
            .iter()
            .filter(|r| !incoming.contains(r.key()))
            .map(|r| r.key().clone())
            .collect();
        for key in stale {
            changed |= self.by_key.remove(&key).is_some();
        }

        if changed {
            self.rebuild_snapshot();
        }
        changed
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Insert unless an equal entity is already stored under `key`.
    fn store(&self, key: String, entity: T) -> bool {
        // The read guard must be released before `insert` touches the shard.
        let unchanged = self.by_key.get(&key).is_some_and(|existing| **existing == entity);
        if unchanged {
            return false;
        }
        self.by_key.insert(key, Arc::new(entity));
        true
    }

    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
