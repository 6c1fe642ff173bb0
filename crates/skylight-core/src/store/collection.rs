// ── Generic reactive keyed collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via a `watch` version counter.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection keyed by string id.
///
/// Every mutation bumps a version counter that subscribers can await.
pub(crate) struct KeyedCollection<T: Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,
}

impl<T: Send + Sync + 'static> KeyedCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            by_key: DashMap::new(),
            version,
        }
    }

    /// Insert or replace an entry. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: impl Into<String>, value: T) -> bool {
        let is_new = self.by_key.insert(key.into(), Arc::new(value)).is_none();
        self.bump_version();
        is_new
    }

    /// Rewrite an existing entry in place. Returns `false` if the key is
    /// unknown.
    pub(crate) fn update(&self, key: &str, f: impl FnOnce(&T) -> T) -> bool {
        let Some(mut entry) = self.by_key.get_mut(key) else {
            return false;
        };
        let next = f(entry.value());
        *entry.value_mut() = Arc::new(next);
        drop(entry);
        self.bump_version();
        true
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Subscribe to the version counter.
    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn bump_version(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_key() {
        let col: KeyedCollection<String> = KeyedCollection::new();
        assert!(col.upsert("lamp", "on".to_owned()));
        assert!(!col.upsert("lamp", "off".to_owned()));
        assert_eq!(*col.get("lamp").unwrap(), "off");
    }

    #[test]
    fn update_rewrites_existing_only() {
        let col: KeyedCollection<u8> = KeyedCollection::new();
        col.upsert("dimmer", 10);
        assert!(col.update("dimmer", |v| v + 5));
        assert_eq!(*col.get("dimmer").unwrap(), 15);
        assert!(!col.update("missing", |v| *v));
        assert!(col.get("missing").is_none());
    }

    #[test]
    fn mutations_bump_version() {
        let col: KeyedCollection<u8> = KeyedCollection::new();
        let rx = col.subscribe();
        col.upsert("a", 1);
        col.update("a", |v| v + 1);
        assert_eq!(*rx.borrow(), 2);
    }
}
