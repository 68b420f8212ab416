//! Shared in-process cache backend.
//!
//! One [`VolatileBackend`] plays the role of the site-wide cache; each
//! [`VolatileStore`] is a namespaced view over it.

use super::{
    expiry_epoch_ms, is_expired, now_epoch_ms, validate_key, KeyValueStore, StoreError,
    StoreKind, StoreResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
struct VolatileEntry {
    value: Vec<u8>,
    expires_at_ms: Option<i64>,
}

/// Process-local cache shared by every volatile store handle.
#[derive(Debug, Clone, Default)]
pub struct VolatileBackend {
    entries: Arc<Mutex<HashMap<String, VolatileEntry>>>,
}

impl VolatileBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of raw entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, VolatileEntry>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::LockPoisoned("volatile"))
    }
}

/// Prefix-namespaced view over a [`VolatileBackend`].
#[derive(Debug, Clone)]
pub struct VolatileStore {
    backend: VolatileBackend,
    prefix: String,
    namespace: String,
}

impl VolatileStore {
    /// Binds `prefix` to a shared backend. The factory rejects empty prefixes.
    pub fn new(backend: VolatileBackend, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        // Length-delimited so that ("a", "b:c") and ("a:b", "c") stay distinct.
        let namespace = format!("{}:{}:", prefix.len(), prefix);
        Self {
            backend,
            prefix,
            namespace,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }
}

impl KeyValueStore for VolatileStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Volatile
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let mut entries = self.backend.lock()?;
        let full_key = self.namespaced(key);
        let now_ms = now_epoch_ms();
        match entries.get(&full_key) {
            Some(entry) if !is_expired(entry.expires_at_ms, now_ms) => {
                Ok(Some(entry.value.clone()))
            }
            Some(_) => {
                entries.remove(&full_key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> StoreResult<()> {
        validate_key(key)?;
        let mut entries = self.backend.lock()?;
        entries.insert(
            self.namespaced(key),
            VolatileEntry {
                value: value.to_vec(),
                expires_at_ms: expiry_epoch_ms(ttl),
            },
        );
        Ok(())
    }

    fn add(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> StoreResult<bool> {
        validate_key(key)?;
        let mut entries = self.backend.lock()?;
        let full_key = self.namespaced(key);
        let now_ms = now_epoch_ms();
        if let Some(existing) = entries.get(&full_key) {
            if !is_expired(existing.expires_at_ms, now_ms) {
                return Ok(false);
            }
        }
        entries.insert(
            full_key,
            VolatileEntry {
                value: value.to_vec(),
                expires_at_ms: expiry_epoch_ms(ttl),
            },
        );
        Ok(true)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let mut entries = self.backend.lock()?;
        Ok(entries.remove(&self.namespaced(key)).is_some())
    }

    fn cleanup_expired(&self) -> StoreResult<usize> {
        let mut entries = self.backend.lock()?;
        let now_ms = now_epoch_ms();
        let before = entries.len();
        entries.retain(|key, entry| {
            !(key.starts_with(&self.namespace) && is_expired(entry.expires_at_ms, now_ms))
        });
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{VolatileBackend, VolatileStore};
    use crate::store::KeyValueStore;
    use std::time::Duration;

    #[test]
    fn reading_expired_entry_evicts_it() {
        let backend = VolatileBackend::new();
        let store = VolatileStore::new(backend.clone(), "openid:consumer:");
        store.put("nonce", b"n", Some(Duration::ZERO)).unwrap();
        store.put("assoc", b"a", None).unwrap();
        assert_eq!(backend.len(), 2);

        assert_eq!(store.get("nonce").unwrap(), None);
        assert_eq!(backend.len(), 1);
        assert_eq!(store.get("assoc").unwrap(), Some(b"a".to_vec()));
    }

    #[test]
    fn put_then_get_returns_value() {
        let store = VolatileStore::new(VolatileBackend::new(), "openid:server:");
        store.put("assoc", b"secret", None).unwrap();
        assert_eq!(store.get("assoc").unwrap(), Some(b"secret".to_vec()));
    }

    #[test]
    fn overlapping_prefixes_do_not_collide() {
        let backend = VolatileBackend::new();
        let short = VolatileStore::new(backend.clone(), "a");
        let long = VolatileStore::new(backend.clone(), "a:b");

        short.put("b:c", b"short", None).unwrap();
        long.put("c", b"long", None).unwrap();

        assert_eq!(short.get("b:c").unwrap(), Some(b"short".to_vec()));
        assert_eq!(long.get("c").unwrap(), Some(b"long".to_vec()));
        assert_eq!(backend.len(), 2);
    }

    #[test]
    fn add_refuses_live_key_but_replaces_expired_one() {
        let store = VolatileStore::new(VolatileBackend::new(), "nonce");
        assert!(store.add("n1", b"1", Some(Duration::ZERO)).unwrap());
        assert!(store.add("n1", b"2", None).unwrap());
        assert!(!store.add("n1", b"3", None).unwrap());
        assert_eq!(store.get("n1").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn cleanup_only_touches_own_namespace() {
        let backend = VolatileBackend::new();
        let first = VolatileStore::new(backend.clone(), "ns1");
        let second = VolatileStore::new(backend.clone(), "ns2");
        first.put("k", b"v", Some(Duration::ZERO)).unwrap();
        second.put("k", b"v", Some(Duration::ZERO)).unwrap();

        assert_eq!(first.cleanup_expired().unwrap(), 1);
        assert_eq!(backend.len(), 1);
        assert_eq!(second.cleanup_expired().unwrap(), 1);
        assert!(backend.is_empty());
    }

    #[test]
    fn delete_reports_whether_key_existed() {
        let store = VolatileStore::new(VolatileBackend::new(), "p");
        store.put("k", b"v", None).unwrap();
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
    }
}
