use core::{convert::Infallible, time::Duration};
use std::{collections::HashMap, sync::Arc, time::Instant};

use crate::{
    KeyValueCache,
    mutex::{Mutex, MutexGuard},
};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// An in-process [`KeyValueCache`] with per-key expiry.
///
/// Clones share the same entries, which makes it a stand-in for an external
/// cache when several generators in one process should coordinate through a
/// [`CacheStore`].
///
/// [`CacheStore`]: crate::CacheStore
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value under `key` without going through the trait.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops `key` immediately, as if it had expired.
    pub fn remove(&self, key: &str) -> bool {
        self.entries().remove(key).is_some()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        #[cfg(feature = "parking-lot")]
        {
            self.entries.lock()
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            // A panic mid-update leaves at worst a stale entry behind.
            self.entries
                .lock()
                .unwrap_or_else(crate::mutex::PoisonError::into_inner)
        }
    }
}

impl KeyValueCache for MemoryCache {
    type Error = Infallible;

    fn get(&mut self, key: &str) -> Result<Option<String>, Self::Error> {
        let now = Instant::now();
        let mut entries = self.entries();
        if let Some(entry) = entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
            entries.remove(key);
        }
        Ok(None)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries().insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: None,
            },
        );
        Ok(())
    }

    fn expire(&mut self, key: &str, ttl: Duration) -> Result<(), Self::Error> {
        if let Some(entry) = self.entries().get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clears_a_previous_expiry() {
        let mut cache = MemoryCache::new();
        cache.set("k", "1").unwrap();
        cache.expire("k", Duration::ZERO).unwrap();
        assert_eq!(cache.get("k").unwrap(), None);

        cache.set("k", "2").unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn clones_share_entries() {
        let mut a = MemoryCache::new();
        let mut b = a.clone();
        a.set("shared", "7").unwrap();
        assert_eq!(b.get("shared").unwrap().as_deref(), Some("7"));
        assert_eq!(a.len(), 1);
        assert!(b.remove("shared"));
        assert!(a.is_empty());
    }

    #[test]
    fn expire_on_missing_key_is_a_no_op() {
        let mut cache = MemoryCache::new();
        cache.expire("missing", Duration::from_secs(1)).unwrap();
        assert!(cache.is_empty());
    }
}
