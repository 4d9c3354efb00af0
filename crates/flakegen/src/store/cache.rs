use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::{Identity, StoreError, TimestampStore};

/// Default key prefix for [`CacheStore`].
pub const DEFAULT_KEY_PREFIX: &str = "SNOWFLAKE";

/// Default expiry of a stored timestamp.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// The three operations a [`CacheStore`] needs from a key-value service.
///
/// Any service with get/set/expire semantics qualifies. For Redis this maps
/// to `GET`, `SET` and `EXPIRE`:
///
/// ```ignore
/// impl KeyValueCache for RedisCache {
///     type Error = redis::RedisError;
///
///     fn get(&mut self, key: &str) -> Result<Option<String>, Self::Error> {
///         self.conn.get(key)
///     }
///
///     fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
///         self.conn.set(key, value)
///     }
///
///     fn expire(&mut self, key: &str, ttl: Duration) -> Result<(), Self::Error> {
///         self.conn.expire(key, ttl.as_secs() as i64)
///     }
/// }
/// ```
pub trait KeyValueCache {
    type Error: core::error::Error + Send + Sync + 'static;

    /// Returns the value under `key`, or `None` if it is absent or expired.
    fn get(&mut self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Makes `key` disappear after `ttl`.
    fn expire(&mut self, key: &str, ttl: Duration) -> Result<(), Self::Error>;
}

/// Key prefix and expiry for a [`CacheStore`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Keys are formatted as `<key_prefix>:<datacenter_id>:<worker_id>`.
    pub key_prefix: String,
    /// Seconds before an unrefreshed timestamp expires.
    pub ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
            ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

/// A [`TimestampStore`] backed by an external key-value cache.
///
/// Lets several processes that share an [`Identity`] see the most recent
/// timestamp any of them used. Coordination is advisory: there is no lock, so
/// two live generators racing on the same identity can still collide within a
/// millisecond. Giving each live generator its own identity remains the
/// operator's job.
///
/// Every write refreshes the expiry, so a crashed generator does not hold its
/// slot forever. Once the entry expires the next generator starts cold, as if
/// no ID had ever been issued.
#[derive(Clone, Debug)]
pub struct CacheStore<C> {
    cache: C,
    key_prefix: String,
    ttl: Duration,
}

impl<C> CacheStore<C>
where
    C: KeyValueCache,
{
    /// Uses the default prefix and a 30 second expiry.
    pub fn new(cache: C) -> Self {
        Self::with_config(cache, &StoreConfig::default())
    }

    pub fn with_config(cache: C, config: &StoreConfig) -> Self {
        Self {
            cache,
            key_prefix: config.key_prefix.clone(),
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }

    /// Overrides the expiry, including sub-second values.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The cache key for `identity`.
    pub fn key(&self, identity: &Identity) -> String {
        format!(
            "{}:{}:{}",
            self.key_prefix,
            identity.datacenter_id(),
            identity.worker_id()
        )
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_inner(self) -> C {
        self.cache
    }
}

impl<C> TimestampStore for CacheStore<C>
where
    C: KeyValueCache,
{
    fn read(&mut self, identity: &Identity) -> Result<Option<u64>, StoreError> {
        let key = self.key(identity);
        let Some(value) = self.cache.get(&key).map_err(StoreError::backend)? else {
            return Ok(None);
        };
        match value.trim().parse::<u64>() {
            Ok(ts) => Ok(Some(ts)),
            Err(_) => Err(StoreError::InvalidValue { key, value }),
        }
    }

    fn write(&mut self, identity: &Identity, timestamp: u64) -> Result<(), StoreError> {
        let key = self.key(identity);
        self.cache
            .set(&key, &timestamp.to_string())
            .map_err(StoreError::backend)?;
        self.cache
            .expire(&key, self.ttl)
            .map_err(StoreError::backend)?;
        #[cfg(feature = "tracing")]
        debug!(%key, timestamp, ttl_ms = self.ttl.as_millis() as u64, "stored last timestamp");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BitLayout, MemoryCache};

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    struct DownCache;

    impl KeyValueCache for DownCache {
        type Error = Refused;

        fn get(&mut self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(Refused)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(Refused)
        }

        fn expire(&mut self, _key: &str, _ttl: Duration) -> Result<(), Self::Error> {
            Err(Refused)
        }
    }

    fn identity() -> Identity {
        Identity::new(3, 12, &BitLayout::TWITTER).unwrap()
    }

    #[test]
    fn formats_key_from_identity() {
        let store = CacheStore::new(MemoryCache::new());
        assert_eq!(store.key(&identity()), "SNOWFLAKE:3:12");

        let config = StoreConfig {
            key_prefix: "ids".to_owned(),
            ttl_secs: 5,
        };
        let store = CacheStore::with_config(MemoryCache::new(), &config);
        assert_eq!(store.key(&identity()), "ids:3:12");
        assert_eq!(store.ttl(), Duration::from_secs(5));
    }

    #[test]
    fn reads_back_what_it_wrote() {
        let mut store = CacheStore::new(MemoryCache::new());
        assert_eq!(store.read(&identity()).unwrap(), None);
        store.write(&identity(), 1_420_041_601_000).unwrap();
        assert_eq!(store.read(&identity()).unwrap(), Some(1_420_041_601_000));
        assert_eq!(
            store.cache().get_raw("SNOWFLAKE:3:12").as_deref(),
            Some("1420041601000")
        );
    }

    #[test]
    fn identities_do_not_share_entries() {
        let mut store = CacheStore::new(MemoryCache::new());
        let other = Identity::new(3, 13, &BitLayout::TWITTER).unwrap();
        store.write(&identity(), 10).unwrap();
        assert_eq!(store.read(&other).unwrap(), None);
    }

    #[test]
    fn rejects_non_numeric_values() {
        let mut cache = MemoryCache::new();
        cache.set("SNOWFLAKE:3:12", "yesterday").unwrap();
        let mut store = CacheStore::new(cache);
        match store.read(&identity()) {
            Err(StoreError::InvalidValue { key, value }) => {
                assert_eq!(key, "SNOWFLAKE:3:12");
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn surfaces_backend_errors() {
        let mut store = CacheStore::new(DownCache);
        let err = store.read(&identity()).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(err.to_string(), "cache backend error: connection refused");
        assert!(store.write(&identity(), 1).is_err());
    }

    #[test]
    fn entries_expire() {
        let mut store =
            CacheStore::new(MemoryCache::new()).with_ttl(Duration::from_millis(20));
        store.write(&identity(), 99).unwrap();
        assert_eq!(store.read(&identity()).unwrap(), Some(99));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(store.read(&identity()).unwrap(), None);
    }
}
