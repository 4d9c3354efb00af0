use crate::{BitLayout, CacheStore, DEFAULT_EPOCH, Identity, KeyValueCache, Result, StoreConfig};

/// Default width of the sequence field.
pub const DEFAULT_SEQUENCE_BITS: u8 = 12;

/// Default width of the timestamp field.
pub const DEFAULT_TIMESTAMP_BITS: u8 = 41;

/// Everything needed to build a [`Generator`], besides its store and clock.
///
/// Leaving `datacenter_id` unset selects a single worker field: worker IDs get
/// 10 bits and there is no datacenter field. Setting it splits the same 10
/// bits into 5 for the datacenter and 5 for the worker. Explicit
/// `worker_bits`/`datacenter_bits` override either default.
///
/// With the `serde` feature the config deserializes from any serde format and
/// rejects keys it does not know:
///
/// ```
/// # #[cfg(feature = "serde")] {
/// use flakegen::GeneratorConfig;
///
/// let config: GeneratorConfig =
///     serde_json::from_str(r#"{ "datacenter_id": 1, "worker_id": 7 }"#).unwrap();
/// assert_eq!(config.worker_id, 7);
///
/// let typo = serde_json::from_str::<GeneratorConfig>(r#"{ "workerId": 7 }"#);
/// assert!(typo.is_err());
/// # }
/// ```
///
/// [`Generator`]: crate::Generator
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub datacenter_id: Option<u64>,
    pub worker_id: u64,
    /// Unix milliseconds subtracted from the clock before encoding.
    pub epoch_millis: u64,
    pub sequence_bits: u8,
    pub worker_bits: Option<u8>,
    pub datacenter_bits: Option<u8>,
    pub timestamp_bits: u8,
    /// Only used when building a [`CacheStore`].
    pub store: StoreConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            datacenter_id: None,
            worker_id: 0,
            epoch_millis: DEFAULT_EPOCH,
            sequence_bits: DEFAULT_SEQUENCE_BITS,
            worker_bits: None,
            datacenter_bits: None,
            timestamp_bits: DEFAULT_TIMESTAMP_BITS,
            store: StoreConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(worker_id: u64) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_datacenter_id(mut self, datacenter_id: u64) -> Self {
        self.datacenter_id = Some(datacenter_id);
        self
    }

    #[must_use]
    pub fn with_epoch_millis(mut self, epoch_millis: u64) -> Self {
        self.epoch_millis = epoch_millis;
        self
    }

    #[must_use]
    pub fn with_sequence_bits(mut self, bits: u8) -> Self {
        self.sequence_bits = bits;
        self
    }

    #[must_use]
    pub fn with_worker_bits(mut self, bits: u8) -> Self {
        self.worker_bits = Some(bits);
        self
    }

    #[must_use]
    pub fn with_datacenter_bits(mut self, bits: u8) -> Self {
        self.datacenter_bits = Some(bits);
        self
    }

    #[must_use]
    pub fn with_timestamp_bits(mut self, bits: u8) -> Self {
        self.timestamp_bits = bits;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Resolves the field widths.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the widths do not fit in 63 bits.
    pub fn layout(&self) -> Result<BitLayout> {
        let (worker_bits, datacenter_bits) = match self.datacenter_id {
            Some(_) => (5, 5),
            None => (10, 0),
        };
        BitLayout::new(
            self.sequence_bits,
            self.worker_bits.unwrap_or(worker_bits),
            self.datacenter_bits.unwrap_or(datacenter_bits),
            self.timestamp_bits,
        )
    }

    /// Validates the configured IDs against `layout`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either ID does not fit its field.
    pub fn identity(&self, layout: &BitLayout) -> Result<Identity> {
        Identity::new(self.datacenter_id.unwrap_or(0), self.worker_id, layout)
    }

    /// Wraps `cache` in a [`CacheStore`] using this config's key prefix and
    /// expiry.
    pub fn cache_store<C>(&self, cache: C) -> CacheStore<C>
    where
        C: KeyValueCache,
    {
        CacheStore::with_config(cache, &self.store)
    }
}
