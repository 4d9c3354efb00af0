use core::cmp::Ordering;

use tokio_util::sync::CancellationToken;
#[cfg(feature = "tracing")]
use tracing::{debug, instrument, warn};

use crate::{
    BitLayout, ClockSource, ConfigError, DEFAULT_EPOCH, Error, GeneratorConfig, Identity,
    MemoryStore, ParsedId, Poll, Result, SnowflakeId, SystemClock, TimestampStore,
};

/// The millisecond and sequence of the last ID this instance issued.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Issued {
    timestamp: u64,
    sequence: u64,
}

/// A Snowflake ID generator for one [`Identity`].
///
/// Each call reads the last timestamp from the [`TimestampStore`], samples the
/// [`ClockSource`], and then either continues the sequence within the same
/// millisecond, starts a new millisecond at sequence zero, waits for the next
/// millisecond once the sequence is used up, or refuses to generate because
/// the clock went backwards.
///
/// Generation takes `&mut self`, so a generator has a single writer. Wrap it
/// in a [`LockGenerator`] to share it between threads.
///
/// ## Stores
/// - [`MemoryStore`]: the last timestamp lives in this instance only
/// - [`CacheStore`]: the last timestamp is shared through an external cache,
///   so generators in other processes claiming the same identity see it
///
/// ## See Also
/// - [`LockGenerator`]
/// - [`GeneratorConfig`]
///
/// [`LockGenerator`]: crate::LockGenerator
/// [`CacheStore`]: crate::CacheStore
///
/// # Example
/// ```
/// use flakegen::Generator;
///
/// let mut generator = Generator::new(5).unwrap();
/// let first = generator.next_id().unwrap();
/// let second = generator.next_id().unwrap();
/// assert!(first < second);
///
/// let parsed = generator.parse(second);
/// assert_eq!(parsed.worker_id, 5);
/// ```
#[derive(Debug)]
pub struct Generator<S = MemoryStore, C = SystemClock> {
    layout: BitLayout,
    identity: Identity,
    epoch: u64,
    store: S,
    clock: C,
    issued: Option<Issued>,
    cancel: CancellationToken,
}

impl Generator<MemoryStore, SystemClock> {
    /// Creates an in-process generator with a single 10-bit worker field and
    /// the [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `worker_id` exceeds 1023.
    pub fn new(worker_id: u64) -> Result<Self> {
        let layout = BitLayout::SINGLE_WORKER;
        let identity = Identity::worker(worker_id, &layout)?;
        Self::from_parts(
            layout,
            identity,
            DEFAULT_EPOCH,
            MemoryStore::new(),
            SystemClock::new(),
        )
    }

    /// Creates an in-process generator with 5-bit datacenter and worker fields
    /// and the [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either ID exceeds 31.
    pub fn with_datacenter(datacenter_id: u64, worker_id: u64) -> Result<Self> {
        let layout = BitLayout::TWITTER;
        let identity = Identity::new(datacenter_id, worker_id, &layout)?;
        Self::from_parts(
            layout,
            identity,
            DEFAULT_EPOCH,
            MemoryStore::new(),
            SystemClock::new(),
        )
    }
}

impl<S, C> Generator<S, C>
where
    S: TimestampStore,
    C: ClockSource,
{
    /// Creates a generator from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the layout is wider than 63 bits or an
    /// ID does not fit its field.
    ///
    /// # Example
    /// ```
    /// use flakegen::{Generator, GeneratorConfig, MemoryCache, SystemClock};
    ///
    /// let config = GeneratorConfig::new(7).with_datacenter_id(2);
    /// let store = config.cache_store(MemoryCache::new());
    /// let mut generator = Generator::from_config(&config, store, SystemClock::new()).unwrap();
    ///
    /// let id = generator.next_id().unwrap();
    /// let parsed = generator.parse(id);
    /// assert_eq!((parsed.datacenter_id, parsed.worker_id), (2, 7));
    /// ```
    pub fn from_config(config: &GeneratorConfig, store: S, clock: C) -> Result<Self> {
        let layout = config.layout()?;
        let identity = config.identity(&layout)?;
        Self::from_parts(layout, identity, config.epoch_millis, store, clock)
    }

    /// Creates a generator from a layout and an identity.
    ///
    /// The identity is checked again against `layout`, since it may have been
    /// validated against a different one.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either ID does not fit its field in
    /// `layout`.
    pub fn from_parts(
        layout: BitLayout,
        identity: Identity,
        epoch: u64,
        store: S,
        clock: C,
    ) -> Result<Self> {
        let identity = Identity::new(identity.datacenter_id(), identity.worker_id(), &layout)?;
        Ok(Self {
            layout,
            identity,
            epoch,
            store,
            clock,
            issued: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Uses `cancel` to abort waits for the next millisecond.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub const fn layout(&self) -> &BitLayout {
        &self.layout
    }

    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Unix milliseconds subtracted from the clock before encoding.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Rebases the epoch.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EpochLocked`] once this generator has issued an ID, since
    /// a new epoch would break ordering with IDs already handed out.
    pub fn set_epoch(&mut self, epoch: u64) -> Result<()> {
        if self.issued.is_some() {
            return Err(ConfigError::EpochLocked.into());
        }
        self.epoch = epoch;
        Ok(())
    }

    /// Generates the next ID, blocking while the current millisecond's
    /// sequence is used up.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock is behind the last recorded
    ///   timestamp. Nothing is written and no ID is produced.
    /// - [`Error::Configuration`] if the clock is before the epoch or past the
    ///   range of the timestamp field.
    /// - [`Error::Cancelled`] if the wait for the next millisecond was
    ///   cancelled.
    /// - [`Error::Store`] if the timestamp store failed.
    pub fn next_id(&mut self) -> Result<SnowflakeId> {
        loop {
            match self.try_poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { after } => {
                    self.clock.await_next(after, &self.cancel)?;
                }
            }
        }
    }

    /// Attempts to generate the next ID without waiting.
    ///
    /// Returns [`Poll::Pending`] when no ID can be issued in the current
    /// millisecond. Nothing is written in that case.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`], except it never returns
    /// [`Error::Cancelled`].
    ///
    /// # Example
    /// ```
    /// use flakegen::{Generator, Poll};
    ///
    /// let mut generator = Generator::new(1).unwrap();
    /// let id = loop {
    ///     match generator.try_poll_id().unwrap() {
    ///         Poll::Ready { id } => break id,
    ///         Poll::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(generator.parse(id).worker_id, 1);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&mut self) -> Result<Poll> {
        let last = self.store.read(&self.identity)?;
        let now = self.clock.now();

        let sequence = match last {
            None => 0,
            Some(last) => match now.cmp(&last) {
                Ordering::Greater => 0,
                Ordering::Equal => match self.issued {
                    // Only continue a sequence this instance started; a
                    // stored timestamp written by anyone else is exhausted.
                    Some(issued) if issued.timestamp == last => {
                        let next = (issued.sequence + 1) & self.layout.max_sequence();
                        if next == 0 {
                            return Ok(self.cold_sequence_exhausted(last));
                        }
                        next
                    }
                    _ => return Ok(self.cold_sequence_exhausted(last)),
                },
                Ordering::Less => return Err(self.cold_clock_behind(last, now)),
            },
        };

        let delta = now
            .checked_sub(self.epoch)
            .ok_or(ConfigError::ClockBeforeEpoch {
                now,
                epoch: self.epoch,
            })?;
        let id = self.layout.encode(
            delta,
            self.identity.datacenter_id(),
            self.identity.worker_id(),
            sequence,
        )?;

        self.store.write(&self.identity, now)?;
        self.issued = Some(Issued {
            timestamp: now,
            sequence,
        });
        Ok(Poll::Ready { id })
    }

    /// Decodes an ID using this generator's layout and epoch.
    ///
    /// Always succeeds; IDs from a different layout decode to meaningless but
    /// well-typed fields.
    pub fn parse(&self, id: impl Into<SnowflakeId>) -> ParsedId {
        let parts = self.layout.decode(id.into());
        ParsedId {
            timestamp: parts.timestamp_delta.saturating_add(self.epoch),
            datacenter_id: parts.datacenter_id,
            worker_id: parts.worker_id,
            sequence: parts.sequence,
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_sequence_exhausted(&self, last: u64) -> Poll {
        #[cfg(feature = "tracing")]
        debug!(identity = %self.identity, last, "sequence exhausted, waiting for next millisecond");
        Poll::Pending { after: last }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, last: u64, current: u64) -> Error {
        #[cfg(feature = "tracing")]
        warn!(
            identity = %self.identity,
            last,
            current,
            regression_ms = last - current,
            "clock moved backwards, refusing to generate id"
        );
        Error::ClockRegression { last, current }
    }
}
