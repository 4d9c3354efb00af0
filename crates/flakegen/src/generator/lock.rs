use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ClockSource, Generator, MemoryStore, ParsedId, Poll, Result, SnowflakeId, SystemClock,
    TimestampStore,
    mutex::{Mutex, MutexGuard},
};

/// A lock-based wrapper that lets several threads share one [`Generator`].
///
/// Calls are serialized through an [`Arc<Mutex<_>>`], so the read-modify-write
/// of the last timestamp and sequence never interleaves. Clones share the same
/// generator. The lock is held while waiting for the next millisecond.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Works with any [`TimestampStore`] and [`ClockSource`]
///
/// ## Recommended When
/// - You're in a multi-threaded host and need one identity per process
///
/// # Example
/// ```
/// use flakegen::{Generator, LockGenerator};
///
/// let generator = LockGenerator::new(Generator::new(3).unwrap());
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let generator = generator.clone();
///         std::thread::spawn(move || generator.next_id().unwrap())
///     })
///     .collect();
/// for handle in handles {
///     assert_eq!(generator.parse(handle.join().unwrap()).unwrap().worker_id, 3);
/// }
/// ```
pub struct LockGenerator<S = MemoryStore, C = SystemClock> {
    inner: Arc<Mutex<Generator<S, C>>>,
}

impl<S, C> Clone for LockGenerator<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C> LockGenerator<S, C>
where
    S: TimestampStore,
    C: ClockSource,
{
    pub fn new(generator: Generator<S, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(generator)),
        }
    }

    /// Generates the next ID, waiting for the lock and, if needed, for the
    /// next millisecond.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::next_id`], plus [`Error::LockPoisoned`] when
    /// another thread panicked while holding the lock (std mutex only).
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        self.lock()?.next_id()
    }

    /// Attempts to generate the next ID without waiting for the clock.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::try_poll_id`], plus lock poisoning.
    pub fn try_poll_id(&self) -> Result<Poll> {
        self.lock()?.try_poll_id()
    }

    /// Decodes an ID with the wrapped generator's layout and epoch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lock is poisoned.
    pub fn parse(&self, id: impl Into<SnowflakeId>) -> Result<ParsedId> {
        Ok(self.lock()?.parse(id))
    }

    /// Runs `f` with exclusive access to the wrapped generator.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lock is poisoned.
    pub fn with<R>(&self, f: impl FnOnce(&mut Generator<S, C>) -> R) -> Result<R> {
        let mut generator = self.lock()?;
        Ok(f(&mut generator))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Generator<S, C>>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.inner.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.inner.lock()?)
        }
    }
}
