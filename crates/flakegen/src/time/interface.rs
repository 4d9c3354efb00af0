use core::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// How often [`ClockSource::await_next`] re-reads the clock while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(100);

/// A source of wall-clock time with millisecond resolution.
///
/// Implementations report the clock as it is: a clock that jumps backwards
/// must show it, so the generator can refuse to issue IDs instead of
/// repeating them.
///
/// # Example
///
/// ```
/// use flakegen::ClockSource;
///
/// struct FixedTime;
/// impl ClockSource for FixedTime {
///     fn now(&self) -> u64 {
///         1_420_041_601_000
///     }
/// }
///
/// assert_eq!(FixedTime.now(), 1_420_041_601_000);
/// ```
pub trait ClockSource {
    /// Returns the current Unix time in whole milliseconds.
    fn now(&self) -> u64;

    /// Interval between clock reads in [`ClockSource::await_next`].
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Blocks the calling thread until [`ClockSource::now`] is strictly greater
    /// than `after`, then returns that timestamp.
    ///
    /// The clock is polled every [`ClockSource::poll_interval`], so for a
    /// healthy clock this returns within about a millisecond. `cancel` is
    /// checked between polls.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] if `cancel` is cancelled before the clock advances.
    fn await_next(&self, after: u64, cancel: &CancellationToken) -> Result<u64> {
        loop {
            let now = self.now();
            if now > after {
                return Ok(now);
            }
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            std::thread::sleep(self.poll_interval());
        }
    }
}

impl<C> ClockSource for &C
where
    C: ClockSource + ?Sized,
{
    fn now(&self) -> u64 {
        (**self).now()
    }

    fn poll_interval(&self) -> Duration {
        (**self).poll_interval()
    }

    fn await_next(&self, after: u64, cancel: &CancellationToken) -> Result<u64> {
        (**self).await_next(after, cancel)
    }
}

impl<C> ClockSource for std::sync::Arc<C>
where
    C: ClockSource + ?Sized,
{
    fn now(&self) -> u64 {
        (**self).now()
    }

    fn poll_interval(&self) -> Duration {
        (**self).poll_interval()
    }

    fn await_next(&self, after: u64, cancel: &CancellationToken) -> Result<u64> {
        (**self).await_next(after, cancel)
    }
}
