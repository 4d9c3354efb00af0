use crate::{
    ClockSource, Generator, LockGenerator, Result, SleepProvider, SnowflakeId, TimestampStore,
};

/// A [`SleepProvider`] backed by Tokio's timer.
///
/// This is the provider behind `next_id_async`.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    async fn sleep_for(dur: core::time::Duration) {
        ::tokio::time::sleep(dur).await;
    }
}

/// A [`SleepProvider`] that yields to the Tokio scheduler instead of sleeping.
///
/// Waiting tasks get rescheduled right away, which reacts faster to the next
/// millisecond at the cost of a tighter polling loop. Under heavy concurrency
/// [`TokioSleep`] is usually the better choice.
pub struct TokioYield;
impl SleepProvider for TokioYield {
    async fn sleep_for(_dur: core::time::Duration) {
        ::tokio::task::yield_now().await;
    }
}

impl<S, C> Generator<S, C>
where
    S: TimestampStore,
    C: ClockSource,
{
    /// Generates the next ID, sleeping on the Tokio timer while the sequence
    /// is used up.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::next_id`].
    pub async fn next_id_async(&mut self) -> Result<SnowflakeId> {
        self.next_id_async_with::<TokioSleep>().await
    }
}

impl<S, C> LockGenerator<S, C>
where
    S: TimestampStore,
    C: ClockSource,
{
    /// Generates the next ID, sleeping on the Tokio timer while the sequence
    /// is used up.
    ///
    /// # Errors
    ///
    /// Same as [`LockGenerator::next_id`].
    pub async fn next_id_async(&self) -> Result<SnowflakeId> {
        self.next_id_async_with::<TokioSleep>().await
    }
}
