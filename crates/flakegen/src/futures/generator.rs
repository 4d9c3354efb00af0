use crate::{
    ClockSource, Error, Generator, LockGenerator, Poll, Result, SnowflakeId, SleepProvider,
    TimestampStore,
};

impl<S, C> Generator<S, C>
where
    S: TimestampStore,
    C: ClockSource,
{
    /// Async counterpart of [`Generator::next_id`].
    ///
    /// While the sequence is used up, the clock is sampled every
    /// [`ClockSource::poll_interval`] and the task sleeps through `P` in
    /// between, instead of blocking the thread.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::next_id`]. [`Error::Cancelled`] is returned once
    /// the cancellation token fires during a wait.
    pub async fn next_id_async_with<P>(&mut self) -> Result<SnowflakeId>
    where
        P: SleepProvider,
    {
        loop {
            let after = match self.try_poll_id()? {
                Poll::Ready { id } => return Ok(id),
                Poll::Pending { after } => after,
            };
            while self.clock().now() <= after {
                if self.cancellation_token().is_cancelled() {
                    return Err(Error::Cancelled);
                }
                P::sleep_for(self.clock().poll_interval()).await;
            }
        }
    }
}

impl<S, C> LockGenerator<S, C>
where
    S: TimestampStore,
    C: ClockSource,
{
    /// Async counterpart of [`LockGenerator::next_id`].
    ///
    /// The lock is only held while polling, never across a sleep, so other
    /// tasks can keep using the generator while this one waits.
    ///
    /// # Errors
    ///
    /// Same as [`LockGenerator::next_id`].
    pub async fn next_id_async_with<P>(&self) -> Result<SnowflakeId>
    where
        P: SleepProvider,
    {
        loop {
            if let Poll::Ready { id } = self.try_poll_id()? {
                return Ok(id);
            }
            let (cancelled, interval) =
                self.with(|g| (g.cancellation_token().is_cancelled(), g.clock().poll_interval()))?;
            if cancelled {
                return Err(Error::Cancelled);
            }
            P::sleep_for(interval).await;
        }
    }
}
