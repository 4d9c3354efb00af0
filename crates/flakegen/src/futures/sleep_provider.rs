use core::{future::Future, time::Duration};

/// Abstracts over how an async runtime sleeps for a [`Duration`].
///
/// Async generation is generic over this trait, so the waiting loop does not
/// depend on a particular executor.
pub trait SleepProvider {
    /// The future must be `Send` so generation can move between worker
    /// threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
