/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `flakegen` can produce.
///
/// Only [`Error::ClockRegression`] and [`Error::Cancelled`] are worth retrying
/// after a delay. Configuration errors need operator intervention (fix the
/// identity or rebase the epoch), and store errors depend on the backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator was configured with values its layout cannot represent,
    /// or the clock has moved outside the representable timestamp range.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The clock reported a time earlier than the last timestamp recorded for
    /// this identity. No ID was produced and no state was changed.
    #[error("clock moved backwards from {last} to {current}; refusing to generate ids")]
    ClockRegression {
        /// Last recorded timestamp (Unix milliseconds).
        last: u64,
        /// Timestamp observed by this call (Unix milliseconds).
        current: u64,
    },

    /// Waiting for the next millisecond was cancelled through the generator's
    /// cancellation token.
    #[error("waiting for the next millisecond was cancelled")]
    Cancelled,

    /// The timestamp store failed to read or persist the last timestamp.
    #[error("timestamp store error: {0}")]
    Store(#[from] StoreError),

    /// The lock around a shared generator was poisoned by a panicking thread.
    ///
    /// `parking_lot` mutexes do not poison, so this variant only exists
    /// without the `parking-lot` feature.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns how far the clock moved backwards, for
    /// [`Error::ClockRegression`]. A variant built with `current >= last`
    /// reports zero.
    pub const fn regression_ms(&self) -> Option<u64> {
        match self {
            Self::ClockRegression { last, current } => Some(last.saturating_sub(*current)),
            _ => None,
        }
    }

    /// Whether a later retry of the same call may succeed without changing
    /// configuration.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ClockRegression { .. } | Self::Cancelled)
    }
}

/// Invalid layout, identity or epoch.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("layout uses {total} bits but at most 63 are available")]
    LayoutTooWide { total: u32 },

    #[error("timestamp field must be at least one bit wide")]
    EmptyTimestampField,

    #[error("datacenter id can't be greater than {max} (got {value})")]
    DatacenterIdOutOfRange { value: u64, max: u64 },

    #[error("worker id can't be greater than {max} (got {value})")]
    WorkerIdOutOfRange { value: u64, max: u64 },

    #[error(
        "timestamp delta {delta} exceeds the {max} ms the layout can hold; rebase the epoch to fix this"
    )]
    TimestampOverflow { delta: u64, max: u64 },

    #[error("clock reads {now} which is earlier than the epoch {epoch}")]
    ClockBeforeEpoch { now: u64, epoch: u64 },

    #[error("the epoch cannot change after the first id has been generated")]
    EpochLocked,
}

/// Failures of a [`TimestampStore`](crate::TimestampStore).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The cache backend returned an error.
    #[error("cache backend error: {0}")]
    Backend(#[source] Box<dyn core::error::Error + Send + Sync + 'static>),

    /// The value stored under `key` is not a millisecond timestamp.
    #[error("value {value:?} stored under {key} is not a timestamp")]
    InvalidValue { key: String, value: String },
}

/// A raw integer that sets the reserved top bit, which no generator produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{value:#018x} sets the reserved top bit and is not a snowflake id")]
pub struct ReservedBitError {
    pub value: u64,
}

impl StoreError {
    /// Wraps any backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_ms_is_the_backward_step() {
        let err = Error::ClockRegression {
            last: 1_000,
            current: 995,
        };
        assert_eq!(err.regression_ms(), Some(5));
        assert_eq!(Error::Cancelled.regression_ms(), None);
    }

    #[test]
    fn regression_ms_saturates_for_inverted_fields() {
        let err = Error::ClockRegression {
            last: 0,
            current: 5,
        };
        assert_eq!(err.regression_ms(), Some(0));
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(Error::Cancelled.is_retryable());
        assert!(!Error::from(ConfigError::EpochLocked).is_retryable());
        assert!(
            !Error::from(StoreError::InvalidValue {
                key: "k".to_owned(),
                value: "v".to_owned(),
            })
            .is_retryable()
        );
    }
}
