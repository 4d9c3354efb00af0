use crate::SnowflakeId;

/// Outcome of a single, non-blocking generation attempt.
///
/// - [`Poll::Ready`] carries a newly generated ID.
/// - [`Poll::Pending`] means no ID can be issued until the clock reads a
///   millisecond strictly greater than `after`, either because the sequence
///   for that millisecond is used up or because another generator sharing the
///   store already issued IDs in it.
///
/// This allows non-blocking generation loops and custom backoff strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// Wait until the clock passes `after` before trying again.
    Pending {
        /// Unix millisecond the clock must move past.
        after: u64,
    },
}
