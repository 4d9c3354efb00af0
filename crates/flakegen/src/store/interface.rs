use crate::{Identity, StoreError};

/// Where a generator keeps the last timestamp it issued an ID for.
///
/// The generator reads the value at the start of every call and writes it
/// after every successful one. A store shared between processes lets
/// generators claiming the same [`Identity`] see each other's high-water mark;
/// it is advisory and does not lock.
pub trait TimestampStore {
    /// Returns the last recorded Unix timestamp in milliseconds, or `None` if
    /// nothing is recorded (never written, or expired).
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&mut self, identity: &Identity) -> Result<Option<u64>, StoreError>;

    /// Records `timestamp` as the last one used by `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn write(&mut self, identity: &Identity, timestamp: u64) -> Result<(), StoreError>;
}

impl<S> TimestampStore for &mut S
where
    S: TimestampStore + ?Sized,
{
    fn read(&mut self, identity: &Identity) -> Result<Option<u64>, StoreError> {
        (**self).read(identity)
    }

    fn write(&mut self, identity: &Identity, timestamp: u64) -> Result<(), StoreError> {
        (**self).write(identity, timestamp)
    }
}
