use crate::{Identity, StoreError, TimestampStore};

/// Keeps the last timestamp in process memory.
///
/// Valid for a single generator: the value lives and dies with it, so it never
/// expires and ignores the identity it is asked about.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    last: Option<u64>,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub const fn last(&self) -> Option<u64> {
        self.last
    }
}

impl TimestampStore for MemoryStore {
    fn read(&mut self, _identity: &Identity) -> Result<Option<u64>, StoreError> {
        Ok(self.last)
    }

    fn write(&mut self, _identity: &Identity, timestamp: u64) -> Result<(), StoreError> {
        self.last = Some(timestamp);
        Ok(())
    }
}
