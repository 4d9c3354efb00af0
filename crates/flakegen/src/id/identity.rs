use core::fmt;

use crate::{BitLayout, ConfigError, Result};

/// The `(datacenter, worker)` slot a generator allocates IDs for.
///
/// An identity is validated against a [`BitLayout`] once, at construction, so
/// encoding never has to check it again. Layouts without a datacenter field
/// only accept a datacenter ID of zero.
///
/// With the `serde` feature an identity serializes, but it does not
/// deserialize: without a layout there is nothing to validate it against.
/// Deserialize a [`GeneratorConfig`] instead.
///
/// [`GeneratorConfig`]: crate::GeneratorConfig
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    datacenter_id: u64,
    worker_id: u64,
}

impl Identity {
    /// # Errors
    ///
    /// [`ConfigError::DatacenterIdOutOfRange`] or
    /// [`ConfigError::WorkerIdOutOfRange`] if either ID does not fit its field.
    pub fn new(datacenter_id: u64, worker_id: u64, layout: &BitLayout) -> Result<Self> {
        let max = layout.max_datacenter_id();
        if datacenter_id > max {
            return Err(ConfigError::DatacenterIdOutOfRange {
                value: datacenter_id,
                max,
            }
            .into());
        }
        let max = layout.max_worker_id();
        if worker_id > max {
            return Err(ConfigError::WorkerIdOutOfRange {
                value: worker_id,
                max,
            }
            .into());
        }
        Ok(Self {
            datacenter_id,
            worker_id,
        })
    }

    /// Identity for layouts with a single worker field.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WorkerIdOutOfRange`] if `worker_id` does not fit.
    pub fn worker(worker_id: u64, layout: &BitLayout) -> Result<Self> {
        Self::new(0, worker_id, layout)
    }

    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.datacenter_id, self.worker_id)
    }
}
