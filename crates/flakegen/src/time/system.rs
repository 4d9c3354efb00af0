use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{ClockSource, DEFAULT_POLL_INTERVAL};

/// Default epoch: Wednesday, December 31, 2014 16:00:00 UTC (midnight on
/// January 1, 2015 in UTC+8).
pub const DEFAULT_EPOCH: u64 = 1_420_041_600_000;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: u64 = 1_288_834_974_657;

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: u64 = 1_420_070_400_000;

/// Wall-clock time from [`SystemTime`].
///
/// Backward adjustments of the system clock (NTP steps, manual changes) show
/// up as-is and are rejected by the generator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SystemClock {
    poll_interval: Duration,
}

impl SystemClock {
    pub const fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Uses a different interval while waiting for the next millisecond.
    pub const fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> u64 {
        // A clock set before 1970 reads as zero, which fails the epoch check.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
