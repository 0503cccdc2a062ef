//! Time sources used when a caller does not supply a timestamp.

use time::OffsetDateTime;

/// Source of the current time in microseconds.
pub trait Clock {
    fn now_micros(&self) -> u64;
}

/// Wall clock, microseconds since the Unix epoch.
///
/// Clocks set before the epoch read as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        nanos_to_micros(OffsetDateTime::now_utc().unix_timestamp_nanos())
    }
}

/// Clock that always returns the same instant.
///
/// # Examples
/// ```
/// use pcapwrite_core::{Clock, FixedClock};
///
/// assert_eq!(FixedClock(1_500_000).now_micros(), 1_500_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_micros(&self) -> u64 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}

fn nanos_to_micros(nanos: i128) -> u64 {
    u64::try_from(nanos.max(0) / 1_000).unwrap_or(u64::MAX)
}
