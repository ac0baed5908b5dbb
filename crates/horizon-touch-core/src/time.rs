//! Platform timestamps.
//!
//! Input samples arrive stamped with the platform's monotonic clock. The
//! engine never reads the wall clock itself: every time-dependent decision
//! (tap duration, velocity, long-press arming) is made against these
//! stamps, and timers are driven with an explicit `now`.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// A point in time on the platform's monotonic input clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// The clock origin.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Create a timestamp from a duration since the clock origin.
    #[inline]
    pub const fn from_duration(since_origin: Duration) -> Self {
        Self(since_origin)
    }

    /// Create a timestamp from milliseconds since the clock origin.
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// The duration since the clock origin.
    #[inline]
    pub const fn as_duration(self) -> Duration {
        self.0
    }

    /// Time elapsed between `earlier` and `self`, saturating at zero.
    #[inline]
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    /// Seconds since the clock origin as `f32`.
    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        self.0.as_secs_f32()
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0.saturating_sub(rhs))
    }
}

impl From<Duration> for Timestamp {
    fn from(since_origin: Duration) -> Self {
        Self(since_origin)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
