//! Configuration for touch tracking and dispatch.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default maximum interval between a lift and the next touch-down for the
/// new touch to count as a repeated tap, in milliseconds.
pub const DEFAULT_MULTI_TAP_INTERVAL_MS: u64 = 300;

/// Default maximum distance between consecutive taps for them to count as a
/// multi-tap, in logical units.
pub const DEFAULT_MULTI_TAP_SLOP: f32 = 10.0;

/// How the window resolves recognizers that evaluate the same touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArbitrationPolicy {
    /// Every recognizer evaluates independently; `can_prevent` hooks are
    /// available to delegates but never consulted by dispatch.
    #[default]
    Simultaneous,
    /// When a recognizer leaves `Possible`, still-possible recognizers that
    /// share one of its touches are failed if the winner can prevent them.
    Exclusive,
}

/// Configuration for a [`Window`](crate::window::Window).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use horizon_touch::{ArbitrationPolicy, TouchConfig};
///
/// let config = TouchConfig::new()
///     .with_multi_tap_interval(Duration::from_millis(250))
///     .with_arbitration(ArbitrationPolicy::Exclusive);
/// assert_eq!(config.arbitration, ArbitrationPolicy::Exclusive);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TouchConfig {
    /// Maximum lift-to-down interval for tap counting.
    pub multi_tap_interval: Duration,
    /// Maximum distance between consecutive taps for tap counting.
    pub multi_tap_slop: f32,
    /// Recognizer arbitration policy.
    pub arbitration: ArbitrationPolicy,
    /// Panic on programming faults after logging them. Defaults to on in
    /// debug builds.
    pub panic_on_fault: bool,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            multi_tap_interval: Duration::from_millis(DEFAULT_MULTI_TAP_INTERVAL_MS),
            multi_tap_slop: DEFAULT_MULTI_TAP_SLOP,
            arbitration: ArbitrationPolicy::default(),
            panic_on_fault: cfg!(debug_assertions),
        }
    }
}

impl TouchConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the multi-tap interval.
    pub fn with_multi_tap_interval(mut self, interval: Duration) -> Self {
        self.multi_tap_interval = interval;
        self
    }

    /// Set the multi-tap slop.
    pub fn with_multi_tap_slop(mut self, slop: f32) -> Self {
        self.multi_tap_slop = slop;
        self
    }

    /// Set the arbitration policy.
    pub fn with_arbitration(mut self, policy: ArbitrationPolicy) -> Self {
        self.arbitration = policy;
        self
    }

    /// Set whether programming faults panic.
    pub fn with_panic_on_fault(mut self, panic: bool) -> Self {
        self.panic_on_fault = panic;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TouchConfig::default();
        assert_eq!(config.multi_tap_interval, Duration::from_millis(300));
        assert_eq!(config.multi_tap_slop, DEFAULT_MULTI_TAP_SLOP);
        assert_eq!(config.arbitration, ArbitrationPolicy::Simultaneous);
        assert_eq!(config.panic_on_fault, cfg!(debug_assertions));
    }

    #[test]
    fn test_builder() {
        let config = TouchConfig::new()
            .with_multi_tap_slop(4.0)
            .with_arbitration(ArbitrationPolicy::Exclusive);
        assert_eq!(config.multi_tap_slop, 4.0);
        assert_eq!(config.arbitration, ArbitrationPolicy::Exclusive);
    }
}
