//! Velocity estimation over a rolling time window.

use std::collections::VecDeque;
use std::time::Duration;

use horizon_touch_core::{Point, Timestamp, Vector};

/// Default length of the velocity window, in milliseconds.
pub const DEFAULT_VELOCITY_WINDOW_MS: u64 = 100;

/// Estimates velocity from the oldest and newest samples inside a rolling
/// window.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<(Timestamp, Point)>,
    window: Duration,
}

impl VelocityTracker {
    /// Create a tracker with the default window.
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(DEFAULT_VELOCITY_WINDOW_MS))
    }

    /// Create a tracker with a specific window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
        }
    }

    /// Record a location and drop samples older than the window.
    pub fn add(&mut self, timestamp: Timestamp, location: Point) {
        self.samples.push_back((timestamp, location));
        while let Some(&(oldest, _)) = self.samples.front() {
            if timestamp.saturating_since(oldest) <= self.window {
                break;
            }
            self.samples.pop_front();
        }
    }

    /// Velocity in logical units per second.
    ///
    /// Zero with fewer than two samples or when all samples share a
    /// timestamp.
    pub fn velocity(&self) -> Vector {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return Vector::ZERO;
        };
        let dt = t1.saturating_since(t0).as_secs_f32();
        if dt <= 0.0 {
            return Vector::ZERO;
        }
        (p1 - p0) / dt
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples inside the window.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples are recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}
