//! Tap recognition.

use std::time::Duration;

use horizon_touch_core::{Point, Timestamp};

use crate::error::TouchResult;
use crate::event::Event;
use crate::touch::{Touch, TouchId};

use super::{GestureContext, GestureCore, GestureRecognizer, GestureState, RecognizerKind, set_state};

/// Default maximum time a finger may stay down for a tap, in milliseconds.
pub const DEFAULT_TAP_MAX_DURATION_MS: u64 = 500;

/// Default maximum distance a finger may travel during a tap.
pub const DEFAULT_TAP_ALLOWABLE_MOVEMENT: f32 = 45.0;

#[derive(Debug, Clone, Copy)]
struct Contact {
    touch: TouchId,
    start: Point,
    started_at: Timestamp,
    lifted_at: Option<Point>,
}

/// Recognizes one or more quick taps by one or more fingers.
///
/// Discrete: goes straight from `Possible` to `Ended` when every finger
/// lifts in time, close to where it started, completing the required tap
/// count. A longer quick series recognizes again on every
/// `taps_required`th tap, so a single-tap recognizer fires on each tap.
#[derive(Debug)]
pub struct TapGestureRecognizer {
    core: GestureCore,
    taps_required: u32,
    touches_required: usize,
    allowable_movement: f32,
    maximum_duration: Duration,
    contacts: Vec<Contact>,
    location: Point,
}

impl TapGestureRecognizer {
    /// Create a single-tap, single-finger recognizer.
    pub fn new() -> Self {
        Self {
            core: GestureCore::new(),
            taps_required: 1,
            touches_required: 1,
            allowable_movement: DEFAULT_TAP_ALLOWABLE_MOVEMENT,
            maximum_duration: Duration::from_millis(DEFAULT_TAP_MAX_DURATION_MS),
            contacts: Vec::new(),
            location: Point::ZERO,
        }
    }

    /// Set the number of taps required.
    pub fn with_taps_required(mut self, taps: u32) -> Self {
        self.taps_required = taps.max(1);
        self
    }

    /// Set the number of fingers required.
    pub fn with_touches_required(mut self, touches: usize) -> Self {
        self.touches_required = touches.max(1);
        self
    }

    /// Set the allowable movement.
    pub fn with_allowable_movement(mut self, distance: f32) -> Self {
        self.allowable_movement = distance;
        self
    }

    /// Set the maximum touch-down duration.
    pub fn with_maximum_duration(mut self, duration: Duration) -> Self {
        self.maximum_duration = duration;
        self
    }

    /// Number of taps required.
    pub fn number_of_taps_required(&self) -> u32 {
        self.taps_required
    }

    /// Number of fingers required.
    pub fn number_of_touches_required(&self) -> usize {
        self.touches_required
    }

    /// Centroid of the fingers when the tap was recognized.
    pub fn location(&self) -> Point {
        self.location
    }

    fn contact(&self, touch: TouchId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.touch == touch)
    }

    /// Check whether the `tap_count`th tap of a quick series finishes a
    /// group of `taps_required` taps.
    fn completes_series(&self, tap_count: u32) -> bool {
        tap_count > 0 && (tap_count - 1) % self.taps_required + 1 == self.taps_required
    }

    fn strayed(&self, touch: &Touch) -> bool {
        self.contact(touch.id())
            .is_some_and(|c| c.start.distance_to(touch.location()) > self.allowable_movement)
    }
}

fn mean(points: &[Point]) -> Option<Point> {
    let count = points.len() as f32;
    let (x, y) = points.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    (!points.is_empty()).then(|| Point::new(x / count, y / count))
}

impl Default for TapGestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer for TapGestureRecognizer {
    fn core(&self) -> &GestureCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GestureCore {
        &mut self.core
    }

    fn kind(&self) -> RecognizerKind<'_> {
        RecognizerKind::Tap(self)
    }

    fn can_prevent(&self, other: &dyn GestureRecognizer) -> bool {
        other.kind().tap_priority().is_none_or(|taps| self.taps_required > taps)
    }

    fn can_be_prevented_by(&self, other: &dyn GestureRecognizer) -> bool {
        other.kind().tap_priority().is_none_or(|taps| taps > self.taps_required)
    }

    fn touches_began(&mut self, touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        for touch in touches {
            self.contacts.push(Contact {
                touch: touch.id(),
                start: touch.location(),
                started_at: touch.timestamp(),
                lifted_at: None,
            });
        }
        if self.contacts.len() > self.touches_required {
            return set_state(self, GestureState::Failed);
        }
        Ok(())
    }

    fn touches_moved(&mut self, touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if touches.iter().any(|touch| self.strayed(touch)) {
            return set_state(self, GestureState::Failed);
        }
        Ok(())
    }

    fn touches_ended(&mut self, touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        for touch in touches {
            let Some(contact) = self.contact(touch.id()).copied() else {
                return set_state(self, GestureState::Failed);
            };
            let held = touch.timestamp().saturating_since(contact.started_at);
            if held > self.maximum_duration
                || self.strayed(touch)
                || !self.completes_series(touch.tap_count())
            {
                return set_state(self, GestureState::Failed);
            }
            if let Some(contact) = self.contacts.iter_mut().find(|c| c.touch == touch.id()) {
                contact.lifted_at = Some(touch.location());
            }
        }

        let lifted: Option<Vec<Point>> = self.contacts.iter().map(|c| c.lifted_at).collect();
        if let Some(points) = lifted {
            if points.len() != self.touches_required {
                return set_state(self, GestureState::Failed);
            }
            self.location = mean(&points).unwrap_or(self.location);
            return set_state(self, GestureState::Ended);
        }
        Ok(())
    }

    fn touches_cancelled(
        &mut self,
        _touches: &[&Touch],
        _event: &Event,
        _cx: &mut GestureContext<'_>,
    ) -> TouchResult<()> {
        set_state(self, GestureState::Failed)
    }

    fn reset(&mut self) {
        self.contacts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::PanGestureRecognizer;

    #[test]
    fn test_mean() {
        let points = [Point::new(0.0, 0.0), Point::new(40.0, 10.0), Point::new(20.0, 50.0)];
        assert_eq!(mean(&points), Some(Point::new(20.0, 20.0)));
        assert_eq!(mean(&[Point::new(7.0, 3.0)]), Some(Point::new(7.0, 3.0)));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_completes_series() {
        let single = TapGestureRecognizer::new();
        assert!((1..=5).all(|count| single.completes_series(count)));
        assert!(!single.completes_series(0));

        let double = TapGestureRecognizer::new().with_taps_required(2);
        let hits: Vec<u32> = (1..=6).filter(|&count| double.completes_series(count)).collect();
        assert_eq!(hits, vec![2, 4, 6]);

        let triple = TapGestureRecognizer::new().with_taps_required(3);
        let hits: Vec<u32> = (1..=7).filter(|&count| triple.completes_series(count)).collect();
        assert_eq!(hits, vec![3, 6]);
    }

    #[test]
    fn test_builders_clamp() {
        let tap = TapGestureRecognizer::new().with_taps_required(0).with_touches_required(0);
        assert_eq!(tap.number_of_taps_required(), 1);
        assert_eq!(tap.number_of_touches_required(), 1);
        assert_eq!(tap.location(), Point::ZERO);
    }

    #[test]
    fn test_more_taps_prevent_fewer() {
        let single = TapGestureRecognizer::new();
        let double = TapGestureRecognizer::new().with_taps_required(2);

        assert!(double.can_prevent(&single));
        assert!(!single.can_prevent(&double));
        assert!(single.can_be_prevented_by(&double));
        assert!(!double.can_be_prevented_by(&single));

        let same = TapGestureRecognizer::new();
        assert!(!single.can_prevent(&same));
        assert!(!single.can_be_prevented_by(&same));
    }

    #[test]
    fn test_taps_and_other_kinds_prevent_each_other() {
        let tap = TapGestureRecognizer::new();
        let pan = PanGestureRecognizer::new();
        assert!(tap.can_prevent(&pan));
        assert!(tap.can_be_prevented_by(&pan));
    }
}
