//! Pan (drag) recognition.

use horizon_touch_core::{Point, Vector};

use crate::error::TouchResult;
use crate::event::Event;
use crate::touch::Touch;

use super::{
    GestureContext, GestureCore, GestureRecognizer, GestureState, RecognizerKind, VelocityTracker, active_centroid,
    centroid, set_state,
};

/// Default drift, along either axis, before a pan begins.
pub const DEFAULT_PAN_MIN_THRESHOLD: f32 = 10.0;

/// Recognizes fingers dragging across the view.
///
/// Continuous: begins once the centroid of the fingers drifts past the
/// threshold along either axis, then reports `Changed` for every movement
/// until the fingers lift.
///
/// Translation is measured from the centroid's position just before the
/// threshold was crossed, so the drift spent reaching the threshold is not
/// reported.
#[derive(Debug)]
pub struct PanGestureRecognizer {
    core: GestureCore,
    minimum_touches: usize,
    maximum_touches: usize,
    threshold: f32,
    origin: Point,
    last: Point,
    velocity: VelocityTracker,
    panning: bool,
}

impl PanGestureRecognizer {
    /// Create a single-finger pan recognizer.
    pub fn new() -> Self {
        Self {
            core: GestureCore::new(),
            minimum_touches: 1,
            maximum_touches: usize::MAX,
            threshold: DEFAULT_PAN_MIN_THRESHOLD,
            origin: Point::ZERO,
            last: Point::ZERO,
            velocity: VelocityTracker::new(),
            panning: false,
        }
    }

    /// Set the minimum number of fingers.
    pub fn with_minimum_touches(mut self, touches: usize) -> Self {
        self.minimum_touches = touches.max(1);
        self
    }

    /// Set the maximum number of fingers.
    pub fn with_maximum_touches(mut self, touches: usize) -> Self {
        self.maximum_touches = touches.max(1);
        self
    }

    /// Set the drift threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Minimum number of fingers.
    pub fn minimum_number_of_touches(&self) -> usize {
        self.minimum_touches
    }

    /// Maximum number of fingers.
    pub fn maximum_number_of_touches(&self) -> usize {
        self.maximum_touches
    }

    /// Movement of the centroid since the pan began.
    pub fn translation(&self) -> Vector {
        self.last - self.origin
    }

    /// Rebase the translation so it currently reads `translation`.
    pub fn set_translation(&mut self, translation: Vector) {
        self.origin = self.last - translation;
    }

    /// Velocity of the centroid, in logical units per second.
    pub fn velocity(&self) -> Vector {
        self.velocity.velocity()
    }

    /// Current centroid of the fingers.
    pub fn location(&self) -> Point {
        self.last
    }

    /// Shift the origin so a change in finger count does not jump the
    /// translation.
    fn rebase(&mut self, center: Point) {
        let jump = center - self.last;
        self.origin = self.origin + jump;
        self.last = center;
    }
}

impl Default for PanGestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer for PanGestureRecognizer {
    fn core(&self) -> &GestureCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GestureCore {
        &mut self.core
    }

    fn kind(&self) -> RecognizerKind<'_> {
        RecognizerKind::Pan(self)
    }

    fn touches_began(&mut self, touches: &[&Touch], event: &Event, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        let (center, count) = active_centroid(event, cx.recognizer());
        if count > self.maximum_touches && !self.panning {
            return set_state(self, GestureState::Failed);
        }
        let Some(center) = center else {
            return Ok(());
        };

        if count == touches.len() {
            self.origin = center;
            self.last = center;
            self.velocity.clear();
        } else {
            self.rebase(center);
        }
        self.velocity.add(cx.now(), center);
        Ok(())
    }

    fn touches_moved(&mut self, _touches: &[&Touch], event: &Event, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        let (Some(center), count) = active_centroid(event, cx.recognizer()) else {
            return Ok(());
        };
        self.velocity.add(cx.now(), center);

        if self.panning {
            self.last = center;
            return set_state(self, GestureState::Changed);
        }

        let drift = center - self.origin;
        let crossed = drift.dx.abs() > self.threshold || drift.dy.abs() > self.threshold;
        if crossed && count >= self.minimum_touches && count <= self.maximum_touches {
            self.origin = self.last;
            self.last = center;
            self.panning = true;
            return set_state(self, GestureState::Began);
        }
        self.last = center;
        Ok(())
    }

    fn touches_ended(&mut self, touches: &[&Touch], event: &Event, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if let (Some(center), _) = active_centroid(event, cx.recognizer()) {
            self.rebase(center);
            self.velocity.clear();
            self.velocity.add(cx.now(), center);
            return Ok(());
        }
        if !self.panning {
            return set_state(self, GestureState::Failed);
        }

        if let Some(lifted) = centroid(touches.iter().copied())
            && lifted != self.last
        {
            self.velocity.add(cx.now(), lifted);
            self.last = lifted;
        }
        set_state(self, GestureState::Ended)
    }

    fn touches_cancelled(
        &mut self,
        _touches: &[&Touch],
        _event: &Event,
        _cx: &mut GestureContext<'_>,
    ) -> TouchResult<()> {
        if self.panning {
            set_state(self, GestureState::Cancelled)
        } else {
            set_state(self, GestureState::Failed)
        }
    }

    fn reset(&mut self) {
        self.panning = false;
        self.velocity.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panning_at(origin: Point, last: Point) -> PanGestureRecognizer {
        let mut pan = PanGestureRecognizer::new();
        pan.origin = origin;
        pan.last = last;
        pan.panning = true;
        pan
    }

    #[test]
    fn test_rebase_keeps_translation() {
        let mut pan = panning_at(Point::ZERO, Point::new(30.0, 0.0));
        assert_eq!(pan.translation(), Vector::new(30.0, 0.0));

        // Second finger lands and the centroid jumps.
        pan.rebase(Point::new(50.0, 10.0));
        assert_eq!(pan.translation(), Vector::new(30.0, 0.0));
        assert_eq!(pan.location(), Point::new(50.0, 10.0));
        assert_eq!(pan.origin, Point::new(20.0, 10.0));
    }

    #[test]
    fn test_set_translation() {
        let mut pan = panning_at(Point::new(10.0, 10.0), Point::new(30.0, 0.0));
        assert_eq!(pan.translation(), Vector::new(20.0, -10.0));

        pan.set_translation(Vector::ZERO);
        assert_eq!(pan.translation(), Vector::ZERO);
        assert_eq!(pan.location(), Point::new(30.0, 0.0));

        pan.set_translation(Vector::new(5.0, 5.0));
        assert_eq!(pan.translation(), Vector::new(5.0, 5.0));
    }

    #[test]
    fn test_builders_clamp() {
        let pan = PanGestureRecognizer::new().with_minimum_touches(0).with_maximum_touches(0);
        assert_eq!(pan.minimum_number_of_touches(), 1);
        assert_eq!(pan.maximum_number_of_touches(), 1);

        let pan = PanGestureRecognizer::default();
        assert_eq!(pan.minimum_number_of_touches(), 1);
        assert_eq!(pan.maximum_number_of_touches(), usize::MAX);
        assert_eq!(pan.threshold, DEFAULT_PAN_MIN_THRESHOLD);
    }

    #[test]
    fn test_reset_stops_panning() {
        let mut pan = panning_at(Point::ZERO, Point::new(30.0, 0.0));
        pan.reset();
        assert!(!pan.panning);
        assert_eq!(pan.velocity(), Vector::ZERO);
    }
}
