//! Swipe recognition.

use std::ops::BitOr;
use std::time::Duration;

use horizon_touch_core::{Point, Timestamp};

use crate::error::TouchResult;
use crate::event::Event;
use crate::touch::{Touch, TouchId, TouchPhase};

use super::{GestureContext, GestureCore, GestureRecognizer, GestureState, RecognizerKind, VelocityTracker, set_state};

/// Default maximum swipe duration, in milliseconds.
pub const DEFAULT_SWIPE_MAX_DURATION_MS: u64 = 500;

/// Default travel along the swipe axis before the swipe is judged.
pub const DEFAULT_SWIPE_MIN_PRIMARY_MOVEMENT: f32 = 50.0;

/// Default maximum travel along the swipe axis.
pub const DEFAULT_SWIPE_MAX_PRIMARY_MOVEMENT: f32 = 1000.0;

/// Default maximum travel across the swipe axis.
pub const DEFAULT_SWIPE_MAX_SECONDARY_MOVEMENT: f32 = 30.0;

/// Default minimum speed along the swipe axis, in units per second.
pub const DEFAULT_SWIPE_MIN_VELOCITY: f32 = 300.0;

/// A set of swipe directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwipeDirection(u8);

impl SwipeDirection {
    /// No direction.
    pub const NONE: Self = Self(0);
    /// Toward positive x.
    pub const RIGHT: Self = Self(1);
    /// Toward negative x.
    pub const LEFT: Self = Self(1 << 1);
    /// Toward negative y.
    pub const UP: Self = Self(1 << 2);
    /// Toward positive y.
    pub const DOWN: Self = Self(1 << 3);
    /// Every direction.
    pub const ALL: Self = Self(0b1111);

    /// Check whether every direction in `other` is in this set.
    pub fn contains(self, other: SwipeDirection) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Check whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for SwipeDirection {
    fn default() -> Self {
        Self::RIGHT
    }
}

impl BitOr for SwipeDirection {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Stroke {
    touch: TouchId,
    start: Point,
    started_at: Timestamp,
}

/// Recognizes a fast, mostly straight stroke in one of the allowed
/// directions.
///
/// Discrete: once the stroke has travelled the minimum distance along its
/// dominant axis fast enough, the recognizer ends. Handlers only hear about
/// the `Ended` transition.
#[derive(Debug)]
pub struct SwipeGestureRecognizer {
    core: GestureCore,
    directions: SwipeDirection,
    maximum_duration: Duration,
    minimum_primary_movement: f32,
    maximum_primary_movement: f32,
    maximum_secondary_movement: f32,
    minimum_velocity: f32,
    stroke: Option<Stroke>,
    velocity: VelocityTracker,
    recognized: Option<SwipeDirection>,
}

impl SwipeGestureRecognizer {
    /// Create a recognizer for rightward swipes.
    pub fn new() -> Self {
        Self::with_directions(SwipeDirection::default())
    }

    /// Create a recognizer for a set of directions.
    pub fn with_directions(directions: SwipeDirection) -> Self {
        Self {
            core: GestureCore::new(),
            directions,
            maximum_duration: Duration::from_millis(DEFAULT_SWIPE_MAX_DURATION_MS),
            minimum_primary_movement: DEFAULT_SWIPE_MIN_PRIMARY_MOVEMENT,
            maximum_primary_movement: DEFAULT_SWIPE_MAX_PRIMARY_MOVEMENT,
            maximum_secondary_movement: DEFAULT_SWIPE_MAX_SECONDARY_MOVEMENT,
            minimum_velocity: DEFAULT_SWIPE_MIN_VELOCITY,
            stroke: None,
            velocity: VelocityTracker::new(),
            recognized: None,
        }
    }

    /// Set the maximum duration.
    pub fn with_maximum_duration(mut self, duration: Duration) -> Self {
        self.maximum_duration = duration;
        self
    }

    /// Set the minimum speed along the swipe axis.
    pub fn with_minimum_velocity(mut self, velocity: f32) -> Self {
        self.minimum_velocity = velocity;
        self
    }

    /// Set the travel along the swipe axis before the swipe is judged.
    pub fn with_minimum_primary_movement(mut self, distance: f32) -> Self {
        self.minimum_primary_movement = distance;
        self
    }

    /// Set the maximum travel across the swipe axis.
    pub fn with_maximum_secondary_movement(mut self, distance: f32) -> Self {
        self.maximum_secondary_movement = distance;
        self
    }

    /// Allowed directions.
    pub fn directions(&self) -> SwipeDirection {
        self.directions
    }

    /// Direction of the most recently recognized swipe.
    pub fn direction(&self) -> Option<SwipeDirection> {
        self.recognized
    }

    /// Where the stroke started.
    pub fn start_location(&self) -> Option<Point> {
        self.stroke.map(|stroke| stroke.start)
    }

    fn evaluate(&mut self, touch: &Touch) -> TouchResult<()> {
        let Some(stroke) = self.stroke.filter(|stroke| stroke.touch == touch.id()) else {
            return Ok(());
        };
        self.velocity.add(touch.timestamp(), touch.location());

        if touch.timestamp().saturating_since(stroke.started_at) > self.maximum_duration {
            return set_state(self, GestureState::Failed);
        }

        let travel = touch.location() - stroke.start;
        let horizontal = travel.dx.abs() >= travel.dy.abs();
        let (along, across) = if horizontal {
            (travel.dx, travel.dy)
        } else {
            (travel.dy, travel.dx)
        };
        let (primary, secondary) = (along.abs(), across.abs());

        if primary > self.maximum_primary_movement || secondary > self.maximum_secondary_movement {
            return set_state(self, GestureState::Failed);
        }

        if primary < self.minimum_primary_movement {
            if touch.phase() == TouchPhase::Ended {
                return set_state(self, GestureState::Failed);
            }
            return Ok(());
        }

        let velocity = self.velocity.velocity();
        let speed = if horizontal { velocity.dx.abs() } else { velocity.dy.abs() };
        if speed <= self.minimum_velocity {
            return set_state(self, GestureState::Failed);
        }

        let direction = match (horizontal, along > 0.0) {
            (true, true) => SwipeDirection::RIGHT,
            (true, false) => SwipeDirection::LEFT,
            (false, true) => SwipeDirection::DOWN,
            (false, false) => SwipeDirection::UP,
        };
        if !self.directions.contains(direction) {
            return set_state(self, GestureState::Failed);
        }

        self.recognized = Some(direction);
        set_state(self, GestureState::Ended)
    }
}

impl Default for SwipeGestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer for SwipeGestureRecognizer {
    fn core(&self) -> &GestureCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GestureCore {
        &mut self.core
    }

    fn kind(&self) -> RecognizerKind<'_> {
        RecognizerKind::Swipe(self)
    }

    fn should_notify(&self, state: GestureState) -> bool {
        state == GestureState::Ended
    }

    fn touches_began(&mut self, touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if self.stroke.is_some() || touches.len() > 1 {
            return set_state(self, GestureState::Failed);
        }
        if let Some(touch) = touches.first() {
            self.stroke = Some(Stroke {
                touch: touch.id(),
                start: touch.location(),
                started_at: touch.timestamp(),
            });
            self.velocity.clear();
            self.velocity.add(touch.timestamp(), touch.location());
        }
        Ok(())
    }

    fn touches_moved(&mut self, touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        for touch in touches {
            self.evaluate(touch)?;
            if self.state().is_terminal() {
                break;
            }
        }
        Ok(())
    }

    fn touches_ended(&mut self, touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        for touch in touches {
            self.evaluate(touch)?;
            if self.state().is_terminal() {
                break;
            }
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
        self.stroke = None;
        self.velocity.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_set() {
        let horizontal = SwipeDirection::LEFT | SwipeDirection::RIGHT;
        assert!(horizontal.contains(SwipeDirection::LEFT));
        assert!(!horizontal.contains(SwipeDirection::UP));
        assert!(SwipeDirection::ALL.contains(horizontal));
        assert!(!SwipeDirection::RIGHT.contains(SwipeDirection::NONE));
        assert_eq!(SwipeDirection::default(), SwipeDirection::RIGHT);
    }
}
