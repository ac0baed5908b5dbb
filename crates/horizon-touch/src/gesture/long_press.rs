//! Long-press recognition.

use std::time::Duration;

use horizon_touch_core::logging::targets;
use horizon_touch_core::{Point, TimerId};

use crate::error::TouchResult;
use crate::event::Event;
use crate::touch::Touch;

use super::{GestureContext, GestureCore, GestureRecognizer, GestureState, RecognizerKind, active_centroid, set_state};

/// Default time fingers must stay down, in milliseconds.
pub const DEFAULT_LONG_PRESS_DURATION_MS: u64 = 500;

/// Default distance fingers may travel while waiting.
pub const DEFAULT_LONG_PRESS_ALLOWABLE_MOVEMENT: f32 = 10.0;

/// Recognizes fingers held down in place.
///
/// Continuous: a timer starts when the required fingers touch down. If they
/// stay within the allowable movement until it fires, the gesture begins;
/// later movement reports `Changed`, and lifting ends it.
///
/// `taps_required` counts the quick taps that must precede the press, so
/// the pressing finger's tap count must exceed it.
#[derive(Debug)]
pub struct LongPressGestureRecognizer {
    core: GestureCore,
    minimum_duration: Duration,
    allowable_movement: f32,
    taps_required: u32,
    touches_required: usize,
    start: Point,
    location: Point,
    fingers: usize,
    pending: Option<TimerId>,
}

impl LongPressGestureRecognizer {
    /// Create a single-finger recognizer with no preceding taps.
    pub fn new() -> Self {
        Self {
            core: GestureCore::new(),
            minimum_duration: Duration::from_millis(DEFAULT_LONG_PRESS_DURATION_MS),
            allowable_movement: DEFAULT_LONG_PRESS_ALLOWABLE_MOVEMENT,
            taps_required: 0,
            touches_required: 1,
            start: Point::ZERO,
            location: Point::ZERO,
            fingers: 0,
            pending: None,
        }
    }

    /// Set the minimum press duration.
    pub fn with_minimum_duration(mut self, duration: Duration) -> Self {
        self.minimum_duration = duration;
        self
    }

    /// Set the allowable movement while waiting.
    pub fn with_allowable_movement(mut self, distance: f32) -> Self {
        self.allowable_movement = distance;
        self
    }

    /// Set the number of taps that must precede the press.
    pub fn with_taps_required(mut self, taps: u32) -> Self {
        self.taps_required = taps;
        self
    }

    /// Set the number of fingers required.
    pub fn with_touches_required(mut self, touches: usize) -> Self {
        self.touches_required = touches.max(1);
        self
    }

    /// Minimum press duration.
    pub fn minimum_press_duration(&self) -> Duration {
        self.minimum_duration
    }

    /// Number of taps that must precede the press.
    pub fn number_of_taps_required(&self) -> u32 {
        self.taps_required
    }

    /// Number of fingers required.
    pub fn number_of_touches_required(&self) -> usize {
        self.touches_required
    }

    /// Centroid of the fingers.
    pub fn location(&self) -> Point {
        self.location
    }

    /// Check whether the press timer is running.
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    fn give_up(&mut self, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if let Some(timer) = self.pending.take() {
            cx.cancel_timer(timer);
        }
        set_state(self, GestureState::Failed)
    }
}

impl Default for LongPressGestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer for LongPressGestureRecognizer {
    fn core(&self) -> &GestureCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GestureCore {
        &mut self.core
    }

    fn kind(&self) -> RecognizerKind<'_> {
        RecognizerKind::LongPress(self)
    }

    fn touches_began(&mut self, touches: &[&Touch], event: &Event, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if self.state() != GestureState::Possible {
            return Ok(());
        }
        if touches.iter().any(|touch| touch.tap_count() <= self.taps_required) {
            return self.give_up(cx);
        }

        self.fingers += touches.len();
        if self.fingers > self.touches_required {
            return self.give_up(cx);
        }
        if self.fingers == self.touches_required {
            self.start = active_centroid(event, cx.recognizer()).0.unwrap_or(self.start);
            self.location = self.start;
            self.pending = Some(cx.schedule(self.minimum_duration));
        }
        Ok(())
    }

    fn touches_moved(&mut self, _touches: &[&Touch], event: &Event, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        let (Some(location), _) = active_centroid(event, cx.recognizer()) else {
            return Ok(());
        };
        self.location = location;

        match self.state() {
            GestureState::Began | GestureState::Changed => set_state(self, GestureState::Changed),
            GestureState::Possible if self.pending.is_some() => {
                if self.start.distance_to(location) > self.allowable_movement {
                    return self.give_up(cx);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn touches_ended(&mut self, _touches: &[&Touch], _event: &Event, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if self.state().is_active() {
            set_state(self, GestureState::Ended)
        } else {
            self.give_up(cx)
        }
    }

    fn touches_cancelled(
        &mut self,
        _touches: &[&Touch],
        _event: &Event,
        cx: &mut GestureContext<'_>,
    ) -> TouchResult<()> {
        if self.state().is_active() {
            set_state(self, GestureState::Cancelled)
        } else {
            self.give_up(cx)
        }
    }

    fn timer_fired(&mut self, timer: TimerId, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if self.pending != Some(timer) || self.state() != GestureState::Possible {
            tracing::trace!(target: targets::GESTURE, ?timer, "ignoring unexpected long-press timer");
            return Ok(());
        }
        self.pending = None;
        set_state(self, GestureState::Began)
    }

    fn reset(&mut self) {
        self.fingers = 0;
        self.pending = None;
    }
}
