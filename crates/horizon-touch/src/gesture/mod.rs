//! Gesture recognizers.
//!
//! A gesture recognizer watches the touches delivered to its view (and the
//! view's descendants) and reports a discrete or continuous gesture through
//! a small state machine:
//!
//! ```text
//!             ┌──────────► Failed ─────────────┐
//!             │                                │ (reset)
//! Possible ──┼──────────► Ended                ▼
//!             │           ▲                Possible
//!             └─► Began ──┼─► Changed ──┐
//!                   │     └─────────────┤
//!                   └──► Cancelled ◄────┘
//! ```
//!
//! Every state change goes through [`set_state`], which validates it
//! against the transition table, consults the recognizer's delegate when a
//! gesture is about to start, and notifies registered handlers. Transitions
//! into a terminal state schedule a reset; the window performs it once the
//! touches that drove the gesture have all ended.
//!
//! Concrete recognizers: [`TapGestureRecognizer`], [`PanGestureRecognizer`],
//! [`LongPressGestureRecognizer`] and [`SwipeGestureRecognizer`].

mod long_press;
mod pan;
mod registry;
mod swipe;
mod tap;
mod velocity;

use std::any::Any;
use std::fmt;
use std::time::Duration;

use slotmap::new_key_type;

use horizon_touch_core::logging::targets;
use horizon_touch_core::{HandlerId, HandlerList, Point, TimerId, TimerManager, Timestamp};

use crate::error::{TouchError, TouchResult};
use crate::event::Event;
use crate::touch::{Touch, TouchId, TouchPhase};
use crate::view::ViewId;

pub use long_press::{
    DEFAULT_LONG_PRESS_ALLOWABLE_MOVEMENT, DEFAULT_LONG_PRESS_DURATION_MS, LongPressGestureRecognizer,
};
pub use pan::{DEFAULT_PAN_MIN_THRESHOLD, PanGestureRecognizer};
pub use registry::GestureRegistry;
pub use swipe::{
    DEFAULT_SWIPE_MAX_DURATION_MS, DEFAULT_SWIPE_MAX_PRIMARY_MOVEMENT, DEFAULT_SWIPE_MAX_SECONDARY_MOVEMENT,
    DEFAULT_SWIPE_MIN_PRIMARY_MOVEMENT, DEFAULT_SWIPE_MIN_VELOCITY, SwipeDirection, SwipeGestureRecognizer,
};
pub use tap::{DEFAULT_TAP_ALLOWABLE_MOVEMENT, DEFAULT_TAP_MAX_DURATION_MS, TapGestureRecognizer};
pub use velocity::{DEFAULT_VELOCITY_WINDOW_MS, VelocityTracker};

new_key_type! {
    /// A handle to a gesture recognizer registered with a window.
    pub struct RecognizerId;
}

/// A gesture recognizer trait object.
pub type DynRecognizer = dyn GestureRecognizer;

/// State of a gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GestureState {
    /// Waiting for touches to match the gesture.
    #[default]
    Possible,
    /// A continuous gesture started.
    Began,
    /// A continuous gesture changed.
    Changed,
    /// The gesture finished. Discrete gestures jump here from `Possible`.
    Ended,
    /// A continuous gesture was cancelled.
    Cancelled,
    /// The touches do not match the gesture.
    Failed,
}

impl GestureState {
    /// Check whether the gesture is over for this occurrence.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }

    /// Check whether a continuous gesture is in progress.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }
}

/// A legal state change and its side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the change.
    pub from: GestureState,
    /// State after the change.
    pub to: GestureState,
    /// Whether handlers are notified.
    pub notify: bool,
    /// Whether the recognizer is reset once its touches end.
    pub reset: bool,
}

const fn rule(from: GestureState, to: GestureState, notify: bool, reset: bool) -> Transition {
    Transition { from, to, notify, reset }
}

/// Every legal state change.
pub const TRANSITIONS: [Transition; 10] = {
    use GestureState::*;
    [
        rule(Possible, Began, true, false),
        rule(Possible, Failed, false, true),
        rule(Possible, Ended, true, true),
        rule(Began, Changed, true, false),
        rule(Began, Cancelled, true, true),
        rule(Began, Ended, true, true),
        rule(Changed, Changed, true, false),
        rule(Changed, Cancelled, true, true),
        rule(Changed, Ended, true, true),
        rule(Failed, Possible, false, false),
    ]
};

impl Transition {
    /// Look up the rule for a state change. `None` if it is illegal.
    pub fn lookup(from: GestureState, to: GestureState) -> Option<Transition> {
        TRANSITIONS.iter().copied().find(|t| t.from == from && t.to == to)
    }
}

/// A borrowed view of a recognizer's concrete type.
#[derive(Debug, Clone, Copy)]
pub enum RecognizerKind<'a> {
    /// A tap recognizer.
    Tap(&'a TapGestureRecognizer),
    /// A pan recognizer.
    Pan(&'a PanGestureRecognizer),
    /// A long-press recognizer.
    LongPress(&'a LongPressGestureRecognizer),
    /// A swipe recognizer.
    Swipe(&'a SwipeGestureRecognizer),
    /// Any other recognizer.
    Custom,
}

impl<'a> RecognizerKind<'a> {
    /// Get the tap recognizer, if this is one.
    pub fn tap(self) -> Option<&'a TapGestureRecognizer> {
        match self {
            Self::Tap(tap) => Some(tap),
            _ => None,
        }
    }

    /// Get the pan recognizer, if this is one.
    pub fn pan(self) -> Option<&'a PanGestureRecognizer> {
        match self {
            Self::Pan(pan) => Some(pan),
            _ => None,
        }
    }

    /// Get the long-press recognizer, if this is one.
    pub fn long_press(self) -> Option<&'a LongPressGestureRecognizer> {
        match self {
            Self::LongPress(press) => Some(press),
            _ => None,
        }
    }

    /// Get the swipe recognizer, if this is one.
    pub fn swipe(self) -> Option<&'a SwipeGestureRecognizer> {
        match self {
            Self::Swipe(swipe) => Some(swipe),
            _ => None,
        }
    }

    /// Number of taps required, for tap recognizers.
    pub fn tap_priority(self) -> Option<u32> {
        self.tap().map(TapGestureRecognizer::number_of_taps_required)
    }
}

/// Optional policy hooks for a recognizer.
pub trait GestureDelegate {
    /// Called when the recognizer is about to leave `Possible` for `Began`
    /// or `Ended`. Returning `false` fails the recognizer instead.
    fn should_begin(&self, _recognizer: &dyn GestureRecognizer) -> bool {
        true
    }

    /// Called when a touch begins on the recognizer's view or a descendant.
    /// Returning `false` keeps the touch away from the recognizer.
    fn should_receive_touch(&self, _recognizer: &dyn GestureRecognizer, _touch: &Touch) -> bool {
        true
    }

    /// Whether `recognizer` and `other` may both recognize from the same
    /// touches under exclusive arbitration.
    fn should_recognize_simultaneously(
        &self,
        _recognizer: &dyn GestureRecognizer,
        _other: &dyn GestureRecognizer,
    ) -> bool {
        false
    }
}

/// Payload of a recognizer timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPayload {
    /// Recognizer that owns the timer.
    pub recognizer: RecognizerId,
    /// Recognizer generation when the timer was started.
    pub generation: u64,
}

/// Services available to a recognizer while it handles touches or timers.
pub struct GestureContext<'a> {
    recognizer: RecognizerId,
    generation: u64,
    now: Timestamp,
    timers: &'a mut TimerManager<TimerPayload>,
}

impl<'a> GestureContext<'a> {
    pub(crate) fn new(
        recognizer: RecognizerId,
        generation: u64,
        now: Timestamp,
        timers: &'a mut TimerManager<TimerPayload>,
    ) -> Self {
        Self {
            recognizer,
            generation,
            now,
            timers,
        }
    }

    /// The recognizer being driven.
    pub fn recognizer(&self) -> RecognizerId {
        self.recognizer
    }

    /// Timestamp of the sample or timer being handled.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Start a one-shot timer that calls back
    /// [`GestureRecognizer::timer_fired`] after `delay`.
    pub fn schedule(&mut self, delay: Duration) -> TimerId {
        let payload = TimerPayload {
            recognizer: self.recognizer,
            generation: self.generation,
        };
        self.timers.start_one_shot(self.now, delay, payload)
    }

    /// Cancel a timer started through [`schedule`](Self::schedule).
    pub fn cancel_timer(&mut self, timer: TimerId) -> bool {
        self.timers.cancel(timer)
    }
}

/// State shared by every recognizer.
pub struct GestureCore {
    state: GestureState,
    enabled: bool,
    view: Option<ViewId>,
    generation: u64,
    tracked: Vec<TouchId>,
    handlers: HandlerList<DynRecognizer>,
    delegate: Option<Box<dyn GestureDelegate>>,
    pending_reset: bool,
    outcome: Option<GestureState>,
}

impl GestureCore {
    /// Create an enabled, unattached core in `Possible`.
    pub fn new() -> Self {
        Self {
            state: GestureState::Possible,
            enabled: true,
            view: None,
            generation: 0,
            tracked: Vec::new(),
            handlers: HandlerList::new(),
            delegate: None,
            pending_reset: false,
            outcome: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Terminal state reached by the most recent occurrence, kept across
    /// resets.
    pub fn last_outcome(&self) -> Option<GestureState> {
        self.outcome
    }

    /// Whether the recognizer receives touches.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The view the recognizer is attached to.
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    /// Incremented by every reset. Timers from older generations are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Touches supplied by the most recent delivery.
    pub fn tracked_touches(&self) -> &[TouchId] {
        &self.tracked
    }

    /// Check whether a reset is scheduled.
    pub fn is_reset_pending(&self) -> bool {
        self.pending_reset
    }

    /// Register a state-change handler. Returns its ID.
    pub fn add_handler<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&DynRecognizer) + 'static,
    {
        self.handlers.add(handler)
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        self.handlers.remove(id).is_ok()
    }

    /// Install a delegate, replacing any previous one.
    pub fn set_delegate(&mut self, delegate: impl GestureDelegate + 'static) {
        self.delegate = Some(Box::new(delegate));
    }

    /// Remove the delegate.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Get the delegate.
    pub fn delegate(&self) -> Option<&dyn GestureDelegate> {
        self.delegate.as_deref()
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_view(&mut self, view: Option<ViewId>) {
        self.view = view;
    }

    pub(crate) fn set_tracked(&mut self, touches: Vec<TouchId>) {
        self.tracked = touches;
    }

    /// Apply a state change without side effects beyond bookkeeping.
    fn apply(&mut self, to: GestureState) -> TouchResult<Transition> {
        let from = self.state;
        let transition = Transition::lookup(from, to).ok_or(TouchError::IllegalTransition { from, to })?;

        tracing::debug!(target: targets::GESTURE, ?from, ?to, "gesture state changed");
        self.state = to;
        if transition.reset {
            self.pending_reset = true;
            self.outcome = Some(to);
        } else if to == GestureState::Possible {
            self.pending_reset = false;
        }
        Ok(transition)
    }

    /// Return to `Possible` and forget the occurrence's touches.
    pub(crate) fn reset(&mut self) {
        self.state = GestureState::Possible;
        self.tracked.clear();
        self.pending_reset = false;
        self.generation += 1;
    }
}

impl Default for GestureCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GestureCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureCore")
            .field("state", &self.state)
            .field("enabled", &self.enabled)
            .field("view", &self.view)
            .field("generation", &self.generation)
            .field("tracked", &self.tracked)
            .field("handlers", &self.handlers.len())
            .field("has_delegate", &self.delegate.is_some())
            .field("pending_reset", &self.pending_reset)
            .finish()
    }
}

/// A gesture recognizer.
///
/// Implementors own a [`GestureCore`] and override the touch hooks they
/// need. Hooks change state through [`set_state`]. Returning an error from
/// a hook reports a programming fault; a gesture that simply does not
/// match transitions to [`GestureState::Failed`].
pub trait GestureRecognizer: Any {
    /// Shared recognizer state.
    fn core(&self) -> &GestureCore;

    /// Shared recognizer state, mutably.
    fn core_mut(&mut self) -> &mut GestureCore;

    /// The concrete recognizer type.
    fn kind(&self) -> RecognizerKind<'_> {
        RecognizerKind::Custom
    }

    /// Current state.
    fn state(&self) -> GestureState {
        self.core().state()
    }

    /// Whether handlers hear about a transition into `state` that the
    /// table marks as notifying.
    fn should_notify(&self, _state: GestureState) -> bool {
        true
    }

    /// Whether this recognizer, once recognized, may fail `other`.
    fn can_prevent(&self, _other: &dyn GestureRecognizer) -> bool {
        true
    }

    /// Whether `other`, once recognized, may fail this recognizer.
    ///
    /// A tap recognizer that requires no more taps than this one cannot.
    /// Recognizers other than taps count as requiring zero taps.
    fn can_be_prevented_by(&self, other: &dyn GestureRecognizer) -> bool {
        let own = self.kind().tap_priority().unwrap_or(0);
        other.kind().tap_priority().is_none_or(|priority| priority > own)
    }

    /// Fingers touched down.
    fn touches_began(&mut self, _touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        Ok(())
    }

    /// Fingers moved.
    fn touches_moved(&mut self, _touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        Ok(())
    }

    /// Fingers lifted.
    fn touches_ended(&mut self, _touches: &[&Touch], _event: &Event, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        Ok(())
    }

    /// The system cancelled fingers.
    fn touches_cancelled(
        &mut self,
        _touches: &[&Touch],
        _event: &Event,
        _cx: &mut GestureContext<'_>,
    ) -> TouchResult<()> {
        Ok(())
    }

    /// A timer started through [`GestureContext::schedule`] fired.
    fn timer_fired(&mut self, _timer: TimerId, _cx: &mut GestureContext<'_>) -> TouchResult<()> {
        Ok(())
    }

    /// Clear per-occurrence state. Called when the recognizer returns to
    /// `Possible`.
    fn reset(&mut self) {}

    /// Evaluate the touches of one dispatch cycle.
    ///
    /// Records `touches` as tracked, then calls the hooks grouped by phase
    /// (began, moved, ended, cancelled) until the recognizer reaches a
    /// terminal state. Disabled and terminal recognizers ignore the call.
    fn recognize(&mut self, touches: &[&Touch], event: &Event, cx: &mut GestureContext<'_>) -> TouchResult<()> {
        if !self.core().is_enabled() || self.state().is_terminal() {
            return Ok(());
        }
        self.core_mut().set_tracked(touches.iter().map(|touch| touch.id()).collect());

        for phase in [TouchPhase::Began, TouchPhase::Moved, TouchPhase::Ended, TouchPhase::Cancelled] {
            let group: Vec<&Touch> = touches.iter().copied().filter(|t| t.phase() == phase).collect();
            if group.is_empty() {
                continue;
            }
            match phase {
                TouchPhase::Began => self.touches_began(&group, event, cx)?,
                TouchPhase::Moved => self.touches_moved(&group, event, cx)?,
                TouchPhase::Ended => self.touches_ended(&group, event, cx)?,
                TouchPhase::Cancelled => self.touches_cancelled(&group, event, cx)?,
                TouchPhase::Stationary => {}
            }
            if self.state().is_terminal() {
                break;
            }
        }
        Ok(())
    }
}

/// Move a recognizer to `to`.
///
/// Leaving `Possible` for `Began` or `Ended` asks the delegate first; a
/// refusal fails the recognizer instead. Illegal transitions return
/// [`TouchError::IllegalTransition`] and leave the state unchanged.
pub fn set_state(recognizer: &mut DynRecognizer, to: GestureState) -> TouchResult<()> {
    let starting = recognizer.state() == GestureState::Possible
        && matches!(to, GestureState::Began | GestureState::Ended);
    let to = if starting && !should_begin(recognizer) {
        tracing::debug!(target: targets::GESTURE, "delegate refused gesture start");
        GestureState::Failed
    } else {
        to
    };

    let transition = recognizer.core_mut().apply(to)?;
    if transition.notify && recognizer.should_notify(to) {
        let mut handlers = std::mem::take(&mut recognizer.core_mut().handlers);
        handlers.notify(recognizer);
        recognizer.core_mut().handlers = handlers;
    }
    Ok(())
}

/// Downcast a recognizer to its concrete type.
pub fn recognizer_cast<R: GestureRecognizer>(recognizer: &DynRecognizer) -> Option<&R> {
    (recognizer as &dyn Any).downcast_ref::<R>()
}

/// Mutable version of [`recognizer_cast`].
pub fn recognizer_cast_mut<R: GestureRecognizer>(recognizer: &mut DynRecognizer) -> Option<&mut R> {
    (recognizer as &mut dyn Any).downcast_mut::<R>()
}

fn should_begin(recognizer: &DynRecognizer) -> bool {
    recognizer
        .core()
        .delegate()
        .is_none_or(|delegate| delegate.should_begin(recognizer))
}

/// Ask a recognizer's delegate whether a new touch is delivered to it.
pub(crate) fn should_receive_touch(recognizer: &DynRecognizer, touch: &Touch) -> bool {
    recognizer
        .core()
        .delegate()
        .is_none_or(|delegate| delegate.should_receive_touch(recognizer, touch))
}

/// Check whether `winner` fails `other` under exclusive arbitration.
pub(crate) fn prevents(winner: &DynRecognizer, other: &DynRecognizer) -> bool {
    let simultaneous = winner
        .core()
        .delegate()
        .is_some_and(|d| d.should_recognize_simultaneously(winner, other))
        || other
            .core()
            .delegate()
            .is_some_and(|d| d.should_recognize_simultaneously(other, winner));
    !simultaneous && winner.can_prevent(other) && other.can_be_prevented_by(winner)
}

/// Centroid of the touches' locations.
pub(crate) fn centroid<'a>(touches: impl IntoIterator<Item = &'a Touch>) -> Option<Point> {
    let (x, y, count) = touches.into_iter().fold((0.0, 0.0, 0u32), |(x, y, count), touch| {
        let location = touch.location();
        (x + location.x, y + location.y, count + 1)
    });
    (count > 0).then(|| Point::new(x / count as f32, y / count as f32))
}

/// Centroid and count of the fingers in contact that feed `recognizer`.
pub(crate) fn active_centroid(event: &Event, recognizer: RecognizerId) -> (Option<Point>, usize) {
    let touches: Vec<&Touch> = event
        .touches_for_recognizer(recognizer)
        .into_iter()
        .filter(|touch| touch.phase().is_active())
        .collect();
    (centroid(touches.iter().copied()), touches.len())
}
