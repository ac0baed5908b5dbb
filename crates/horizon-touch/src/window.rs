//! Window-level touch dispatch.
//!
//! A [`Window`] turns raw input into recognizer evaluation and responder
//! callbacks. Each call to [`Window::handle_batch`] is one dispatch cycle:
//!
//! 1. Samples are applied to the window's [`Event`], updating touch identity
//!    and phases. Touches that began are hit-tested, and the enabled
//!    recognizers on the hit view and its ancestors are recorded on them.
//! 2. Every recognizer fed by a touch that changed this cycle evaluates its
//!    touches, in the order the recognizers were first encountered.
//! 3. The changed touches are grouped by phase and owning view, and each
//!    group is delivered once through that view's responder chain.
//! 4. Recognizers whose occurrence is over are reset, and the event sweeps
//!    lifted touches.
//!
//! Timers are driven separately with [`Window::process_timers`], so the
//! host loop decides what "now" is.

use std::time::Duration;

use horizon_touch_core::logging::{span_names, targets};
use horizon_touch_core::{HandlerId, TimerManager, Timestamp};

use crate::config::{ArbitrationPolicy, TouchConfig};
use crate::error::{TouchError, TouchResult};
use crate::event::{Event, EventKind};
use crate::gesture::{
    self, DynRecognizer, GestureContext, GestureRecognizer, GestureRegistry, GestureState, RecognizerId,
    TimerPayload, set_state,
};
use crate::input::{InputReceiver, PointerAction, RawSample};
use crate::responder::{DispatchResult, FirstResponder, ResponderAccess, ResponderChain, ResponderId};
use crate::touch::{Touch, TouchId, TouchPhase};
use crate::view::{ViewHierarchy, ViewId};

/// Touches of one phase owned by one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchGroup {
    /// Phase shared by the touches.
    pub phase: TouchPhase,
    /// Owning view.
    pub view: ViewId,
    /// The touches, in change order.
    pub touches: Vec<TouchId>,
}

/// One responder callback made during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// What was delivered.
    pub group: TouchGroup,
    /// How far it got.
    pub result: DispatchResult,
}

/// Outcome of a dispatch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// The input was dropped because the window ignores interaction.
    pub dropped: bool,
    /// Responder callbacks, in delivery order.
    pub deliveries: Vec<Delivery>,
}

/// Group the touches changed by the current cycle for delivery.
///
/// Groups appear in the order their first touch changed. Stationary touches
/// and touches without an owning view are left out.
pub fn group_touches(event: &Event) -> Vec<TouchGroup> {
    let mut groups: Vec<TouchGroup> = Vec::new();
    for touch in event.touches() {
        let phase = touch.phase();
        if phase == TouchPhase::Stationary {
            continue;
        }
        let Some(view) = touch.view() else {
            continue;
        };
        match groups.iter_mut().find(|g| g.phase == phase && g.view == view) {
            Some(group) => group.touches.push(touch.id()),
            None => groups.push(TouchGroup {
                phase,
                view,
                touches: vec![touch.id()],
            }),
        }
    }
    groups
}

/// The touch dispatcher of one window.
#[derive(Debug)]
pub struct Window {
    config: TouchConfig,
    event: Event,
    registry: GestureRegistry,
    timers: TimerManager<TimerPayload>,
    first_responder: FirstResponder,
    ignore_depth: u32,
}

impl Window {
    /// Create a window dispatcher.
    pub fn new(config: TouchConfig) -> Self {
        Self {
            event: Event::new(&config),
            config,
            registry: GestureRegistry::new(),
            timers: TimerManager::new(),
            first_responder: FirstResponder::new(),
            ignore_depth: 0,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    /// Get the window's touch event.
    pub fn event(&self) -> &Event {
        &self.event
    }

    // =========================================================================
    // Gesture recognizers
    // =========================================================================

    /// Add a recognizer and attach it to `view`.
    pub fn add_gesture_recognizer<R: GestureRecognizer>(&mut self, view: ViewId, recognizer: R) -> RecognizerId {
        self.registry.insert_on(view, Box::new(recognizer))
    }

    /// Add a recognizer without attaching it.
    pub fn insert_gesture_recognizer(&mut self, recognizer: Box<DynRecognizer>) -> RecognizerId {
        self.registry.insert(recognizer)
    }

    /// Attach a recognizer to `view`, detaching it from its previous view.
    pub fn attach_gesture_recognizer(&mut self, id: RecognizerId, view: ViewId) -> TouchResult<()> {
        self.registry.attach(id, view)?;
        self.event.forget_recognizer(id);
        self.reset_recognizer(id);
        Ok(())
    }

    /// Detach a recognizer from its view.
    pub fn detach_gesture_recognizer(&mut self, id: RecognizerId) -> TouchResult<()> {
        self.registry.detach(id)?;
        self.event.forget_recognizer(id);
        self.reset_recognizer(id);
        Ok(())
    }

    /// Remove a recognizer and hand it back.
    pub fn remove_gesture_recognizer(&mut self, id: RecognizerId) -> Option<Box<DynRecognizer>> {
        self.reset_recognizer(id);
        self.event.forget_recognizer(id);
        self.registry.remove(id)
    }

    /// Get a recognizer.
    pub fn gesture_recognizer(&self, id: RecognizerId) -> Option<&DynRecognizer> {
        self.registry.get(id)
    }

    /// Get a recognizer mutably.
    pub fn gesture_recognizer_mut(&mut self, id: RecognizerId) -> Option<&mut DynRecognizer> {
        self.registry.get_mut(id)
    }

    /// Get a recognizer as its concrete type.
    pub fn gesture_recognizer_as<R: GestureRecognizer>(&self, id: RecognizerId) -> Option<&R> {
        self.registry.get(id).and_then(gesture::recognizer_cast::<R>)
    }

    /// Get a recognizer mutably as its concrete type.
    pub fn gesture_recognizer_as_mut<R: GestureRecognizer>(&mut self, id: RecognizerId) -> Option<&mut R> {
        self.registry.get_mut(id).and_then(gesture::recognizer_cast_mut::<R>)
    }

    /// Recognizers attached directly to `view`, in attachment order.
    pub fn gesture_recognizers(&self, view: ViewId) -> &[RecognizerId] {
        self.registry.attached_to(view)
    }

    /// Recognizers a touch beginning on `view` would be delivered to.
    pub fn gesture_recognizers_for<T: ViewHierarchy + ?Sized>(&self, tree: &T, view: ViewId) -> Vec<RecognizerId> {
        self.registry
            .collect_for(tree, view)
            .into_iter()
            .filter(|&id| self.registry.get(id).is_some_and(|r| r.core().is_enabled()))
            .collect()
    }

    /// Register a state-change handler on a recognizer.
    pub fn add_gesture_handler<F>(&mut self, id: RecognizerId, handler: F) -> TouchResult<HandlerId>
    where
        F: FnMut(&DynRecognizer) + 'static,
    {
        let recognizer = self.registry.get_mut(id).ok_or(TouchError::UnknownRecognizer)?;
        Ok(recognizer.core_mut().add_handler(handler))
    }

    /// Remove a state-change handler. Returns `false` if it was not
    /// registered.
    pub fn remove_gesture_handler(&mut self, id: RecognizerId, handler: HandlerId) -> TouchResult<bool> {
        let recognizer = self.registry.get_mut(id).ok_or(TouchError::UnknownRecognizer)?;
        Ok(recognizer.core_mut().remove_handler(handler))
    }

    /// Enable or disable a recognizer.
    ///
    /// Disabling cancels a gesture in progress, fails one still being
    /// evaluated, and resets the recognizer.
    pub fn set_recognizer_enabled(&mut self, id: RecognizerId, enabled: bool) -> TouchResult<()> {
        let recognizer = self.registry.get_mut(id).ok_or(TouchError::UnknownRecognizer)?;
        if enabled || !recognizer.core().is_enabled() {
            recognizer.core_mut().set_enabled(enabled);
            return Ok(());
        }

        let evaluating = !self.event.touches_for_recognizer(id).is_empty();
        let result = match recognizer.state() {
            GestureState::Began | GestureState::Changed => set_state(recognizer, GestureState::Cancelled),
            GestureState::Possible if evaluating => set_state(recognizer, GestureState::Failed),
            _ => Ok(()),
        };
        recognizer.core_mut().set_enabled(false);
        tracing::debug!(target: targets::WINDOW, ?id, "recognizer disabled");

        self.event.forget_recognizer(id);
        self.reset_recognizer(id);
        result.map_err(|err| self.fault(err))
    }

    // =========================================================================
    // Interaction ignoring
    // =========================================================================

    /// Start dropping input. Calls nest.
    pub fn begin_ignoring_interaction_events(&mut self) {
        self.ignore_depth += 1;
        tracing::debug!(target: targets::WINDOW, depth = self.ignore_depth, "ignoring interaction events");
    }

    /// Undo one [`begin_ignoring_interaction_events`](Self::begin_ignoring_interaction_events).
    pub fn end_ignoring_interaction_events(&mut self) -> TouchResult<()> {
        if self.ignore_depth == 0 {
            return Err(self.fault(TouchError::UnbalancedIgnoreInteraction));
        }
        self.ignore_depth -= 1;
        tracing::debug!(target: targets::WINDOW, depth = self.ignore_depth, "interaction ignore released");
        Ok(())
    }

    /// Check whether input is currently dropped.
    pub fn is_ignoring_interaction_events(&self) -> bool {
        self.ignore_depth > 0
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatch a single sample as one cycle.
    pub fn handle_sample<T: ViewHierarchy + ?Sized>(
        &mut self,
        tree: &mut T,
        sample: &RawSample,
    ) -> TouchResult<DispatchSummary> {
        self.handle_batch(tree, std::slice::from_ref(sample))
    }

    /// Dispatch a batch of samples as one cycle.
    ///
    /// While interaction is ignored, new contacts and movement are dropped.
    /// Lifts of fingers already in contact still run, as cancellations, so
    /// their recognizers and responders see the touch end.
    pub fn handle_batch<T: ViewHierarchy + ?Sized>(
        &mut self,
        tree: &mut T,
        samples: &[RawSample],
    ) -> TouchResult<DispatchSummary> {
        let _span = tracing::trace_span!(target: targets::WINDOW, span_names::DISPATCH, samples = samples.len()).entered();

        if !self.is_ignoring_interaction_events() {
            return self.run_cycle(tree, EventKind::Touches, |event, tree| {
                for sample in samples {
                    event.apply_sample(sample, tree);
                }
            });
        }

        let lifts: Vec<RawSample> = samples
            .iter()
            .filter(|sample| matches!(sample.action, PointerAction::Up | PointerAction::Cancel))
            .filter(|sample| {
                self.event
                    .touch_for_pointer(sample.pointer_id)
                    .is_some_and(|touch| touch.phase().is_active())
            })
            .map(|sample| RawSample {
                action: PointerAction::Cancel,
                ..sample.clone()
            })
            .collect();
        let dropped = lifts.len() < samples.len();
        tracing::trace!(
            target: targets::WINDOW,
            samples = samples.len(),
            lifts = lifts.len(),
            "input ignored"
        );

        if lifts.is_empty() {
            return Ok(DispatchSummary {
                dropped,
                deliveries: Vec::new(),
            });
        }
        let summary = self.run_cycle(tree, EventKind::Touches, |event, tree| {
            for sample in &lifts {
                event.apply_sample(sample, tree);
            }
        })?;
        Ok(DispatchSummary { dropped, ..summary })
    }

    /// Dispatch every queued sample, one cycle each. Returns the number of
    /// samples taken from the queue.
    pub fn drain_input<T: ViewHierarchy + ?Sized>(
        &mut self,
        tree: &mut T,
        input: &InputReceiver,
    ) -> TouchResult<usize> {
        let samples = input.drain();
        for sample in &samples {
            self.handle_sample(tree, sample)?;
        }
        Ok(samples.len())
    }

    /// Cancel every touch in contact, as for a system interruption.
    pub fn cancel_all_touches<T: ViewHierarchy + ?Sized>(
        &mut self,
        tree: &mut T,
        timestamp: Timestamp,
    ) -> TouchResult<DispatchSummary> {
        self.run_cycle(tree, EventKind::System, |event, _| event.cancel_all(timestamp))
    }

    /// Fire every timer due at `now`. Returns the number delivered.
    ///
    /// Timers whose recognizer was removed or reset since they were started
    /// are dropped.
    pub fn process_timers(&mut self, now: Timestamp) -> TouchResult<usize> {
        let _span = tracing::trace_span!(target: targets::WINDOW, span_names::TIMER, %now).entered();
        let mut delivered = 0;
        let mut fault = None;

        for fired in self.timers.process_expired(now) {
            let TimerPayload { recognizer: id, generation } = fired.payload;
            let Some(recognizer) = self.registry.get_mut(id) else {
                continue;
            };
            if recognizer.core().generation() != generation || !recognizer.core().is_enabled() {
                tracing::trace!(target: targets::WINDOW, ?id, timer = ?fired.id, "stale recognizer timer dropped");
                continue;
            }

            let before = recognizer.state();
            let mut cx = GestureContext::new(id, generation, now, &mut self.timers);
            let result = recognizer.timer_fired(fired.id, &mut cx);
            let after = recognizer.state();
            delivered += 1;

            if let Err(err) = result {
                fault.get_or_insert(err);
            }
            if let Err(err) = self.after_evaluation(id, before, after) {
                fault.get_or_insert(err);
            }
        }

        match fault {
            Some(err) => Err(self.fault(err)),
            None => Ok(delivered),
        }
    }

    /// Time until the next recognizer timer is due.
    pub fn time_until_next_timer(&mut self, now: Timestamp) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    /// Number of pending recognizer timers.
    pub fn pending_timer_count(&self) -> usize {
        self.timers.active_count()
    }

    /// Tell the window that `view` left the hierarchy.
    ///
    /// Its touches lose their owning view, its recognizers are detached and
    /// reset, and it loses first-responder status. Call once per removed
    /// view.
    pub fn view_removed(&mut self, view: ViewId) {
        let touches = self.event.detach_view(view);
        let recognizers = self.registry.detach_view(view);
        for &id in &recognizers {
            self.event.forget_recognizer(id);
            self.reset_recognizer(id);
        }
        self.first_responder.forget(ResponderId::View(view));
        tracing::debug!(
            target: targets::WINDOW,
            ?view,
            touches,
            recognizers = recognizers.len(),
            "view removed"
        );
    }

    // =========================================================================
    // First responder
    // =========================================================================

    /// Get the current first responder.
    pub fn first_responder(&self) -> Option<ResponderId> {
        self.first_responder.current()
    }

    /// Make `id` the first responder. See
    /// [`FirstResponder::become_first_responder`].
    pub fn become_first_responder<S: ResponderAccess + ?Sized>(&mut self, storage: &mut S, id: ResponderId) -> bool {
        self.first_responder.become_first_responder(storage, id)
    }

    /// Resign the current first responder.
    pub fn resign_first_responder<S: ResponderAccess + ?Sized>(&mut self, storage: &mut S) -> bool {
        self.first_responder.resign_first_responder(storage)
    }

    // =========================================================================
    // Cycle internals
    // =========================================================================

    fn run_cycle<T, F>(&mut self, tree: &mut T, kind: EventKind, apply: F) -> TouchResult<DispatchSummary>
    where
        T: ViewHierarchy + ?Sized,
        F: FnOnce(&mut Event, &T),
    {
        self.event.begin_cycle(kind);
        apply(&mut self.event, &*tree);
        self.sweep_removed_views(&*tree);

        self.collect_recognizers(&*tree);
        let fault = self.run_recognizers();
        let deliveries = self.deliver(tree);
        self.finish_cycle();

        match fault {
            Some(err) => Err(self.fault(err)),
            None => Ok(DispatchSummary {
                dropped: false,
                deliveries,
            }),
        }
    }

    /// Treat views owning touches that have left the hierarchy as removed.
    fn sweep_removed_views<T: ViewHierarchy + ?Sized>(&mut self, tree: &T) {
        let mut gone: Vec<ViewId> = Vec::new();
        for touch in self.event.all_touches() {
            if let Some(view) = touch.view()
                && !gone.contains(&view)
                && !tree.contains_view(view)
            {
                gone.push(view);
            }
        }
        for view in gone {
            tracing::debug!(target: targets::WINDOW, ?view, "touch view left the hierarchy");
            self.view_removed(view);
        }
    }

    /// Record the recognizers of every touch that began this cycle.
    fn collect_recognizers<T: ViewHierarchy + ?Sized>(&mut self, tree: &T) {
        let began: Vec<TouchId> = self
            .event
            .touches()
            .filter(|touch| touch.phase() == TouchPhase::Began)
            .map(Touch::id)
            .collect();

        for id in began {
            let recognizers = match self.event.touch(id) {
                Some(touch) => match touch.view() {
                    Some(view) => self
                        .registry
                        .collect_for(tree, view)
                        .into_iter()
                        .filter(|&r| {
                            self.registry.get(r).is_some_and(|recognizer| {
                                recognizer.core().is_enabled() && gesture::should_receive_touch(recognizer, touch)
                            })
                        })
                        .collect(),
                    None => Vec::new(),
                },
                None => continue,
            };
            if let Some(touch) = self.event.touch_mut(id) {
                touch.set_gesture_recognizers(recognizers);
            }
        }
    }

    fn run_recognizers(&mut self) -> Option<TouchError> {
        let mut order: Vec<RecognizerId> = Vec::new();
        for touch in self.event.touches() {
            for &id in touch.gesture_recognizers() {
                if !order.contains(&id) {
                    order.push(id);
                }
            }
        }

        let now = self.event.timestamp();
        let mut fault = None;
        for id in order {
            let (result, before, after) = {
                let Some(recognizer) = self.registry.get_mut(id) else {
                    continue;
                };
                let touches: Vec<&Touch> = self
                    .event
                    .touches()
                    .filter(|touch| touch.gesture_recognizers().contains(&id))
                    .collect();

                let before = recognizer.state();
                let mut cx = GestureContext::new(id, recognizer.core().generation(), now, &mut self.timers);
                let result = recognizer.recognize(&touches, &self.event, &mut cx);
                (result, before, recognizer.state())
            };

            if let Err(err) = result {
                fault.get_or_insert(err);
            }
            if let Err(err) = self.after_evaluation(id, before, after) {
                fault.get_or_insert(err);
            }
        }
        fault
    }

    fn after_evaluation(&mut self, id: RecognizerId, before: GestureState, after: GestureState) -> TouchResult<()> {
        let recognized = before == GestureState::Possible && matches!(after, GestureState::Began | GestureState::Ended);
        if recognized && self.config.arbitration == ArbitrationPolicy::Exclusive {
            return self.arbitrate(id);
        }
        Ok(())
    }

    /// Fail still-possible recognizers sharing a touch with `winner`.
    fn arbitrate(&mut self, winner: RecognizerId) -> TouchResult<()> {
        let Some(recognizer) = self.registry.get(winner) else {
            return Ok(());
        };

        let mut rivals: Vec<RecognizerId> = Vec::new();
        for touch in self.event.touches_for_recognizer(winner) {
            for &other in touch.gesture_recognizers() {
                if other != winner && !rivals.contains(&other) {
                    rivals.push(other);
                }
            }
        }
        rivals.retain(|&other| {
            self.registry.get(other).is_some_and(|rival| {
                rival.state() == GestureState::Possible && gesture::prevents(recognizer, rival)
            })
        });

        for loser in rivals {
            self.timers.cancel_where(|payload| payload.recognizer == loser);
            if let Some(rival) = self.registry.get_mut(loser) {
                tracing::debug!(target: targets::WINDOW, ?winner, ?loser, "recognizer prevented");
                set_state(rival, GestureState::Failed)?;
            }
        }
        Ok(())
    }

    fn deliver<T: ViewHierarchy + ?Sized>(&self, tree: &mut T) -> Vec<Delivery> {
        group_touches(&self.event)
            .into_iter()
            .map(|group| {
                let touches: Vec<&Touch> = group.touches.iter().filter_map(|&id| self.event.touch(id)).collect();
                let result =
                    ResponderChain::deliver(tree, ResponderId::View(group.view), group.phase, &touches, &self.event);
                tracing::trace!(target: targets::WINDOW, phase = ?group.phase, view = ?group.view, ?result, "touches delivered");
                Delivery { group, result }
            })
            .collect()
    }

    /// Reset recognizers whose touches have all lifted, then close the cycle.
    fn finish_cycle(&mut self) {
        let due: Vec<RecognizerId> = self
            .registry
            .ids()
            .into_iter()
            .filter(|&id| {
                self.registry.get(id).is_some_and(|recognizer| {
                    let core = recognizer.core();
                    let touched = core.is_reset_pending()
                        || (core.state() == GestureState::Possible && !core.tracked_touches().is_empty());
                    touched
                        && self
                            .event
                            .touches_for_recognizer(id)
                            .iter()
                            .all(|touch| !touch.phase().is_active())
                })
            })
            .collect();

        for id in due {
            self.reset_recognizer(id);
        }
        self.event.end_cycle();
    }

    fn reset_recognizer(&mut self, id: RecognizerId) {
        self.timers.cancel_where(|payload| payload.recognizer == id);
        if let Some(recognizer) = self.registry.get_mut(id) {
            recognizer.reset();
            recognizer.core_mut().reset();
            tracing::trace!(target: targets::GESTURE, ?id, "recognizer reset");
        }
    }

    fn fault(&self, err: TouchError) -> TouchError {
        tracing::error!(target: targets::WINDOW, error = %err, "touch engine fault");
        if self.config.panic_on_fault {
            panic!("touch engine fault: {err}");
        }
        err
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(TouchConfig::default())
    }
}
