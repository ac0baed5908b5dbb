//! Touch events and identity tracking.
//!
//! A window owns a single [`Event`] that lives for as long as any finger is
//! in contact (a touch session). Each dispatch cycle applies raw samples to
//! it:
//!
//! - a pointer touching down gets a [`Touch`], reused if the same pointer
//!   already has one in this session, and is hit-tested to its owning view
//! - moves update every finger whose coordinates changed and mark the rest
//!   [`TouchPhase::Stationary`]
//! - lifts and cancels mark the finger terminal
//!
//! [`Event::end_cycle`] runs after delivery: fingers that lifted are swept
//! from the active set, and once none remain the whole session is purged.

use std::collections::HashMap;
use std::time::Duration;

use slotmap::SlotMap;

use horizon_touch_core::logging::targets;
use horizon_touch_core::{Point, Timestamp};

use crate::config::TouchConfig;
use crate::gesture::RecognizerId;
use crate::input::{PointerAction, RawSample};
use crate::touch::{PointerId, Touch, TouchId, TouchPhase};
use crate::view::{ViewHierarchy, ViewId};

/// What produced the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventKind {
    /// Platform touch samples.
    #[default]
    Touches,
    /// A system interruption that cancelled every touch.
    System,
}

#[derive(Debug, Clone, Copy)]
struct TapRecord {
    location: Point,
    timestamp: Timestamp,
    tap_count: u32,
}

/// The touch event of a window.
#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    timestamp: Timestamp,
    touches: SlotMap<TouchId, Touch>,
    /// Platform pointer to touch, for the lifetime of the session.
    identities: HashMap<PointerId, TouchId>,
    /// Touches in contact or lifted this cycle, in touch-down order.
    active: Vec<TouchId>,
    /// Touches changed by the current cycle, in change order.
    current: Vec<TouchId>,
    last_tap: Option<TapRecord>,
    multi_tap_interval: Duration,
    multi_tap_slop: f32,
}

impl Event {
    /// Create an empty event.
    pub fn new(config: &TouchConfig) -> Self {
        Self {
            kind: EventKind::Touches,
            timestamp: Timestamp::ZERO,
            touches: SlotMap::with_key(),
            identities: HashMap::new(),
            active: Vec::new(),
            current: Vec::new(),
            last_tap: None,
            multi_tap_interval: config.multi_tap_interval,
            multi_tap_slop: config.multi_tap_slop,
        }
    }

    /// What produced the current cycle.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Timestamp of the latest applied sample.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Check whether any finger is in contact.
    pub fn is_session_active(&self) -> bool {
        self.active_touches().next().is_some()
    }

    /// Get a touch by ID.
    pub fn touch(&self, id: TouchId) -> Option<&Touch> {
        self.touches.get(id)
    }

    /// The touches changed by the current cycle, in change order.
    pub fn touches(&self) -> impl Iterator<Item = &Touch> + '_ {
        self.current.iter().filter_map(|&id| self.touches.get(id))
    }

    /// IDs of the touches changed by the current cycle.
    pub fn touch_ids(&self) -> &[TouchId] {
        &self.current
    }

    /// Every touch in the window, in touch-down order.
    pub fn all_touches(&self) -> impl Iterator<Item = &Touch> + '_ {
        self.active.iter().filter_map(|&id| self.touches.get(id))
    }

    /// Touches whose finger is still in contact.
    pub fn active_touches(&self) -> impl Iterator<Item = &Touch> + '_ {
        self.all_touches().filter(|touch| touch.phase().is_active())
    }

    /// Touches owned by `view`.
    pub fn touches_for_view(&self, view: ViewId) -> Vec<&Touch> {
        self.all_touches()
            .filter(|touch| touch.view() == Some(view))
            .collect()
    }

    /// Touches that will be delivered to `recognizer`.
    pub fn touches_for_recognizer(&self, recognizer: RecognizerId) -> Vec<&Touch> {
        self.all_touches()
            .filter(|touch| touch.gesture_recognizers().contains(&recognizer))
            .collect()
    }

    /// Find the touch tracking a platform pointer.
    pub fn touch_for_pointer(&self, pointer: PointerId) -> Option<&Touch> {
        self.identities
            .get(&pointer)
            .and_then(|&id| self.touches.get(id))
    }

    pub(crate) fn touch_mut(&mut self, id: TouchId) -> Option<&mut Touch> {
        self.touches.get_mut(id)
    }

    /// Start a dispatch cycle.
    pub(crate) fn begin_cycle(&mut self, kind: EventKind) {
        self.kind = kind;
        self.current.clear();
    }

    /// Apply one sample. Returns the touch the sample's action applied to.
    pub(crate) fn apply_sample<T: ViewHierarchy + ?Sized>(
        &mut self,
        sample: &RawSample,
        tree: &T,
    ) -> Option<TouchId> {
        self.timestamp = sample.timestamp;
        match sample.action {
            PointerAction::Down => self.touch_down(sample, tree),
            PointerAction::Move => {
                self.touch_moved(sample, tree);
                None
            }
            PointerAction::Up => self.touch_lifted(sample, tree, TouchPhase::Ended),
            PointerAction::Cancel => self.touch_lifted(sample, tree, TouchPhase::Cancelled),
        }
    }

    /// Cancel every finger in contact.
    pub(crate) fn cancel_all(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
        for &id in &self.active {
            if let Some(touch) = self.touches.get_mut(id)
                && touch.phase().is_active()
            {
                touch.set_phase(TouchPhase::Cancelled);
                touch.set_timestamp(timestamp);
                if !self.current.contains(&id) {
                    self.current.push(id);
                }
            }
        }
    }

    /// Finish a dispatch cycle.
    pub(crate) fn end_cycle(&mut self) {
        self.current.clear();

        if !self.is_session_active() {
            if !self.touches.is_empty() {
                tracing::debug!(target: targets::EVENT, touches = self.touches.len(), "touch session ended");
            }
            self.touches.clear();
            self.identities.clear();
            self.active.clear();
            return;
        }

        let touches = &mut self.touches;
        self.active.retain(|&id| match touches.get_mut(id) {
            Some(touch) if touch.phase().is_terminal() => {
                touch.clear_view();
                false
            }
            Some(_) => true,
            None => false,
        });
    }

    /// Detach every touch owned by a view that left the hierarchy.
    pub(crate) fn detach_view(&mut self, view: ViewId) -> usize {
        let mut detached = 0;
        for touch in self.touches.values_mut() {
            if touch.view() == Some(view) {
                touch.detach_view();
                detached += 1;
            }
        }
        detached
    }

    /// Stop delivering touches to a removed recognizer.
    pub(crate) fn forget_recognizer(&mut self, recognizer: RecognizerId) {
        for touch in self.touches.values_mut() {
            touch.remove_gesture_recognizer(recognizer);
        }
    }

    fn touch_down<T: ViewHierarchy + ?Sized>(&mut self, sample: &RawSample, tree: &T) -> Option<TouchId> {
        let pointer = sample.pointer_id;
        let Some(raw) = sample.position_of(pointer) else {
            tracing::warn!(target: targets::EVENT, ?pointer, "touch-down without a position");
            return None;
        };
        let location = resolve_location(sample, raw, tree);

        let existing = self
            .identities
            .get(&pointer)
            .copied()
            .filter(|&id| self.touches.contains_key(id));
        let id = match existing {
            Some(id) => {
                if self.touches[id].phase().is_active() {
                    tracing::warn!(target: targets::EVENT, ?pointer, "touch-down for a finger already in contact");
                }
                id
            }
            None => {
                let id = self.touches.insert_with_key(|id| Touch::new(id, pointer));
                self.identities.insert(pointer, id);
                id
            }
        };

        let tap_count = self.next_tap_count(location, sample.timestamp);
        let view = tree.hit_test(location);
        if let Some(touch) = self.touches.get_mut(id) {
            touch.begin(location, sample.timestamp, tap_count, view);
        }
        tracing::trace!(target: targets::EVENT, ?pointer, ?id, ?view, tap_count, "touch began");

        if !self.active.contains(&id) {
            self.active.push(id);
        }
        self.mark_changed(id);
        self.settle_others();
        Some(id)
    }

    fn touch_moved<T: ViewHierarchy + ?Sized>(&mut self, sample: &RawSample, tree: &T) {
        for pointer in &sample.pointers {
            if !self.identities.contains_key(&pointer.id) {
                tracing::warn!(target: targets::EVENT, pointer = ?pointer.id, "move for unknown pointer ignored");
            }
        }

        let mut moved = Vec::new();
        for &id in &self.active {
            let Some(touch) = self.touches.get_mut(id) else {
                continue;
            };
            if !touch.phase().is_active() {
                continue;
            }

            let changed = match sample.position_of(touch.pointer_id()) {
                Some(raw) => touch.move_to(resolve_location(sample, raw, tree), sample.timestamp),
                None => false,
            };

            if changed {
                if touch.phase() != TouchPhase::Began || !self.current.contains(&id) {
                    touch.set_phase(TouchPhase::Moved);
                }
                moved.push(id);
            } else if !self.current.contains(&id) {
                touch.set_phase(TouchPhase::Stationary);
            }
        }

        for id in moved {
            self.mark_changed(id);
        }
        self.update_pair_metrics();
    }

    fn touch_lifted<T: ViewHierarchy + ?Sized>(
        &mut self,
        sample: &RawSample,
        tree: &T,
        phase: TouchPhase,
    ) -> Option<TouchId> {
        let pointer = sample.pointer_id;
        let id = self.identities.get(&pointer).copied()?;
        let Some(touch) = self.touches.get_mut(id) else {
            return None;
        };
        if !touch.phase().is_active() {
            tracing::warn!(target: targets::EVENT, ?pointer, ?phase, "lift for a finger not in contact");
            return None;
        }

        if let Some(raw) = sample.position_of(pointer) {
            touch.move_to(resolve_location(sample, raw, tree), sample.timestamp);
        }
        touch.set_phase(phase);
        touch.set_timestamp(sample.timestamp);

        if phase == TouchPhase::Ended {
            self.last_tap = Some(TapRecord {
                location: touch.location(),
                timestamp: sample.timestamp,
                tap_count: touch.tap_count(),
            });
        }
        tracing::trace!(target: targets::EVENT, ?pointer, ?id, ?phase, "touch lifted");

        self.mark_changed(id);
        self.settle_others();
        Some(id)
    }

    fn mark_changed(&mut self, id: TouchId) {
        if !self.current.contains(&id) {
            self.current.push(id);
        }
    }

    /// Mark began or moved fingers outside this cycle's changes stationary.
    fn settle_others(&mut self) {
        for &id in &self.active {
            if self.current.contains(&id) {
                continue;
            }
            if let Some(touch) = self.touches.get_mut(id)
                && matches!(touch.phase(), TouchPhase::Began | TouchPhase::Moved)
            {
                touch.set_phase(TouchPhase::Stationary);
            }
        }
    }

    fn next_tap_count(&self, location: Point, timestamp: Timestamp) -> u32 {
        match self.last_tap {
            Some(tap)
                if timestamp.saturating_since(tap.timestamp) <= self.multi_tap_interval
                    && tap.location.distance_to(location) <= self.multi_tap_slop =>
            {
                tap.tap_count + 1
            }
            _ => 1,
        }
    }

    /// Rotation and magnification for two-finger contacts.
    fn update_pair_metrics(&mut self) {
        let pair: Vec<TouchId> = self
            .active
            .iter()
            .copied()
            .filter(|&id| self.touches.get(id).is_some_and(|t| t.phase().is_active()))
            .collect();

        let (rotation, magnification) = match pair.as_slice() {
            [a, b] => {
                let (a, b) = (&self.touches[*a], &self.touches[*b]);
                let before = (sample_origin(a) - sample_origin(b)).to_vec2();
                let after = (a.location() - b.location()).to_vec2();
                if before.length() > 0.0 && after.length() > 0.0 {
                    (
                        before.perp_dot(after).atan2(before.dot(after)),
                        after.length() / before.length() - 1.0,
                    )
                } else {
                    (0.0, 0.0)
                }
            }
            _ => (0.0, 0.0),
        };

        for id in pair {
            if let Some(touch) = self.touches.get_mut(id) {
                touch.set_pair_metrics(rotation, magnification);
            }
        }
    }
}

/// Where a touch was before this cycle's movement.
fn sample_origin(touch: &Touch) -> Point {
    if touch.phase() == TouchPhase::Moved {
        touch.previous_location()
    } else {
        touch.location()
    }
}

/// Convert a raw position to logical window coordinates.
///
/// Re-bases from the platform widget's origin onto the window surface's
/// origin, then divides by the window's scale factor.
pub(crate) fn resolve_location<T: ViewHierarchy + ?Sized>(sample: &RawSample, raw: Point, tree: &T) -> Point {
    let offset = sample.widget_origin - tree.surface_origin();
    (raw + offset).unscaled(tree.scale_factor())
}
