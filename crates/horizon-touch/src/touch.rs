//! Touch identity.
//!
//! A [`Touch`] is the engine's record of one finger. The same record is
//! reused for every sample of that finger's contact, and for a later
//! contact by the same platform pointer while the touch session lasts, so
//! recognizers and responders can compare touches by [`TouchId`].

use slotmap::new_key_type;

use horizon_touch_core::{Point, Timestamp, Vector};

use crate::error::{TouchError, TouchResult};
use crate::gesture::RecognizerId;
use crate::view::{ViewHierarchy, ViewId};

new_key_type! {
    /// A stable identifier for a tracked touch.
    pub struct TouchId;
}

/// The platform's pointer identifier for a finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl From<u64> for PointerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The phase of a touch within the current dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// The finger touched down.
    Began,
    /// The finger moved.
    Moved,
    /// The finger is down but did not change this cycle.
    Stationary,
    /// The finger lifted.
    Ended,
    /// The system cancelled the touch.
    Cancelled,
}

impl TouchPhase {
    /// Check whether the finger is still in contact.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Moved | Self::Stationary)
    }

    /// Check whether the contact is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// One finger's contact.
#[derive(Debug, Clone)]
pub struct Touch {
    id: TouchId,
    pointer_id: PointerId,
    location: Point,
    previous_location: Point,
    delta: Vector,
    phase: TouchPhase,
    tap_count: u32,
    timestamp: Timestamp,
    view: Option<ViewId>,
    detached: bool,
    rotation: f32,
    magnification: f32,
    gesture_recognizers: Vec<RecognizerId>,
}

impl Touch {
    pub(crate) fn new(id: TouchId, pointer_id: PointerId) -> Self {
        Self {
            id,
            pointer_id,
            location: Point::ZERO,
            previous_location: Point::ZERO,
            delta: Vector::ZERO,
            phase: TouchPhase::Began,
            tap_count: 1,
            timestamp: Timestamp::ZERO,
            view: None,
            detached: false,
            rotation: 0.0,
            magnification: 0.0,
            gesture_recognizers: Vec::new(),
        }
    }

    /// Get the touch ID.
    pub fn id(&self) -> TouchId {
        self.id
    }

    /// Get the platform pointer ID this touch tracks.
    pub fn pointer_id(&self) -> PointerId {
        self.pointer_id
    }

    /// Current location in window coordinates.
    pub fn location(&self) -> Point {
        self.location
    }

    /// Location before the most recent movement, in window coordinates.
    pub fn previous_location(&self) -> Point {
        self.previous_location
    }

    /// Movement since the previous sample.
    pub fn delta(&self) -> Vector {
        self.delta
    }

    /// Current location in a view's coordinates.
    pub fn location_in<T: ViewHierarchy + ?Sized>(&self, tree: &T, view: ViewId) -> Point {
        tree.convert_from_window(view, self.location)
    }

    /// Previous location in a view's coordinates.
    pub fn previous_location_in<T: ViewHierarchy + ?Sized>(&self, tree: &T, view: ViewId) -> Point {
        tree.convert_from_window(view, self.previous_location)
    }

    /// Phase in the current cycle.
    pub fn phase(&self) -> TouchPhase {
        self.phase
    }

    /// Number of consecutive taps this contact completes, starting at 1.
    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }

    /// Timestamp of the latest sample that changed this touch.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The view the touch was hit-tested to on touch-down.
    ///
    /// `None` if nothing was hit or the view has since been detached.
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    /// The view that owns this touch.
    pub fn owning_view(&self) -> TouchResult<ViewId> {
        match self.view {
            Some(view) => Ok(view),
            None if self.detached => Err(TouchError::ViewDetached),
            None => Err(TouchError::NoTarget),
        }
    }

    /// Angle change, in radians, of the line to the other finger of a
    /// two-finger contact since the previous sample.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Relative change in distance to the other finger of a two-finger
    /// contact since the previous sample. `0.0` means no change.
    pub fn magnification(&self) -> f32 {
        self.magnification
    }

    /// Recognizers collected from the owning view and its ancestors when the
    /// touch began.
    pub fn gesture_recognizers(&self) -> &[RecognizerId] {
        &self.gesture_recognizers
    }

    pub(crate) fn begin(
        &mut self,
        location: Point,
        timestamp: Timestamp,
        tap_count: u32,
        view: Option<ViewId>,
    ) {
        self.location = location;
        self.previous_location = location;
        self.delta = Vector::ZERO;
        self.phase = TouchPhase::Began;
        self.tap_count = tap_count;
        self.timestamp = timestamp;
        self.view = view;
        self.detached = false;
        self.rotation = 0.0;
        self.magnification = 0.0;
        self.gesture_recognizers.clear();
    }

    /// Record a new location. Returns `false` if the location is unchanged.
    pub(crate) fn move_to(&mut self, location: Point, timestamp: Timestamp) -> bool {
        if location == self.location {
            return false;
        }
        self.previous_location = self.location;
        self.location = location;
        self.delta = location - self.previous_location;
        self.timestamp = timestamp;
        true
    }

    pub(crate) fn set_phase(&mut self, phase: TouchPhase) {
        if phase == TouchPhase::Stationary {
            self.delta = Vector::ZERO;
        }
        self.phase = phase;
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    pub(crate) fn set_pair_metrics(&mut self, rotation: f32, magnification: f32) {
        self.rotation = rotation;
        self.magnification = magnification;
    }

    pub(crate) fn set_gesture_recognizers(&mut self, recognizers: Vec<RecognizerId>) {
        self.gesture_recognizers = recognizers;
    }

    pub(crate) fn remove_gesture_recognizer(&mut self, recognizer: RecognizerId) {
        self.gesture_recognizers.retain(|&r| r != recognizer);
    }

    /// Drop the owning view after its contact ended.
    pub(crate) fn clear_view(&mut self) {
        self.view = None;
    }

    /// Drop the owning view because it left the hierarchy.
    pub(crate) fn detach_view(&mut self) {
        self.view = None;
        self.detached = true;
    }
}
