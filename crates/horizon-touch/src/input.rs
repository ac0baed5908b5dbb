//! Raw touch input.
//!
//! Platforms deliver touch input as [`RawSample`]s: one pointer action plus
//! the current positions of every pointer in contact, in physical pixels
//! relative to the platform widget that received them. The engine converts
//! samples to logical window coordinates during dispatch.
//!
//! [`WinitTouchAdapter`] builds samples from winit touch events, and
//! [`input_queue`] hands samples from a platform input thread to the UI
//! loop.
//!
//! # Example
//!
//! ```
//! use horizon_touch::input::{PointerAction, RawSample, input_queue};
//! use horizon_touch::{PointerId, Timestamp};
//!
//! let (sender, receiver) = input_queue();
//! let sample = RawSample::new(PointerAction::Down, PointerId(1), Timestamp::ZERO)
//!     .with_pointer(PointerId(1), 40.0, 80.0);
//!
//! assert!(sender.send(sample));
//! assert_eq!(receiver.drain().len(), 1);
//! ```

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use winit::event::{Touch as WinitTouch, TouchPhase as WinitTouchPhase};

use horizon_touch_core::logging::targets;
use horizon_touch_core::{Point, Timestamp};

use crate::touch::PointerId;

/// Default capacity of the platform-to-UI input queue.
const DEFAULT_INPUT_QUEUE_CAPACITY: usize = 256;

/// The action a raw sample reports for its pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    /// A finger touched down.
    Down,
    /// One or more fingers moved.
    Move,
    /// A finger lifted.
    Up,
    /// The platform cancelled the pointer.
    Cancel,
}

/// A pointer position inside a [`RawSample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointer {
    /// Platform pointer ID.
    pub id: PointerId,
    /// Position in physical pixels, relative to the platform widget.
    pub position: Point,
}

/// One platform touch sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// The pointer the action applies to. Ignored for [`PointerAction::Move`].
    pub pointer_id: PointerId,
    /// What happened.
    pub action: PointerAction,
    /// Platform monotonic time of the sample.
    pub timestamp: Timestamp,
    /// Positions of every pointer in contact.
    pub pointers: Vec<RawPointer>,
    /// Screen position of the platform widget, in physical pixels.
    pub widget_origin: Point,
}

impl RawSample {
    /// Create a sample with no pointer positions.
    pub fn new(action: PointerAction, pointer_id: PointerId, timestamp: Timestamp) -> Self {
        Self {
            pointer_id,
            action,
            timestamp,
            pointers: Vec::new(),
            widget_origin: Point::ZERO,
        }
    }

    /// Add a pointer position.
    pub fn with_pointer(mut self, id: PointerId, x: f32, y: f32) -> Self {
        self.pointers.push(RawPointer {
            id,
            position: Point::new(x, y),
        });
        self
    }

    /// Set the platform widget's screen origin.
    pub fn with_widget_origin(mut self, origin: Point) -> Self {
        self.widget_origin = origin;
        self
    }

    /// Find the raw position of a pointer.
    pub fn position_of(&self, id: PointerId) -> Option<Point> {
        self.pointers
            .iter()
            .find(|pointer| pointer.id == id)
            .map(|pointer| pointer.position)
    }
}

/// Converts a winit touch phase to a pointer action.
pub fn from_winit_touch_phase(phase: WinitTouchPhase) -> PointerAction {
    match phase {
        WinitTouchPhase::Started => PointerAction::Down,
        WinitTouchPhase::Moved => PointerAction::Move,
        WinitTouchPhase::Ended => PointerAction::Up,
        WinitTouchPhase::Cancelled => PointerAction::Cancel,
    }
}

/// Builds [`RawSample`]s from winit touch events.
///
/// winit reports one finger per event, while samples carry every finger in
/// contact. The adapter remembers each active finger's last position and
/// fills them in.
#[derive(Debug, Default)]
pub struct WinitTouchAdapter {
    /// Active fingers in touch-down order.
    active: Vec<RawPointer>,
    widget_origin: Point,
}

impl WinitTouchAdapter {
    /// Create an adapter for a widget at the screen origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the widget's screen origin, in physical pixels.
    pub fn set_widget_origin(&mut self, origin: Point) {
        self.widget_origin = origin;
    }

    /// Get the number of fingers in contact.
    pub fn active_touch_count(&self) -> usize {
        self.active.len()
    }

    /// Handles a touch event from winit.
    pub fn handle_touch(&mut self, touch: &WinitTouch, timestamp: Timestamp) -> RawSample {
        let action = from_winit_touch_phase(touch.phase);
        let id = PointerId(touch.id);
        let position = Point::new(touch.location.x as f32, touch.location.y as f32);

        match action {
            PointerAction::Down => {
                self.active.retain(|pointer| pointer.id != id);
                self.active.push(RawPointer { id, position });
            }
            PointerAction::Move | PointerAction::Up | PointerAction::Cancel => {
                match self.active.iter_mut().find(|pointer| pointer.id == id) {
                    Some(pointer) => pointer.position = position,
                    None => {
                        tracing::warn!(target: targets::INPUT, ?id, ?action, "winit touch for unknown finger");
                    }
                }
            }
        }

        let sample = RawSample {
            pointer_id: id,
            action,
            timestamp,
            pointers: self.active.clone(),
            widget_origin: self.widget_origin,
        };

        if matches!(action, PointerAction::Up | PointerAction::Cancel) {
            self.active.retain(|pointer| pointer.id != id);
        }

        sample
    }

    /// Forget all fingers.
    pub fn reset(&mut self) {
        self.active.clear();
    }
}

/// Create a bounded queue for handing samples to the UI loop.
pub fn input_queue() -> (InputSender, InputReceiver) {
    input_queue_with_capacity(DEFAULT_INPUT_QUEUE_CAPACITY)
}

/// Create an input queue with a specific capacity.
pub fn input_queue_with_capacity(capacity: usize) -> (InputSender, InputReceiver) {
    let (sender, receiver) = bounded(capacity);
    (InputSender { sender }, InputReceiver { receiver })
}

/// The platform-thread end of an input queue.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<RawSample>,
}

impl InputSender {
    /// Queue a sample for the UI loop.
    ///
    /// Returns `false` if the queue is full or the UI end has been dropped.
    pub fn send(&self, sample: RawSample) -> bool {
        match self.sender.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(sample)) => {
                tracing::warn!(target: targets::INPUT, action = ?sample.action, "input queue full, sample dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// The UI-loop end of an input queue.
#[derive(Debug)]
pub struct InputReceiver {
    receiver: Receiver<RawSample>,
}

impl InputReceiver {
    /// Take every queued sample without blocking.
    pub fn drain(&self) -> Vec<RawSample> {
        self.receiver.try_iter().collect()
    }

    /// Wait up to `timeout` for the next sample.
    ///
    /// Returns `None` on timeout or once every sender is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RawSample> {
        match self.receiver.recv_timeout(timeout) {
            Ok(sample) => Some(sample),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!(target: targets::INPUT, "input queue disconnected");
                None
            }
        }
    }

    /// Get the number of queued samples.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if no samples are queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

static_assertions::assert_impl_all!(RawSample: Send, Sync);
static_assertions::assert_impl_all!(InputSender: Send, Sync, Clone);
static_assertions::assert_impl_all!(InputReceiver: Send);
