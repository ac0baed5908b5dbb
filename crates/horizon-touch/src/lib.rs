//! Horizon Touch - touch identity tracking, responder-chain dispatch and
//! gesture recognition.
//!
//! A [`Window`] receives raw platform samples, keeps one stable [`Touch`]
//! per finger, evaluates the [`GestureRecognizer`]s attached to the touched
//! view and its ancestors, and delivers grouped touch callbacks through the
//! [`Responder`] chain. The view tree itself stays with the host, behind
//! [`ViewHierarchy`].
//!
//! # Example
//!
//! ```
//! use horizon_touch::prelude::*;
//! use horizon_touch::input::{PointerAction, RawSample};
//! use slotmap::SlotMap;
//!
//! struct Canvas;
//! impl Responder for Canvas {}
//!
//! struct Tree {
//!     views: SlotMap<ViewId, Canvas>,
//!     root: ViewId,
//! }
//!
//! impl ResponderAccess for Tree {
//!     fn responder(&self, id: ResponderId) -> Option<&dyn Responder> {
//!         match id {
//!             ResponderId::View(v) => self.views.get(v).map(|c| c as &dyn Responder),
//!             ResponderId::Controller(_) => None,
//!         }
//!     }
//!     fn responder_mut(&mut self, id: ResponderId) -> Option<&mut dyn Responder> {
//!         match id {
//!             ResponderId::View(v) => self.views.get_mut(v).map(|c| c as &mut dyn Responder),
//!             ResponderId::Controller(_) => None,
//!         }
//!     }
//! }
//!
//! impl ViewHierarchy for Tree {
//!     fn hit_test(&self, _point: Point) -> Option<ViewId> {
//!         Some(self.root)
//!     }
//!     fn superview(&self, _view: ViewId) -> Option<ViewId> {
//!         None
//!     }
//!     fn contains_view(&self, view: ViewId) -> bool {
//!         self.views.contains_key(view)
//!     }
//! }
//!
//! let mut views = SlotMap::with_key();
//! let root = views.insert(Canvas);
//! let mut tree = Tree { views, root };
//!
//! let mut window = Window::new(TouchConfig::default());
//! let tap = window.add_gesture_recognizer(root, TapGestureRecognizer::new());
//!
//! let down = RawSample::new(PointerAction::Down, PointerId(1), Timestamp::ZERO)
//!     .with_pointer(PointerId(1), 20.0, 20.0);
//! let up = RawSample::new(PointerAction::Up, PointerId(1), Timestamp::from_millis(80))
//!     .with_pointer(PointerId(1), 21.0, 20.0);
//!
//! window.handle_sample(&mut tree, &down)?;
//! window.handle_sample(&mut tree, &up)?;
//!
//! let outcome = window.gesture_recognizer(tap).and_then(|r| r.core().last_outcome());
//! assert_eq!(outcome, Some(GestureState::Ended));
//! # Ok::<(), TouchError>(())
//! ```

pub use horizon_touch_core::*;

pub mod config;
pub mod error;
pub mod event;
pub mod gesture;
pub mod input;
pub mod prelude;
pub mod responder;
pub mod touch;
pub mod view;
pub mod window;

pub use config::{ArbitrationPolicy, TouchConfig};
pub use error::{TouchError, TouchResult};
pub use event::{Event, EventKind};
pub use gesture::{
    GestureContext, GestureCore, GestureDelegate, GestureRecognizer, GestureState, LongPressGestureRecognizer,
    PanGestureRecognizer, RecognizerId, RecognizerKind, SwipeDirection, SwipeGestureRecognizer,
    TapGestureRecognizer, recognizer_cast, recognizer_cast_mut, set_state,
};
pub use responder::{DispatchResult, FirstResponder, Propagation, Responder, ResponderAccess, ResponderId};
pub use touch::{PointerId, Touch, TouchId, TouchPhase};
pub use view::{ControllerId, ViewHierarchy, ViewId};
pub use window::{DispatchSummary, Window};
