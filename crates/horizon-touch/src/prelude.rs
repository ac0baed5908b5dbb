//! Prelude module for Horizon Touch.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use horizon_touch::prelude::*;
//! ```

// ============================================================================
// Dispatch
// ============================================================================

pub use crate::config::{ArbitrationPolicy, TouchConfig};
pub use crate::error::{TouchError, TouchResult};
pub use crate::window::{DispatchSummary, Window};

// ============================================================================
// Touches and Responders
// ============================================================================

pub use crate::event::Event;
pub use crate::responder::{Propagation, Responder, ResponderAccess, ResponderId};
pub use crate::touch::{PointerId, Touch, TouchId, TouchPhase};
pub use crate::view::{ViewHierarchy, ViewId};

// ============================================================================
// Gesture Recognizers
// ============================================================================

pub use crate::gesture::{
    GestureDelegate, GestureRecognizer, GestureState, LongPressGestureRecognizer, PanGestureRecognizer,
    RecognizerId, SwipeDirection, SwipeGestureRecognizer, TapGestureRecognizer,
};

// ============================================================================
// Geometry and Time
// ============================================================================

pub use horizon_touch_core::{Point, Timestamp, Vector};
