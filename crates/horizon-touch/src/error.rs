//! Error types for the touch engine.
//!
//! Only programming faults are errors. Expected negative outcomes are plain
//! values: a refused first-responder transfer is `false`, a recognizer that
//! did not match reaches [`GestureState::Failed`](crate::gesture::GestureState),
//! and a touch that hit nothing simply has no owning view.

use thiserror::Error;

use crate::gesture::GestureState;

/// Programming faults raised by the touch engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchError {
    /// A recognizer attempted a state change outside the transition table.
    #[error("illegal gesture state transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// State before the attempted transition.
        from: GestureState,
        /// Requested state.
        to: GestureState,
    },

    /// `end_ignoring_interaction_events` was called without a matching begin.
    #[error("end_ignoring_interaction_events called without matching begin")]
    UnbalancedIgnoreInteraction,

    /// The touch's owning view was detached from the hierarchy.
    #[error("touch owning view has been detached from the hierarchy")]
    ViewDetached,

    /// The touch never resolved to a view.
    #[error("touch has no target view")]
    NoTarget,

    /// The recognizer ID is invalid or the recognizer has been removed.
    #[error("invalid or removed gesture recognizer ID")]
    UnknownRecognizer,
}

impl TouchError {
    /// Check whether this error leaves a recognizer's invariants violated.
    pub fn is_state_fault(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }
}

/// A specialized Result type for touch engine operations.
pub type TouchResult<T> = std::result::Result<T, TouchError>;
