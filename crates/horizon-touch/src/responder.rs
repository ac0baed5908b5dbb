//! Responders and the responder chain.
//!
//! Views and view controllers receive touch callbacks as [`Responder`]s.
//! Delivery starts at a touch's owning view and walks
//! [`ViewHierarchy::next_responder`] until a responder returns
//! [`Propagation::Stop`] or the chain runs out.
//!
//! [`FirstResponder`] tracks which responder currently holds
//! first-responder status for a window.

use horizon_touch_core::logging::targets;

use crate::event::Event;
use crate::touch::{Touch, TouchPhase};
use crate::view::{ControllerId, ViewHierarchy, ViewId};

/// A responder in the chain: either a view or a view controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponderId {
    /// A view.
    View(ViewId),
    /// A view controller.
    Controller(ControllerId),
}

impl From<ViewId> for ResponderId {
    fn from(view: ViewId) -> Self {
        Self::View(view)
    }
}

impl From<ControllerId> for ResponderId {
    fn from(controller: ControllerId) -> Self {
        Self::Controller(controller)
    }
}

/// Whether a touch callback lets delivery continue up the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Pass the callback to the next responder.
    #[default]
    Forward,
    /// Stop delivery here.
    Stop,
}

/// Touch callbacks and first-responder hooks.
///
/// Every callback forwards by default, so a responder only overrides the
/// phases it handles.
pub trait Responder {
    /// Fingers touched down.
    fn touches_began(&mut self, _touches: &[&Touch], _event: &Event) -> Propagation {
        Propagation::Forward
    }

    /// Fingers moved.
    fn touches_moved(&mut self, _touches: &[&Touch], _event: &Event) -> Propagation {
        Propagation::Forward
    }

    /// Fingers lifted.
    fn touches_ended(&mut self, _touches: &[&Touch], _event: &Event) -> Propagation {
        Propagation::Forward
    }

    /// The system cancelled fingers.
    fn touches_cancelled(&mut self, _touches: &[&Touch], _event: &Event) -> Propagation {
        Propagation::Forward
    }

    /// Whether this responder accepts first-responder status.
    fn can_become_first_responder(&self) -> bool {
        false
    }

    /// Whether this responder gives up first-responder status when asked.
    fn can_resign_first_responder(&self) -> bool {
        true
    }

    /// Called after this responder became first responder.
    fn did_become_first_responder(&mut self) {}

    /// Called after this responder resigned first responder.
    fn did_resign_first_responder(&mut self) {}
}

/// Trait for accessing responders by their ID.
///
/// Implement this trait for your view storage to let the engine deliver
/// touch callbacks.
pub trait ResponderAccess {
    /// Get an immutable reference to a responder.
    fn responder(&self, id: ResponderId) -> Option<&dyn Responder>;

    /// Get a mutable reference to a responder.
    fn responder_mut(&mut self, id: ResponderId) -> Option<&mut dyn Responder>;
}

/// Result of delivering a touch callback through the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// A responder stopped propagation.
    Handled(ResponderId),
    /// The callback reached the end of the chain.
    Ignored,
    /// The starting responder was not found.
    ResponderNotFound,
}

impl DispatchResult {
    /// Check if some responder stopped propagation.
    pub fn was_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// Walks the responder chain.
pub struct ResponderChain;

impl ResponderChain {
    /// Deliver a touch callback starting at `start`.
    ///
    /// `phase` selects the callback; [`TouchPhase::Stationary`] is never
    /// delivered and yields [`DispatchResult::Ignored`].
    pub fn deliver<T: ViewHierarchy + ?Sized>(
        tree: &mut T,
        start: ResponderId,
        phase: TouchPhase,
        touches: &[&Touch],
        event: &Event,
    ) -> DispatchResult {
        if tree.responder(start).is_none() {
            return DispatchResult::ResponderNotFound;
        }

        let mut current = Some(start);
        while let Some(id) = current {
            let Some(responder) = tree.responder_mut(id) else {
                tracing::warn!(target: targets::RESPONDER, ?id, "responder chain broken");
                return DispatchResult::Ignored;
            };

            let propagation = match phase {
                TouchPhase::Began => responder.touches_began(touches, event),
                TouchPhase::Moved => responder.touches_moved(touches, event),
                TouchPhase::Ended => responder.touches_ended(touches, event),
                TouchPhase::Cancelled => responder.touches_cancelled(touches, event),
                TouchPhase::Stationary => return DispatchResult::Ignored,
            };

            if propagation == Propagation::Stop {
                tracing::trace!(target: targets::RESPONDER, ?id, ?phase, "touches handled");
                return DispatchResult::Handled(id);
            }
            current = tree.next_responder(id);
        }

        DispatchResult::Ignored
    }

    /// Collect the chain starting at `start`, including `start` itself.
    pub fn chain<T: ViewHierarchy + ?Sized>(tree: &T, start: ResponderId) -> Vec<ResponderId> {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            chain.push(id);
            current = tree.next_responder(id);
        }
        chain
    }
}

/// Tracks the first responder of a window.
#[derive(Debug, Default)]
pub struct FirstResponder {
    current: Option<ResponderId>,
}

impl FirstResponder {
    /// Create a manager with no first responder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current first responder.
    pub fn current(&self) -> Option<ResponderId> {
        self.current
    }

    /// Make `id` the first responder.
    ///
    /// Returns `true` if `id` holds the status afterwards. Asking on behalf
    /// of the current first responder succeeds without side effects. Fails
    /// if `id` refuses the status or the current holder refuses to resign.
    pub fn become_first_responder<S: ResponderAccess + ?Sized>(
        &mut self,
        storage: &mut S,
        id: ResponderId,
    ) -> bool {
        if self.current == Some(id) {
            return true;
        }

        let can_become = storage
            .responder(id)
            .is_some_and(|responder| responder.can_become_first_responder());
        if !can_become {
            return false;
        }

        if let Some(old) = self.current {
            if let Some(responder) = storage.responder_mut(old) {
                if !responder.can_resign_first_responder() {
                    tracing::debug!(target: targets::RESPONDER, ?old, ?id, "first responder refused to resign");
                    return false;
                }
                responder.did_resign_first_responder();
            }
        }

        self.current = Some(id);
        if let Some(responder) = storage.responder_mut(id) {
            responder.did_become_first_responder();
        }
        tracing::debug!(target: targets::RESPONDER, ?id, "first responder changed");
        true
    }

    /// Resign the current first responder.
    ///
    /// Returns `true` if no responder holds the status afterwards.
    pub fn resign_first_responder<S: ResponderAccess + ?Sized>(&mut self, storage: &mut S) -> bool {
        let Some(old) = self.current else {
            return true;
        };

        if let Some(responder) = storage.responder_mut(old) {
            if !responder.can_resign_first_responder() {
                return false;
            }
            responder.did_resign_first_responder();
        }
        self.current = None;
        true
    }

    /// Drop the first responder without callbacks if it is `id`.
    ///
    /// Used when a responder leaves the hierarchy.
    pub fn forget(&mut self, id: ResponderId) {
        if self.current == Some(id) {
            self.current = None;
        }
    }
}
