//! The view hierarchy seam.
//!
//! The retained view tree lives outside the touch engine. The engine only
//! needs a handful of queries from it, expressed by [`ViewHierarchy`]:
//! hit-testing, the superview chain, view controllers, coordinate
//! conversion, and mutable access to responders for callback delivery.
//!
//! View and controller handles are generational slotmap keys, so a tree
//! implementation can store its nodes in a `SlotMap<ViewId, _>` directly.

use slotmap::new_key_type;

use horizon_touch_core::Point;

use crate::responder::{ResponderAccess, ResponderId};

new_key_type! {
    /// A handle to a view in the external hierarchy.
    pub struct ViewId;

    /// A handle to a view controller in the external hierarchy.
    pub struct ControllerId;
}

/// Queries the touch engine consumes from the view hierarchy.
///
/// Only [`hit_test`](Self::hit_test), [`superview`](Self::superview) and
/// [`contains_view`](Self::contains_view) are required, plus responder
/// access from [`ResponderAccess`]. The coordinate queries default to an
/// unscaled window whose backing surface sits at the screen origin.
pub trait ViewHierarchy: ResponderAccess {
    /// Find the deepest view under a point in window coordinates.
    ///
    /// Implementations honor visibility, opacity and interaction-enabled
    /// flags. `None` means the touch has no target.
    fn hit_test(&self, point: Point) -> Option<ViewId>;

    /// Get the parent of a view.
    fn superview(&self, view: ViewId) -> Option<ViewId>;

    /// Check whether a view is still part of the hierarchy.
    ///
    /// The window treats a touch's view that is no longer contained as
    /// removed, as if [`Window::view_removed`](crate::Window::view_removed)
    /// had been called for it.
    fn contains_view(&self, view: ViewId) -> bool;

    /// Get the controller that manages a view, if any.
    fn view_controller(&self, _view: ViewId) -> Option<ControllerId> {
        None
    }

    /// Get the view a controller manages.
    fn controller_view(&self, _controller: ControllerId) -> Option<ViewId> {
        None
    }

    /// Physical pixels per logical unit.
    fn scale_factor(&self) -> f32 {
        1.0
    }

    /// Screen position of the window's backing surface, in physical pixels.
    fn surface_origin(&self) -> Point {
        Point::ZERO
    }

    /// Convert a point from window coordinates into a view's coordinates.
    fn convert_from_window(&self, _view: ViewId, point: Point) -> Point {
        point
    }

    /// The view itself followed by every ancestor up to the root.
    fn ancestors(&self, view: ViewId) -> Ancestors<'_, Self> {
        Ancestors {
            tree: self,
            next: Some(view),
        }
    }

    /// The logical parent of a responder.
    ///
    /// A view's next responder is its controller, if any, else its
    /// superview. A controller's next responder is its view's superview.
    fn next_responder(&self, responder: ResponderId) -> Option<ResponderId> {
        match responder {
            ResponderId::View(view) => self
                .view_controller(view)
                .map(ResponderId::Controller)
                .or_else(|| self.superview(view).map(ResponderId::View)),
            ResponderId::Controller(controller) => self
                .controller_view(controller)
                .and_then(|view| self.superview(view))
                .map(ResponderId::View),
        }
    }
}

/// Iterator over a view and its ancestors, innermost first.
pub struct Ancestors<'a, T: ?Sized> {
    tree: &'a T,
    next: Option<ViewId>,
}

impl<T: ViewHierarchy + ?Sized> Iterator for Ancestors<'_, T> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let current = self.next?;
        self.next = self.tree.superview(current);
        Some(current)
    }
}
