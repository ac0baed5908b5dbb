//! Callback registration for single-threaded notification.
//!
//! [`HandlerList`] is the single-threaded counterpart of a signal: callbacks
//! are registered with [`HandlerList::add`], which returns a [`HandlerId`]
//! used to remove them again, and [`HandlerList::notify`] invokes every
//! registered callback synchronously in registration order.
//!
//! # Example
//!
//! ```
//! use horizon_touch_core::HandlerList;
//!
//! let mut handlers = HandlerList::<i32>::new();
//! let id = handlers.add(|value| println!("got {value}"));
//! handlers.notify(&42);
//! assert!(handlers.remove(id).is_ok());
//! ```

use std::fmt;

use slotmap::{SlotMap, new_key_type};

use crate::error::HandlerError;

new_key_type! {
    /// A unique identifier for a registered handler.
    ///
    /// The ID remains valid until the handler is removed.
    pub struct HandlerId;
}

type BoxedHandler<T> = Box<dyn FnMut(&T)>;

/// An ordered list of callbacks that receive `&T`.
pub struct HandlerList<T: ?Sized> {
    handlers: SlotMap<HandlerId, BoxedHandler<T>>,
    /// Registration order; slotmap iteration order is not insertion order.
    order: Vec<HandlerId>,
}

impl<T: ?Sized> HandlerList<T> {
    /// Create an empty handler list.
    pub fn new() -> Self {
        Self {
            handlers: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Register a handler. Returns its ID.
    pub fn add<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = self.handlers.insert(Box::new(handler));
        self.order.push(id);
        id
    }

    /// Remove a handler by ID.
    pub fn remove(&mut self, id: HandlerId) -> Result<(), HandlerError> {
        if self.handlers.remove(id).is_none() {
            return Err(HandlerError::InvalidHandler);
        }
        self.order.retain(|&h| h != id);
        Ok(())
    }

    /// Check whether a handler is still registered.
    pub fn contains(&self, id: HandlerId) -> bool {
        self.handlers.contains_key(id)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Remove all handlers.
    pub fn clear(&mut self) {
        self.handlers.clear();
        self.order.clear();
    }

    /// Invoke every handler with `value`, in registration order.
    pub fn notify(&mut self, value: &T) {
        for id in &self.order {
            if let Some(handler) = self.handlers.get_mut(*id) {
                handler(value);
            }
        }
    }
}

impl<T: ?Sized> Default for HandlerList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for HandlerList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerList")
            .field("len", &self.handlers.len())
            .finish()
    }
}
