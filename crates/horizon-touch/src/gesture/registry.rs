//! Recognizer storage and view attachment.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::error::{TouchError, TouchResult};
use crate::view::{ViewHierarchy, ViewId};

use super::{DynRecognizer, GestureRecognizer, RecognizerId};

/// Owns a window's recognizers and tracks which view each is attached to.
#[derive(Default)]
pub struct GestureRegistry {
    recognizers: SlotMap<RecognizerId, Box<DynRecognizer>>,
    /// Attached recognizers per view, in attachment order.
    by_view: HashMap<ViewId, Vec<RecognizerId>>,
}

impl GestureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a recognizer without attaching it.
    pub fn insert(&mut self, recognizer: Box<DynRecognizer>) -> RecognizerId {
        self.recognizers.insert(recognizer)
    }

    /// Store a recognizer and attach it to `view`.
    pub fn insert_on(&mut self, view: ViewId, mut recognizer: Box<DynRecognizer>) -> RecognizerId {
        recognizer.core_mut().set_view(Some(view));
        let id = self.recognizers.insert(recognizer);
        self.by_view.entry(view).or_default().push(id);
        id
    }

    /// Remove a recognizer, detaching it first.
    pub fn remove(&mut self, id: RecognizerId) -> Option<Box<DynRecognizer>> {
        let mut recognizer = self.recognizers.remove(id)?;
        if let Some(view) = recognizer.core().view() {
            self.unlink(view, id);
        }
        recognizer.core_mut().set_view(None);
        Some(recognizer)
    }

    /// Get a recognizer.
    pub fn get(&self, id: RecognizerId) -> Option<&DynRecognizer> {
        self.recognizers.get(id).map(|r| &**r)
    }

    /// Get a recognizer mutably.
    pub fn get_mut(&mut self, id: RecognizerId) -> Option<&mut DynRecognizer> {
        self.recognizers.get_mut(id).map(|r| &mut **r)
    }

    /// Check whether a recognizer is stored.
    pub fn contains(&self, id: RecognizerId) -> bool {
        self.recognizers.contains_key(id)
    }

    /// Number of stored recognizers.
    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    /// Check if no recognizers are stored.
    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    /// IDs of every stored recognizer.
    pub fn ids(&self) -> Vec<RecognizerId> {
        self.recognizers.keys().collect()
    }

    /// Attach a recognizer to a view, detaching it from any previous view.
    pub fn attach(&mut self, id: RecognizerId, view: ViewId) -> TouchResult<()> {
        let recognizer = self.recognizers.get_mut(id).ok_or(TouchError::UnknownRecognizer)?;
        let previous = recognizer.core().view();
        recognizer.core_mut().set_view(Some(view));

        if let Some(previous) = previous {
            self.unlink(previous, id);
        }
        self.by_view.entry(view).or_default().push(id);
        Ok(())
    }

    /// Detach a recognizer from its view.
    pub fn detach(&mut self, id: RecognizerId) -> TouchResult<()> {
        let recognizer = self.recognizers.get_mut(id).ok_or(TouchError::UnknownRecognizer)?;
        if let Some(view) = recognizer.core().view() {
            recognizer.core_mut().set_view(None);
            self.unlink(view, id);
        }
        Ok(())
    }

    /// Detach every recognizer attached to `view`. Returns their IDs.
    pub fn detach_view(&mut self, view: ViewId) -> Vec<RecognizerId> {
        let ids = self.by_view.remove(&view).unwrap_or_default();
        for &id in &ids {
            if let Some(recognizer) = self.recognizers.get_mut(id) {
                recognizer.core_mut().set_view(None);
            }
        }
        ids
    }

    /// Recognizers attached directly to `view`, in attachment order.
    pub fn attached_to(&self, view: ViewId) -> &[RecognizerId] {
        self.by_view.get(&view).map_or(&[], Vec::as_slice)
    }

    /// Recognizers on `view` and its ancestors, innermost view first.
    pub fn collect_for<T: ViewHierarchy + ?Sized>(&self, tree: &T, view: ViewId) -> Vec<RecognizerId> {
        tree.ancestors(view)
            .flat_map(|v| self.attached_to(v).iter().copied())
            .collect()
    }

    fn unlink(&mut self, view: ViewId, id: RecognizerId) {
        if let Some(list) = self.by_view.get_mut(&view) {
            list.retain(|&r| r != id);
            if list.is_empty() {
                self.by_view.remove(&view);
            }
        }
    }
}

impl std::fmt::Debug for GestureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRegistry")
            .field("recognizers", &self.recognizers.len())
            .field("views", &self.by_view.len())
            .finish()
    }
}
