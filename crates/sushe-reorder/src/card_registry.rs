#![forbid(unsafe_code)]

//! Slot-indexed registry of rendered card handles.
//!
//! The renderer registers a handle for each visible slot. The registry never
//! creates or owns the elements themselves; it only reads their geometry.

use crate::geometry::Rect;
use crate::host::ElementHandle;

/// Card handles indexed by display slot.
#[derive(Debug)]
pub struct CardRegistry<E> {
    slots: Vec<Option<E>>,
}

impl<E> Default for CardRegistry<E> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<E: ElementHandle> CardRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handle rendered at `index`.
    pub fn register_card(&mut self, index: usize, handle: E) {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(handle);
    }

    /// Drop the handle at `index`, returning it.
    pub fn unregister_card(&mut self, index: usize) -> Option<E> {
        let handle = self.slots.get_mut(index)?.take();
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        handle
    }

    /// Forget every handle.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current rectangle of the card at `index`.
    #[must_use]
    pub fn rect(&self, index: usize) -> Option<Rect> {
        self.slots
            .get(index)?
            .as_ref()?
            .bounding_rect()
            .filter(Rect::is_valid)
    }

    /// Rectangles for slots `0..count`, or `None` if any slot is missing.
    #[must_use]
    pub fn rects(&self, count: usize) -> Option<Vec<Rect>> {
        (0..count).map(|index| self.rect(index)).collect()
    }
}
