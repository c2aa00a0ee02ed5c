#![forbid(unsafe_code)]

//! Scrollable list layout model.
//!
//! Cards are stacked top to bottom inside a fixed container rectangle. Card
//! rectangles are computed on demand from the shared scroll offset, so
//! scrolling the host moves every card the way a real DOM would.

use std::cell::RefCell;
use std::rc::Rc;

use sushe_reorder::{ElementHandle, Rect};

/// Geometry of a vertically stacked list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLayout {
    container: Rect,
    heights: Vec<f64>,
    gap: f64,
    scroll_top: f64,
}

impl ListLayout {
    /// `count` cards of equal `height` in `container`.
    #[must_use]
    pub fn uniform(container: Rect, count: usize, height: f64) -> Self {
        Self::with_heights(container, vec![height; count])
    }

    /// One card per entry of `heights`.
    #[must_use]
    pub fn with_heights(container: Rect, heights: Vec<f64>) -> Self {
        Self {
            container,
            heights,
            gap: 0.0,
            scroll_top: 0.0,
        }
    }

    /// Vertical space between cards.
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap.max(0.0);
        self
    }

    #[must_use]
    pub fn container(&self) -> Rect {
        self.container
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Total height of the stacked content.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        let cards: f64 = self.heights.iter().sum();
        let gaps = self.gap * self.heights.len().saturating_sub(1) as f64;
        cards + gaps
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.content_height() - self.container.height).max(0.0)
    }

    /// Scroll by `dy`, clamped to `[0, max_scroll]`. Returns the applied delta.
    pub fn scroll_by(&mut self, dy: f64) -> f64 {
        let before = self.scroll_top;
        self.scroll_top = (self.scroll_top + dy).clamp(0.0, self.max_scroll());
        self.scroll_top - before
    }

    /// Viewport rectangle of slot `slot`.
    #[must_use]
    pub fn slot_rect(&self, slot: usize) -> Option<Rect> {
        let height = *self.heights.get(slot)?;
        let above: f64 = self.heights[..slot].iter().sum::<f64>() + self.gap * slot as f64;
        Some(Rect::new(
            self.container.x,
            self.container.y + above - self.scroll_top,
            self.container.width,
            height,
        ))
    }
}

/// A layout shared between the host and its card handles.
pub type SharedLayout = Rc<RefCell<ListLayout>>;

/// Handle to one rendered card slot.
#[derive(Debug, Clone)]
pub struct CardHandle {
    slot: usize,
    layout: SharedLayout,
    detached: bool,
}

impl CardHandle {
    #[must_use]
    pub fn new(slot: usize, layout: SharedLayout) -> Self {
        Self {
            slot,
            layout,
            detached: false,
        }
    }

    /// A handle whose element has left the document.
    #[must_use]
    pub fn detached(slot: usize, layout: SharedLayout) -> Self {
        Self {
            slot,
            layout,
            detached: true,
        }
    }

    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl ElementHandle for CardHandle {
    fn bounding_rect(&self) -> Option<Rect> {
        if self.detached {
            return None;
        }
        self.layout.borrow().slot_rect(self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::new(0.0, 50.0, 360.0, 400.0)
    }

    #[test]
    fn slots_stack_from_container_top() {
        let layout = ListLayout::uniform(container(), 10, 100.0);
        assert_eq!(layout.slot_rect(0), Some(Rect::new(0.0, 50.0, 360.0, 100.0)));
        assert_eq!(layout.slot_rect(3).map(|r| r.top()), Some(350.0));
        assert_eq!(layout.slot_rect(10), None);
    }

    #[test]
    fn gap_and_mixed_heights() {
        let layout = ListLayout::with_heights(container(), vec![40.0, 80.0, 120.0]).gap(8.0);
        assert_eq!(layout.slot_rect(2).map(|r| r.top()), Some(50.0 + 40.0 + 80.0 + 16.0));
        assert_eq!(layout.content_height(), 256.0);
        assert_eq!(layout.max_scroll(), 0.0);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut layout = ListLayout::uniform(container(), 10, 100.0);
        assert_eq!(layout.max_scroll(), 600.0);
        assert_eq!(layout.scroll_by(-20.0), 0.0);
        assert_eq!(layout.scroll_by(250.0), 250.0);
        assert_eq!(layout.slot_rect(0).map(|r| r.top()), Some(-200.0));
        assert_eq!(layout.scroll_by(1000.0), 350.0);
        assert_eq!(layout.scroll_top(), 600.0);
    }

    #[test]
    fn handles_follow_shared_scroll() {
        let layout: SharedLayout = Rc::new(RefCell::new(ListLayout::uniform(container(), 5, 100.0)));
        let card = CardHandle::new(1, Rc::clone(&layout));
        assert_eq!(card.bounding_rect().map(|r| r.top()), Some(150.0));
        layout.borrow_mut().scroll_by(30.0);
        assert_eq!(card.bounding_rect().map(|r| r.top()), Some(120.0));
        assert_eq!(CardHandle::detached(1, layout).bounding_rect(), None);
    }
}
