#![forbid(unsafe_code)]

//! Host collaborator traits.
//!
//! The engine never calls a platform API directly. The embedding environment
//! (a wasm shim over the DOM, or a test double) implements these traits and
//! passes itself into every engine call. [`ReorderHost`] bundles them.
//!
//! All calls are one-way notifications or bookkeeping; none can fail in a way
//! the engine reacts to.

use std::time::Duration;

use crate::geometry::{Point, Rect};

/// Opaque handle for a scheduled timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Opaque handle for a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Document-level touch listener attachment.
///
/// Listeners live on the document rather than the card so tracking continues
/// after the finger leaves the card's bounds.
pub trait ListenerRegistry {
    /// Attach document-level `touchmove` / `touchend` / `touchcancel` listeners.
    fn subscribe_document_touch(&mut self);
    /// Detach them.
    fn unsubscribe_document_touch(&mut self);
}

/// One-shot timeouts (`setTimeout` / `clearTimeout`).
pub trait TimerScheduler {
    /// Schedule a timeout; the host later reports it back to the engine.
    fn set_timeout(&mut self, delay: Duration) -> TimerId;
    /// Cancel a scheduled timeout. Unknown ids are ignored.
    fn clear_timeout(&mut self, id: TimerId);
}

/// Animation-frame cadence (`requestAnimationFrame` / `cancelAnimationFrame`).
pub trait FrameScheduler {
    /// Request one frame callback.
    fn request_frame(&mut self) -> FrameId;
    /// Cancel a pending frame callback. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
}

/// The scrollable list container.
pub trait ScrollContainer {
    /// Container rectangle in viewport coordinates.
    fn container_rect(&self) -> Option<Rect>;
    /// Current vertical scroll offset.
    fn scroll_top(&self) -> f64;
    /// Scroll by `dy`, clamped to the container's scroll range.
    ///
    /// Returns the delta actually applied.
    fn scroll_by(&mut self, dy: f64) -> f64;
    /// Lock or unlock native (user-driven) scrolling.
    fn set_native_scroll_locked(&mut self, locked: bool);
}

/// Pins layout-affecting viewport variables for the duration of a drag.
pub trait ViewportLock {
    fn freeze_viewport(&mut self);
    fn unfreeze_viewport(&mut self);
}

/// Vibration feedback.
pub trait Haptics {
    /// Fire one pulse. Returns `false` if the capability is missing.
    fn vibrate(&mut self, _pulse: Duration) -> bool {
        false
    }
}

/// Initial rendering state handed to the visual sink at activation.
#[derive(Debug, Clone, PartialEq)]
pub struct DragStart<I> {
    pub index: usize,
    pub ghost: Point,
    pub ghost_width: f64,
    pub ordered_ids: Vec<I>,
}

/// Externally owned rendering state for the ghost and per-card highlights.
pub trait DragVisualSink<I> {
    fn start_drag(&mut self, start: &DragStart<I>);
    fn update_ghost(&mut self, ghost: Point);
    fn update_drop(&mut self, drop_index: usize, order: &[I]);
    fn end_drag(&mut self);
}

/// Persistence collaborator.
///
/// Called at most once per drag, only when the order changed. The engine does
/// not await or retry; error surfacing belongs to the implementor.
pub trait ReorderSink<I> {
    fn on_reorder(&mut self, new_order: &[I]);
}

/// Everything the engine needs from its environment.
pub trait ReorderHost<I>:
    ListenerRegistry
    + TimerScheduler
    + FrameScheduler
    + ScrollContainer
    + ViewportLock
    + Haptics
    + DragVisualSink<I>
    + ReorderSink<I>
{
}

impl<I, T> ReorderHost<I> for T where
    T: ListenerRegistry
        + TimerScheduler
        + FrameScheduler
        + ScrollContainer
        + ViewportLock
        + Haptics
        + DragVisualSink<I>
        + ReorderSink<I>
{
}

/// A rendered item whose geometry can be read on demand.
pub trait ElementHandle {
    /// Current bounding rectangle, or `None` if detached.
    fn bounding_rect(&self) -> Option<Rect>;
}

impl ElementHandle for Rect {
    fn bounding_rect(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl<E: ElementHandle + ?Sized> ElementHandle for std::rc::Rc<E> {
    fn bounding_rect(&self) -> Option<Rect> {
        (**self).bounding_rect()
    }
}
