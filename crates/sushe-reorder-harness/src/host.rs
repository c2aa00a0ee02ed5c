#![forbid(unsafe_code)]

//! Recording host: implements every collaborator trait against a
//! [`ListLayout`] and records each call for later assertions.
//!
//! # JSONL Schema
//!
//! ```json
//! {"call":"subscribe"}
//! {"call":"set_timeout","id":1,"delay_ms":480}
//! {"call":"start_drag","index":1,"ghost_x":0.0,"ghost_y":150.0,"ghost_width":360.0,"ordered_ids":["a","b","c"]}
//! {"call":"reorder","order":["a","c","b"]}
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use sushe_reorder::{
    DragStart, DragVisualSink, FrameId, FrameScheduler, Haptics, ListenerRegistry, Point, Rect,
    ReorderSink, ScrollContainer, TimerId, TimerScheduler, ViewportLock,
};

use crate::layout::{CardHandle, ListLayout, SharedLayout};

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall<I> {
    Subscribe,
    Unsubscribe,
    SetTimeout { id: u64, delay_ms: u64 },
    ClearTimeout { id: u64 },
    RequestFrame { id: u64 },
    CancelFrame { id: u64 },
    ScrollBy { requested: f64, applied: f64 },
    NativeScrollLocked { locked: bool },
    FreezeViewport,
    UnfreezeViewport,
    Vibrate { ms: u64, supported: bool },
    StartDrag {
        index: usize,
        ghost_x: f64,
        ghost_y: f64,
        ghost_width: f64,
        ordered_ids: Vec<I>,
    },
    UpdateGhost { x: f64, y: f64 },
    UpdateDrop { index: usize, order: Vec<I> },
    EndDrag,
    Reorder { order: Vec<I> },
}

/// Deterministic in-memory host.
#[derive(Debug)]
pub struct RecordingHost<I> {
    layout: SharedLayout,
    calls: Vec<HostCall<I>>,
    listeners: i32,
    live_timers: BTreeSet<u64>,
    live_frames: BTreeSet<u64>,
    next_id: u64,
    native_scroll_locked: bool,
    viewport_frozen: bool,
    haptics: bool,
    dragging: bool,
    ghost: Option<Point>,
    reorders: Vec<Vec<I>>,
}

impl<I: Clone> RecordingHost<I> {
    #[must_use]
    pub fn new(layout: ListLayout) -> Self {
        Self {
            layout: Rc::new(RefCell::new(layout)),
            calls: Vec::new(),
            listeners: 0,
            live_timers: BTreeSet::new(),
            live_frames: BTreeSet::new(),
            next_id: 1,
            native_scroll_locked: false,
            viewport_frozen: false,
            haptics: true,
            dragging: false,
            ghost: None,
            reorders: Vec::new(),
        }
    }

    /// Whether vibration is reported as supported.
    pub fn set_haptics(&mut self, supported: bool) {
        self.haptics = supported;
    }

    /// Handle for card slot `slot`.
    #[must_use]
    pub fn card(&self, slot: usize) -> CardHandle {
        CardHandle::new(slot, Rc::clone(&self.layout))
    }

    #[must_use]
    pub fn layout(&self) -> SharedLayout {
        Rc::clone(&self.layout)
    }

    /// Viewport center of slot `slot`.
    #[must_use]
    pub fn card_center(&self, slot: usize) -> Option<Point> {
        let rect = self.layout.borrow().slot_rect(slot)?;
        Some(Point::new(rect.x + rect.width / 2.0, rect.center_y()))
    }

    #[must_use]
    pub fn calls(&self) -> &[HostCall<I>] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Orders handed to the persistence sink, oldest first.
    #[must_use]
    pub fn reorders(&self) -> &[Vec<I>] {
        &self.reorders
    }

    /// Net listener subscriptions (should be 0 or 1).
    #[must_use]
    pub fn listener_count(&self) -> i32 {
        self.listeners
    }

    /// The most recently scheduled timer that is still live.
    #[must_use]
    pub fn live_timer(&self) -> Option<TimerId> {
        self.live_timers.last().copied().map(TimerId)
    }

    #[must_use]
    pub fn live_timer_count(&self) -> usize {
        self.live_timers.len()
    }

    /// The outstanding frame request, if any.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameId> {
        self.live_frames.last().copied().map(FrameId)
    }

    #[must_use]
    pub fn pending_frame_count(&self) -> usize {
        self.live_frames.len()
    }

    /// Host-side handling when a frame callback is delivered.
    pub fn take_frame(&mut self) -> Option<FrameId> {
        let id = self.live_frames.pop_last()?;
        Some(FrameId(id))
    }

    /// Host-side handling when a timer callback is delivered.
    pub fn take_timer(&mut self) -> Option<TimerId> {
        let id = self.live_timers.pop_last()?;
        Some(TimerId(id))
    }

    #[must_use]
    pub fn native_scroll_locked(&self) -> bool {
        self.native_scroll_locked
    }

    #[must_use]
    pub fn viewport_frozen(&self) -> bool {
        self.viewport_frozen
    }

    #[must_use]
    pub fn ghost(&self) -> Option<Point> {
        self.ghost
    }

    #[must_use]
    pub fn visual_dragging(&self) -> bool {
        self.dragging
    }

    /// No listener, timer, frame, lock, freeze, or drag visual left behind.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.listeners == 0
            && self.live_timers.is_empty()
            && self.live_frames.is_empty()
            && !self.native_scroll_locked
            && !self.viewport_frozen
            && !self.dragging
    }

    /// Count of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&HostCall<I>) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl<I: Clone + Serialize> RecordingHost<I> {
    /// Recorded calls as JSON lines.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for call in &self.calls {
            out.push_str(&serde_json::to_string(call)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl<I> ListenerRegistry for RecordingHost<I> {
    fn subscribe_document_touch(&mut self) {
        self.listeners += 1;
        self.calls.push(HostCall::Subscribe);
    }

    fn unsubscribe_document_touch(&mut self) {
        self.listeners -= 1;
        self.calls.push(HostCall::Unsubscribe);
    }
}

impl<I: Clone> TimerScheduler for RecordingHost<I> {
    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let id = self.next_id();
        self.live_timers.insert(id);
        self.calls.push(HostCall::SetTimeout {
            id,
            delay_ms: delay.as_millis() as u64,
        });
        TimerId(id)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.live_timers.remove(&id.0);
        self.calls.push(HostCall::ClearTimeout { id: id.0 });
    }
}

impl<I: Clone> FrameScheduler for RecordingHost<I> {
    fn request_frame(&mut self) -> FrameId {
        let id = self.next_id();
        self.live_frames.insert(id);
        self.calls.push(HostCall::RequestFrame { id });
        FrameId(id)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.live_frames.remove(&id.0);
        self.calls.push(HostCall::CancelFrame { id: id.0 });
    }
}

impl<I> ScrollContainer for RecordingHost<I> {
    fn container_rect(&self) -> Option<Rect> {
        Some(self.layout.borrow().container())
    }

    fn scroll_top(&self) -> f64 {
        self.layout.borrow().scroll_top()
    }

    fn scroll_by(&mut self, dy: f64) -> f64 {
        let applied = self.layout.borrow_mut().scroll_by(dy);
        self.calls.push(HostCall::ScrollBy {
            requested: dy,
            applied,
        });
        applied
    }

    fn set_native_scroll_locked(&mut self, locked: bool) {
        self.native_scroll_locked = locked;
        self.calls.push(HostCall::NativeScrollLocked { locked });
    }
}

impl<I> ViewportLock for RecordingHost<I> {
    fn freeze_viewport(&mut self) {
        self.viewport_frozen = true;
        self.calls.push(HostCall::FreezeViewport);
    }

    fn unfreeze_viewport(&mut self) {
        self.viewport_frozen = false;
        self.calls.push(HostCall::UnfreezeViewport);
    }
}

impl<I> Haptics for RecordingHost<I> {
    fn vibrate(&mut self, pulse: Duration) -> bool {
        self.calls.push(HostCall::Vibrate {
            ms: pulse.as_millis() as u64,
            supported: self.haptics,
        });
        self.haptics
    }
}

impl<I: Clone> DragVisualSink<I> for RecordingHost<I> {
    fn start_drag(&mut self, start: &DragStart<I>) {
        self.dragging = true;
        self.ghost = Some(start.ghost);
        self.calls.push(HostCall::StartDrag {
            index: start.index,
            ghost_x: start.ghost.x,
            ghost_y: start.ghost.y,
            ghost_width: start.ghost_width,
            ordered_ids: start.ordered_ids.clone(),
        });
    }

    fn update_ghost(&mut self, ghost: Point) {
        self.ghost = Some(ghost);
        self.calls.push(HostCall::UpdateGhost {
            x: ghost.x,
            y: ghost.y,
        });
    }

    fn update_drop(&mut self, drop_index: usize, order: &[I]) {
        self.calls.push(HostCall::UpdateDrop {
            index: drop_index,
            order: order.to_vec(),
        });
    }

    fn end_drag(&mut self) {
        self.dragging = false;
        self.ghost = None;
        self.calls.push(HostCall::EndDrag);
    }
}

impl<I: Clone> ReorderSink<I> for RecordingHost<I> {
    fn on_reorder(&mut self, new_order: &[I]) {
        self.reorders.push(new_order.to_vec());
        self.calls.push(HostCall::Reorder {
            order: new_order.to_vec(),
        });
    }
}
