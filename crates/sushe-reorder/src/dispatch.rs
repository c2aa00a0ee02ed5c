#![forbid(unsafe_code)]

//! Per-call results returned to the host.
//!
//! Every engine entry point returns a [`ReorderDispatch`]: which lifecycle
//! phase was handled, what came of it, and whether the host must call
//! `preventDefault()` on the native event.

use crate::session::ActivationRejected;

/// Lifecycle signal the host delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    LongPressTimer,
    LongPressPoll,
    AnimationFrame,
    Blur,
    VisibilityHidden,
    ItemsReplaced,
    Unmount,
}

/// Why an input was dropped without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// A gesture is already pending or active (single-pointer model).
    GestureInProgress,
    /// The touch id differs from the one that owns the gesture.
    TouchMismatch,
    /// Nothing is pending or active.
    NoGesture,
    /// A timer or frame id that is no longer current.
    StaleCallback,
    /// The long press has not been held long enough yet.
    NotYetElapsed,
    /// The touch-start index is outside the current sequence.
    IndexOutOfRange,
    /// Activation could not complete; the gesture degraded to a non-drag.
    ActivationRejected(ActivationRejected),
}

/// Why a pending gesture or an active drag ended without a release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CancelReason {
    /// The finger moved past the cancel distance before the long press.
    MovedBeyondThreshold { distance: f64 },
    /// The finger lifted before the long press elapsed.
    ReleasedEarly,
    /// The platform cancelled the touch.
    TouchCancelled,
    /// Window blur or page hidden.
    Interrupted,
    /// The host replaced the item sequence.
    ItemsReplaced,
    /// The list was torn down.
    Unmounted,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A long press is being timed.
    Pending,
    /// The pending press was abandoned.
    GestureCancelled(CancelReason),
    /// A drag session started.
    Activated { index: usize },
    /// The ghost moved; `swapped` is set when the drop slot changed.
    GhostMoved { drop_index: usize, swapped: bool },
    /// An auto-scroll frame ran.
    Scrolled { delta: f64, drop_index: usize },
    /// The drag ended by release.
    Released { committed: bool },
    /// The drag ended by cancellation; nothing was persisted.
    DragCancelled(CancelReason),
    /// Nothing was active; bookkeeping only.
    Idle,
    Ignored(IgnoredReason),
}

/// Result of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderDispatch {
    pub phase: TouchPhase,
    /// Monotonic per-engine sequence number.
    pub sequence: u64,
    pub outcome: DispatchOutcome,
    /// The host must suppress the native default (scrolling) for this event.
    pub prevent_default: bool,
}

impl ReorderDispatch {
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Ignored(_))
    }
}
