// Forbid unsafe in production; deny in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Touch-driven long-press reorder engine for SuShe Online album lists.
//!
//! # Role
//! A finger held on a card for the long-press duration lifts it into a
//! floating ghost. Dragging the ghost past a neighbor's midpoint swaps the
//! two; holding near the list's top or bottom edge scrolls it. Lifting the
//! finger hands the new order to a persistence collaborator, once, and only
//! if it changed.
//!
//! # Primary responsibilities
//! - **GestureRecognizer**: scroll vs long press, with a cancel radius.
//! - **DragSessionController**: activation, ghost tracking, finalize/cancel.
//! - **Drop-slot resolver**: neighbor-only swaps with built-in hysteresis.
//! - **Auto-scroll**: edge trigger zones driven at animation-frame cadence.
//!
//! # How it fits in the system
//! The engine is host-driven. The embedding environment implements
//! [`ReorderHost`] (timers, frames, listeners, scrolling, visuals,
//! persistence) and forwards DOM signals to [`ReorderEngine`]. Everything runs
//! to completion on the caller's thread; nothing blocks or spawns.

pub mod auto_scroll;
pub mod card_registry;
pub mod config;
pub mod dispatch;
pub mod drop_slot;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod host;
pub mod session;

pub use auto_scroll::{AutoScrollLoop, AutoScrollStats, calc_scroll_speed, scroll_speed};
pub use card_registry::CardRegistry;
pub use config::{ConfigError, ReorderConfig, ScrollPolicy};
pub use dispatch::{CancelReason, DispatchOutcome, IgnoredReason, ReorderDispatch, TouchPhase};
pub use drop_slot::{move_item, resolve_drop_index, resolve_drop_index_with};
pub use engine::ReorderEngine;
pub use geometry::{ContainerBounds, Point, Rect};
pub use gesture::{GestureRecognizer, Touch};
pub use host::{
    DragStart, DragVisualSink, ElementHandle, FrameId, FrameScheduler, Haptics, ListenerRegistry,
    ReorderHost, ReorderSink, ScrollContainer, TimerId, TimerScheduler, ViewportLock,
};
pub use session::{ActivationRejected, DragSession, DragSessionController, DragSummary};
