#![forbid(unsafe_code)]

//! Drag session lifecycle: activation, per-move mutation, and teardown.
//!
//! A [`DragSession`] is allocated whole at activation and dropped whole at
//! release or cancel. [`DragSessionController`] is its only owner.
//!
//! # Invariants
//!
//! 1. `current_order` is always a permutation of `start_order`.
//! 2. Activation either completes every side effect or none: all fallible
//!    checks run before the host is touched.
//! 3. Teardown reverses every activation side effect exactly once; a second
//!    release or cancel is a no-op.
//! 4. The persistence sink is called only on release, and only when the
//!    order changed.

use thiserror::Error;
use web_time::Instant;

use crate::auto_scroll::{AutoScrollLoop, AutoScrollStats, scroll_speed};
use crate::card_registry::CardRegistry;
use crate::config::ReorderConfig;
use crate::drop_slot::{move_item, resolve_drop_index_with};
use crate::geometry::{ContainerBounds, Point, Rect};
use crate::host::{DragStart, ElementHandle, FrameId, ReorderHost};

/// Why a long press could not become a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActivationRejected {
    #[error("drag index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no geometry for card {index}")]
    MissingCardGeometry { index: usize },
    #[error("scroll container has no geometry")]
    MissingContainerGeometry,
    #[error("a drag session is already active")]
    SessionActive,
}

/// State of one drag, alive from activation to release or cancel.
#[derive(Debug)]
pub struct DragSession<I> {
    origin_index: usize,
    grab_offset: Point,
    ghost: Point,
    ghost_width: f64,
    ghost_height: f64,
    last_touch: Point,
    bounds: ContainerBounds,
    start_order: Vec<I>,
    current_order: Vec<I>,
    drop_index: usize,
    auto_scroll: Option<AutoScrollLoop>,
    started_at: Instant,
}

impl<I> DragSession<I> {
    /// Slot the dragged item started in.
    #[must_use]
    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    /// Top-left of the ghost.
    #[must_use]
    pub fn ghost_position(&self) -> Point {
        self.ghost
    }

    #[must_use]
    pub fn ghost_height(&self) -> f64 {
        self.ghost_height
    }

    #[must_use]
    pub fn ghost_width(&self) -> f64 {
        self.ghost_width
    }

    /// Vertical center of the ghost, the point compared against neighbors.
    #[must_use]
    pub fn ghost_center_y(&self) -> f64 {
        self.ghost.y + self.ghost_height / 2.0
    }

    /// Touch minus ghost corner, captured at activation.
    #[must_use]
    pub fn grab_offset(&self) -> Point {
        self.grab_offset
    }

    #[must_use]
    pub fn last_touch(&self) -> Point {
        self.last_touch
    }

    /// Container bounds frozen at activation.
    #[must_use]
    pub fn bounds(&self) -> ContainerBounds {
        self.bounds
    }

    #[must_use]
    pub fn start_order(&self) -> &[I] {
        &self.start_order
    }

    #[must_use]
    pub fn current_order(&self) -> &[I] {
        &self.current_order
    }

    /// Slot the dragged item currently occupies in `current_order`.
    #[must_use]
    pub fn drop_index(&self) -> usize {
        self.drop_index
    }

    /// Speed the auto-scroll loop is currently targeting.
    #[must_use]
    pub fn scroll_speed(&self) -> f64 {
        self.auto_scroll
            .as_ref()
            .map_or(0.0, AutoScrollLoop::target_speed)
    }

    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// Result of one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    pub drop_index: usize,
    pub swapped: bool,
    pub scroll_speed: f64,
}

/// Result of one auto-scroll frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub delta: f64,
    pub drop_index: usize,
    pub swapped: bool,
}

/// What a finished session amounted to.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSummary<I> {
    pub origin_index: usize,
    pub final_index: usize,
    /// The order changed and was handed to the persistence sink.
    pub committed: bool,
    /// The committed order, when `committed`.
    pub order: Option<Vec<I>>,
    pub scroll: AutoScrollStats,
}

/// Owns at most one [`DragSession`].
#[derive(Debug)]
pub struct DragSessionController<I> {
    config: ReorderConfig,
    session: Option<DragSession<I>>,
}

impl<I: Clone + PartialEq> DragSessionController<I> {
    #[must_use]
    pub fn new(config: ReorderConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession<I>> {
        self.session.as_ref()
    }

    /// Start a drag of slot `index` with the finger at `touch`.
    pub fn activate<H, E>(
        &mut self,
        index: usize,
        touch: Point,
        order: &[I],
        cards: &CardRegistry<E>,
        host: &mut H,
        now: Instant,
    ) -> Result<(), ActivationRejected>
    where
        H: ReorderHost<I> + ?Sized,
        E: ElementHandle,
    {
        if self.session.is_some() {
            return Err(ActivationRejected::SessionActive);
        }
        if index >= order.len() {
            return Err(ActivationRejected::IndexOutOfRange {
                index,
                len: order.len(),
            });
        }
        let card = cards
            .rect(index)
            .ok_or(ActivationRejected::MissingCardGeometry { index })?;
        let container = host
            .container_rect()
            .filter(Rect::is_valid)
            .ok_or(ActivationRejected::MissingContainerGeometry)?;

        let grab_offset = touch.offset_from(card.origin());
        let ghost = touch.translate_back(grab_offset);
        let bounds = ContainerBounds::from_rect(container);

        host.start_drag(&DragStart {
            index,
            ghost,
            ghost_width: card.width,
            ordered_ids: order.to_vec(),
        });
        if !host.vibrate(self.config.haptic_pulse) {
            tracing::trace!("haptics unavailable");
        }
        host.freeze_viewport();
        host.set_native_scroll_locked(true);
        let auto_scroll = AutoScrollLoop::start(host, self.config.scroll_policy.ramp_frames());

        tracing::debug!(
            index,
            ghost_height = card.height,
            container_top = bounds.top,
            container_bottom = bounds.bottom,
            "drag activated"
        );
        self.session = Some(DragSession {
            origin_index: index,
            grab_offset,
            ghost,
            ghost_width: card.width,
            ghost_height: card.height,
            last_touch: touch,
            bounds,
            start_order: order.to_vec(),
            current_order: order.to_vec(),
            drop_index: index,
            auto_scroll: Some(auto_scroll),
            started_at: now,
        });
        Ok(())
    }

    /// Track the finger: move the ghost, retarget auto-scroll, resolve the slot.
    pub fn on_move<H, E>(
        &mut self,
        touch: Point,
        cards: &CardRegistry<E>,
        host: &mut H,
    ) -> Option<MoveReport>
    where
        H: ReorderHost<I> + ?Sized,
        E: ElementHandle,
    {
        let session = self.session.as_mut()?;
        session.last_touch = touch;
        session.ghost = touch.translate_back(session.grab_offset);
        host.update_ghost(session.ghost);

        let speed = scroll_speed(&self.config.scroll_policy, touch.y, session.bounds);
        if let Some(auto_scroll) = session.auto_scroll.as_mut() {
            auto_scroll.set_target_speed(speed);
        }

        let swapped = resolve_slot(session, self.config.swap_threshold, cards, host);
        tracing::trace!(
            y = touch.y,
            drop_index = session.drop_index,
            speed,
            "drag move"
        );
        Some(MoveReport {
            drop_index: session.drop_index,
            swapped,
            scroll_speed: speed,
        })
    }

    /// Run one auto-scroll frame; re-resolve the slot if the list moved.
    ///
    /// Returns `None` without a session or for a frame the loop did not
    /// request.
    pub fn on_frame<H, E>(
        &mut self,
        frame: FrameId,
        cards: &CardRegistry<E>,
        host: &mut H,
    ) -> Option<FrameReport>
    where
        H: ReorderHost<I> + ?Sized,
        E: ElementHandle,
    {
        let session = self.session.as_mut()?;
        let delta = session.auto_scroll.as_mut()?.on_frame(frame, host)?;
        let swapped = delta != 0.0 && resolve_slot(session, self.config.swap_threshold, cards, host);
        Some(FrameReport {
            delta,
            drop_index: session.drop_index,
            swapped,
        })
    }

    /// Finish the drag, persisting the order if it changed.
    pub fn release<H>(&mut self, host: &mut H) -> Option<DragSummary<I>>
    where
        H: ReorderHost<I> + ?Sized,
    {
        self.finish(host, true)
    }

    /// Abandon the drag without persisting.
    pub fn cancel<H>(&mut self, host: &mut H) -> Option<DragSummary<I>>
    where
        H: ReorderHost<I> + ?Sized,
    {
        self.finish(host, false)
    }

    fn finish<H>(&mut self, host: &mut H, persist: bool) -> Option<DragSummary<I>>
    where
        H: ReorderHost<I> + ?Sized,
    {
        let mut session = self.session.take()?;
        let scroll = session
            .auto_scroll
            .take()
            .map(|auto_scroll| auto_scroll.stop(host))
            .unwrap_or_default();
        host.set_native_scroll_locked(false);
        host.unfreeze_viewport();
        host.end_drag();

        let changed = session.current_order != session.start_order;
        let committed = persist && changed;
        if committed {
            host.on_reorder(&session.current_order);
        }
        tracing::debug!(
            origin = session.origin_index,
            final_index = session.drop_index,
            committed,
            persist,
            scrolled_frames = scroll.scrolled_frames,
            "drag finished"
        );
        Some(DragSummary {
            origin_index: session.origin_index,
            final_index: session.drop_index,
            committed,
            order: committed.then_some(session.current_order),
            scroll,
        })
    }
}

/// Re-resolve the drop slot against the ghost center. Returns `true` on swap.
fn resolve_slot<I, E, H>(
    session: &mut DragSession<I>,
    swap_threshold: f64,
    cards: &CardRegistry<E>,
    host: &mut H,
) -> bool
where
    E: ElementHandle,
    H: ReorderHost<I> + ?Sized,
{
    let Some(rects) = cards.rects(session.current_order.len()) else {
        tracing::trace!("card geometry incomplete; slot unchanged");
        return false;
    };
    let current = session.drop_index;
    let next = resolve_drop_index_with(session.ghost_center_y(), &rects, current, swap_threshold);
    if next == current || !move_item(&mut session.current_order, current, next) {
        return false;
    }
    session.drop_index = next;
    host.update_drop(next, &session.current_order);
    tracing::debug!(from = current, to = next, "drop slot changed");
    true
}
