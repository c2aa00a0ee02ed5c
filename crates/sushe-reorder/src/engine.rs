#![forbid(unsafe_code)]

//! [`ReorderEngine`]: the host-facing entry point.
//!
//! Wires the [`GestureRecognizer`], the [`DragSessionController`], and the
//! [`CardRegistry`] together and turns each host signal into a
//! [`ReorderDispatch`].
//!
//! # Invariants
//!
//! 1. The recognizer is `Dragging` exactly when the controller holds a
//!    session. A rejected activation tears the recognizer back down.
//! 2. `prevent_default` is set only while a drag is active, never during the
//!    pending phase.
//! 3. The engine's item sequence changes only on an order-changing release
//!    or through [`ReorderEngine::set_items`].
//!
//! # Usage
//!
//! ```
//! use sushe_reorder::{ReorderConfig, ReorderEngine, Rect};
//!
//! let mut engine: ReorderEngine<&str, Rect> =
//!     ReorderEngine::new(ReorderConfig::default(), vec!["a", "b", "c"]).unwrap();
//! engine.register_card(0, Rect::new(0.0, 0.0, 320.0, 100.0));
//! assert_eq!(engine.items(), &["a", "b", "c"]);
//! assert!(!engine.is_dragging());
//! ```

use web_time::Instant;

use crate::card_registry::CardRegistry;
use crate::config::{ConfigError, ReorderConfig};
use crate::dispatch::{
    CancelReason, DispatchOutcome, IgnoredReason, ReorderDispatch, TouchPhase,
};
use crate::gesture::{Activation, EndVerdict, GestureRecognizer, MoveVerdict, Touch};
use crate::host::{ElementHandle, FrameId, ReorderHost, TimerId};
use crate::session::{DragSession, DragSessionController, DragSummary};

/// Touch-driven reorder engine for one list.
#[derive(Debug)]
pub struct ReorderEngine<I, E> {
    config: ReorderConfig,
    items: Vec<I>,
    cards: CardRegistry<E>,
    recognizer: GestureRecognizer,
    controller: DragSessionController<I>,
    last_summary: Option<DragSummary<I>>,
    next_sequence: u64,
}

impl<I, E> ReorderEngine<I, E>
where
    I: Clone + PartialEq + std::fmt::Debug,
    E: ElementHandle,
{
    /// Build an engine over `items` with a validated configuration.
    pub fn new(config: ReorderConfig, items: Vec<I>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            recognizer: GestureRecognizer::new(config.long_press, config.cancel_distance),
            controller: DragSessionController::new(config.clone()),
            cards: CardRegistry::new(),
            config,
            items,
            last_summary: None,
            next_sequence: 1,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// The current Ordered Sequence.
    #[must_use]
    pub fn items(&self) -> &[I] {
        &self.items
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.recognizer.is_pending()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.controller.is_active()
    }

    /// Whether document listeners are attached.
    #[must_use]
    pub fn listeners_attached(&self) -> bool {
        self.recognizer.listeners_attached()
    }

    /// The active drag session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession<I>> {
        self.controller.session()
    }

    /// Summary of the most recently finished drag.
    #[must_use]
    pub fn last_summary(&self) -> Option<&DragSummary<I>> {
        self.last_summary.as_ref()
    }

    #[must_use]
    pub fn cards(&self) -> &CardRegistry<E> {
        &self.cards
    }

    /// Register the rendered handle for slot `index`.
    pub fn register_card(&mut self, index: usize, handle: E) {
        self.cards.register_card(index, handle);
    }

    pub fn unregister_card(&mut self, index: usize) -> Option<E> {
        self.cards.unregister_card(index)
    }

    /// Replace the Ordered Sequence. An in-flight gesture is cancelled first.
    pub fn set_items<H>(&mut self, items: Vec<I>, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let dispatch = self.interrupt(TouchPhase::ItemsReplaced, CancelReason::ItemsReplaced, host);
        self.items = items;
        dispatch
    }

    /// Finger down on slot `index`.
    pub fn touch_start<H>(
        &mut self,
        index: usize,
        touch: Touch,
        now: Instant,
        host: &mut H,
    ) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let phase = TouchPhase::TouchStart;
        if !self.recognizer.is_idle() {
            let prevent = self.is_dragging();
            return self.dispatch(
                phase,
                DispatchOutcome::Ignored(IgnoredReason::GestureInProgress),
                prevent,
            );
        }
        if index >= self.items.len() {
            return self.ignored(phase, IgnoredReason::IndexOutOfRange);
        }
        match self.recognizer.touch_start(index, touch, now, host) {
            Ok(()) => self.dispatch(phase, DispatchOutcome::Pending, false),
            Err(reason) => self.ignored(phase, reason),
        }
    }

    /// Document-level move.
    pub fn touch_move<H>(&mut self, touch: Touch, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let phase = TouchPhase::TouchMove;
        match self.recognizer.touch_move(touch, host) {
            MoveVerdict::Pending => self.dispatch(phase, DispatchOutcome::Pending, false),
            MoveVerdict::Cancelled(reason) => {
                self.dispatch(phase, DispatchOutcome::GestureCancelled(reason), false)
            }
            MoveVerdict::Drag(point) => {
                match self.controller.on_move(point, &self.cards, host) {
                    Some(report) => self.dispatch(
                        phase,
                        DispatchOutcome::GhostMoved {
                            drop_index: report.drop_index,
                            swapped: report.swapped,
                        },
                        true,
                    ),
                    None => self.ignored(phase, IgnoredReason::NoGesture),
                }
            }
            MoveVerdict::Ignored(reason) => {
                let prevent = self.is_dragging();
                self.dispatch(phase, DispatchOutcome::Ignored(reason), prevent)
            }
        }
    }

    /// The long-press timeout `timer` fired.
    pub fn long_press_elapsed<H>(&mut self, timer: TimerId, now: Instant, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let phase = TouchPhase::LongPressTimer;
        match self.recognizer.timer_fired(timer, now) {
            Ok(activation) => self.activate(phase, activation, now, host),
            Err(reason) => self.ignored(phase, reason),
        }
    }

    /// Poll for an elapsed long press (for hosts that tick instead of timing).
    pub fn check_long_press<H>(&mut self, now: Instant, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let phase = TouchPhase::LongPressPoll;
        match self.recognizer.check_long_press(now, host) {
            Ok(activation) => self.activate(phase, activation, now, host),
            Err(reason) => self.ignored(phase, reason),
        }
    }

    fn activate<H>(
        &mut self,
        phase: TouchPhase,
        activation: Activation,
        now: Instant,
        host: &mut H,
    ) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        match self.controller.activate(
            activation.index,
            activation.point,
            &self.items,
            &self.cards,
            host,
            now,
        ) {
            Ok(()) => self.dispatch(
                phase,
                DispatchOutcome::Activated {
                    index: activation.index,
                },
                true,
            ),
            Err(rejected) => {
                tracing::warn!(index = activation.index, reason = %rejected, "drag activation rejected");
                self.recognizer.teardown(host);
                self.ignored(phase, IgnoredReason::ActivationRejected(rejected))
            }
        }
    }

    /// Finger lifted. `touch_id` of `None` matches the owning touch.
    pub fn touch_end<H>(&mut self, touch_id: Option<u32>, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        self.end(TouchPhase::TouchEnd, touch_id, false, host)
    }

    /// Platform cancelled the touch.
    pub fn touch_cancel<H>(&mut self, touch_id: Option<u32>, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        self.end(TouchPhase::TouchCancel, touch_id, true, host)
    }

    fn end<H>(
        &mut self,
        phase: TouchPhase,
        touch_id: Option<u32>,
        cancelled: bool,
        host: &mut H,
    ) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        match self.recognizer.touch_end(touch_id, cancelled, host) {
            EndVerdict::Release => match self.controller.release(host) {
                Some(summary) => {
                    let committed = summary.committed;
                    if let Some(order) = &summary.order {
                        self.items.clone_from(order);
                    }
                    self.last_summary = Some(summary);
                    self.dispatch(phase, DispatchOutcome::Released { committed }, true)
                }
                None => self.ignored(phase, IgnoredReason::NoGesture),
            },
            EndVerdict::DragCancelled => {
                if let Some(summary) = self.controller.cancel(host) {
                    self.last_summary = Some(summary);
                }
                self.dispatch(
                    phase,
                    DispatchOutcome::DragCancelled(CancelReason::TouchCancelled),
                    true,
                )
            }
            EndVerdict::Cancelled(reason) => {
                self.dispatch(phase, DispatchOutcome::GestureCancelled(reason), false)
            }
            EndVerdict::Ignored(reason) => {
                let prevent = self.is_dragging();
                self.dispatch(phase, DispatchOutcome::Ignored(reason), prevent)
            }
        }
    }

    /// Animation frame `frame` arrived.
    pub fn animation_frame<H>(&mut self, frame: FrameId, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let phase = TouchPhase::AnimationFrame;
        if !self.controller.is_active() {
            return self.ignored(phase, IgnoredReason::NoGesture);
        }
        match self.controller.on_frame(frame, &self.cards, host) {
            Some(report) => self.dispatch(
                phase,
                DispatchOutcome::Scrolled {
                    delta: report.delta,
                    drop_index: report.drop_index,
                },
                false,
            ),
            None => self.ignored(phase, IgnoredReason::StaleCallback),
        }
    }

    /// Window lost focus.
    pub fn blur<H>(&mut self, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        self.interrupt(TouchPhase::Blur, CancelReason::Interrupted, host)
    }

    /// Page became hidden.
    pub fn visibility_hidden<H>(&mut self, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        self.interrupt(TouchPhase::VisibilityHidden, CancelReason::Interrupted, host)
    }

    /// The list is going away: cancel everything and forget card handles.
    pub fn unmount<H>(&mut self, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let dispatch = self.interrupt(TouchPhase::Unmount, CancelReason::Unmounted, host);
        self.cards.clear();
        dispatch
    }

    fn interrupt<H>(&mut self, phase: TouchPhase, reason: CancelReason, host: &mut H) -> ReorderDispatch
    where
        H: ReorderHost<I> + ?Sized,
    {
        let was_pending = self.recognizer.is_pending();
        self.recognizer.teardown(host);
        if let Some(summary) = self.controller.cancel(host) {
            tracing::debug!(?reason, "drag interrupted");
            self.last_summary = Some(summary);
            return self.dispatch(phase, DispatchOutcome::DragCancelled(reason), false);
        }
        if was_pending {
            return self.dispatch(phase, DispatchOutcome::GestureCancelled(reason), false);
        }
        self.dispatch(phase, DispatchOutcome::Idle, false)
    }

    fn ignored(&mut self, phase: TouchPhase, reason: IgnoredReason) -> ReorderDispatch {
        self.dispatch(phase, DispatchOutcome::Ignored(reason), false)
    }

    fn dispatch(
        &mut self,
        phase: TouchPhase,
        outcome: DispatchOutcome,
        prevent_default: bool,
    ) -> ReorderDispatch {
        if let DispatchOutcome::Ignored(reason) = &outcome {
            tracing::trace!(?phase, ?reason, "input ignored");
        }
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        ReorderDispatch {
            phase,
            sequence,
            outcome,
            prevent_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn invalid_config_is_rejected() {
        let config = ReorderConfig::default().with_long_press(Duration::ZERO);
        let err = ReorderEngine::<u32, Rect>::new(config, vec![1, 2]).unwrap_err();
        assert_eq!(err, ConfigError::ZeroLongPress);
    }

    #[test]
    fn fresh_engine_is_idle() {
        let engine = ReorderEngine::<u32, Rect>::new(ReorderConfig::default(), vec![1, 2, 3]).unwrap();
        assert_eq!(engine.items(), &[1, 2, 3]);
        assert!(!engine.is_pending());
        assert!(!engine.is_dragging());
        assert!(!engine.listeners_attached());
        assert_eq!(engine.session().map(DragSession::origin_index), None);
        assert_eq!(engine.last_summary(), None);
    }

    #[test]
    fn cards_register_and_unregister() {
        let mut engine = ReorderEngine::<u32, Rect>::new(ReorderConfig::default(), vec![1, 2]).unwrap();
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        engine.register_card(1, rect);
        assert_eq!(engine.cards().rect(1), Some(rect));
        assert_eq!(engine.cards().rect(0), None);
        assert_eq!(engine.unregister_card(1), Some(rect));
        assert!(engine.cards().is_empty());
    }
}
