#![forbid(unsafe_code)]

//! Engine + recording host + deterministic clock.
//!
//! [`ReorderRig`] plays the host's side of the contract: it owns the clock,
//! delivers timer and frame callbacks the engine asked for, and addresses
//! touches at card centers so tests read like the gestures they describe.

use std::time::Duration;

use sushe_reorder::{
    ConfigError, DispatchOutcome, Point, ReorderConfig, ReorderDispatch, ReorderEngine, Touch,
};
use web_time::Instant;

use crate::host::RecordingHost;
use crate::layout::{CardHandle, ListLayout};

/// Touch id used by the single-finger helpers.
pub const PRIMARY_TOUCH: u32 = 1;

/// Nominal animation frame interval.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// A reorder engine wired to a [`RecordingHost`].
#[derive(Debug)]
pub struct ReorderRig<I> {
    engine: ReorderEngine<I, CardHandle>,
    host: RecordingHost<I>,
    origin: Instant,
    elapsed: Duration,
    finger: Point,
    pressed_at: Option<Instant>,
}

impl<I> ReorderRig<I>
where
    I: Clone + PartialEq + std::fmt::Debug,
{
    /// Default configuration, one card registered per layout slot.
    pub fn new(items: Vec<I>, layout: ListLayout) -> Result<Self, ConfigError> {
        Self::with_config(ReorderConfig::default(), items, layout)
    }

    pub fn with_config(
        config: ReorderConfig,
        items: Vec<I>,
        layout: ListLayout,
    ) -> Result<Self, ConfigError> {
        let slots = layout.len();
        let host = RecordingHost::new(layout);
        let mut engine = ReorderEngine::new(config, items)?;
        for slot in 0..slots {
            engine.register_card(slot, host.card(slot));
        }
        Ok(Self {
            engine,
            host,
            origin: Instant::now(),
            elapsed: Duration::ZERO,
            finger: Point::default(),
            pressed_at: None,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &ReorderEngine<I, CardHandle> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ReorderEngine<I, CardHandle> {
        &mut self.engine
    }

    #[must_use]
    pub fn host(&self) -> &RecordingHost<I> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut RecordingHost<I> {
        &mut self.host
    }

    /// Split borrow for driving the engine directly.
    pub fn parts(&mut self) -> (&mut ReorderEngine<I, CardHandle>, &mut RecordingHost<I>) {
        (&mut self.engine, &mut self.host)
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.origin + self.elapsed
    }

    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }

    /// Last position of the primary finger.
    #[must_use]
    pub fn finger(&self) -> Point {
        self.finger
    }

    /// Viewport center of slot `slot`.
    #[must_use]
    pub fn card_center(&self, slot: usize) -> Option<Point> {
        self.host.card_center(slot)
    }

    /// Finger down at the center of slot `slot`.
    pub fn press(&mut self, slot: usize) -> ReorderDispatch {
        let at = self.card_center(slot).unwrap_or_default();
        self.press_at(slot, at)
    }

    /// Finger down on slot `slot` at an explicit point.
    pub fn press_at(&mut self, slot: usize, at: Point) -> ReorderDispatch {
        self.finger = at;
        let now = self.now();
        let dispatch =
            self.engine
                .touch_start(slot, Touch::new(PRIMARY_TOUCH, at.x, at.y), now, &mut self.host);
        if dispatch.outcome == DispatchOutcome::Pending {
            self.pressed_at = Some(now);
        }
        dispatch
    }

    /// Move the primary finger.
    pub fn move_to(&mut self, x: f64, y: f64) -> ReorderDispatch {
        self.touch_move(Touch::new(PRIMARY_TOUCH, x, y))
    }

    /// Move the primary finger vertically, keeping its x.
    pub fn move_to_y(&mut self, y: f64) -> ReorderDispatch {
        self.move_to(self.finger.x, y)
    }

    pub fn touch_move(&mut self, touch: Touch) -> ReorderDispatch {
        if touch.id == PRIMARY_TOUCH {
            self.finger = touch.point;
        }
        self.engine.touch_move(touch, &mut self.host)
    }

    /// Let the long-press duration pass and deliver the timer.
    ///
    /// Falls back to polling when no timer is live.
    pub fn fire_long_press(&mut self) -> ReorderDispatch {
        let hold = self.engine.config().long_press;
        self.advance(hold);
        let now = self.now();
        match self.host.take_timer() {
            Some(timer) => self.engine.long_press_elapsed(timer, now, &mut self.host),
            None => self.engine.check_long_press(now, &mut self.host),
        }
    }

    /// Let `by` pass, delivering the long-press timer if it came due.
    pub fn hold(&mut self, by: Duration) -> Option<ReorderDispatch> {
        self.advance(by);
        let pressed_at = self.pressed_at?;
        let now = self.now();
        if !self.engine.is_pending()
            || now.saturating_duration_since(pressed_at) < self.engine.config().long_press
        {
            return None;
        }
        let timer = self.host.take_timer()?;
        Some(self.engine.long_press_elapsed(timer, now, &mut self.host))
    }

    /// Press slot `slot` and hold until activation.
    pub fn long_press(&mut self, slot: usize) -> ReorderDispatch {
        self.press(slot);
        self.fire_long_press()
    }

    pub fn release(&mut self) -> ReorderDispatch {
        self.engine.touch_end(Some(PRIMARY_TOUCH), &mut self.host)
    }

    pub fn cancel(&mut self) -> ReorderDispatch {
        self.engine.touch_cancel(Some(PRIMARY_TOUCH), &mut self.host)
    }

    /// Deliver up to `n` requested frames, one [`FRAME_INTERVAL`] apart.
    ///
    /// Stops early when no frame is pending.
    pub fn run_frames(&mut self, n: usize) -> Vec<ReorderDispatch> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            self.advance(FRAME_INTERVAL);
            let Some(frame) = self.host.take_frame() else {
                break;
            };
            out.push(self.engine.animation_frame(frame, &mut self.host));
        }
        out
    }

    /// Replace the items, as a re-render from the parent would.
    pub fn set_items(&mut self, items: Vec<I>) -> ReorderDispatch {
        self.engine.set_items(items, &mut self.host)
    }

    pub fn blur(&mut self) -> ReorderDispatch {
        self.engine.blur(&mut self.host)
    }

    pub fn visibility_hidden(&mut self) -> ReorderDispatch {
        self.engine.visibility_hidden(&mut self.host)
    }

    pub fn unmount(&mut self) -> ReorderDispatch {
        self.engine.unmount(&mut self.host)
    }
}
