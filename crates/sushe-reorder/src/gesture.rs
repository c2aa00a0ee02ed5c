#![forbid(unsafe_code)]

//! Long-press gesture recognition: tells a scroll or tap apart from a
//! press-and-hold that should start a drag.
//!
//! # State Machine
//!
//! ```text
//!            touch_start                 timer / poll
//!   Idle ───────────────▶ Pending ───────────────────▶ Dragging
//!    ▲                      │                            │
//!    │  move > cancel dist, │ touch end/cancel           │ touch end/cancel,
//!    │  touch end/cancel    │                            │ teardown
//!    └──────────────────────┴────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. Single pointer: a touch start while pending or dragging is ignored.
//! 2. Once a pending press is cancelled it cannot activate, even if the
//!    finger then holds still past the long-press duration.
//! 3. Document listeners are attached on touch start and detached on every
//!    path back to `Idle`; [`GestureRecognizer::teardown`] is idempotent.
//! 4. While pending, nothing calls `preventDefault()`, so native scrolling
//!    keeps working until the drag is confirmed.

use std::time::Duration;

use web_time::Instant;

use crate::dispatch::{CancelReason, IgnoredReason};
use crate::geometry::Point;
use crate::host::{ListenerRegistry, TimerId, TimerScheduler};

/// One touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    /// Platform touch identifier.
    pub id: u32,
    pub point: Point,
}

impl Touch {
    #[must_use]
    pub const fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            point: Point::new(x, y),
        }
    }
}

/// A press that has not yet reached the long-press duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingGesture {
    /// Slot the press started on.
    pub index: usize,
    pub touch_id: u32,
    pub start: Point,
    pub start_time: Instant,
    /// Latest position reported while pending.
    pub last: Point,
    timer: Option<TimerId>,
}

/// The recognizer's commit: a long press that should become a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation {
    pub index: usize,
    pub touch_id: u32,
    /// Current touch point at the moment the press elapsed.
    pub point: Point,
    pub held: Duration,
}

/// What a move event meant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveVerdict {
    /// Still inside the cancel radius.
    Pending,
    /// The press turned into a scroll.
    Cancelled(CancelReason),
    /// A drag owns this touch; forward the point.
    Drag(Point),
    Ignored(IgnoredReason),
}

/// What a touch end or cancel meant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndVerdict {
    /// A pending press ended without activating.
    Cancelled(CancelReason),
    /// The drag's finger lifted.
    Release,
    /// The platform cancelled the drag's touch.
    DragCancelled,
    Ignored(IgnoredReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureState {
    Idle,
    Pending(PendingGesture),
    Dragging { touch_id: u32 },
}

/// Tracks whether document listeners are attached.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ListenerGuard {
    attached: bool,
}

impl ListenerGuard {
    fn attach<H: ListenerRegistry + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            host.subscribe_document_touch();
            self.attached = true;
        }
    }

    fn release<H: ListenerRegistry + ?Sized>(&mut self, host: &mut H) {
        if self.attached {
            host.unsubscribe_document_touch();
            self.attached = false;
        }
    }
}

/// Long-press recognizer for a single pointer.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    long_press: Duration,
    cancel_distance: f64,
    state: GestureState,
    listeners: ListenerGuard,
}

impl GestureRecognizer {
    #[must_use]
    pub fn new(long_press: Duration, cancel_distance: f64) -> Self {
        Self {
            long_press,
            cancel_distance,
            state: GestureState::Idle,
            listeners: ListenerGuard::default(),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, GestureState::Pending(_))
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// The pending press, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingGesture> {
        match &self.state {
            GestureState::Pending(pending) => Some(pending),
            _ => None,
        }
    }

    /// Whether document listeners are currently attached.
    #[must_use]
    pub fn listeners_attached(&self) -> bool {
        self.listeners.attached
    }

    /// Begin timing a press on slot `index`.
    pub fn touch_start<H>(
        &mut self,
        index: usize,
        touch: Touch,
        now: Instant,
        host: &mut H,
    ) -> Result<(), IgnoredReason>
    where
        H: ListenerRegistry + TimerScheduler + ?Sized,
    {
        if !self.is_idle() {
            return Err(IgnoredReason::GestureInProgress);
        }
        let timer = host.set_timeout(self.long_press);
        self.listeners.attach(host);
        self.state = GestureState::Pending(PendingGesture {
            index,
            touch_id: touch.id,
            start: touch.point,
            start_time: now,
            last: touch.point,
            timer: Some(timer),
        });
        tracing::debug!(index, touch = touch.id, "long press pending");
        Ok(())
    }

    /// Feed a document-level move.
    pub fn touch_move<H>(&mut self, touch: Touch, host: &mut H) -> MoveVerdict
    where
        H: ListenerRegistry + TimerScheduler + ?Sized,
    {
        match &mut self.state {
            GestureState::Idle => MoveVerdict::Ignored(IgnoredReason::NoGesture),
            GestureState::Pending(pending) => {
                if pending.touch_id != touch.id {
                    return MoveVerdict::Ignored(IgnoredReason::TouchMismatch);
                }
                let distance = pending.start.distance(touch.point);
                if distance > self.cancel_distance {
                    let reason = CancelReason::MovedBeyondThreshold { distance };
                    tracing::debug!(distance, "long press cancelled by movement");
                    self.teardown(host);
                    return MoveVerdict::Cancelled(reason);
                }
                pending.last = touch.point;
                MoveVerdict::Pending
            }
            GestureState::Dragging { touch_id } => {
                if *touch_id != touch.id {
                    return MoveVerdict::Ignored(IgnoredReason::TouchMismatch);
                }
                MoveVerdict::Drag(touch.point)
            }
        }
    }

    /// The host reports that timer `id` fired.
    pub fn timer_fired(&mut self, id: TimerId, now: Instant) -> Result<Activation, IgnoredReason> {
        match self.state {
            GestureState::Pending(pending) if pending.timer == Some(id) => {
                Ok(self.commit(pending, now))
            }
            GestureState::Idle => Err(IgnoredReason::NoGesture),
            _ => Err(IgnoredReason::StaleCallback),
        }
    }

    /// Poll for an elapsed long press without relying on the timer.
    pub fn check_long_press<H>(
        &mut self,
        now: Instant,
        host: &mut H,
    ) -> Result<Activation, IgnoredReason>
    where
        H: TimerScheduler + ?Sized,
    {
        let GestureState::Pending(pending) = self.state else {
            return Err(IgnoredReason::NoGesture);
        };
        if now.saturating_duration_since(pending.start_time) < self.long_press {
            return Err(IgnoredReason::NotYetElapsed);
        }
        if let Some(timer) = pending.timer {
            host.clear_timeout(timer);
        }
        Ok(self.commit(pending, now))
    }

    fn commit(&mut self, pending: PendingGesture, now: Instant) -> Activation {
        self.state = GestureState::Dragging {
            touch_id: pending.touch_id,
        };
        let held = now.saturating_duration_since(pending.start_time);
        tracing::debug!(index = pending.index, held_ms = held.as_millis() as u64, "long press elapsed");
        Activation {
            index: pending.index,
            touch_id: pending.touch_id,
            point: pending.last,
            held,
        }
    }

    /// Feed a touch end (`cancelled = false`) or touch cancel.
    ///
    /// `touch_id` of `None` matches whichever touch owns the gesture.
    pub fn touch_end<H>(&mut self, touch_id: Option<u32>, cancelled: bool, host: &mut H) -> EndVerdict
    where
        H: ListenerRegistry + TimerScheduler + ?Sized,
    {
        let owner = match self.state {
            GestureState::Idle => return EndVerdict::Ignored(IgnoredReason::NoGesture),
            GestureState::Pending(pending) => pending.touch_id,
            GestureState::Dragging { touch_id } => touch_id,
        };
        if touch_id.is_some_and(|id| id != owner) {
            return EndVerdict::Ignored(IgnoredReason::TouchMismatch);
        }

        let was_dragging = self.is_dragging();
        self.teardown(host);
        match (was_dragging, cancelled) {
            (true, false) => EndVerdict::Release,
            (true, true) => EndVerdict::DragCancelled,
            (false, false) => EndVerdict::Cancelled(CancelReason::ReleasedEarly),
            (false, true) => EndVerdict::Cancelled(CancelReason::TouchCancelled),
        }
    }

    /// Return to `Idle`, clearing the timer and detaching listeners.
    ///
    /// Safe to call any number of times.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: ListenerRegistry + TimerScheduler + ?Sized,
    {
        if let GestureState::Pending(PendingGesture {
            timer: Some(timer), ..
        }) = self.state
        {
            host.clear_timeout(timer);
        }
        self.listeners.release(host);
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeHost {
        subscribed: i32,
        subscribe_calls: u32,
        next_timer: u64,
        live_timers: Vec<TimerId>,
    }

    impl ListenerRegistry for FakeHost {
        fn subscribe_document_touch(&mut self) {
            self.subscribed += 1;
            self.subscribe_calls += 1;
        }

        fn unsubscribe_document_touch(&mut self) {
            self.subscribed -= 1;
        }
    }

    impl TimerScheduler for FakeHost {
        fn set_timeout(&mut self, _delay: Duration) -> TimerId {
            self.next_timer += 1;
            let id = TimerId(self.next_timer);
            self.live_timers.push(id);
            id
        }

        fn clear_timeout(&mut self, id: TimerId) {
            self.live_timers.retain(|t| *t != id);
        }
    }

    const MS_100: Duration = Duration::from_millis(100);
    const MS_500: Duration = Duration::from_millis(500);

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(Duration::from_millis(480), 10.0)
    }

    #[test]
    fn touch_start_arms_timer_and_listeners() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        gr.touch_start(2, Touch::new(1, 100.0, 100.0), Instant::now(), &mut host)
            .unwrap();
        assert!(gr.is_pending());
        assert!(gr.listeners_attached());
        assert_eq!(host.subscribed, 1);
        assert_eq!(host.live_timers, vec![TimerId(1)]);
        assert_eq!(gr.pending().map(|p| p.index), Some(2));
    }

    #[test]
    fn timer_commits_with_latest_point() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(0, Touch::new(1, 100.0, 100.0), t, &mut host)
            .unwrap();
        assert_eq!(
            gr.touch_move(Touch::new(1, 103.0, 104.0), &mut host),
            MoveVerdict::Pending
        );
        let activation = gr.timer_fired(TimerId(1), t + MS_500).unwrap();
        assert_eq!(activation.point, Point::new(103.0, 104.0));
        assert_eq!(activation.held, MS_500);
        assert!(gr.is_dragging());
        // Listeners stay attached for the drag.
        assert_eq!(host.subscribed, 1);
    }

    #[test]
    fn movement_beyond_threshold_cancels() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(0, Touch::new(1, 100.0, 100.0), t, &mut host)
            .unwrap();
        let verdict = gr.touch_move(Touch::new(1, 100.0, 112.0), &mut host);
        assert_eq!(
            verdict,
            MoveVerdict::Cancelled(CancelReason::MovedBeyondThreshold { distance: 12.0 })
        );
        assert!(gr.is_idle());
        assert_eq!(host.subscribed, 0);
        assert!(host.live_timers.is_empty());
        // A late timer callback cannot revive it.
        assert_eq!(
            gr.timer_fired(TimerId(1), t + MS_500),
            Err(IgnoredReason::NoGesture)
        );
        assert_eq!(
            gr.check_long_press(t + MS_500, &mut host),
            Err(IgnoredReason::NoGesture)
        );
    }

    #[test]
    fn movement_at_threshold_keeps_pending() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        gr.touch_start(0, Touch::new(1, 100.0, 100.0), Instant::now(), &mut host)
            .unwrap();
        assert_eq!(
            gr.touch_move(Touch::new(1, 100.0, 110.0), &mut host),
            MoveVerdict::Pending
        );
    }

    #[test]
    fn early_release_never_activates() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(0, Touch::new(1, 100.0, 100.0), t, &mut host)
            .unwrap();
        assert_eq!(
            gr.touch_end(Some(1), false, &mut host),
            EndVerdict::Cancelled(CancelReason::ReleasedEarly)
        );
        assert!(host.live_timers.is_empty());
        assert_eq!(host.subscribed, 0);
        assert!(gr.check_long_press(t + MS_500, &mut host).is_err());
    }

    #[test]
    fn second_touch_start_is_ignored() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(0, Touch::new(1, 100.0, 100.0), t, &mut host)
            .unwrap();
        assert_eq!(
            gr.touch_start(3, Touch::new(2, 50.0, 300.0), t, &mut host),
            Err(IgnoredReason::GestureInProgress)
        );
        assert_eq!(host.subscribe_calls, 1);
        assert_eq!(host.live_timers.len(), 1);
    }

    #[test]
    fn foreign_touch_is_ignored() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        gr.touch_start(0, Touch::new(1, 100.0, 100.0), Instant::now(), &mut host)
            .unwrap();
        assert_eq!(
            gr.touch_move(Touch::new(7, 300.0, 300.0), &mut host),
            MoveVerdict::Ignored(IgnoredReason::TouchMismatch)
        );
        assert_eq!(
            gr.touch_end(Some(7), false, &mut host),
            EndVerdict::Ignored(IgnoredReason::TouchMismatch)
        );
        assert!(gr.is_pending());
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(0, Touch::new(1, 0.0, 0.0), t, &mut host)
            .unwrap();
        assert_eq!(
            gr.timer_fired(TimerId(42), t + MS_500),
            Err(IgnoredReason::StaleCallback)
        );
        assert!(gr.is_pending());
    }

    #[test]
    fn poll_respects_duration() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(0, Touch::new(1, 0.0, 0.0), t, &mut host)
            .unwrap();
        assert_eq!(
            gr.check_long_press(t + MS_100, &mut host),
            Err(IgnoredReason::NotYetElapsed)
        );
        let activation = gr.check_long_press(t + MS_500, &mut host).unwrap();
        assert_eq!(activation.index, 0);
        assert!(host.live_timers.is_empty());
        assert_eq!(
            gr.check_long_press(t + MS_500, &mut host),
            Err(IgnoredReason::NoGesture)
        );
    }

    #[test]
    fn drag_release_and_cancel_verdicts() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(0, Touch::new(1, 0.0, 0.0), t, &mut host)
            .unwrap();
        gr.timer_fired(TimerId(1), t + MS_500).unwrap();
        assert_eq!(
            gr.touch_move(Touch::new(1, 0.0, 200.0), &mut host),
            MoveVerdict::Drag(Point::new(0.0, 200.0))
        );
        assert_eq!(gr.touch_end(None, false, &mut host), EndVerdict::Release);
        assert_eq!(host.subscribed, 0);

        gr.touch_start(0, Touch::new(2, 0.0, 0.0), t, &mut host)
            .unwrap();
        gr.timer_fired(TimerId(2), t + MS_500).unwrap();
        assert_eq!(gr.touch_end(None, true, &mut host), EndVerdict::DragCancelled);
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        gr.touch_start(0, Touch::new(1, 0.0, 0.0), Instant::now(), &mut host)
            .unwrap();
        gr.teardown(&mut host);
        gr.teardown(&mut host);
        assert_eq!(host.subscribed, 0);
        assert!(host.live_timers.is_empty());
        assert!(gr.is_idle());
    }

    #[test]
    #[tracing_test::traced_test]
    fn lifecycle_is_logged() {
        let mut gr = recognizer();
        let mut host = FakeHost::default();
        let t = Instant::now();
        gr.touch_start(3, Touch::new(1, 0.0, 0.0), t, &mut host)
            .unwrap();
        assert!(logs_contain("long press pending"));
        gr.touch_move(Touch::new(1, 0.0, 40.0), &mut host);
        assert!(logs_contain("long press cancelled by movement"));
        assert!(!logs_contain("long press elapsed"));
    }
}
