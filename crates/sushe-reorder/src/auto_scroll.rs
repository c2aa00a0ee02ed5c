#![forbid(unsafe_code)]

//! Edge auto-scroll: speed curve and the per-frame scroll loop.
//!
//! [`scroll_speed`] maps a touch position to a signed px-per-frame speed:
//! negative inside the top trigger zone, positive inside the bottom one, zero
//! elsewhere, with magnitude growing toward the edge.
//!
//! [`AutoScrollLoop`] drives the container at animation-frame cadence. It is
//! started once at drag activation and consumed by [`AutoScrollLoop::stop`],
//! so a session can stop it exactly once.
//!
//! # Invariants
//!
//! 1. A zero speed never writes to the container.
//! 2. At most one frame request is outstanding per loop.
//! 3. Frames with a stale id are ignored.

use crate::config::ScrollPolicy;
use crate::geometry::ContainerBounds;
use crate::host::{FrameId, FrameScheduler, ScrollContainer};

/// Speed for the default fixed-zone policy (60 px zone, 8 px/frame).
#[must_use]
pub fn calc_scroll_speed(touch_y: f64, container_top: f64, container_bottom: f64) -> f64 {
    scroll_speed(
        &ScrollPolicy::default(),
        touch_y,
        ContainerBounds::new(container_top, container_bottom),
    )
}

/// Signed scroll speed (px/frame) for `touch_y` against frozen bounds.
///
/// A touch beyond an edge counts as full penetration. When the container is
/// shorter than two zones the top zone wins.
#[must_use]
pub fn scroll_speed(policy: &ScrollPolicy, touch_y: f64, bounds: ContainerBounds) -> f64 {
    if !touch_y.is_finite() {
        return 0.0;
    }
    let zone = policy.zone_height(bounds.height());
    if zone <= 0.0 {
        return 0.0;
    }

    let from_top = touch_y - bounds.top;
    if from_top < zone {
        return -magnitude(policy, from_top, zone);
    }
    let from_bottom = bounds.bottom - touch_y;
    if from_bottom < zone {
        return magnitude(policy, from_bottom, zone);
    }
    0.0
}

fn magnitude(policy: &ScrollPolicy, edge_distance: f64, zone: f64) -> f64 {
    let depth = (1.0 - edge_distance / zone).clamp(0.0, 1.0);
    match *policy {
        ScrollPolicy::FixedZone { max_speed, .. } => max_speed * depth,
        ScrollPolicy::ViewportFraction {
            max_speed,
            edge_boost_zone,
            edge_boost,
            ..
        } => {
            let mut speed = max_speed * depth * depth;
            if edge_distance < edge_boost_zone {
                speed *= edge_boost;
            }
            speed.min(max_speed)
        }
    }
}

/// Counters accumulated over one loop's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutoScrollStats {
    /// Frames delivered to the loop.
    pub frames: u64,
    /// Frames that wrote a scroll delta.
    pub scrolled_frames: u64,
    /// Sum of deltas actually applied by the container.
    pub total_delta: f64,
}

/// A running auto-scroll loop.
#[derive(Debug)]
pub struct AutoScrollLoop {
    pending: Option<FrameId>,
    target_speed: f64,
    ramp_frames: u32,
    frames_in_zone: u32,
    stats: AutoScrollStats,
}

impl AutoScrollLoop {
    /// Start the loop by requesting its first frame.
    pub fn start<S: FrameScheduler + ?Sized>(scheduler: &mut S, ramp_frames: u32) -> Self {
        let frame = scheduler.request_frame();
        tracing::trace!(frame = frame.0, "auto-scroll loop started");
        Self {
            pending: Some(frame),
            target_speed: 0.0,
            ramp_frames,
            frames_in_zone: 0,
            stats: AutoScrollStats::default(),
        }
    }

    /// Set the speed the next frames should apply.
    ///
    /// Leaving a zone, or switching to the opposite one, restarts the ramp.
    pub fn set_target_speed(&mut self, speed: f64) {
        let speed = if speed.is_finite() { speed } else { 0.0 };
        if speed == 0.0 || speed.signum() != self.target_speed.signum() {
            self.frames_in_zone = 0;
        }
        self.target_speed = speed;
    }

    #[must_use]
    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    /// Target speed scaled by the ramp-up factor.
    #[must_use]
    pub fn effective_speed(&self) -> f64 {
        if self.ramp_frames == 0 || self.target_speed == 0.0 {
            return self.target_speed;
        }
        let ramp = (f64::from(self.frames_in_zone) + 1.0) / f64::from(self.ramp_frames);
        self.target_speed * ramp.min(1.0)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> AutoScrollStats {
        self.stats
    }

    /// Handle one animation frame.
    ///
    /// Returns `None` for a frame this loop did not request, otherwise the
    /// delta the container applied (0 when idle). Always re-arms the next
    /// frame.
    pub fn on_frame<H>(&mut self, frame: FrameId, host: &mut H) -> Option<f64>
    where
        H: ScrollContainer + FrameScheduler + ?Sized,
    {
        if self.pending != Some(frame) {
            return None;
        }
        self.stats.frames += 1;

        let speed = self.effective_speed();
        let mut applied = 0.0;
        if speed != 0.0 {
            applied = host.scroll_by(speed);
            self.frames_in_zone = self.frames_in_zone.saturating_add(1);
            if applied != 0.0 {
                self.stats.scrolled_frames += 1;
                self.stats.total_delta += applied;
            }
            tracing::trace!(speed, applied, "auto-scroll frame");
        }

        self.pending = Some(host.request_frame());
        Some(applied)
    }

    /// Cancel the outstanding frame and return the loop's counters.
    pub fn stop<S: FrameScheduler + ?Sized>(mut self, scheduler: &mut S) -> AutoScrollStats {
        if let Some(frame) = self.pending.take() {
            scheduler.cancel_frame(frame);
        }
        tracing::trace!(frames = self.stats.frames, "auto-scroll loop stopped");
        self.stats
    }
}

impl Drop for AutoScrollLoop {
    fn drop(&mut self) {
        if let Some(frame) = self.pending {
            tracing::warn!(frame = frame.0, "auto-scroll loop dropped without stop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[derive(Default)]
    struct FakeContainer {
        scroll_top: f64,
        max_scroll: f64,
        next_frame: u64,
        requested: Vec<FrameId>,
        cancelled: Vec<FrameId>,
        writes: usize,
    }

    impl FrameScheduler for FakeContainer {
        fn request_frame(&mut self) -> FrameId {
            self.next_frame += 1;
            let id = FrameId(self.next_frame);
            self.requested.push(id);
            id
        }

        fn cancel_frame(&mut self, id: FrameId) {
            self.cancelled.push(id);
        }
    }

    impl ScrollContainer for FakeContainer {
        fn container_rect(&self) -> Option<Rect> {
            Some(Rect::new(0.0, 0.0, 400.0, 500.0))
        }

        fn scroll_top(&self) -> f64 {
            self.scroll_top
        }

        fn scroll_by(&mut self, dy: f64) -> f64 {
            self.writes += 1;
            let before = self.scroll_top;
            self.scroll_top = (self.scroll_top + dy).clamp(0.0, self.max_scroll);
            self.scroll_top - before
        }

        fn set_native_scroll_locked(&mut self, _locked: bool) {}
    }

    fn container() -> FakeContainer {
        FakeContainer {
            max_scroll: 1000.0,
            scroll_top: 100.0,
            ..FakeContainer::default()
        }
    }

    #[test]
    fn fixed_zone_sign_and_dead_band() {
        assert!(calc_scroll_speed(5.0, 0.0, 500.0) < 0.0);
        assert_eq!(calc_scroll_speed(250.0, 0.0, 500.0), 0.0);
        assert!(calc_scroll_speed(495.0, 0.0, 500.0) > 0.0);
        assert_eq!(calc_scroll_speed(60.0, 0.0, 500.0), 0.0);
        assert_eq!(calc_scroll_speed(440.0, 0.0, 500.0), 0.0);
    }

    #[test]
    fn fixed_zone_is_linear_and_capped() {
        assert_eq!(calc_scroll_speed(0.0, 0.0, 500.0), -8.0);
        assert_eq!(calc_scroll_speed(30.0, 0.0, 500.0), -4.0);
        assert_eq!(calc_scroll_speed(470.0, 0.0, 500.0), 4.0);
        assert_eq!(calc_scroll_speed(500.0, 0.0, 500.0), 8.0);
        // Beyond the edges counts as full depth.
        assert_eq!(calc_scroll_speed(-40.0, 0.0, 500.0), -8.0);
        assert_eq!(calc_scroll_speed(900.0, 0.0, 500.0), 8.0);
    }

    #[test]
    fn zones_follow_container_offset() {
        assert_eq!(calc_scroll_speed(5.0, 56.0, 656.0), -8.0);
        assert_eq!(calc_scroll_speed(86.0, 56.0, 656.0), -4.0);
        assert_eq!(calc_scroll_speed(300.0, 56.0, 656.0), 0.0);
    }

    #[test]
    fn non_finite_touch_is_idle() {
        assert_eq!(calc_scroll_speed(f64::NAN, 0.0, 500.0), 0.0);
    }

    #[test]
    fn viewport_policy_boosts_near_edge() {
        let policy = ScrollPolicy::VIEWPORT_DEFAULT;
        let bounds = ContainerBounds::new(0.0, 500.0);
        // Zone is 100px; edge band is 20px.
        assert_eq!(scroll_speed(&policy, 150.0, bounds), 0.0);
        let outside_band = scroll_speed(&policy, 30.0, bounds);
        let inside_band = scroll_speed(&policy, 19.0, bounds);
        assert!(outside_band < 0.0);
        assert!(inside_band < outside_band);
        assert_eq!(scroll_speed(&policy, 0.0, bounds), -30.0);
        assert_eq!(scroll_speed(&policy, 500.0, bounds), 30.0);
    }

    #[test]
    fn loop_requests_first_frame_on_start() {
        let mut host = container();
        let scroll = AutoScrollLoop::start(&mut host, 0);
        assert!(scroll.is_running());
        assert_eq!(host.requested, vec![FrameId(1)]);
        scroll.stop(&mut host);
    }

    #[test]
    fn zero_speed_frame_does_not_write() {
        let mut host = container();
        let mut scroll = AutoScrollLoop::start(&mut host, 0);
        assert_eq!(scroll.on_frame(FrameId(1), &mut host), Some(0.0));
        assert_eq!(host.writes, 0);
        assert_eq!(host.requested.len(), 2);
        scroll.stop(&mut host);
    }

    #[test]
    fn frames_apply_target_speed() {
        let mut host = container();
        let mut scroll = AutoScrollLoop::start(&mut host, 0);
        scroll.set_target_speed(-8.0);
        assert_eq!(scroll.on_frame(FrameId(1), &mut host), Some(-8.0));
        assert_eq!(scroll.on_frame(FrameId(2), &mut host), Some(-8.0));
        assert_eq!(host.scroll_top, 84.0);
        let stats = scroll.stop(&mut host);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.scrolled_frames, 2);
        assert_eq!(stats.total_delta, -16.0);
    }

    #[test]
    fn stale_frame_is_ignored() {
        let mut host = container();
        let mut scroll = AutoScrollLoop::start(&mut host, 0);
        scroll.set_target_speed(4.0);
        assert_eq!(scroll.on_frame(FrameId(99), &mut host), None);
        assert_eq!(host.writes, 0);
        scroll.stop(&mut host);
    }

    #[test]
    fn clamped_scroll_reports_applied_delta() {
        let mut host = container();
        host.scroll_top = 3.0;
        let mut scroll = AutoScrollLoop::start(&mut host, 0);
        scroll.set_target_speed(-8.0);
        assert_eq!(scroll.on_frame(FrameId(1), &mut host), Some(-3.0));
        assert_eq!(scroll.on_frame(FrameId(2), &mut host), Some(0.0));
        let stats = scroll.stop(&mut host);
        assert_eq!(stats.scrolled_frames, 1);
    }

    #[test]
    fn stop_cancels_outstanding_frame() {
        let mut host = container();
        let mut scroll = AutoScrollLoop::start(&mut host, 0);
        scroll.on_frame(FrameId(1), &mut host);
        scroll.stop(&mut host);
        assert_eq!(host.cancelled, vec![FrameId(2)]);
    }

    #[test]
    fn ramp_scales_early_frames() {
        let mut host = container();
        let mut scroll = AutoScrollLoop::start(&mut host, 4);
        scroll.set_target_speed(8.0);
        assert_eq!(scroll.effective_speed(), 2.0);
        scroll.on_frame(FrameId(1), &mut host);
        assert_eq!(scroll.effective_speed(), 4.0);
        scroll.on_frame(FrameId(2), &mut host);
        scroll.on_frame(FrameId(3), &mut host);
        assert_eq!(scroll.effective_speed(), 8.0);
        // Flipping direction restarts the ramp.
        scroll.set_target_speed(-8.0);
        assert_eq!(scroll.effective_speed(), -2.0);
        scroll.stop(&mut host);
    }
}
