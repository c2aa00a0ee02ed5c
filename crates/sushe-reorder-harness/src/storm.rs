#![forbid(unsafe_code)]

//! Touch storm generator for fault-injection testing.
//!
//! Produces deterministic operation sequences that mix well-formed gestures
//! with the messy cases real devices send: foreign touch ids, stale timers,
//! early lifts, blur mid-drag, and list replacement during a drag.
//!
//! Operations decode from byte pairs, so fuzzers and the seeded generator
//! share one vocabulary.
//!
//! # JSONL Schema
//!
//! ```json
//! {"idx":0,"op":"press","slot":2,"outcome":"Pending","dragging":false}
//! {"idx":1,"op":"hold","ms":480,"outcome":"Activated { index: 2 }","dragging":true}
//! ```

use std::time::Duration;

use serde::Serialize;
use sushe_reorder::{DispatchOutcome, ReorderDispatch, Touch};

use crate::rig::ReorderRig;

/// Touch id of a second, unrelated finger.
pub const FOREIGN_TOUCH: u32 = 7;

/// One storm step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StormOp {
    /// Primary finger down on a slot.
    Press { slot: usize },
    /// Primary finger moves by a vertical offset.
    Nudge { dy: f64 },
    /// Primary finger jumps to an absolute y.
    MoveTo { y: f64 },
    /// A second finger moves.
    ForeignMove { y: f64 },
    /// Time passes; a live long-press timer fires if due.
    Hold { ms: u64 },
    /// Poll for an elapsed long press.
    Poll,
    /// Deliver animation frames.
    Frames { n: usize },
    Release,
    Cancel,
    /// A second finger lifts.
    ForeignEnd,
    Blur,
    /// The parent re-renders with the list rotated by one.
    Rotate,
}

impl StormOp {
    /// Decode one operation from a byte pair.
    ///
    /// `slots` and `height` bound slot indices and absolute positions.
    #[must_use]
    pub fn decode(op: u8, arg: u8, slots: usize, height: f64) -> Self {
        let unit = f64::from(arg) / 255.0;
        match op % 16 {
            0 | 1 => Self::Press {
                slot: usize::from(arg) % slots.max(1),
            },
            2..=4 => Self::Nudge {
                dy: (unit - 0.5) * 80.0,
            },
            5 | 6 => Self::MoveTo {
                y: unit * height * 1.2 - height * 0.1,
            },
            7 => Self::ForeignMove { y: unit * height },
            8 | 9 => Self::Hold {
                ms: u64::from(arg) * 4,
            },
            10 => Self::Poll,
            11 => Self::Frames {
                n: usize::from(arg % 12),
            },
            12 => Self::Release,
            13 => Self::Cancel,
            14 => {
                if arg % 2 == 0 {
                    Self::ForeignEnd
                } else {
                    Self::Blur
                }
            }
            _ => Self::Rotate,
        }
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Press { .. } => "press",
            Self::Nudge { .. } => "nudge",
            Self::MoveTo { .. } => "move_to",
            Self::ForeignMove { .. } => "foreign_move",
            Self::Hold { .. } => "hold",
            Self::Poll => "poll",
            Self::Frames { .. } => "frames",
            Self::Release => "release",
            Self::Cancel => "cancel",
            Self::ForeignEnd => "foreign_end",
            Self::Blur => "blur",
            Self::Rotate => "rotate",
        }
    }
}

/// Simple deterministic PRNG (xorshift64) for reproducible storms.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn next_u8(&mut self) -> u8 {
        (self.next() >> 24) as u8
    }
}

/// Generate `count` operations from `seed`.
#[must_use]
pub fn generate_storm(seed: u64, count: usize, slots: usize, height: f64) -> Vec<StormOp> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let op = rng.next_u8();
            let arg = rng.next_u8();
            StormOp::decode(op, arg, slots, height)
        })
        .collect()
}

/// Decode a raw byte stream into operations (pairs; a trailing byte is dropped).
#[must_use]
pub fn decode_storm(bytes: &[u8], slots: usize, height: f64) -> Vec<StormOp> {
    bytes
        .chunks_exact(2)
        .map(|pair| StormOp::decode(pair[0], pair[1], slots, height))
        .collect()
}

/// Apply one operation to a rig.
pub fn apply<I>(rig: &mut ReorderRig<I>, op: StormOp) -> Vec<ReorderDispatch>
where
    I: Clone + PartialEq + std::fmt::Debug,
{
    tracing::trace!(op = op.name(), "storm op");
    match op {
        StormOp::Press { slot } => vec![rig.press(slot)],
        StormOp::Nudge { dy } => {
            let finger = rig.finger();
            vec![rig.move_to(finger.x, finger.y + dy)]
        }
        StormOp::MoveTo { y } => vec![rig.move_to_y(y)],
        StormOp::ForeignMove { y } => {
            let x = rig.finger().x;
            vec![rig.touch_move(Touch::new(FOREIGN_TOUCH, x, y))]
        }
        StormOp::Hold { ms } => rig.hold(Duration::from_millis(ms)).into_iter().collect(),
        StormOp::Poll => {
            let now = rig.now();
            let (engine, host) = rig.parts();
            vec![engine.check_long_press(now, host)]
        }
        StormOp::Frames { n } => rig.run_frames(n),
        StormOp::Release => vec![rig.release()],
        StormOp::Cancel => vec![rig.cancel()],
        StormOp::ForeignEnd => {
            let (engine, host) = rig.parts();
            vec![engine.touch_end(Some(FOREIGN_TOUCH), host)]
        }
        StormOp::Blur => vec![rig.blur()],
        StormOp::Rotate => {
            let mut items = rig.engine().items().to_vec();
            if !items.is_empty() {
                items.rotate_left(1);
            }
            vec![rig.set_items(items)]
        }
    }
}

/// One applied storm step, for JSONL transcripts.
#[derive(Debug, Clone, Serialize)]
pub struct StormLogEntry {
    pub idx: usize,
    #[serde(flatten)]
    pub op: StormOp,
    pub outcome: String,
    pub dragging: bool,
}

impl StormLogEntry {
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Result of running a full storm.
#[derive(Debug, Clone, Default)]
pub struct StormReport {
    pub dispatches: usize,
    pub activations: usize,
    pub commits: usize,
    pub log: Vec<StormLogEntry>,
}

/// Apply every operation, logging one entry per dispatch.
pub fn run_storm<I>(rig: &mut ReorderRig<I>, ops: &[StormOp]) -> StormReport
where
    I: Clone + PartialEq + std::fmt::Debug,
{
    let mut report = StormReport::default();
    for (idx, &op) in ops.iter().enumerate() {
        for dispatch in apply(rig, op) {
            report.dispatches += 1;
            match dispatch.outcome {
                DispatchOutcome::Activated { .. } => report.activations += 1,
                DispatchOutcome::Released { committed: true } => {
                    report.commits += 1;
                }
                _ => {}
            }
            report.log.push(StormLogEntry {
                idx,
                op,
                outcome: format!("{:?}", dispatch.outcome),
                dragging: rig.engine().is_dragging(),
            });
        }
    }
    tracing::debug!(
        ops = ops.len(),
        dispatches = report.dispatches,
        activations = report.activations,
        commits = report.commits,
        "storm complete"
    );
    report
}

/// Release whatever is in flight, leaving the host idle.
pub fn settle<I>(rig: &mut ReorderRig<I>)
where
    I: Clone + PartialEq + std::fmt::Debug,
{
    rig.release();
    rig.blur();
}
