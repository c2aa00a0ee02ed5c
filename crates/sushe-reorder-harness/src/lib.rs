#![forbid(unsafe_code)]

//! Deterministic host and fixtures for exercising `sushe-reorder`.
//!
//! # Role
//! Stands in for the browser: a scrollable [`layout::ListLayout`], a
//! [`host::RecordingHost`] that implements every collaborator trait and logs
//! each call, a [`rig::ReorderRig`] that owns the clock and delivers timer and
//! frame callbacks, and a seeded [`storm`] generator for fault injection.
//!
//! Nothing here touches a real clock or DOM; identical inputs produce
//! identical transcripts.

pub mod host;
pub mod layout;
pub mod rig;
pub mod storm;

pub use host::{HostCall, RecordingHost};
pub use layout::{CardHandle, ListLayout, SharedLayout};
pub use rig::{FRAME_INTERVAL, PRIMARY_TOUCH, ReorderRig};
pub use storm::{StormLogEntry, StormOp, StormReport, decode_storm, generate_storm, run_storm};
