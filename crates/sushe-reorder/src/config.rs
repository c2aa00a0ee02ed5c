#![forbid(unsafe_code)]

//! Thresholds, timings, and auto-scroll tuning for the reorder engine.

use std::time::Duration;

use thiserror::Error;

/// Hold duration before a stationary touch turns into a drag.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(480);
/// Movement (Euclidean, px) that turns a pending press back into a scroll.
pub const DEFAULT_CANCEL_DISTANCE: f64 = 10.0;
/// Fraction of a neighbor's height the ghost center must pass to swap.
pub const DEFAULT_SWAP_THRESHOLD: f64 = 0.5;
/// Vibration pulse fired once on activation.
pub const DEFAULT_HAPTIC_PULSE: Duration = Duration::from_millis(50);

/// How the auto-scroll trigger zones and speeds are derived.
///
/// [`ScrollPolicy::FixedZone`] is the default. The two policies are
/// alternatives; a host picks exactly one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ScrollPolicy {
    /// Fixed-height zone at each edge, speed linear in penetration depth.
    FixedZone {
        /// Zone height in px.
        zone: f64,
        /// Speed at the very edge, px per frame.
        max_speed: f64,
    },
    /// Zone sized as a fraction of the container height, quadratic speed
    /// curve, a boost inside a thin band at the edge, and a ramp-up over the
    /// first frames spent in a zone.
    ViewportFraction {
        /// Zone height as a fraction of the container height.
        fraction: f64,
        /// Speed cap, px per frame.
        max_speed: f64,
        /// Band (px) at the very edge where `edge_boost` applies.
        edge_boost_zone: f64,
        /// Multiplier applied inside the edge band (>= 1).
        edge_boost: f64,
        /// Frames over which speed ramps from a fraction up to full.
        ramp_frames: u32,
    },
}

impl ScrollPolicy {
    /// The fixed 60 px zone with an 8 px/frame cap.
    pub const FIXED_DEFAULT: Self = Self::FixedZone {
        zone: 60.0,
        max_speed: 8.0,
    };

    /// The 20%-of-viewport zone with up to 30 px/frame.
    pub const VIEWPORT_DEFAULT: Self = Self::ViewportFraction {
        fraction: 0.2,
        max_speed: 30.0,
        edge_boost_zone: 20.0,
        edge_boost: 1.5,
        ramp_frames: 10,
    };

    /// Trigger zone height for a container of the given height.
    #[must_use]
    pub fn zone_height(&self, container_height: f64) -> f64 {
        match *self {
            Self::FixedZone { zone, .. } => zone,
            Self::ViewportFraction { fraction, .. } => container_height.max(0.0) * fraction,
        }
    }

    /// Number of frames the speed ramps over (0 = no ramp).
    #[must_use]
    pub const fn ramp_frames(&self) -> u32 {
        match *self {
            Self::FixedZone { .. } => 0,
            Self::ViewportFraction { ramp_frames, .. } => ramp_frames,
        }
    }
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self::FIXED_DEFAULT
    }
}

/// Reasons a [`ReorderConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("long-press duration must be non-zero")]
    ZeroLongPress,
    #[error("cancel distance must be finite and non-negative, got {0}")]
    InvalidCancelDistance(f64),
    #[error("swap threshold must be in (0, 1], got {0}")]
    InvalidSwapThreshold(f64),
    #[error("scroll zone must be finite and positive, got {0}")]
    InvalidScrollZone(f64),
    #[error("max scroll speed must be finite and positive, got {0}")]
    InvalidScrollSpeed(f64),
    #[error("edge boost must be finite and at least 1, got {0}")]
    InvalidEdgeBoost(f64),
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReorderConfig {
    /// Hold duration before activation (default: 480ms).
    pub long_press: Duration,
    /// Euclidean movement that cancels a pending press (default: 10px).
    pub cancel_distance: f64,
    /// Neighbor-height fraction the ghost center must cross (default: 0.5).
    pub swap_threshold: f64,
    /// Haptic pulse on activation (default: 50ms).
    pub haptic_pulse: Duration,
    /// Auto-scroll policy (default: fixed 60px zone, 8px/frame).
    pub scroll_policy: ScrollPolicy,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            long_press: DEFAULT_LONG_PRESS,
            cancel_distance: DEFAULT_CANCEL_DISTANCE,
            swap_threshold: DEFAULT_SWAP_THRESHOLD,
            haptic_pulse: DEFAULT_HAPTIC_PULSE,
            scroll_policy: ScrollPolicy::default(),
        }
    }
}

impl ReorderConfig {
    #[must_use]
    pub fn with_long_press(mut self, long_press: Duration) -> Self {
        self.long_press = long_press;
        self
    }

    #[must_use]
    pub fn with_cancel_distance(mut self, px: f64) -> Self {
        self.cancel_distance = px;
        self
    }

    #[must_use]
    pub fn with_swap_threshold(mut self, fraction: f64) -> Self {
        self.swap_threshold = fraction;
        self
    }

    #[must_use]
    pub fn with_haptic_pulse(mut self, pulse: Duration) -> Self {
        self.haptic_pulse = pulse;
        self
    }

    #[must_use]
    pub fn with_scroll_policy(mut self, policy: ScrollPolicy) -> Self {
        self.scroll_policy = policy;
        self
    }

    /// Check every threshold for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.long_press.is_zero() {
            return Err(ConfigError::ZeroLongPress);
        }
        if !self.cancel_distance.is_finite() || self.cancel_distance < 0.0 {
            return Err(ConfigError::InvalidCancelDistance(self.cancel_distance));
        }
        if !(self.swap_threshold > 0.0 && self.swap_threshold <= 1.0) {
            return Err(ConfigError::InvalidSwapThreshold(self.swap_threshold));
        }
        match self.scroll_policy {
            ScrollPolicy::FixedZone { zone, max_speed } => {
                check_positive(zone, ConfigError::InvalidScrollZone)?;
                check_positive(max_speed, ConfigError::InvalidScrollSpeed)?;
            }
            ScrollPolicy::ViewportFraction {
                fraction,
                max_speed,
                edge_boost_zone,
                edge_boost,
                ..
            } => {
                if !(fraction > 0.0 && fraction <= 0.5) {
                    return Err(ConfigError::InvalidScrollZone(fraction));
                }
                check_positive(max_speed, ConfigError::InvalidScrollSpeed)?;
                if !edge_boost_zone.is_finite() || edge_boost_zone < 0.0 {
                    return Err(ConfigError::InvalidScrollZone(edge_boost_zone));
                }
                if !edge_boost.is_finite() || edge_boost < 1.0 {
                    return Err(ConfigError::InvalidEdgeBoost(edge_boost));
                }
            }
        }
        Ok(())
    }
}

fn check_positive(value: f64, err: fn(f64) -> ConfigError) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(err(value))
    }
}
