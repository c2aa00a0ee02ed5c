//! Property-based tests for the auto-scroll speed curve.
//!
//! 1. Exactly zero strictly between the trigger zones
//! 2. Negative near the top, positive near the bottom
//! 3. Magnitude non-decreasing toward the edge
//! 4. Magnitude never exceeds the policy cap

use proptest::prelude::*;
use sushe_reorder::{ContainerBounds, ScrollPolicy, calc_scroll_speed, scroll_speed};

const ZONE: f64 = 60.0;

fn bounds_strategy() -> impl Strategy<Value = (f64, f64)> {
    // Tall enough that the two zones never overlap.
    (-500.0f64..500.0, 300.0f64..3000.0).prop_map(|(top, height)| (top, top + height))
}

fn policy_strategy() -> impl Strategy<Value = ScrollPolicy> {
    prop_oneof![
        (10.0f64..120.0, 1.0f64..40.0)
            .prop_map(|(zone, max_speed)| ScrollPolicy::FixedZone { zone, max_speed }),
        (0.05f64..0.4, 1.0f64..40.0, 0.0f64..30.0, 1.0f64..3.0).prop_map(
            |(fraction, max_speed, edge_boost_zone, edge_boost)| ScrollPolicy::ViewportFraction {
                fraction,
                max_speed,
                edge_boost_zone,
                edge_boost,
                ramp_frames: 10,
            }
        ),
    ]
}

fn max_speed(policy: &ScrollPolicy) -> f64 {
    match *policy {
        ScrollPolicy::FixedZone { max_speed, .. }
        | ScrollPolicy::ViewportFraction { max_speed, .. } => max_speed,
    }
}

proptest! {
    #[test]
    fn zero_between_zones((top, bottom) in bounds_strategy(), t in 0.0f64..1.0) {
        let lo = top + ZONE;
        let hi = bottom - ZONE;
        let y = lo + (hi - lo) * t;
        prop_assume!(y > lo && y < hi);
        prop_assert_eq!(calc_scroll_speed(y, top, bottom), 0.0);
    }

    #[test]
    fn sign_matches_edge((top, bottom) in bounds_strategy(), depth in 0.0f64..59.0) {
        prop_assert!(calc_scroll_speed(top + depth, top, bottom) < 0.0);
        prop_assert!(calc_scroll_speed(bottom - depth, top, bottom) > 0.0);
    }

    #[test]
    fn magnitude_grows_toward_edge(
        (top, bottom) in bounds_strategy(),
        policy in policy_strategy(),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let bounds = ContainerBounds::new(top, bottom);
        let zone = policy.zone_height(bounds.height());
        let (near, far) = if a <= b { (a, b) } else { (b, a) };

        let top_near = scroll_speed(&policy, top + near * zone, bounds);
        let top_far = scroll_speed(&policy, top + far * zone, bounds);
        prop_assert!(top_near <= top_far);
        prop_assert!(top_near <= 0.0);

        let bottom_near = scroll_speed(&policy, bottom - near * zone, bounds);
        let bottom_far = scroll_speed(&policy, bottom - far * zone, bounds);
        prop_assert!(bottom_near >= bottom_far);
        prop_assert!(bottom_near >= 0.0);
    }

    #[test]
    fn magnitude_is_capped(
        (top, bottom) in bounds_strategy(),
        policy in policy_strategy(),
        y in -5000.0f64..5000.0,
    ) {
        let speed = scroll_speed(&policy, y, ContainerBounds::new(top, bottom));
        prop_assert!(speed.abs() <= max_speed(&policy) + 1e-9);
    }
}
