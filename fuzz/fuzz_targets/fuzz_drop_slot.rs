#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sushe_reorder::{
    ContainerBounds, Rect, ScrollPolicy, move_item, resolve_drop_index_with, scroll_speed,
};

#[derive(Debug, Arbitrary)]
struct Input {
    rects: Vec<(f64, f64, f64, f64)>,
    centers: Vec<f64>,
    start: usize,
    threshold: f64,
    top: f64,
    bottom: f64,
}

fuzz_target!(|input: Input| {
    // Cap sizes to keep fuzzing fast.
    if input.rects.len() > 256 || input.centers.len() > 512 {
        return;
    }
    let rects: Vec<Rect> = input
        .rects
        .iter()
        .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
        .collect();
    let threshold = if input.threshold.is_finite() {
        input.threshold.abs().fract()
    } else {
        0.5
    };

    let mut order: Vec<usize> = (0..rects.len()).collect();
    let mut drop = if rects.is_empty() { 0 } else { input.start % rects.len() };
    let dragged = order.get(drop).copied();

    for &center in &input.centers {
        let next = resolve_drop_index_with(center, &rects, drop, threshold);
        assert!(next.abs_diff(drop) <= 1, "non-neighbor move {drop} -> {next}");
        if !rects.is_empty() {
            assert!(next < rects.len(), "drop index out of range");
            assert!(move_item(&mut order, drop, next));
        }
        drop = next;
    }

    // The dragged item sits at the drop slot and nothing was lost.
    assert_eq!(order.get(drop).copied(), dragged);
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert!(sorted.iter().copied().eq(0..rects.len()));

    // Scroll speed stays finite and capped for any bounds.
    let bounds = ContainerBounds::new(input.top, input.bottom);
    for policy in [ScrollPolicy::FIXED_DEFAULT, ScrollPolicy::VIEWPORT_DEFAULT] {
        for &center in input.centers.iter().take(32) {
            let speed = scroll_speed(&policy, center, bounds);
            assert!(!speed.is_nan(), "NaN speed at {center}");
            assert!(speed.abs() <= 30.0, "speed {speed} above cap");
        }
    }
});
