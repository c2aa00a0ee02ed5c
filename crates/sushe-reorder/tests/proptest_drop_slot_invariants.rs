//! Property-based invariant tests for drop-slot resolution.
//!
//! 1. Output never differs from the current index by more than one
//! 2. Repeated neighbor moves keep the sequence a permutation
//! 3. After a swap, reversing needs a full item height of travel
//! 4. No panics on arbitrary rectangles and indices

use proptest::prelude::*;
use sushe_reorder::{Rect, move_item, resolve_drop_index, resolve_drop_index_with};

// ── Strategies ──────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (
        -2000.0f64..2000.0,
        -2000.0f64..2000.0,
        0.0f64..500.0,
        0.0f64..500.0,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn rects_strategy() -> impl Strategy<Value = Vec<Rect>> {
    prop::collection::vec(rect_strategy(), 0..40)
}

/// Heights for a stacked column of cards.
fn column_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(20.0f64..300.0, 2..30)
}

fn stack(heights: &[f64]) -> Vec<Rect> {
    let mut top = 0.0;
    heights
        .iter()
        .map(|&h| {
            let rect = Rect::new(0.0, top, 320.0, h);
            top += h;
            rect
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Neighbor-only output
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn output_is_within_one_slot(
        rects in rects_strategy(),
        current in 0usize..45,
        center in -5000.0f64..5000.0,
        threshold in 0.01f64..=1.0,
    ) {
        let next = resolve_drop_index_with(center, &rects, current, threshold);
        prop_assert!(next.abs_diff(current) <= 1);
        if !rects.is_empty() && current < rects.len() {
            prop_assert!(next < rects.len());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Order preservation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn neighbor_moves_preserve_permutation(
        heights in column_strategy(),
        start in 0usize..30,
        centers in prop::collection::vec(-500.0f64..9000.0, 1..80),
    ) {
        let rects = stack(&heights);
        let len = rects.len();
        let start = start % len;
        let original: Vec<usize> = (0..len).collect();
        let mut order = original.clone();
        let mut drop = start;

        for center in centers {
            let next = resolve_drop_index(center, &rects, drop);
            prop_assert!(move_item(&mut order, drop, next));
            drop = next;
        }

        prop_assert_eq!(order.len(), len);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, original);
        prop_assert_eq!(order[drop], start);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Hysteresis
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn swap_down_cannot_reverse_without_a_full_height(
        heights in column_strategy(),
        slot in 0usize..30,
        overshoot in 0.001f64..1.0,
    ) {
        // Uniform heights: every slot is one item height apart.
        let height = heights[0];
        let rects: Vec<Rect> = (0..heights.len())
            .map(|i| Rect::new(0.0, i as f64 * height, 320.0, height))
            .collect();
        let k = slot % (rects.len() - 1);

        // Ghost center just past the next item's midpoint.
        let crossing = rects[k + 1].center_y() + overshoot;
        let after = resolve_drop_index(crossing, &rects, k);
        prop_assert_eq!(after, k + 1);

        // Any position above the reverse threshold keeps the new slot.
        let reverse_threshold = rects[k].center_y();
        prop_assert!(crossing - reverse_threshold >= height);
        let just_short = reverse_threshold + overshoot;
        prop_assert_eq!(resolve_drop_index(just_short, &rects, after), k + 1);
        prop_assert_eq!(resolve_drop_index(reverse_threshold - overshoot, &rects, after), k);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Robustness
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn never_panics(
        rects in rects_strategy(),
        current in any::<usize>(),
        center in any::<f64>(),
    ) {
        let next = resolve_drop_index(center, &rects, current);
        prop_assert!(next.abs_diff(current) <= 1);
    }
}
