#![forbid(unsafe_code)]

//! Drop-slot resolution: decides when the ghost has crossed into a neighbor's
//! slot.
//!
//! # Invariants
//!
//! 1. Only the immediate neighbors of the current slot are examined, so the
//!    result never differs from the current index by more than one.
//! 2. The comparison uses the ghost's vertical center, not the raw touch
//!    point. After a swap the new neighbor sits a full item height away, so
//!    the reverse threshold cannot be crossed by the same small movement.
//! 3. Pure: reads rectangles, returns an index.
//!
//! A full scan would let the just-relocated neighbor, whose midpoint lands on
//! the ghost center right after a swap, trigger an immediate reverse swap on
//! the next frame.

use crate::config::DEFAULT_SWAP_THRESHOLD;
use crate::geometry::Rect;

/// Resolve the drop index with the default swap threshold (0.5).
#[must_use]
pub fn resolve_drop_index(ghost_center_y: f64, item_rects: &[Rect], current: usize) -> usize {
    resolve_drop_index_with(ghost_center_y, item_rects, current, DEFAULT_SWAP_THRESHOLD)
}

/// Resolve the drop index against a neighbor-height fraction.
///
/// Moves down when `ghost_center_y` passes `next.top + next.height * threshold`,
/// up when it passes `prev.bottom - prev.height * threshold`, and otherwise
/// returns `current`. An out-of-range `current` is returned unchanged.
#[must_use]
pub fn resolve_drop_index_with(
    ghost_center_y: f64,
    item_rects: &[Rect],
    current: usize,
    swap_threshold: f64,
) -> usize {
    if current >= item_rects.len() || !ghost_center_y.is_finite() {
        return current;
    }

    if let Some(next) = item_rects.get(current + 1)
        && ghost_center_y > next.top() + next.height * swap_threshold
    {
        return current + 1;
    }

    if current > 0 {
        let prev = &item_rects[current - 1];
        if ghost_center_y < prev.bottom() - prev.height * swap_threshold {
            return current - 1;
        }
    }

    current
}

/// Move the element at `from` to position `to`, shifting the ones between.
///
/// Out-of-range indices leave the sequence untouched and return `false`.
pub fn move_item<T>(order: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= order.len() || to >= order.len() {
        return false;
    }
    if from != to {
        let item = order.remove(from);
        order.insert(to, item);
    }
    true
}
