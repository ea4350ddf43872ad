//! # Handle Reachability
//!
//! Keeps a slice of every drag handle on screen so a dragged popup can
//! always be grabbed again.

use overlay_core::{Rect, Size};
use tracing::trace;

/// Visible share of `rect` inside a viewport anchored at the origin.
///
/// Returns the smaller of the horizontal and vertical shares. An axis of
/// zero length counts as fully visible.
pub fn visible_fraction(rect: Rect, viewport: Size) -> f32 {
    let share = |start: f32, len: f32, total: f32| {
        if len <= 0.0 {
            return 1.0;
        }
        let visible = (start + len).min(total) - start.max(0.0);
        visible.max(0.0) / len
    };
    share(rect.x, rect.width, viewport.width).min(share(rect.y, rect.height, viewport.height))
}

/// Correct a candidate box so every handle keeps at least `fraction` of its
/// length inside the viewport on each edge.
///
/// `handles` are relative to the popup box. Corrections apply per edge and
/// per handle, in order, so a later handle wins a conflict.
pub fn correct_for_handles(candidate: Rect, handles: &[Rect], viewport: Size, fraction: f32) -> Rect {
    let mut corrected = candidate;

    for handle in handles {
        let sliver_x = fraction * handle.width;
        let sliver_y = fraction * handle.height;

        let left = corrected.x + handle.x;
        if left + handle.width < sliver_x {
            corrected.x = sliver_x - handle.width - handle.x;
        } else if left > viewport.width - sliver_x {
            corrected.x = viewport.width - sliver_x - handle.x;
        }

        let top = corrected.y + handle.y;
        if top + handle.height < sliver_y {
            corrected.y = sliver_y - handle.height - handle.y;
        } else if top > viewport.height - sliver_y {
            corrected.y = viewport.height - sliver_y - handle.y;
        }
    }

    if corrected != candidate {
        trace!(
            from_x = candidate.x,
            from_y = candidate.y,
            to_x = corrected.x,
            to_y = corrected.y,
            "Handle reachability correction"
        );
    }
    corrected
}
