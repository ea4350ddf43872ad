//! # Overlay Bench
//!
//! Fixtures shared by the criterion benchmarks of the overlay layout engine.
//!
//! Run with: cargo bench -p overlay-bench

use overlay_core::{Rect, Size};
use overlay_layout::{ConstraintContext, LayoutTuning, PlacementInput};

/// An opener in the middle of a 1000x800 viewport.
pub fn sample_input(popup: Size) -> PlacementInput<'static> {
    PlacementInput {
        opener: Rect::new(480.0, 380.0, 40.0, 20.0),
        popup,
        frame: Size::new(1000.0, 800.0),
        margin: 10.0,
        fullscreen: false,
        compact: false,
        bias_x: &[],
        bias_y: &[],
    }
}

/// Constraint context for a 1000x800 viewport.
pub fn sample_context<'a>(
    handles: &'a [Rect],
    tuning: &'a LayoutTuning,
    dragging: bool,
) -> ConstraintContext<'a> {
    ConstraintContext {
        reference_viewport: Size::new(1000.0, 800.0),
        live_viewport: Size::new(1000.0, 800.0),
        margin: 10.0,
        off_limits: true,
        dragging,
        handles,
        tuning,
    }
}

/// `n` stacked 30px handle strips.
pub fn sample_handles(n: usize) -> Vec<Rect> {
    (0..n)
        .map(|i| Rect::new(0.0, i as f32 * 30.0, 300.0, 30.0))
        .collect()
}
