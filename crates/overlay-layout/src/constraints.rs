//! # Dimension Constraints
//!
//! The single commit point for a popup's box. Every update is merged with
//! the previous box, clamped, and only then stored.
//!
//! Clamp order:
//!
//! 1. When not dragging, a box starting before the origin on both axes
//!    cannot fit and is replaced by the whole viewport. Otherwise, unless
//!    off-limits placement is allowed, the box is shrunk into the
//!    reference viewport.
//! 2. Left and top never precede the origin.
//! 3. While dragging, drag handles stay partly reachable.

use overlay_core::{Rect, Size};
use tracing::{debug, trace};

use crate::handles::correct_for_handles;
use crate::LayoutTuning;

/// Partial box update. Missing fields keep their previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxUpdate {
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl BoxUpdate {
    pub fn position(left: f32, top: f32) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            ..Default::default()
        }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn full(rect: Rect) -> Self {
        Self {
            left: Some(rect.x),
            top: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.top.is_none() && self.width.is_none() && self.height.is_none()
    }

    /// Merge into `previous`, dropping malformed fields.
    fn merge(&self, previous: Rect) -> Rect {
        let offset = |value: Option<f32>, old: f32| value.filter(|v| v.is_finite()).unwrap_or(old);
        let length = |value: Option<f32>, old: f32| {
            value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(old)
        };
        Rect::new(
            offset(self.left, previous.x),
            offset(self.top, previous.y),
            length(self.width, previous.width),
            length(self.height, previous.height),
        )
    }
}

/// Frame and mode flags for one update.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext<'a> {
    /// Frame the popup is sized against (frozen for sticky popups).
    pub reference_viewport: Size,
    /// Current viewport.
    pub live_viewport: Size,
    pub margin: f32,
    /// Allow the box to extend past the reference viewport.
    pub off_limits: bool,
    pub dragging: bool,
    /// Drag handles, relative to the popup box.
    pub handles: &'a [Rect],
    pub tuning: &'a LayoutTuning,
}

/// Result of an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintOutcome {
    /// The committed box.
    pub bounds: Rect,
    /// The update could not fit and the box covers the viewport instead.
    pub fullscreen_fallback: bool,
}

/// Owner of the authoritative box.
#[derive(Debug, Clone, Default)]
pub struct ConstraintEngine {
    current: Rect,
    committed: bool,
}

impl ConstraintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current box.
    pub fn current(&self) -> Rect {
        self.current
    }

    /// Whether any update has been committed yet.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Merge, clamp and commit an update.
    pub fn apply(&mut self, update: BoxUpdate, ctx: &ConstraintContext<'_>) -> ConstraintOutcome {
        let merged = update.merge(self.current);
        let outcome = clamp(merged, ctx);

        trace!(
            left = outcome.bounds.x,
            top = outcome.bounds.y,
            width = outcome.bounds.width,
            height = outcome.bounds.height,
            fullscreen_fallback = outcome.fullscreen_fallback,
            "Committing box"
        );

        self.current = outcome.bounds;
        self.committed = true;
        outcome
    }
}

fn clamp(mut bounds: Rect, ctx: &ConstraintContext<'_>) -> ConstraintOutcome {
    if !ctx.dragging && bounds.x < 0.0 && bounds.y < 0.0 {
        debug!(left = bounds.x, top = bounds.y, "Box cannot fit, covering viewport");
        return ConstraintOutcome {
            bounds: Rect::new(0.0, 0.0, ctx.live_viewport.width, ctx.live_viewport.height),
            fullscreen_fallback: true,
        };
    }

    if !ctx.off_limits {
        bounds = shrink_into(bounds, ctx);
    }

    bounds.x = bounds.x.max(0.0);
    bounds.y = bounds.y.max(0.0);

    if ctx.dragging && !ctx.handles.is_empty() {
        bounds = correct_for_handles(
            bounds,
            ctx.handles,
            ctx.live_viewport,
            ctx.tuning.handle_min_visible,
        );
    }

    ConstraintOutcome {
        bounds,
        fullscreen_fallback: false,
    }
}

/// Shrink a box overflowing the frame, keeping a minimum size, then move it
/// back inside.
fn shrink_into(mut bounds: Rect, ctx: &ConstraintContext<'_>) -> Rect {
    let frame = ctx.reference_viewport;
    let margin = ctx.margin;
    let min_width = ctx.tuning.min_width_margins * margin;
    let min_height = ctx.tuning.min_height_margins * margin;

    let overflow_right = bounds.right() + 2.0 * margin - frame.width;
    if overflow_right > 0.0 {
        bounds.width = (bounds.width - overflow_right)
            .min(frame.width - 2.0 * margin)
            .max(min_width)
            .min(frame.width);
    }
    let overflow_bottom = bounds.bottom() + 2.0 * margin - frame.height;
    if overflow_bottom > 0.0 {
        bounds.height = (bounds.height - overflow_bottom)
            .min(frame.height - 2.0 * margin)
            .max(min_height)
            .min(frame.height);
    }

    if bounds.right() > frame.width {
        bounds.x = (frame.width - bounds.width).max(0.0);
    }
    if bounds.bottom() > frame.height {
        bounds.y = (frame.height - bounds.height).max(0.0);
    }
    bounds
}
