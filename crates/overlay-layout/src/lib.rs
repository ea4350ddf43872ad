//! # Overlay Layout
//!
//! Layout engine for detached popups anchored to an opener element.
//!
//! ## Design Goals
//!
//! 1. **Opener-relative placement**: search an ordered bias list per axis,
//!    never returning an offset that overflows the viewport
//! 2. **Stable sizing**: freeze the popup's natural size once and scale it
//!    against a reference frame instead of re-measuring on every pass
//! 3. **Single commit point**: every box change goes through the
//!    constraint engine, which clamps and then stores a copy
//! 4. **Recoverability**: drag handles always stay partly on screen

use serde::{Deserialize, Serialize};
use thiserror::Error;

use overlay_core::Viewport;

pub mod constraints;
pub mod handles;
pub mod placement;
pub mod reference;

pub use constraints::{BoxUpdate, ConstraintContext, ConstraintEngine, ConstraintOutcome};
pub use handles::{correct_for_handles, visible_fraction};
pub use placement::{
    compute_layout, default_biases, place_on_axis, place_on_axis_tuned, LayoutOutcome,
    Placement, PlacementInput,
};
pub use reference::{NaturalMeasure, ReferenceSize, ReferenceTracker};

/// Errors that can occur in layout.
#[derive(Error, Debug, PartialEq)]
pub enum LayoutError {
    #[error("Invalid tuning value for {field}: {value}")]
    InvalidTuning { field: &'static str, value: f32 },
}

/// Numeric knobs of the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    /// Footprint ratio below which a headerless popup is sticky.
    pub sticky_threshold: f32,
    /// Fraction of a drag handle that must stay inside the viewport.
    pub handle_min_visible: f32,
    /// On compact screens, popups covering this ratio of both viewport
    /// dimensions go fullscreen.
    pub compact_fullscreen_threshold: f32,
    /// Retries of one bias before it is dropped.
    pub max_retries: u32,
    /// Opener nudge applied on each retry, in pixels.
    pub retry_nudge: f32,
    /// Overflow tolerated for a retry, in margins.
    pub margin_tolerance: f32,
    /// Default margin is `min(viewport) / margin_divisor`.
    pub margin_divisor: f32,
    /// Minimum width kept when shrinking to the viewport, in margins.
    pub min_width_margins: f32,
    /// Minimum height kept when shrinking to the viewport, in margins.
    pub min_height_margins: f32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            sticky_threshold: 0.2,
            handle_min_visible: 0.2,
            compact_fullscreen_threshold: 0.8,
            max_retries: 5,
            retry_nudge: 5.0,
            margin_tolerance: 2.0,
            margin_divisor: 50.0,
            min_width_margins: 20.0,
            min_height_margins: 10.0,
        }
    }
}

impl LayoutTuning {
    /// Reject values the algorithms cannot work with.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let ratios = [
            ("sticky_threshold", self.sticky_threshold),
            ("handle_min_visible", self.handle_min_visible),
            ("compact_fullscreen_threshold", self.compact_fullscreen_threshold),
        ];
        for (field, value) in ratios {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(LayoutError::InvalidTuning { field, value });
            }
        }

        let non_negative = [
            ("retry_nudge", self.retry_nudge),
            ("margin_tolerance", self.margin_tolerance),
            ("min_width_margins", self.min_width_margins),
            ("min_height_margins", self.min_height_margins),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidTuning { field, value });
            }
        }

        if !self.margin_divisor.is_finite() || self.margin_divisor <= 0.0 {
            return Err(LayoutError::InvalidTuning {
                field: "margin_divisor",
                value: self.margin_divisor,
            });
        }
        Ok(())
    }

    /// Margin used when neither the caller nor the surface provides one.
    pub fn default_margin(&self, viewport: &Viewport) -> f32 {
        (viewport.width / self.margin_divisor).min(viewport.height / self.margin_divisor)
    }
}
