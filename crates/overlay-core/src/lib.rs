//! # Overlay Core
//!
//! Shared primitives for the overlay popup engine: viewport-relative
//! geometry, the pointer input model, and placement biases.
//!
//! All coordinates are CSS pixels relative to the viewport origin. Offsets
//! may be negative; sizes never are once a popup has been laid out.

use serde::{Deserialize, Serialize};

pub mod geometry;
pub mod input;

pub use geometry::{Point, Rect, Size, Viewport};
pub use input::{PointerButton, PointerEvent, PointerEventType};

/// Preferred relative placement along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bias {
    /// Popup ends at the opener's center (placed before it on the axis).
    Before,
    /// Popup straddles the opener, leaning toward the side with more room.
    Overlap,
    /// Popup starts at the opener's center (placed after it on the axis).
    After,
    /// Give up on opener-relative placement.
    Fullscreen,
}

impl Bias {
    /// Fraction of the popup length placed before the opener's center.
    ///
    /// Returns `None` for [`Bias::Fullscreen`], which has no offset.
    pub fn factor(&self, opener_center: f32, max_length: f32) -> Option<f32> {
        match self {
            Bias::Before => Some(1.0),
            Bias::After => Some(0.0),
            Bias::Overlap => Some(if max_length > 0.0 {
                opener_center / max_length
            } else {
                0.5
            }),
            Bias::Fullscreen => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Before => "before",
            Bias::Overlap => "overlap",
            Bias::After => "after",
            Bias::Fullscreen => "fullscreen",
        }
    }
}
