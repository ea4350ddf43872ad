//! # Placement
//!
//! Opener-relative placement search. Each axis is solved independently by
//! walking an ordered bias list front to back; the first bias whose
//! candidate offset fits inside `[0, max_length - popup_length]` wins.

use overlay_core::{Bias, Rect, Size};
use tracing::trace;

use crate::LayoutTuning;

/// Result of placing a popup on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Offset of the popup's start edge.
    Position(f32),
    /// Every bias was exhausted; the caller should prefer fullscreen.
    NoFit,
}

impl Placement {
    pub fn position(&self) -> Option<f32> {
        match self {
            Placement::Position(p) => Some(*p),
            Placement::NoFit => None,
        }
    }

    pub fn fits(&self) -> bool {
        matches!(self, Placement::Position(_))
    }
}

const AFTER_FIRST: &[Bias] = &[Bias::After, Bias::Overlap];
const BEFORE_FIRST: &[Bias] = &[Bias::Before, Bias::Overlap];
const OVERLAP_ONLY: &[Bias] = &[Bias::Overlap];

/// Compact screens try every side, preferring the popup to open toward the
/// bottom-left of the opener so its close button lands near the tap.
pub const COMPACT_BIAS_X: &[Bias] = &[Bias::Before, Bias::Overlap, Bias::After];
pub const COMPACT_BIAS_Y: &[Bias] = &[Bias::After, Bias::Overlap, Bias::Before];

/// Bias order used when the caller gives none, based on which third of the
/// axis the opener starts in.
pub fn default_biases(opener_pos: f32, max_length: f32) -> &'static [Bias] {
    let cut = max_length / 3.0;
    if opener_pos < cut {
        AFTER_FIRST
    } else if opener_pos > 2.0 * cut {
        BEFORE_FIRST
    } else {
        OVERLAP_ONLY
    }
}

/// Place a popup on one axis with the default tuning.
pub fn place_on_axis(
    popup_length: f32,
    opener_pos: f32,
    opener_length: f32,
    max_length: f32,
    biases: &[Bias],
    margin: f32,
) -> Placement {
    place_on_axis_tuned(
        popup_length,
        opener_pos,
        opener_length,
        max_length,
        biases,
        margin,
        &LayoutTuning::default(),
    )
}

/// Place a popup on one axis.
///
/// A candidate that overflows by no more than `margin_tolerance * margin`
/// is retried with the opener nudged back by `retry_nudge`, at most
/// `max_retries` times, before its bias is dropped.
pub fn place_on_axis_tuned(
    popup_length: f32,
    opener_pos: f32,
    opener_length: f32,
    max_length: f32,
    biases: &[Bias],
    margin: f32,
    tuning: &LayoutTuning,
) -> Placement {
    let queue = if biases.is_empty() {
        default_biases(opener_pos, max_length)
    } else {
        biases
    };
    let tolerance = tuning.margin_tolerance * margin;

    for &bias in queue {
        let mut pos = opener_pos;
        for attempt in 0..=tuning.max_retries {
            let center = pos + opener_length / 2.0;
            let Some(factor) = bias.factor(center, max_length) else {
                break;
            };
            let candidate = center - popup_length * factor;
            let overflow = (-candidate).max(candidate + popup_length - max_length);
            if overflow <= 0.0 {
                return Placement::Position(candidate);
            }
            if overflow > tolerance {
                break;
            }
            trace!(bias = bias.as_str(), attempt, candidate, overflow, "Retrying bias");
            pos -= tuning.retry_nudge;
        }
    }

    Placement::NoFit
}

/// Everything needed to lay out a popup next to its opener.
#[derive(Debug, Clone, Copy)]
pub struct PlacementInput<'a> {
    /// Opener bounding rectangle.
    pub opener: Rect,
    /// Size the popup wants.
    pub popup: Size,
    /// Reference frame (live or frozen viewport size).
    pub frame: Size,
    pub margin: f32,
    pub fullscreen: bool,
    pub compact: bool,
    pub bias_x: &'a [Bias],
    pub bias_y: &'a [Bias],
}

/// Result of a full layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutOutcome {
    Placed(Rect),
    Fullscreen,
}

/// Compute the desired box for a popup.
///
/// An axis without a fit starts at the origin; when neither axis fits the
/// popup goes fullscreen.
pub fn compute_layout<'a>(input: &PlacementInput<'a>, tuning: &LayoutTuning) -> LayoutOutcome {
    let popup = input.popup;
    let frame = input.frame;

    if input.fullscreen {
        return LayoutOutcome::Fullscreen;
    }

    let threshold = tuning.compact_fullscreen_threshold;
    if input.compact
        && popup.width >= threshold * frame.width
        && popup.height >= threshold * frame.height
    {
        return LayoutOutcome::Fullscreen;
    }

    let max_width = frame.width - 2.0 * input.margin;
    let max_height = frame.height - 2.0 * input.margin;

    // Compact orders stand in for an empty list, axis by axis.
    let pick = |given: &'a [Bias], compact: &'static [Bias]| -> &'a [Bias] {
        if input.compact && given.is_empty() {
            compact
        } else {
            given
        }
    };
    let bias_x = pick(input.bias_x, COMPACT_BIAS_X);
    let bias_y = pick(input.bias_y, COMPACT_BIAS_Y);

    let x = place_on_axis_tuned(
        popup.width,
        input.opener.x,
        input.opener.width,
        max_width,
        bias_x,
        input.margin,
        tuning,
    );
    let y = place_on_axis_tuned(
        popup.height,
        input.opener.y,
        input.opener.height,
        max_height,
        bias_y,
        input.margin,
        tuning,
    );

    match (x.position(), y.position()) {
        (None, None) => LayoutOutcome::Fullscreen,
        (left, top) => LayoutOutcome::Placed(Rect::new(
            left.unwrap_or(0.0),
            top.unwrap_or(0.0),
            popup.width,
            popup.height,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_default_biases_by_third() {
        assert_eq!(default_biases(10.0, 900.0), AFTER_FIRST);
        assert_eq!(default_biases(450.0, 900.0), OVERLAP_ONLY);
        assert_eq!(default_biases(700.0, 900.0), BEFORE_FIRST);
    }

    #[test]
    fn test_before_bias_ends_at_opener_center() {
        let p = place_on_axis(300.0, 500.0, 50.0, 980.0, &[Bias::Before, Bias::Overlap], 10.0);
        assert_eq!(p, Placement::Position(225.0));
    }

    #[test]
    fn test_after_bias_starts_at_opener_center() {
        let p = place_on_axis(200.0, 100.0, 40.0, 980.0, &[Bias::After], 10.0);
        assert_eq!(p, Placement::Position(120.0));
    }

    #[test]
    fn test_middle_opener_overlaps() {
        let p = place_on_axis(300.0, 500.0, 50.0, 980.0, &[], 10.0);
        let expected = 525.0 - 300.0 * (525.0 / 980.0);
        let got = p.position().unwrap();
        assert!((got - expected).abs() < EPS, "got {got}, expected {expected}");
    }

    #[test]
    fn test_falls_through_to_next_bias() {
        // Before would start at -50.
        let p = place_on_axis(100.0, 30.0, 40.0, 500.0, &[Bias::Before, Bias::After], 10.0);
        assert_eq!(p, Placement::Position(50.0));
    }

    #[test]
    fn test_small_overflow_is_retried_with_nudge() {
        // After: 890 + 10 = 900 start, 100 long, max 995 -> overflow 5 (<= 20).
        // One nudge of 5 brings it to exactly fit.
        let p = place_on_axis(100.0, 890.0, 20.0, 995.0, &[Bias::After], 10.0);
        assert_eq!(p, Placement::Position(895.0));
    }

    #[test]
    fn test_retries_are_bounded() {
        // Overflow of 15 needs 3 nudges; allow only 2.
        let tuning = LayoutTuning {
            max_retries: 2,
            ..Default::default()
        };
        let p = place_on_axis_tuned(100.0, 900.0, 20.0, 995.0, &[Bias::After], 10.0, &tuning);
        assert_eq!(p, Placement::NoFit);

        let p = place_on_axis(100.0, 900.0, 20.0, 995.0, &[Bias::After], 10.0);
        assert_eq!(p, Placement::Position(895.0));
    }

    #[test]
    fn test_large_overflow_drops_bias() {
        let p = place_on_axis(2000.0, 100.0, 20.0, 980.0, &[Bias::After, Bias::Overlap], 10.0);
        assert_eq!(p, Placement::NoFit);
    }

    #[test]
    fn test_fullscreen_bias_has_no_position() {
        let p = place_on_axis(100.0, 100.0, 20.0, 980.0, &[Bias::Fullscreen, Bias::After], 10.0);
        assert_eq!(p, Placement::Position(110.0));
        let p = place_on_axis(100.0, 100.0, 20.0, 980.0, &[Bias::Fullscreen], 10.0);
        assert_eq!(p, Placement::NoFit);
    }

    #[test]
    fn test_positions_always_within_bounds() {
        let queues: [&[Bias]; 5] = [
            &[],
            &[Bias::Before],
            &[Bias::After],
            &[Bias::Overlap, Bias::Before],
            &[Bias::Before, Bias::Overlap, Bias::After],
        ];
        for queue in queues {
            for opener in (0..1000).step_by(37) {
                for len in [10.0, 150.0, 480.0, 900.0, 1200.0] {
                    let max = 980.0;
                    match place_on_axis(len, opener as f32, 30.0, max, queue, 10.0) {
                        Placement::Position(p) => {
                            assert!(p >= 0.0, "p={p} opener={opener} len={len}");
                            assert!(p <= max - len + EPS, "p={p} opener={opener} len={len}");
                        }
                        Placement::NoFit => {}
                    }
                }
            }
        }
    }

    fn input<'a>(opener: Rect, popup: Size, frame: Size) -> PlacementInput<'a> {
        PlacementInput {
            opener,
            popup,
            frame,
            margin: 10.0,
            fullscreen: false,
            compact: false,
            bias_x: &[],
            bias_y: &[],
        }
    }

    #[test]
    fn test_compute_layout_places_both_axes() {
        let outcome = compute_layout(
            &input(
                Rect::new(40.0, 30.0, 60.0, 20.0),
                Size::new(200.0, 100.0),
                Size::new(1000.0, 800.0),
            ),
            &LayoutTuning::default(),
        );
        assert_eq!(outcome, LayoutOutcome::Placed(Rect::new(70.0, 40.0, 200.0, 100.0)));
    }

    #[test]
    fn test_compute_layout_neither_axis_fits() {
        let outcome = compute_layout(
            &input(
                Rect::new(40.0, 30.0, 60.0, 20.0),
                Size::new(1200.0, 900.0),
                Size::new(1000.0, 800.0),
            ),
            &LayoutTuning::default(),
        );
        assert_eq!(outcome, LayoutOutcome::Fullscreen);
    }

    #[test]
    fn test_compute_layout_one_axis_starts_at_origin() {
        let outcome = compute_layout(
            &input(
                Rect::new(40.0, 30.0, 60.0, 20.0),
                Size::new(1200.0, 100.0),
                Size::new(1000.0, 800.0),
            ),
            &LayoutTuning::default(),
        );
        assert_eq!(outcome, LayoutOutcome::Placed(Rect::new(0.0, 40.0, 1200.0, 100.0)));
    }

    #[test]
    fn test_compact_large_popup_goes_fullscreen() {
        let mut i = input(
            Rect::new(40.0, 30.0, 60.0, 20.0),
            Size::new(330.0, 600.0),
            Size::new(400.0, 700.0),
        );
        i.compact = true;
        assert_eq!(compute_layout(&i, &LayoutTuning::default()), LayoutOutcome::Fullscreen);
    }

    #[test]
    fn test_compact_order_applies_per_axis() {
        // Opener in the middle third vertically: the default order would
        // overlap, the compact order opens below the opener's center.
        let mut i = input(
            Rect::new(40.0, 400.0, 60.0, 20.0),
            Size::new(200.0, 100.0),
            Size::new(1000.0, 800.0),
        );
        i.compact = true;
        i.bias_x = &[Bias::After];
        assert_eq!(
            compute_layout(&i, &LayoutTuning::default()),
            LayoutOutcome::Placed(Rect::new(70.0, 410.0, 200.0, 100.0))
        );
    }

    #[test]
    fn test_explicit_fullscreen() {
        let mut i = input(Rect::zero(), Size::new(10.0, 10.0), Size::new(400.0, 700.0));
        i.fullscreen = true;
        assert_eq!(compute_layout(&i, &LayoutTuning::default()), LayoutOutcome::Fullscreen);
    }
}
