//! # Reference Size
//!
//! Tracks the popup's natural size, captured once on the first successful
//! layout pass, and decides which frame the popup is laid out against.
//!
//! A popup is either viewport-relative (scaled against the live viewport)
//! or sticky (small, opener-bound, laid out against the viewport recorded
//! when it opened).

use overlay_core::Size;
use tracing::debug;

use crate::LayoutTuning;

/// Raw measurements used to derive a natural size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NaturalMeasure {
    /// Scroll size of the content container.
    pub content: Size,
    /// Scroll size of the header, when the popup has one.
    pub header: Option<Size>,
}

impl NaturalMeasure {
    /// Content size plus header: header height stacks, widths take the max.
    pub fn natural_size(&self) -> Size {
        match self.header {
            Some(header) => Size::new(
                self.content.width.max(header.width),
                self.content.height + header.height,
            ),
            None => self.content,
        }
    }
}

/// Frozen natural size and its ratio to the viewport it was captured in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSize {
    pub width: f32,
    pub height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub width_ratio: f32,
    pub height_ratio: f32,
}

impl ReferenceSize {
    pub fn capture(natural: Size, viewport: Size) -> Self {
        let ratio = |len: f32, total: f32| if total > 0.0 { len / total } else { 1.0 };
        Self {
            width: natural.width,
            height: natural.height,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            width_ratio: ratio(natural.width, viewport.width),
            height_ratio: ratio(natural.height, viewport.height),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Natural size scaled by the captured ratio against `frame`, never
    /// growing past the natural size.
    pub fn scaled_to(&self, frame: Size) -> Size {
        Size::new(
            self.width.min(self.width_ratio * frame.width),
            self.height.min(self.height_ratio * frame.height),
        )
    }
}

/// Owner of the reference size, the sticky classification and the
/// `css_resized` override.
#[derive(Debug, Clone)]
pub struct ReferenceTracker {
    reference: Option<ReferenceSize>,
    open_viewport: Option<Size>,
    has_header: bool,
    sticky_override: Option<bool>,
    sticky: bool,
    css_resized: bool,
    /// Whether the next capture is floored at the rendered size. Off after
    /// an external size was dropped, so content alone sizes the popup.
    rendered_floor: bool,
}

impl ReferenceTracker {
    pub fn new(has_header: bool, sticky_override: Option<bool>) -> Self {
        Self {
            reference: None,
            open_viewport: None,
            has_header,
            sticky_override,
            sticky: sticky_override.unwrap_or(false),
            css_resized: false,
            rendered_floor: true,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceSize> {
        self.reference.as_ref()
    }

    pub fn is_captured(&self) -> bool {
        self.reference.is_some()
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn is_css_resized(&self) -> bool {
        self.css_resized
    }

    /// Viewport size recorded on the first capture.
    pub fn open_viewport(&self) -> Option<Size> {
        self.open_viewport
    }

    /// Capture the reference size if none is frozen yet.
    ///
    /// `rendered` is the box size already on screen; the natural size never
    /// goes below it, except right after an external size was dropped.
    pub fn ensure_captured(
        &mut self,
        measure: NaturalMeasure,
        rendered: Size,
        viewport: Size,
        tuning: &LayoutTuning,
    ) -> ReferenceSize {
        if let Some(reference) = self.reference {
            return reference;
        }

        let natural = if self.rendered_floor {
            measure.natural_size().max(rendered)
        } else {
            measure.natural_size()
        };
        self.rendered_floor = true;
        let reference = ReferenceSize::capture(natural, viewport);
        self.reference = Some(reference);

        if self.open_viewport.is_none() {
            self.open_viewport = Some(viewport);
            self.sticky = self.sticky_override.unwrap_or_else(|| {
                !self.has_header
                    && natural.width < tuning.sticky_threshold * viewport.width
                    && natural.height < tuning.sticky_threshold * viewport.height
            });
        }

        debug!(
            width = reference.width,
            height = reference.height,
            sticky = self.sticky,
            "Captured reference size"
        );
        reference
    }

    /// Frame the popup is laid out against.
    pub fn frame(&self, live_viewport: Size) -> Size {
        match (self.sticky, self.open_viewport) {
            (true, Some(frozen)) => frozen,
            _ => live_viewport,
        }
    }

    /// Size the popup should take in `frame`.
    pub fn desired_size(&self, frame: Size) -> Option<Size> {
        let reference = self.reference?;
        if self.sticky || self.css_resized {
            Some(reference.size())
        } else {
            Some(reference.scaled_to(frame))
        }
    }

    /// Trust an externally applied size until the next window resize.
    pub fn record_external_resize(&mut self, size: Size, viewport: Size) {
        self.reference = Some(ReferenceSize::capture(size, viewport));
        self.css_resized = true;
        debug!(width = size.width, height = size.height, "External resize recorded");
    }

    /// Drop an external size so the next pass measures content again,
    /// ignoring the externally sized box still on screen.
    ///
    /// Returns whether an external size was dropped.
    pub fn release_external_resize(&mut self) -> bool {
        if !self.css_resized {
            return false;
        }
        self.css_resized = false;
        self.reference = None;
        self.rendered_floor = false;
        true
    }

    /// A window resize invalidates an external size. A reference measured
    /// from content stays frozen.
    pub fn on_window_resize(&mut self) {
        if self.release_external_resize() {
            debug!("Window resize invalidated external size");
        }
    }
}
