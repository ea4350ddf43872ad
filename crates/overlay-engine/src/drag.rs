//! # Drag Controller
//!
//! `Idle -> Dragging -> Idle`. While dragging, the box follows the pointer
//! through the constraint engine and the placement search is bypassed. The
//! dropped position stays until something external invalidates it.

use tracing::{debug, trace};

use overlay_core::{Point, PointerEvent, Rect};
use overlay_layout::{BoxUpdate, LayoutTuning};

use crate::host::Environment;
use crate::popup::PopupInstance;

/// Drag state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `offset` is the box origin minus the pointer position at press.
    Dragging { offset: Point },
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn begin(&mut self, box_origin: Point, pointer: Point) {
        self.state = DragState::Dragging {
            offset: Point::new(box_origin.x - pointer.x, box_origin.y - pointer.y),
        };
    }

    /// Box origin for a pointer position, if dragging.
    pub fn target(&self, pointer: Point) -> Option<Point> {
        match self.state {
            DragState::Dragging { offset } => Some(Point::new(pointer.x + offset.x, pointer.y + offset.y)),
            DragState::Idle => None,
        }
    }

    /// Back to idle. Returns whether a drag was in progress.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

impl PopupInstance {
    pub(crate) fn is_handle(&self, selector: &str) -> bool {
        self.handle_selectors.iter().any(|s| s == selector)
    }

    /// Start a drag from a press on a handle. Returns whether dragging
    /// started; a filtered pointer leaves the popup idle.
    pub(crate) fn begin_drag(&mut self, event: &PointerEvent, ignored: bool) -> bool {
        if ignored {
            trace!(popup_id = %self.id, "Pointer filtered, drag not started");
            self.drag.reset();
            return false;
        }

        self.fullscreen = false;
        self.fullscreen_fallback = false;
        self.drag.begin(self.dims().origin(), event.position);
        self.moving = true;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_drag_active(true);
        }
        // An external size survives layout passes but not a drag.
        if self.tracker.release_external_resize() {
            debug!(popup_id = %self.id, "External size dropped by drag");
        }
        debug!(popup_id = %self.id, x = event.position.x, y = event.position.y, "Drag started");
        true
    }

    pub(crate) fn drag_to(
        &mut self,
        event: &PointerEvent,
        env: &dyn Environment,
        tuning: &LayoutTuning,
    ) -> Option<Rect> {
        let target = self.drag.target(event.position)?;
        let bounds = self.commit(BoxUpdate::position(target.x, target.y), env, tuning, true);
        if let Some(surface) = self.surface.as_mut() {
            surface.scroll_to_origin();
        }
        trace!(popup_id = %self.id, left = bounds.x, top = bounds.y, "Dragged");
        Some(bounds)
    }

    pub(crate) fn end_drag(&mut self) {
        if !self.drag.end() {
            return;
        }
        self.moving = false;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_drag_active(false);
        }
        debug!(popup_id = %self.id, "Drag ended");
    }
}
