//! # Host Interfaces
//!
//! The engine never touches a document directly. Everything it needs from
//! the page goes through these traits: the opener element, the viewport,
//! the renderer that mounts popup content, and the mounted subtree itself.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;

use overlay_common::Result;
use overlay_core::{PointerEvent, Rect, Size, Viewport};

use crate::stack::PopupId;

/// The element a popup is anchored near.
pub trait Opener {
    /// Bounding rectangle relative to the viewport.
    fn bounding_rect(&self) -> Rect;

    /// Whether the element is still in the document.
    fn is_connected(&self) -> bool;

    /// Identity of the data the opener belongs to, used to detect
    /// duplicate opens.
    fn owner_id(&self) -> Option<String> {
        None
    }

    /// Placeholders carry no geometry of their own.
    fn is_placeholder(&self) -> bool {
        false
    }

    /// Closest ancestor with real geometry.
    fn sized_parent(&self) -> Option<Rc<dyn Opener>> {
        None
    }
}

/// Window-level state.
pub trait Environment {
    fn viewport(&self) -> Viewport;

    fn is_compact_screen(&self) -> bool {
        false
    }

    /// Pointer filtering policy for drags.
    fn should_ignore_pointer(&self, event: &PointerEvent) -> bool {
        event.is_ignorable()
    }
}

/// What the renderer needs to mount a popup.
#[derive(Debug, Clone, Copy)]
pub struct MountRequest<'a> {
    pub id: PopupId,
    pub name: &'a str,
    pub title: Option<&'a str>,
    pub show_header: bool,
    /// Data forced onto the content instead of the opener's.
    pub data: Option<&'a Value>,
    pub compact: bool,
}

/// Mounts popup content into the detached layer.
pub trait ContentRenderer {
    fn has_content(&self, name: &str) -> bool;

    fn mount(&self, request: &MountRequest<'_>) -> Result<Box<dyn PopupSurface>>;
}

/// Observable parts of a mounted popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservedTarget {
    /// The content container.
    Content,
    /// The outer popup box.
    Outer,
}

/// Connection flag shared between the engine and a host observer.
///
/// Once disconnected the host must stop delivering callbacks, and the
/// engine drops any that still arrive.
#[derive(Debug, Clone)]
pub struct ObserverToken(Rc<Cell<bool>>);

impl ObserverToken {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_connected(&self) -> bool {
        self.0.get()
    }

    pub fn disconnect(&self) {
        self.0.set(false);
    }
}

impl Default for ObserverToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A mounted popup subtree.
pub trait PopupSurface {
    /// Whether the subtree is still attached to the document.
    fn is_mounted(&self) -> bool {
        true
    }

    fn has_content_container(&self) -> bool;

    /// Natural scroll size of the content container.
    fn content_scroll_size(&self) -> Size;

    /// Natural scroll size of the header, if one is shown.
    fn header_scroll_size(&self) -> Option<Size>;

    /// Rendered height of the header, zero without one.
    fn header_offset_height(&self) -> f32;

    /// Size of the outer box as currently rendered.
    fn rendered_size(&self) -> Size;

    /// Margin declared by the page styles.
    fn margin_hint(&self) -> Option<f32> {
        None
    }

    /// Rectangle of the first element matching `selector`, relative to the
    /// popup box.
    fn handle_rect(&self, selector: &str) -> Option<Rect>;

    fn apply_box(&mut self, bounds: &Rect);

    fn set_z_index(&mut self, z_index: i32);

    /// Toggle the transient styling shown while dragging.
    fn set_drag_active(&mut self, active: bool);

    fn scroll_to_origin(&mut self);

    /// Drop explicit sizes on the content so it fills the popup.
    fn clear_content_size(&mut self);

    fn observe(&mut self, target: ObservedTarget, token: ObserverToken);

    fn unobserve(&mut self, target: ObservedTarget);

    /// Remove the subtree from the document.
    fn remove(&mut self) -> Result<()>;
}
