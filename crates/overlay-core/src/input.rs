//! # Pointer Input
//!
//! Platform-agnostic pointer events delivered by the host. Only the
//! information the drag controller needs is modelled: which button, where,
//! and whether the pointer is the primary one.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// Primary button (usually left, or a touch contact).
    Primary,
    /// Secondary button (usually right).
    Secondary,
    /// Auxiliary button (usually middle/wheel).
    Auxiliary,
    /// No button (plain moves).
    None,
}

/// Pointer event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEventType {
    Down,
    Move,
    Up,
}

/// Pointer event data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub event_type: PointerEventType,
    /// Position relative to the viewport (clientX/clientY).
    pub position: Point,
    pub button: PointerButton,
    /// Whether this is the primary pointer of its type.
    pub is_primary: bool,
}

impl PointerEvent {
    fn new(event_type: PointerEventType, x: f32, y: f32, button: PointerButton) -> Self {
        Self {
            event_type,
            position: Point::new(x, y),
            button,
            is_primary: true,
        }
    }

    /// Primary-button press at the given client position.
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerEventType::Down, x, y, PointerButton::Primary)
    }

    /// Move to the given client position.
    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerEventType::Move, x, y, PointerButton::None)
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn secondary_pointer(mut self) -> Self {
        self.is_primary = false;
        self
    }

    /// Default filtering policy: only primary presses of the primary pointer
    /// may start a drag.
    pub fn is_ignorable(&self) -> bool {
        !self.is_primary
            || (self.event_type == PointerEventType::Down && self.button != PointerButton::Primary)
    }
}
