//! # Observation Reconciler
//!
//! Reacts to size changes reported by the host without feeding back into
//! itself. Two observers are attached to every mounted popup:
//!
//! 1. **Content**: content grew or shrank, so the box follows it
//! 2. **Outer**: the box itself was resized from outside (a resize corner),
//!    so the engine adopts that size as the new reference
//!
//! Every callback first checks that the popup is still mounted and alive,
//! and disconnects both observers otherwise.

use tracing::{debug, trace};

use overlay_core::Rect;
use overlay_layout::{BoxUpdate, LayoutTuning};

use crate::host::{Environment, ObservedTarget, ObserverToken};
use crate::popup::PopupInstance;

/// Tokens of the observers attached to a popup.
#[derive(Debug, Default)]
pub struct Observers {
    content: Option<ObserverToken>,
    outer: Option<ObserverToken>,
}

impl Observers {
    fn token(&self, target: ObservedTarget) -> Option<&ObserverToken> {
        match target {
            ObservedTarget::Content => self.content.as_ref(),
            ObservedTarget::Outer => self.outer.as_ref(),
        }
    }

    pub fn is_connected(&self, target: ObservedTarget) -> bool {
        self.token(target).is_some_and(ObserverToken::is_connected)
    }
}

impl PopupInstance {
    pub(crate) fn connect_observers(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let content = ObserverToken::new();
        let outer = ObserverToken::new();
        surface.observe(ObservedTarget::Content, content.clone());
        surface.observe(ObservedTarget::Outer, outer.clone());
        self.observers = Observers {
            content: Some(content),
            outer: Some(outer),
        };
    }

    pub(crate) fn disconnect_observers(&mut self) {
        let targets = [
            (ObservedTarget::Content, self.observers.content.take()),
            (ObservedTarget::Outer, self.observers.outer.take()),
        ];
        for (target, token) in targets {
            let Some(token) = token else { continue };
            token.disconnect();
            if let Some(surface) = self.surface.as_mut() {
                surface.unobserve(target);
            }
        }
    }

    pub fn is_observing(&self, target: ObservedTarget) -> bool {
        self.observers.is_connected(target)
    }

    /// Entry guard shared by both callbacks.
    fn observer_alive(&mut self, target: ObservedTarget) -> bool {
        if !self.observers.is_connected(target) {
            return false;
        }
        if self.detached || !self.is_mounted() {
            debug!(popup_id = %self.id, "Popup gone, disconnecting observers");
            self.disconnect_observers();
            return false;
        }
        true
    }

    /// Content changed size: follow it.
    pub(crate) fn on_content_resized(
        &mut self,
        env: &dyn Environment,
        tuning: &LayoutTuning,
    ) -> Option<Rect> {
        if !self.observer_alive(ObservedTarget::Content) {
            return None;
        }
        // A fullscreen box ignores content. Moves and held pointers are
        // changes we caused. An external size wins until the next window
        // resize.
        if self.is_fullscreen() || self.moving || self.pointer_down || self.tracker.is_css_resized() {
            trace!(popup_id = %self.id, "Content resize ignored");
            return None;
        }

        let surface = self.surface.as_ref()?;
        let content = surface.content_scroll_size();
        let height = content.height + surface.header_offset_height();
        trace!(popup_id = %self.id, width = content.width, height, "Content resized");
        Some(self.commit(BoxUpdate::size(content.width, height), env, tuning, false))
    }

    /// Outer box changed size: adopt it if the user resized it.
    pub(crate) fn on_outer_resized(
        &mut self,
        env: &dyn Environment,
        tuning: &LayoutTuning,
    ) -> Option<Rect> {
        if !self.observer_alive(ObservedTarget::Outer) {
            return None;
        }
        // Only a held pointer that is not dragging resizes the box.
        if !self.pointer_down || self.moving {
            return None;
        }

        let size = self.surface.as_ref()?.rendered_size();
        if size == self.dims().size() {
            return None;
        }

        debug!(
            popup_id = %self.id,
            width = size.width,
            height = size.height,
            "External resize detected"
        );
        self.tracker.record_external_resize(size, env.viewport().size());
        Some(self.commit(BoxUpdate::size(size.width, size.height), env, tuning, false))
    }
}
