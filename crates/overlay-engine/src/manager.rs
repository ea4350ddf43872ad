//! # Popup Manager
//!
//! Public surface of the engine. Owns the stack and routes host events
//! (pointer, resize, observer callbacks) to the right popup.
//!
//! Errors follow two rules: contract violations (unknown content, bad
//! arguments) are returned synchronously; render failures tear the popup
//! down, get logged, and `open` reports [`OpenOutcome::Failed`].

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use overlay_common::{OverlayError, Result};
use overlay_core::{PointerEvent, Rect};

use crate::config::EngineConfig;
use crate::host::{ContentRenderer, Environment, MountRequest, ObservedTarget, Opener};
use crate::options::{ConfirmContext, PopupOptions};
use crate::popup::{PopupInfo, PopupInstance};
use crate::stack::{PopupId, PopupStack};

/// Result of an open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new popup is on screen.
    Opened(PopupId),
    /// The same content was already open for this owner and was brought to
    /// front instead.
    Existing(PopupId),
    /// Mounting failed; the popup was torn down.
    Failed,
    /// The opener left the document before the popup could open.
    Aborted,
}

impl OpenOutcome {
    /// Id of the popup now showing the content, if any.
    pub fn id(&self) -> Option<PopupId> {
        match self {
            OpenOutcome::Opened(id) | OpenOutcome::Existing(id) => Some(*id),
            OpenOutcome::Failed | OpenOutcome::Aborted => None,
        }
    }
}

/// Where a pointer press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerRegion<'a> {
    /// Anywhere on the popup.
    Body,
    /// An element matching this selector.
    Handle(&'a str),
}

pub struct PopupManager {
    config: EngineConfig,
    environment: Box<dyn Environment>,
    renderer: Box<dyn ContentRenderer>,
    stack: PopupStack,
}

impl PopupManager {
    pub fn new(
        config: EngineConfig,
        environment: Box<dyn Environment>,
        renderer: Box<dyn ContentRenderer>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            environment,
            renderer,
            stack: PopupStack::new(),
        })
    }

    pub fn with_defaults(
        environment: Box<dyn Environment>,
        renderer: Box<dyn ContentRenderer>,
    ) -> Self {
        Self {
            config: EngineConfig::default(),
            environment,
            renderer,
            stack: PopupStack::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Most recently opened popup.
    pub fn top(&self) -> Option<PopupId> {
        self.stack.last()
    }

    pub fn contains(&self, id: PopupId) -> bool {
        self.stack.contains(id)
    }

    fn popup(&self, id: PopupId) -> Result<&PopupInstance> {
        self.stack
            .get(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))
    }

    fn popup_mut(&mut self, id: PopupId) -> Result<&mut PopupInstance> {
        self.stack
            .get_mut(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))
    }

    // ==================== Open / Close ====================

    /// Open a popup next to `opener`.
    pub fn open(&mut self, opener: Rc<dyn Opener>, options: PopupOptions) -> Result<OpenOutcome> {
        if options.name.trim().is_empty() {
            return Err(OverlayError::InvalidArgument("popup name is empty".into()));
        }
        if !self.renderer.has_content(&options.name) {
            return Err(OverlayError::UnknownContent(options.name));
        }

        if !self.config.allows_duplicates(&options.name) {
            let owner = opener.owner_id();
            if let Some(existing) = self.stack.find_duplicate(&options.name, owner.as_deref()) {
                debug!(popup_id = %existing, name = %options.name, "Already open, bringing to front");
                self.stack.to_front(existing, self.config.z_index_base);
                return Ok(OpenOutcome::Existing(existing));
            }
        }

        if !opener.is_connected() {
            warn!(name = %options.name, "Opener is not in the document, popup not opened");
            return Ok(OpenOutcome::Aborted);
        }

        let id = PopupId::new();
        let compact = self.environment.is_compact_screen();
        let popup = PopupInstance::new(id, opener, options, &self.config, compact);
        self.stack.push(popup);

        if let Err(e) = self.mount(id, compact) {
            error!(popup_id = %id, error = %e, category = e.category(), "Cannot render popup");
            self.destroy(id);
            return Ok(OpenOutcome::Failed);
        }

        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        if let Some(popup) = self.stack.get_mut(id) {
            popup.connect_observers();
            popup.draw(env, tuning);
        }
        self.stack.to_front(id, self.config.z_index_base);

        info!(popup_id = %id, count = self.stack.len(), "Popup opened");
        Ok(OpenOutcome::Opened(id))
    }

    fn mount(&mut self, id: PopupId, compact: bool) -> Result<()> {
        let viewport = self.environment.viewport();
        let default_margin = self.config.layout.default_margin(&viewport);

        let popup = self
            .stack
            .get_mut(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))?;
        let options = &popup.options;
        let request = MountRequest {
            id,
            name: &options.name,
            title: options.title.as_deref(),
            show_header: options.show_header,
            data: options.force_data.as_ref(),
            compact,
        };
        let surface = self.renderer.mount(&request)?;
        if !surface.has_content_container() {
            // Keep the surface so teardown removes what was mounted.
            popup.attach(surface, default_margin);
            return Err(OverlayError::render(format!(
                "content container missing for '{}'",
                popup.name
            )));
        }

        let margin = popup
            .options
            .margin
            .or_else(|| surface.margin_hint())
            .unwrap_or(default_margin);
        popup.attach(surface, margin);
        Ok(())
    }

    /// Tear a popup down. Returns `false` when it was not open.
    fn destroy(&mut self, id: PopupId) -> bool {
        let Some(mut popup) = self.stack.remove(id) else {
            return false;
        };
        let destroyed = popup.teardown();
        if destroyed {
            info!(popup_id = %id, count = self.stack.len(), "Popup closed");
        }
        destroyed
    }

    /// Close a specific popup. Closing it twice has no further effect.
    pub fn close_popup(&mut self, id: PopupId) -> bool {
        self.destroy(id)
    }

    /// Close the most recently opened popup.
    pub fn close(&mut self) -> bool {
        self.back(1) == 1
    }

    /// Close the `n` most recently opened popups. Returns how many closed.
    pub fn back(&mut self, n: usize) -> usize {
        let mut closed = 0;
        while closed < n {
            let Some(id) = self.stack.last() else { break };
            if self.destroy(id) {
                closed += 1;
            }
        }
        closed
    }

    /// `back` followed by a re-render of every remaining popup.
    pub fn back_with_refresh(&mut self, n: usize) -> Result<usize> {
        let closed = self.back(n);
        let remaining = self.stack.ids();
        self.refresh(&remaining)?;
        Ok(closed)
    }

    pub fn close_all(&mut self) -> usize {
        let count = self.stack.len();
        self.back(count)
    }

    /// Re-render popups from scratch with their original opener and
    /// options, in stack order.
    pub fn refresh(&mut self, ids: &[PopupId]) -> Result<Vec<OpenOutcome>> {
        let targets: Vec<(PopupId, Rc<dyn Opener>, PopupOptions)> = self
            .stack
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| (p.id, Rc::clone(&p.opener), p.options.clone()))
            .collect();

        let mut outcomes = Vec::with_capacity(targets.len());
        for (id, opener, options) in targets {
            self.destroy(id);
            outcomes.push(self.open(opener, options)?);
        }
        Ok(outcomes)
    }

    /// Close every popup whose opener left the document.
    pub fn sweep_detached_openers(&mut self) -> Vec<PopupId> {
        let gone: Vec<PopupId> = self
            .stack
            .iter()
            .filter(|p| !p.opener.is_connected())
            .map(|p| p.id)
            .collect();
        for id in &gone {
            debug!(popup_id = %id, "Opener removed, closing popup");
            self.destroy(*id);
        }
        gone
    }

    // ==================== Layout ====================

    /// Force a layout pass.
    pub fn draw(&mut self, id: PopupId) -> Result<Rect> {
        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        let popup = self
            .stack
            .get_mut(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))?;
        popup
            .draw(env, tuning)
            .ok_or_else(|| OverlayError::render(format!("popup {id} is not mounted")))
    }

    /// The window was resized: external sizes are dropped and every popup
    /// is laid out again. A popup being dragged keeps its position.
    pub fn window_resized(&mut self) {
        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        for popup in self.stack.iter_mut() {
            popup.tracker.on_window_resize();
            if !popup.moving {
                popup.draw(env, tuning);
            }
        }
    }

    /// The opener moved or changed size.
    pub fn opener_resized(&mut self, id: PopupId) -> Result<()> {
        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        let popup = self
            .stack
            .get_mut(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))?;
        if !popup.moving {
            popup.draw(env, tuning);
        }
        Ok(())
    }

    /// Host callback for an observed size change.
    ///
    /// Returns the new box when the change was applied. Callbacks for
    /// closed popups are dropped.
    pub fn observed_resize(&mut self, id: PopupId, target: ObservedTarget) -> Option<Rect> {
        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        let popup = self.stack.get_mut(id)?;
        match target {
            ObservedTarget::Content => popup.on_content_resized(env, tuning),
            ObservedTarget::Outer => popup.on_outer_resized(env, tuning),
        }
    }

    pub fn maximize(&mut self, id: PopupId) -> Result<()> {
        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        let popup = self
            .stack
            .get_mut(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))?;
        popup.maximize(env, tuning);
        Ok(())
    }

    pub fn minimize(&mut self, id: PopupId) -> Result<()> {
        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        let popup = self
            .stack
            .get_mut(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))?;
        popup.minimize(env, tuning);
        Ok(())
    }

    pub fn dims(&self, id: PopupId) -> Result<Rect> {
        Ok(self.popup(id)?.dims())
    }

    pub fn is_fullscreen(&self, id: PopupId) -> Result<bool> {
        Ok(self.popup(id)?.is_fullscreen())
    }

    /// Whether the popup keeps a size applied from outside the engine.
    pub fn is_css_resized(&self, id: PopupId) -> Result<bool> {
        Ok(self.popup(id)?.is_css_resized())
    }

    pub fn is_moving(&self, id: PopupId) -> Result<bool> {
        Ok(self.popup(id)?.is_moving())
    }

    // ==================== Z-Order ====================

    pub fn to_front(&mut self, id: PopupId) -> Result<i32> {
        self.stack
            .to_front(id, self.config.z_index_base)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))
    }

    pub fn to_back(&mut self, id: PopupId) -> Result<i32> {
        self.stack
            .to_back(id, self.config.z_index_base)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))
    }

    // ==================== Content View ====================

    pub fn info(&self, id: PopupId) -> Result<PopupInfo> {
        Ok(self.popup(id)?.info(self.config.z_index_base))
    }

    /// Snapshots of every popup, in open order.
    pub fn stack(&self) -> Vec<PopupInfo> {
        self.stack
            .iter()
            .map(|p| p.info(self.config.z_index_base))
            .collect()
    }

    // ==================== Events ====================

    /// Route a DOM event from inside a popup. Returns whether it closed
    /// the popup.
    pub fn dispatch_event(&mut self, id: PopupId, event: &str, selector: &str) -> Result<bool> {
        if !self.popup(id)?.matches_close_trigger(event, selector) {
            return Ok(false);
        }
        debug!(popup_id = %id, event, selector, "Close trigger matched");
        Ok(self.destroy(id))
    }

    /// Run the confirm hook. Returns whether one was configured.
    pub fn confirm(&self, id: PopupId) -> Result<bool> {
        let popup = self.popup(id)?;
        let Some(callback) = popup.options.after_confirm.clone() else {
            return Ok(false);
        };
        callback(&ConfirmContext {
            popup: id,
            args: &popup.options.confirm_args,
            whats_this: popup.options.whats_this.as_deref(),
        });
        Ok(true)
    }

    /// A named external signal changed. Popups bound to it close when the
    /// value differs from the one seen at open time.
    pub fn signal_changed(&mut self, name: &str, value: &Value) -> Vec<PopupId> {
        let closing: Vec<PopupId> = self
            .stack
            .iter()
            .filter(|p| {
                p.signal
                    .as_ref()
                    .is_some_and(|(signal, initial)| signal == name && initial != value)
            })
            .map(|p| p.id)
            .collect();
        for id in &closing {
            debug!(popup_id = %id, signal = name, "Close signal changed");
            self.destroy(*id);
        }
        closing
    }

    // ==================== Pointer ====================

    /// Pointer pressed inside a popup. Returns whether a drag started.
    pub fn pointer_down(
        &mut self,
        id: PopupId,
        event: &PointerEvent,
        region: PointerRegion<'_>,
    ) -> Result<bool> {
        self.to_front(id)?;
        let ignored = self.environment.should_ignore_pointer(event);
        let popup = self.popup_mut(id)?;
        popup.pointer_down = true;

        match region {
            PointerRegion::Handle(selector) if popup.is_handle(selector) => {
                Ok(popup.begin_drag(event, ignored))
            }
            _ => Ok(false),
        }
    }

    /// Pointer moved. Returns the new box while dragging.
    pub fn pointer_move(&mut self, id: PopupId, event: &PointerEvent) -> Result<Option<Rect>> {
        let env = self.environment.as_ref();
        let tuning = &self.config.layout;
        let popup = self
            .stack
            .get_mut(id)
            .ok_or(OverlayError::PopupNotFound(id.as_u64()))?;
        Ok(popup.drag_to(event, env, tuning))
    }

    pub fn pointer_up(&mut self, id: PopupId) -> Result<()> {
        let popup = self.popup_mut(id)?;
        popup.end_drag();
        popup.pointer_down = false;
        Ok(())
    }
}
