//! # Popup Instance
//!
//! State of one open popup: its opener, mounted surface, mode flags,
//! reference size and authoritative box. Observation and drag handling
//! live in their own modules but operate on this type.

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use overlay_core::Rect;
use overlay_layout::{
    compute_layout, BoxUpdate, ConstraintContext, ConstraintEngine, LayoutOutcome, LayoutTuning,
    NaturalMeasure, PlacementInput, ReferenceTracker,
};

use crate::config::EngineConfig;
use crate::drag::DragController;
use crate::host::{Environment, Opener, PopupSurface};
use crate::observer::Observers;
use crate::options::{CloseTrigger, DestroyContext, PopupOptions};
use crate::stack::PopupId;

/// Read-only view of a popup, the only thing content gets to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupInfo {
    pub id: u64,
    pub name: String,
    pub bounds: Rect,
    pub z_index: i32,
    pub fullscreen: bool,
    pub sticky: bool,
}

pub struct PopupInstance {
    pub(crate) id: PopupId,
    pub(crate) name: String,
    pub(crate) owner: Option<String>,
    pub(crate) opener: Rc<dyn Opener>,
    pub(crate) options: PopupOptions,
    pub(crate) surface: Option<Box<dyn PopupSurface>>,
    /// Requested through options or `maximize`.
    pub(crate) fullscreen: bool,
    /// Set by the last layout pass when nothing fit.
    pub(crate) fullscreen_fallback: bool,
    pub(crate) moving: bool,
    pub(crate) pointer_down: bool,
    pub(crate) engine: ConstraintEngine,
    pub(crate) tracker: ReferenceTracker,
    pub(crate) margin: f32,
    pub(crate) close_triggers: Vec<CloseTrigger>,
    pub(crate) handle_selectors: Vec<String>,
    /// Relative z-index.
    pub(crate) z: i32,
    pub(crate) detached: bool,
    pub(crate) observers: Observers,
    pub(crate) drag: DragController,
    pub(crate) signal: Option<(String, Value)>,
}

impl PopupInstance {
    pub fn new(
        id: PopupId,
        opener: Rc<dyn Opener>,
        options: PopupOptions,
        config: &EngineConfig,
        compact: bool,
    ) -> Self {
        let mut close_triggers = options.close_triggers.clone();
        close_triggers.extend(config.close_triggers());

        let mut handle_selectors = Vec::new();
        if options.show_header {
            handle_selectors.push(if compact {
                config.compact_handle_selector.clone()
            } else {
                config.header_handle_selector.clone()
            });
        }
        if let Some(selector) = &options.handle_selector {
            handle_selectors.push(selector.clone());
        }

        Self {
            id,
            name: options.name.clone(),
            owner: opener.owner_id(),
            tracker: ReferenceTracker::new(options.show_header, options.sticky),
            fullscreen: options.fullscreen,
            signal: options.close_signal.clone(),
            opener,
            options,
            surface: None,
            fullscreen_fallback: false,
            moving: false,
            pointer_down: false,
            engine: ConstraintEngine::new(),
            margin: 0.0,
            close_triggers,
            handle_selectors,
            z: 0,
            detached: false,
            observers: Observers::default(),
            drag: DragController::default(),
        }
    }

    pub fn id(&self) -> PopupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opener(&self) -> &Rc<dyn Opener> {
        &self.opener
    }

    pub fn options(&self) -> &PopupOptions {
        &self.options
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.is_mounted())
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen || self.fullscreen_fallback
    }

    pub fn is_sticky(&self) -> bool {
        self.tracker.is_sticky()
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn is_css_resized(&self) -> bool {
        self.tracker.is_css_resized()
    }

    /// Snapshot of the current box.
    pub fn dims(&self) -> Rect {
        self.engine.current()
    }

    pub fn handle_selectors(&self) -> &[String] {
        &self.handle_selectors
    }

    pub fn close_triggers(&self) -> &[CloseTrigger] {
        &self.close_triggers
    }

    pub fn info(&self, z_base: i32) -> PopupInfo {
        PopupInfo {
            id: self.id.as_u64(),
            name: self.name.clone(),
            bounds: self.dims(),
            z_index: self.z + z_base,
            fullscreen: self.is_fullscreen(),
            sticky: self.is_sticky(),
        }
    }

    pub(crate) fn attach(&mut self, surface: Box<dyn PopupSurface>, margin: f32) {
        self.surface = Some(surface);
        self.margin = margin;
    }

    pub(crate) fn set_z(&mut self, z: i32, base: i32) {
        self.z = z;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_z_index(z + base);
        }
    }

    pub(crate) fn matches_close_trigger(&self, event: &str, selector: &str) -> bool {
        self.close_triggers.iter().any(|t| t.matches(event, selector))
    }

    /// Opener geometry; placeholders are sized through their parent.
    fn anchor_rect(&self) -> Rect {
        if self.opener.is_placeholder() {
            if let Some(parent) = self.opener.sized_parent() {
                return parent.bounding_rect();
            }
        }
        self.opener.bounding_rect()
    }

    fn handle_rects(&self) -> Vec<Rect> {
        let Some(surface) = self.surface.as_ref() else {
            return Vec::new();
        };
        self.handle_selectors
            .iter()
            .filter_map(|selector| surface.handle_rect(selector))
            .collect()
    }

    /// Route an update through the constraint engine and apply the result.
    pub(crate) fn commit(
        &mut self,
        update: BoxUpdate,
        env: &dyn Environment,
        tuning: &LayoutTuning,
        dragging: bool,
    ) -> Rect {
        let live = env.viewport().size();
        let handles = if dragging { self.handle_rects() } else { Vec::new() };
        let ctx = ConstraintContext {
            reference_viewport: self.tracker.frame(live),
            live_viewport: live,
            margin: self.margin,
            off_limits: self.options.off_limits || self.is_fullscreen(),
            dragging,
            handles: &handles,
            tuning,
        };

        let outcome = self.engine.apply(update, &ctx);
        if outcome.fullscreen_fallback {
            self.fullscreen_fallback = true;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.apply_box(&outcome.bounds);
        }
        outcome.bounds
    }

    /// Full layout pass against the opener.
    pub(crate) fn draw(&mut self, env: &dyn Environment, tuning: &LayoutTuning) -> Option<Rect> {
        if self.detached {
            return None;
        }
        let surface = self.surface.as_ref()?;

        let viewport = env.viewport();
        let live = viewport.size();
        let measure = NaturalMeasure {
            content: surface.content_scroll_size(),
            header: if self.options.show_header {
                surface.header_scroll_size()
            } else {
                None
            },
        };
        let rendered = surface.rendered_size();

        self.tracker.ensure_captured(measure, rendered, live, tuning);
        let frame = self.tracker.frame(live);
        let desired = self.tracker.desired_size(frame).unwrap_or(rendered);

        let input = PlacementInput {
            opener: self.anchor_rect(),
            popup: desired,
            frame,
            margin: self.margin,
            fullscreen: self.fullscreen,
            compact: env.is_compact_screen(),
            bias_x: &self.options.bias_x,
            bias_y: &self.options.bias_y,
        };
        let outcome = compute_layout(&input, tuning);

        self.fullscreen_fallback = false;
        let update = match outcome {
            LayoutOutcome::Placed(bounds) => BoxUpdate::full(bounds),
            LayoutOutcome::Fullscreen => {
                self.fullscreen_fallback = !self.fullscreen;
                BoxUpdate::full(viewport.full_rect())
            }
        };

        let bounds = self.commit(update, env, tuning, false);
        debug!(
            popup_id = %self.id,
            left = bounds.x,
            top = bounds.y,
            width = bounds.width,
            height = bounds.height,
            fullscreen = self.is_fullscreen(),
            "Popup drawn"
        );
        Some(bounds)
    }

    pub(crate) fn maximize(&mut self, env: &dyn Environment, tuning: &LayoutTuning) {
        self.fullscreen = true;
        self.draw(env, tuning);
        if let Some(surface) = self.surface.as_mut() {
            surface.clear_content_size();
        }
    }

    pub(crate) fn minimize(&mut self, env: &dyn Environment, tuning: &LayoutTuning) {
        self.fullscreen = false;
        self.draw(env, tuning);
    }

    /// Release everything the popup owns. Returns `false` when it was
    /// already torn down.
    pub(crate) fn teardown(&mut self) -> bool {
        if self.detached {
            return false;
        }
        self.detached = true;

        if let Some(callback) = self.options.on_destroy.clone() {
            callback(&DestroyContext {
                popup: self.id,
                name: &self.name,
                surface: self.surface.as_deref(),
            });
        }

        self.disconnect_observers();
        self.drag.reset();
        self.moving = false;
        self.pointer_down = false;
        self.signal = None;

        // Partially mounted popups are expected here; removal is best-effort.
        if let Some(mut surface) = self.surface.take() {
            if let Err(e) = surface.remove() {
                trace!(popup_id = %self.id, error = %e, "Ignoring teardown failure");
            }
        }
        true
    }
}
