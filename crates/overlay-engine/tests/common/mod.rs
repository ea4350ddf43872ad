//! In-memory host used by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use overlay_engine::{
    ContentRenderer, EngineConfig, Environment, MountRequest, ObservedTarget, ObserverToken,
    Opener, OverlayError, PopupManager, PopupSurface, Rect, Result, Size, Viewport,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("overlay_engine=debug")
        .with_test_writer()
        .try_init();
}

// ==================== Opener ====================

pub struct FakeOpener {
    pub rect: Cell<Rect>,
    pub connected: Cell<bool>,
    pub owner: Option<String>,
    pub parent: Option<Rc<FakeOpener>>,
}

impl FakeOpener {
    pub fn at(x: f32, y: f32, width: f32, height: f32) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(Rect::new(x, y, width, height)),
            connected: Cell::new(true),
            owner: None,
            parent: None,
        })
    }

    pub fn owned(x: f32, y: f32, owner: &str) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(Rect::new(x, y, 40.0, 20.0)),
            connected: Cell::new(true),
            owner: Some(owner.to_string()),
            parent: None,
        })
    }

    pub fn placeholder_in(parent: Rc<FakeOpener>) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(Rect::zero()),
            connected: Cell::new(true),
            owner: None,
            parent: Some(parent),
        })
    }
}

impl Opener for FakeOpener {
    fn bounding_rect(&self) -> Rect {
        self.rect.get()
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn owner_id(&self) -> Option<String> {
        self.owner.clone()
    }

    fn is_placeholder(&self) -> bool {
        self.parent.is_some()
    }

    fn sized_parent(&self) -> Option<Rc<dyn Opener>> {
        self.parent.clone().map(|p| p as Rc<dyn Opener>)
    }
}

// ==================== Environment ====================

#[derive(Clone)]
pub struct FakeEnvironment {
    pub viewport: Rc<Cell<Viewport>>,
    pub compact: Rc<Cell<bool>>,
}

impl Environment for FakeEnvironment {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn is_compact_screen(&self) -> bool {
        self.compact.get()
    }
}

// ==================== Content ====================

/// How a content name renders.
#[derive(Debug, Clone)]
pub struct Content {
    pub content: Size,
    pub header: Option<Size>,
    pub header_offset: f32,
    pub has_container: bool,
    pub mount_fails: bool,
    pub remove_fails: bool,
    pub margin_hint: Option<f32>,
    pub handles: Vec<(String, Rect)>,
}

impl Content {
    /// Headed content with a 30px title bar.
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            content: Size::new(width, height),
            header: Some(Size::new(width, 30.0)),
            header_offset: 30.0,
            has_container: true,
            mount_fails: false,
            remove_fails: false,
            margin_hint: None,
            handles: vec![(".header-title".to_string(), Rect::new(0.0, 0.0, width, 30.0))],
        }
    }

    /// Content without a header.
    pub fn bare(width: f32, height: f32) -> Self {
        Self {
            header: None,
            header_offset: 0.0,
            handles: Vec::new(),
            ..Self::sized(width, height)
        }
    }
}

#[derive(Debug, Default)]
pub struct SurfaceState {
    pub name: String,
    pub content: Size,
    pub header: Option<Size>,
    pub header_offset: f32,
    pub rendered: Size,
    pub has_container: bool,
    pub mounted: bool,
    pub margin_hint: Option<f32>,
    pub handles: HashMap<String, Rect>,
    pub applied: Vec<Rect>,
    pub z_index: i32,
    pub drag_active: bool,
    pub scroll_resets: usize,
    pub content_size_cleared: bool,
    pub tokens: Vec<(ObservedTarget, ObserverToken)>,
    pub unobserved: Vec<ObservedTarget>,
    pub remove_calls: usize,
    pub remove_fails: bool,
}

impl SurfaceState {
    pub fn last_box(&self) -> Option<Rect> {
        self.applied.last().copied()
    }

    pub fn all_tokens_disconnected(&self) -> bool {
        self.tokens.iter().all(|(_, t)| !t.is_connected())
    }
}

pub type SharedSurface = Rc<RefCell<SurfaceState>>;

pub struct FakeSurface(SharedSurface);

impl PopupSurface for FakeSurface {
    fn is_mounted(&self) -> bool {
        self.0.borrow().mounted
    }

    fn has_content_container(&self) -> bool {
        self.0.borrow().has_container
    }

    fn content_scroll_size(&self) -> Size {
        self.0.borrow().content
    }

    fn header_scroll_size(&self) -> Option<Size> {
        self.0.borrow().header
    }

    fn header_offset_height(&self) -> f32 {
        self.0.borrow().header_offset
    }

    fn rendered_size(&self) -> Size {
        self.0.borrow().rendered
    }

    fn margin_hint(&self) -> Option<f32> {
        self.0.borrow().margin_hint
    }

    fn handle_rect(&self, selector: &str) -> Option<Rect> {
        self.0.borrow().handles.get(selector).copied()
    }

    fn apply_box(&mut self, bounds: &Rect) {
        let mut state = self.0.borrow_mut();
        state.rendered = bounds.size();
        state.applied.push(*bounds);
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.0.borrow_mut().z_index = z_index;
    }

    fn set_drag_active(&mut self, active: bool) {
        self.0.borrow_mut().drag_active = active;
    }

    fn scroll_to_origin(&mut self) {
        self.0.borrow_mut().scroll_resets += 1;
    }

    fn clear_content_size(&mut self) {
        self.0.borrow_mut().content_size_cleared = true;
    }

    fn observe(&mut self, target: ObservedTarget, token: ObserverToken) {
        self.0.borrow_mut().tokens.push((target, token));
    }

    fn unobserve(&mut self, target: ObservedTarget) {
        self.0.borrow_mut().unobserved.push(target);
    }

    fn remove(&mut self) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.remove_calls += 1;
        state.mounted = false;
        if state.remove_fails {
            return Err(OverlayError::teardown("subtree already detached"));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeRenderer {
    pub contents: Rc<RefCell<HashMap<String, Content>>>,
    pub surfaces: Rc<RefCell<Vec<SharedSurface>>>,
}

impl ContentRenderer for FakeRenderer {
    fn has_content(&self, name: &str) -> bool {
        self.contents.borrow().contains_key(name)
    }

    fn mount(&self, request: &MountRequest<'_>) -> Result<Box<dyn PopupSurface>> {
        let contents = self.contents.borrow();
        let content = contents
            .get(request.name)
            .ok_or_else(|| OverlayError::UnknownContent(request.name.to_string()))?;
        if content.mount_fails {
            return Err(OverlayError::render(format!("template {} threw", request.name)));
        }

        let state = Rc::new(RefCell::new(SurfaceState {
            name: request.name.to_string(),
            content: content.content,
            header: if request.show_header { content.header } else { None },
            header_offset: if request.show_header { content.header_offset } else { 0.0 },
            has_container: content.has_container,
            mounted: true,
            margin_hint: content.margin_hint,
            handles: content.handles.iter().cloned().collect(),
            remove_fails: content.remove_fails,
            ..Default::default()
        }));
        self.surfaces.borrow_mut().push(Rc::clone(&state));
        Ok(Box::new(FakeSurface(state)))
    }
}

// ==================== Harness ====================

pub struct Harness {
    pub popups: PopupManager,
    pub env: FakeEnvironment,
    pub renderer: FakeRenderer,
}

impl Harness {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, EngineConfig::default())
    }

    pub fn with_config(width: f32, height: f32, config: EngineConfig) -> Self {
        init_tracing();
        let env = FakeEnvironment {
            viewport: Rc::new(Cell::new(Viewport::new(width, height))),
            compact: Rc::new(Cell::new(false)),
        };
        let renderer = FakeRenderer::default();
        let popups = PopupManager::new(config, Box::new(env.clone()), Box::new(renderer.clone()))
            .expect("valid config");
        Self {
            popups,
            env,
            renderer,
        }
    }

    pub fn register(&self, name: &str, content: Content) {
        self.renderer
            .contents
            .borrow_mut()
            .insert(name.to_string(), content);
    }

    pub fn resize_window(&mut self, width: f32, height: f32) {
        self.env.viewport.set(Viewport::new(width, height));
        self.popups.window_resized();
    }

    /// Surface of the n-th mount.
    pub fn surface(&self, index: usize) -> SharedSurface {
        Rc::clone(&self.renderer.surfaces.borrow()[index])
    }

    pub fn last_surface(&self) -> SharedSurface {
        let surfaces = self.renderer.surfaces.borrow();
        Rc::clone(surfaces.last().expect("a popup was mounted"))
    }
}
