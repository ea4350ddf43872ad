//! # Overlay Engine
//!
//! Lifecycle, interaction and stacking for detached popups.
//!
//! ## Design Goals
//!
//! 1. **Explicit registry**: the popup stack is owned by a [`PopupManager`]
//!    value, never hidden static state
//! 2. **Narrow host seams**: the document, viewport and renderer are reached
//!    only through the traits in [`host`]
//! 3. **No zombie popups**: a popup that fails to mount is torn down at once,
//!    and teardown is idempotent
//! 4. **Content stays opaque**: content only sees [`PopupInfo`] snapshots
//!
//! ## Example
//!
//! ```ignore
//! let mut popups = PopupManager::new(EngineConfig::default(), env, renderer)?;
//! let outcome = popups.open(opener, PopupOptions::new("cardLabels"))?;
//! if let Some(id) = outcome.id() {
//!     popups.to_front(id)?;
//! }
//! ```

pub mod config;
pub mod drag;
pub mod host;
pub mod manager;
pub mod observer;
pub mod options;
pub mod popup;
pub mod stack;

pub use config::EngineConfig;
pub use drag::{DragController, DragState};
pub use host::{
    ContentRenderer, Environment, MountRequest, ObservedTarget, ObserverToken, Opener,
    PopupSurface,
};
pub use manager::{OpenOutcome, PointerRegion, PopupManager};
pub use options::{
    CloseTrigger, ConfirmCallback, ConfirmContext, DestroyCallback, DestroyContext, PopupOptions,
};
pub use popup::{PopupInfo, PopupInstance};
pub use stack::{PopupId, PopupStack};

pub use overlay_common::{OverlayError, Result};
pub use overlay_core::{Bias, PointerEvent, Rect, Size, Viewport};
