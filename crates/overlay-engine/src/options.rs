//! Open-time popup options.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use overlay_common::{OverlayError, Result};
use overlay_core::Bias;

use crate::host::PopupSurface;
use crate::stack::PopupId;

/// An "event selector" pair that closes the popup, e.g. `click .js-close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseTrigger {
    pub event: String,
    pub selector: String,
}

impl CloseTrigger {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (event, selector) = text
            .split_once(char::is_whitespace)
            .ok_or_else(|| OverlayError::InvalidArgument(format!("close trigger '{text}'")))?;
        let selector = selector.trim();
        if event.is_empty() || selector.is_empty() {
            return Err(OverlayError::InvalidArgument(format!("close trigger '{text}'")));
        }
        Ok(Self {
            event: event.to_string(),
            selector: selector.to_string(),
        })
    }

    /// Parse a `;`-separated list, skipping empty entries.
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        list
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn matches(&self, event: &str, selector: &str) -> bool {
        self.event == event && self.selector == selector
    }
}

impl fmt::Display for CloseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.event, self.selector)
    }
}

/// Passed to the teardown callback, before anything is released.
pub struct DestroyContext<'a> {
    pub popup: PopupId,
    pub name: &'a str,
    /// The mounted content, if mounting got that far.
    pub surface: Option<&'a dyn PopupSurface>,
}

/// Passed to the confirm hook.
#[derive(Debug)]
pub struct ConfirmContext<'a> {
    pub popup: PopupId,
    pub args: &'a Value,
    pub whats_this: Option<&'a str>,
}

pub type DestroyCallback = Rc<dyn Fn(&DestroyContext<'_>)>;
pub type ConfirmCallback = Rc<dyn Fn(&ConfirmContext<'_>)>;

/// Options recognized by [`PopupManager::open`](crate::PopupManager::open).
#[derive(Clone)]
pub struct PopupOptions {
    pub name: String,
    pub show_header: bool,
    pub title: Option<String>,
    /// Extra close triggers; the configured defaults are always added.
    pub close_triggers: Vec<CloseTrigger>,
    /// Extra drag handle selector.
    pub handle_selector: Option<String>,
    pub on_destroy: Option<DestroyCallback>,
    /// Let the popup extend past the viewport; handles stay reachable.
    pub off_limits: bool,
    /// Override the automatic sticky classification.
    pub sticky: Option<bool>,
    pub force_data: Option<Value>,
    pub after_confirm: Option<ConfirmCallback>,
    pub whats_this: Option<String>,
    pub confirm_args: Value,
    pub bias_x: Vec<Bias>,
    pub bias_y: Vec<Bias>,
    pub margin: Option<f32>,
    pub fullscreen: bool,
    /// Named external signal and its value at open time.
    pub close_signal: Option<(String, Value)>,
}

impl PopupOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            show_header: true,
            title: None,
            close_triggers: Vec::new(),
            handle_selector: None,
            on_destroy: None,
            off_limits: true,
            sticky: None,
            force_data: None,
            after_confirm: None,
            whats_this: None,
            confirm_args: Value::Null,
            bias_x: Vec::new(),
            bias_y: Vec::new(),
            margin: None,
            fullscreen: false,
            close_signal: None,
        }
    }

    pub fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn close_trigger(mut self, trigger: CloseTrigger) -> Self {
        self.close_triggers.push(trigger);
        self
    }

    /// Add triggers from a `;`-separated string.
    pub fn close_triggers_str(mut self, list: &str) -> Result<Self> {
        self.close_triggers.extend(CloseTrigger::parse_list(list)?);
        Ok(self)
    }

    pub fn handle_selector(mut self, selector: impl Into<String>) -> Self {
        self.handle_selector = Some(selector.into());
        self
    }

    pub fn on_destroy(mut self, callback: impl Fn(&DestroyContext<'_>) + 'static) -> Self {
        self.on_destroy = Some(Rc::new(callback));
        self
    }

    pub fn off_limits(mut self, off_limits: bool) -> Self {
        self.off_limits = off_limits;
        self
    }

    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = Some(sticky);
        self
    }

    pub fn force_data(mut self, data: Value) -> Self {
        self.force_data = Some(data);
        self
    }

    pub fn after_confirm(mut self, callback: impl Fn(&ConfirmContext<'_>) + 'static) -> Self {
        self.after_confirm = Some(Rc::new(callback));
        self
    }

    pub fn whats_this(mut self, label: impl Into<String>) -> Self {
        self.whats_this = Some(label.into());
        self
    }

    pub fn confirm_args(mut self, args: Value) -> Self {
        self.confirm_args = args;
        self
    }

    pub fn bias(mut self, x: Vec<Bias>, y: Vec<Bias>) -> Self {
        self.bias_x = x;
        self.bias_y = y;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn close_signal(mut self, name: impl Into<String>, initial: Value) -> Self {
        self.close_signal = Some((name.into(), initial));
        self
    }
}

impl fmt::Debug for PopupOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupOptions")
            .field("name", &self.name)
            .field("show_header", &self.show_header)
            .field("title", &self.title)
            .field("close_triggers", &self.close_triggers)
            .field("handle_selector", &self.handle_selector)
            .field("off_limits", &self.off_limits)
            .field("sticky", &self.sticky)
            .field("fullscreen", &self.fullscreen)
            .field("close_signal", &self.close_signal)
            .finish_non_exhaustive()
    }
}
