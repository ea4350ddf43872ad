//! # Popup Stack
//!
//! Ordered registry of live popups. Order is open order; z-order is kept
//! separately as a relative z-index per popup.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::popup::PopupInstance;

/// Unique popup identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(u64);

impl PopupId {
    /// Generate a new unique ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for PopupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popup-{}", self.0)
    }
}

/// Live popups in open order.
#[derive(Default)]
pub struct PopupStack {
    popups: Vec<PopupInstance>,
}

impl PopupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }

    pub fn push(&mut self, popup: PopupInstance) {
        self.popups.push(popup);
    }

    /// Remove a popup wherever it sits in the stack.
    pub fn remove(&mut self, id: PopupId) -> Option<PopupInstance> {
        let index = self.popups.iter().position(|p| p.id == id)?;
        Some(self.popups.remove(index))
    }

    pub fn get(&self, id: PopupId) -> Option<&PopupInstance> {
        self.popups.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PopupId) -> Option<&mut PopupInstance> {
        self.popups.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PopupId) -> bool {
        self.get(id).is_some()
    }

    /// Ids in open order.
    pub fn ids(&self) -> Vec<PopupId> {
        self.popups.iter().map(|p| p.id).collect()
    }

    /// Most recently opened popup.
    pub fn last(&self) -> Option<PopupId> {
        self.popups.last().map(|p| p.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PopupInstance> {
        self.popups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PopupInstance> {
        self.popups.iter_mut()
    }

    /// Live popup showing `name` for the same owner.
    pub fn find_duplicate(&self, name: &str, owner: Option<&str>) -> Option<PopupId> {
        self.popups
            .iter()
            .find(|p| !p.detached && p.name == name && p.owner.as_deref() == owner)
            .map(|p| p.id)
    }

    /// Raise a popup above every other one. Returns the applied z-index.
    ///
    /// A popup that is already alone on top keeps its z-index.
    pub fn to_front(&mut self, id: PopupId, base: i32) -> Option<i32> {
        let current = self.get(id)?.z;
        let max = self.popups.iter().map(|p| p.z).max().unwrap_or(current);
        let at_max = self.popups.iter().filter(|p| p.z == max).count();
        let z = if current == max && at_max == 1 { current } else { max + 1 };

        let popup = self.get_mut(id)?;
        popup.set_z(z, base);
        debug!(popup_id = %id, z_index = z + base, "Popup to front");
        Some(z + base)
    }

    /// Lower a popup below every other one. Returns the applied z-index.
    pub fn to_back(&mut self, id: PopupId, base: i32) -> Option<i32> {
        let current = self.get(id)?.z;
        let min = self.popups.iter().map(|p| p.z).min().unwrap_or(current);
        let at_min = self.popups.iter().filter(|p| p.z == min).count();
        let z = if current == min && at_min == 1 { current } else { min - 1 };

        let popup = self.get_mut(id)?;
        popup.set_z(z, base);
        debug!(popup_id = %id, z_index = z + base, "Popup to back");
        Some(z + base)
    }
}
