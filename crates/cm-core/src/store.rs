//! In-memory annotation stores.
//!
//! `CalloutStore` is the per-surface drag state for element callouts.
//! `OverlayStore` is a convenience keyed map for callers that want to keep
//! overlay objects next to the engine and persist intents into it.

use crate::id::{OverlayId, PointKey};
use crate::intent::Intent;
use crate::overlay::OverlayObject;
use indexmap::IndexMap;
use kurbo::Point;
use std::collections::BTreeMap;

/// Manually repositioned callouts. Presence of a key means the user moved
/// that callout; absence means "use the computed default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalloutStore {
    positions: BTreeMap<PointKey, Point>,
}

impl CalloutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: PointKey) -> Option<Point> {
        self.positions.get(&key).copied()
    }

    pub fn contains(&self, key: PointKey) -> bool {
        self.positions.contains_key(&key)
    }

    /// Insert or update a position.
    pub fn insert(&mut self, key: PointKey, p: Point) {
        self.positions.insert(key, p);
    }

    /// Drop every entry. Only surface teardown does this.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Entries in stable `(dataset, point)` order.
    pub fn iter(&self) -> impl Iterator<Item = (PointKey, Point)> + '_ {
        self.positions.iter().map(|(k, p)| (*k, *p))
    }
}

/// Overlay objects keyed by id, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct OverlayStore {
    objects: IndexMap<OverlayId, OverlayObject>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: impl IntoIterator<Item = OverlayObject>) -> Self {
        let mut store = Self::new();
        for o in objects {
            store.upsert(o);
        }
        store
    }

    /// Insert, or replace in place keeping the original insertion slot.
    /// An object without an id gets a generated `image_<n>` / `text_<n>` one,
    /// which is returned.
    pub fn upsert(&mut self, mut object: OverlayObject) -> OverlayId {
        if object.id().is_unset() {
            let kind = if object.is_image() { "image" } else { "text" };
            object.frame.id = OverlayId::generate(kind, |id| self.objects.contains_key(&id));
            log::debug!("overlay without id stored as {}", object.id());
        }
        let id = object.id();
        self.objects.insert(id, object);
        id
    }

    pub fn get(&self, id: OverlayId) -> Option<&OverlayObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut OverlayObject> {
        self.objects.get_mut(&id)
    }

    pub fn remove(&mut self, id: OverlayId) -> Option<OverlayObject> {
        self.objects.shift_remove(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayObject> {
        self.objects.values()
    }

    /// Ascending z-index; ties keep insertion order.
    pub fn draw_order(&self) -> Vec<&OverlayObject> {
        let mut v: Vec<&OverlayObject> = self.objects.values().collect();
        v.sort_by_key(|o| o.frame.z_index);
        v
    }

    /// Exact reverse of [`draw_order`](Self::draw_order): topmost first.
    pub fn hit_order(&self) -> Vec<&OverlayObject> {
        let mut v = self.draw_order();
        v.reverse();
        v
    }

    /// Persist an overlay intent. Returns `true` if anything changed.
    /// Callout intents are ignored; they belong to the callout store.
    pub fn apply(&mut self, intent: &Intent) -> bool {
        let Some(id) = intent.target().and_then(|t| t.overlay_id()) else {
            return false;
        };
        match intent {
            Intent::Move { x, y, .. } => match self.objects.get_mut(&id) {
                Some(o) => {
                    o.frame.x = *x;
                    o.frame.y = *y;
                    true
                }
                None => false,
            },
            Intent::Resize {
                x,
                y,
                width,
                height,
                use_natural_size,
                natural_width,
                natural_height,
                ..
            } => match self.objects.get_mut(&id) {
                Some(o) => {
                    o.frame.x = *x;
                    o.frame.y = *y;
                    o.frame.width = *width;
                    o.frame.height = *height;
                    if let Some(flag) = use_natural_size {
                        o.frame.use_natural_size = *flag;
                    }
                    if natural_width.is_some() {
                        o.frame.natural_width = *natural_width;
                    }
                    if natural_height.is_some() {
                        o.frame.natural_height = *natural_height;
                    }
                    true
                }
                None => false,
            },
            Intent::Remove { .. } => self.objects.shift_remove(&id).is_some(),
            Intent::Select { .. } | Intent::ContextMenu { .. } => false,
        }
    }
}
