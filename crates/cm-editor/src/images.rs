//! Decoded-image cache.
//!
//! One slot per URL. The first request starts a fetch; later requests wait
//! on it. Completion wakes the waiters exactly once.

use cm_core::{Intent, OverlayId, OverlayStore, PointKey, fit::smart_overlay_size};
use cm_render::hit::overlay_target;
use cm_render::{ImageProvider, LoadedImage};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Who is waiting on a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waiter {
    Annotation(PointKey),
    Overlay(OverlayId),
}

#[derive(Debug)]
enum Slot<I> {
    Loading { waiters: SmallVec<[Waiter; 2]> },
    Ready(LoadedImage<I>),
    Failed,
}

/// Answer to [`ImageCache::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// First request for this URL: the caller must start loading it.
    Fetch,
    /// Already loading.
    Pending,
    Ready,
    /// Loading failed earlier. Not retried.
    Failed,
}

/// What a completed load asks of the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    /// Back-fill resizes for overlays that wanted their natural size.
    pub intents: Vec<Intent>,
    pub redraw: bool,
}

#[derive(Debug)]
pub struct ImageCache<I> {
    slots: HashMap<String, Slot<I>>,
}

impl<I> Default for ImageCache<I> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<I> ImageCache<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, url: &str, waiter: Waiter) -> Request {
        match self.slots.get_mut(url) {
            None => {
                let mut waiters = SmallVec::new();
                waiters.push(waiter);
                self.slots.insert(url.to_string(), Slot::Loading { waiters });
                log::debug!("image fetch: {url}");
                Request::Fetch
            }
            Some(Slot::Loading { waiters }) => {
                if !waiters.contains(&waiter) {
                    waiters.push(waiter);
                }
                Request::Pending
            }
            Some(Slot::Ready(_)) => Request::Ready,
            Some(Slot::Failed) => Request::Failed,
        }
    }

    pub fn is_loading(&self, url: &str) -> bool {
        matches!(self.slots.get(url), Some(Slot::Loading { .. }))
    }

    pub fn is_failed(&self, url: &str) -> bool {
        matches!(self.slots.get(url), Some(Slot::Failed))
    }

    /// Finish a load started by [`Request::Fetch`].
    ///
    /// Unknown URLs and URLs that already completed are ignored, so a late
    /// or duplicated callback never triggers a second redraw. Waiters whose
    /// overlay has since been removed are dropped silently.
    pub fn complete(
        &mut self,
        url: &str,
        result: Result<LoadedImage<I>, String>,
        overlays: &OverlayStore,
        surface_height: f64,
    ) -> Completion {
        let Some(slot) = self.slots.get_mut(url) else {
            log::debug!("late image load ignored: {url}");
            return Completion::default();
        };
        let waiters = match slot {
            Slot::Loading { waiters } => std::mem::take(waiters),
            Slot::Ready(_) | Slot::Failed => return Completion::default(),
        };

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(reason) => {
                log::warn!("image load failed: {url}: {reason}");
                *slot = Slot::Failed;
                return Completion::default();
            }
        };

        let natural = loaded.natural;
        let intents = waiters
            .iter()
            .filter_map(|w| match w {
                Waiter::Overlay(id) => overlays.get(*id),
                Waiter::Annotation(_) => None,
            })
            .filter(|o| o.frame.use_natural_size && o.image_url() == Some(url))
            .map(|o| {
                let size = smart_overlay_size(natural, surface_height);
                Intent::Resize {
                    target: overlay_target(o),
                    x: o.frame.x,
                    y: o.frame.y,
                    width: size.width,
                    height: size.height,
                    use_natural_size: Some(false),
                    natural_width: Some(natural.width),
                    natural_height: Some(natural.height),
                }
            })
            .collect();

        *slot = Slot::Ready(loaded);
        Completion {
            intents,
            redraw: true,
        }
    }

    /// Drop every slot. In-flight loads complete as no-ops afterwards.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<I> ImageProvider<I> for ImageCache<I> {
    fn loaded(&self, url: &str) -> Option<&LoadedImage<I>> {
        match self.slots.get(url) {
            Some(Slot::Ready(loaded)) => Some(loaded),
            _ => None,
        }
    }
}
