//! Per-surface annotation engine.
//!
//! `AnnotationCanvas` bundles everything one chart surface needs: the
//! current element geometry, the caller's annotation configuration and
//! overlay objects, the callout store, the interaction machine, the image
//! cache and the redraw coordinator. Two canvases on one page share
//! nothing.
//!
//! Overlay intents are applied to the canvas' own mirror of the overlay
//! store so the next frame already shows them, and queued for the caller,
//! who owns the real store.

use crate::images::{ImageCache, Request, Waiter};
use crate::input::InputEvent;
use crate::machine::{InteractionMachine, Redraw};
use cm_core::{
    Annotation, AnnotationConfig, CalloutStore, ChartType, Element, ElementGeometry,
    FeatureToggles, Intent, OverlayId, OverlayObject, OverlayStore, PointKey, RawElement,
    fit::smart_overlay_size,
};
use cm_render::hit::overlay_target;
use cm_render::{
    AnnotationStatus, DrawingSurface, FrameInput, HitScene, ImageProvider, LoadedImage,
    ResolvedAnnotation, render_frame,
};
use kurbo::{Point, Size};
use std::collections::BTreeMap;

use crate::redraw::RedrawCoordinator;

pub struct AnnotationCanvas<I> {
    chart_type: ChartType,
    elements: Vec<Element>,
    annotations: BTreeMap<PointKey, AnnotationConfig>,
    overlays: OverlayStore,
    toggles: FeatureToggles,
    callouts: CalloutStore,
    machine: InteractionMachine,
    images: ImageCache<I>,
    redraw: RedrawCoordinator,
    selected: Option<OverlayId>,
    scene: HitScene,
    resolved: Vec<ResolvedAnnotation>,
    intents: Vec<Intent>,
    fetches: Vec<String>,
    surface_size: Size,
}

impl<I> AnnotationCanvas<I> {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            elements: Vec::new(),
            annotations: BTreeMap::new(),
            overlays: OverlayStore::new(),
            toggles: FeatureToggles::default(),
            callouts: CalloutStore::new(),
            machine: InteractionMachine::new(),
            images: ImageCache::new(),
            redraw: RedrawCoordinator::new(),
            selected: None,
            scene: HitScene::default(),
            resolved: Vec::new(),
            intents: Vec::new(),
            fetches: Vec::new(),
            surface_size: Size::ZERO,
        }
    }

    // ─── Inputs ─────────────────────────────────────────────────────────

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.chart_type = chart_type;
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn set_elements(&mut self, elements: Vec<Element>) {
        self.elements = elements;
    }

    /// Normalize host descriptors for the current chart type.
    pub fn set_raw_elements<'a>(&mut self, raw: impl IntoIterator<Item = (PointKey, &'a RawElement)>) {
        let chart_type = self.chart_type;
        self.elements = raw
            .into_iter()
            .map(|(key, r)| Element::new(key, ElementGeometry::normalize(chart_type, r)))
            .collect();
    }

    pub fn annotations(&self) -> &BTreeMap<PointKey, AnnotationConfig> {
        &self.annotations
    }

    pub fn set_annotations(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.annotations = annotations.into_iter().map(|a| (a.key, a.config)).collect();
    }

    pub fn overlays(&self) -> &OverlayStore {
        &self.overlays
    }

    pub fn set_overlays(&mut self, overlays: impl IntoIterator<Item = OverlayObject>) {
        self.overlays = OverlayStore::from_objects(overlays);
        if let Some(id) = self.selected
            && self.overlays.get(id).is_none()
        {
            self.selected = None;
        }
        self.refresh_scene();
    }

    pub fn toggles(&self) -> FeatureToggles {
        self.toggles
    }

    pub fn set_toggles(&mut self, toggles: FeatureToggles) {
        self.toggles = toggles;
    }

    pub fn callouts(&self) -> &CalloutStore {
        &self.callouts
    }

    pub fn selected(&self) -> Option<OverlayId> {
        self.selected
    }

    pub fn set_selected(&mut self, id: Option<OverlayId>) {
        self.selected = id;
        self.scene.selected = id;
    }

    /// Size of the surface at the last draw.
    pub fn surface_size(&self) -> Size {
        self.surface_size
    }

    /// Annotations as resolved by the last draw.
    pub fn resolved(&self) -> &[ResolvedAnnotation] {
        &self.resolved
    }

    pub fn resolved_point(&self, key: PointKey) -> Option<Point> {
        self.resolved.iter().find(|r| r.key == key).map(|r| r.point)
    }

    pub fn is_interacting(&self) -> bool {
        !self.machine.is_idle()
    }

    // ─── Frame ──────────────────────────────────────────────────────────

    /// Ask for a frame after an input change. Returns `true` if the caller
    /// must schedule one.
    pub fn request_redraw(&mut self) -> bool {
        self.redraw.request()
    }

    /// One redraw pass. Returns `true` if the pass itself asked for another
    /// frame, which the caller must schedule like any other request.
    pub fn draw<S>(&mut self, s: &mut S) -> bool
    where
        S: DrawingSurface<Image = I>,
    {
        self.redraw.begin_frame();
        self.surface_size = s.size();

        let input = FrameInput {
            elements: &self.elements,
            annotations: &self.annotations,
            callouts: &self.callouts,
            overlays: &self.overlays,
            toggles: self.toggles,
            selected: self.selected,
        };
        let report = render_frame(s, &self.images, &input);

        for (key, p) in &report.callout_defaults {
            if let Some(config) = self.annotations.get_mut(key) {
                config.persist_callout(*p);
            }
        }

        for r in &report.resolved {
            if let AnnotationStatus::Pending(url) = &r.status {
                self.request_image(url, Waiter::Annotation(r.key));
            }
        }
        let waiting: Vec<(String, OverlayId)> = self
            .overlays
            .iter()
            .filter_map(|o| o.image_url().map(|url| (url.to_string(), o.id())))
            .filter(|(url, _)| report.missing_images.contains(url))
            .collect();
        for (url, id) in waiting {
            self.request_image(&url, Waiter::Overlay(id));
        }
        self.resolved = report.resolved;
        self.scene = report.hit_scene;
        self.backfill_ready_overlays()
    }

    fn request_image(&mut self, url: &str, waiter: Waiter) {
        if self.images.request(url, waiter) == Request::Fetch {
            self.fetches.push(url.to_string());
        }
    }

    /// Natural-size overlays whose image was already decoded before they
    /// were added never see a completion; size them here.
    fn backfill_ready_overlays(&mut self) -> bool {
        let height = self.surface_size.height;
        let resizes: Vec<Intent> = self
            .overlays
            .iter()
            .filter(|o| o.frame.use_natural_size && o.frame.natural_size().is_none())
            .filter_map(|o| {
                let loaded = o.image_url().and_then(|url| self.images.loaded(url))?;
                let size = smart_overlay_size(loaded.natural, height);
                Some(Intent::Resize {
                    target: overlay_target(o),
                    x: o.frame.x,
                    y: o.frame.y,
                    width: size.width,
                    height: size.height,
                    use_natural_size: Some(false),
                    natural_width: Some(loaded.natural.width),
                    natural_height: Some(loaded.natural.height),
                })
            })
            .collect();
        if resizes.is_empty() {
            return false;
        }
        for intent in resizes {
            self.emit(intent);
        }
        self.redraw.request()
    }

    // ─── Interaction ────────────────────────────────────────────────────

    /// Feed one input event. Returns `true` if the caller must schedule a frame.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        let outcome = self
            .machine
            .handle_event(event, &self.scene, &mut self.callouts);
        for intent in outcome.intents {
            self.emit(intent);
        }
        match outcome.redraw {
            Redraw::Immediate => self.redraw.request(),
            Redraw::None => false,
        }
    }

    pub fn cursor_at(&self, p: Point) -> &'static str {
        self.machine.cursor_at(p, &self.scene)
    }

    fn emit(&mut self, intent: Intent) {
        match &intent {
            Intent::Select { id, .. } => self.set_selected(*id),
            Intent::Remove { target } if target.overlay_id() == self.selected => {
                self.set_selected(None);
            }
            _ => {}
        }
        if self.overlays.apply(&intent) {
            self.refresh_scene();
        }
        self.intents.push(intent);
    }

    fn refresh_scene(&mut self) {
        self.scene.overlays = self.overlays.hit_order().into_iter().cloned().collect();
        self.scene.selected = self.selected;
    }

    /// Intents produced since the last call, oldest first.
    pub fn take_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    /// URLs the caller must start loading, each exactly once.
    pub fn take_fetches(&mut self) -> Vec<String> {
        std::mem::take(&mut self.fetches)
    }

    // ─── Images ─────────────────────────────────────────────────────────

    /// A fetch finished decoding. Returns `true` if the caller must schedule a frame.
    pub fn image_loaded(&mut self, url: &str, image: LoadedImage<I>) -> bool {
        self.finish_image(url, Ok(image))
    }

    pub fn image_failed(&mut self, url: &str, reason: impl Into<String>) -> bool {
        self.finish_image(url, Err(reason.into()))
    }

    fn finish_image(&mut self, url: &str, result: Result<LoadedImage<I>, String>) -> bool {
        let done = self
            .images
            .complete(url, result, &self.overlays, self.surface_size.height);
        for intent in done.intents {
            self.emit(intent);
        }
        done.redraw && self.redraw.request()
    }

    /// Release per-surface state when the chart is destroyed. Callout
    /// positions are forgotten; the caller's configuration is untouched.
    pub fn teardown(&mut self) {
        self.callouts.clear();
        self.machine = InteractionMachine::new();
        self.images.clear();
        self.intents.clear();
        self.fetches.clear();
        self.resolved.clear();
        self.scene = HitScene::default();
        self.selected = None;
        log::debug!("annotation canvas torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::{Anchor, BarGeometry, Target};
    use cm_render::RecordingSurface;
    use kurbo::Rect;
    use pretty_assertions::assert_eq;

    fn bar() -> Element {
        Element::new(
            PointKey::new(0, 0),
            ElementGeometry::Bar(BarGeometry {
                x: 50.0,
                y: 10.0,
                base: 200.0,
                width: 20.0,
                height: 190.0,
                horizontal: false,
            }),
        )
    }

    #[test]
    fn missing_images_are_fetched_once() {
        let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
        canvas.set_elements(vec![bar()]);
        canvas.set_annotations([Annotation::new(PointKey::new(0, 0), AnnotationConfig::image("a.png"))]);
        canvas.set_overlays([OverlayObject::image("o", "a.png", Rect::new(0.0, 0.0, 40.0, 40.0))]);

        let mut s = RecordingSurface::new(300.0, 300.0);
        canvas.draw(&mut s);
        canvas.draw(&mut s);
        assert_eq!(canvas.take_fetches(), vec!["a.png".to_string()]);

        let loaded = LoadedImage {
            image: "a.png".to_string(),
            natural: Size::new(10.0, 10.0),
        };
        assert!(canvas.image_loaded("a.png", loaded.clone()));
        assert!(!canvas.image_loaded("a.png", loaded), "second completion is a no-op");
    }

    #[test]
    fn callout_default_is_written_back_into_config() {
        let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
        canvas.set_elements(vec![bar()]);
        let mut config = AnnotationConfig::text("peak");
        config.anchor = Anchor::Callout;
        canvas.set_annotations([Annotation::new(PointKey::new(0, 0), config)]);

        let mut s = RecordingSurface::new(300.0, 300.0);
        canvas.draw(&mut s);
        let stored = &canvas.annotations()[&PointKey::new(0, 0)];
        assert_eq!(stored.persisted_callout(), canvas.resolved_point(PointKey::new(0, 0)));
    }

    #[test]
    fn select_and_delete_track_the_mirror() {
        let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
        canvas.set_overlays([OverlayObject::text("t", "hello", Rect::new(10.0, 10.0, 110.0, 60.0))]);
        let mut s = RecordingSurface::new(300.0, 300.0);
        canvas.draw(&mut s);

        canvas.handle_event(&InputEvent::pointer_down(50.0, 30.0));
        canvas.handle_event(&InputEvent::pointer_up(50.0, 30.0));
        assert_eq!(canvas.selected(), Some(OverlayId::intern("t")));

        canvas.handle_event(&InputEvent::key("Delete", crate::input::Modifiers::NONE));
        assert_eq!(canvas.selected(), None);
        assert!(canvas.overlays().is_empty());
        let target = Target::Text {
            id: OverlayId::intern("t"),
        };
        assert_eq!(
            canvas.take_intents(),
            vec![Intent::select(target), Intent::Remove { target }]
        );
    }

    #[test]
    fn teardown_forgets_callouts() {
        let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
        canvas.callouts.insert(PointKey::new(0, 0), Point::new(1.0, 2.0));
        canvas.teardown();
        assert!(canvas.callouts().is_empty());
    }
}
