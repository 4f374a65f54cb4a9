//! One redraw pass over the chart's annotations and overlays.
//!
//! Elements are visited in `(dataset, point)` order, then overlays in
//! ascending z-index, so overlaps render the same way every run. The pass
//! never mutates its inputs: callout defaults and undecoded images are
//! reported back for the caller to act on.

use crate::annotation::{AnnotationStatus, draw_annotation};
use crate::hit::{CalloutTarget, HitScene};
use crate::overlay::draw_overlays;
use crate::surface::{DrawingSurface, ImageProvider};
use cm_core::{
    Anchor, AnnotationConfig, CalloutStore, Element, FeatureToggles, OverlayId, OverlayStore,
    PointKey, resolve, sort_elements,
};
use kurbo::Point;
use std::collections::BTreeMap;

/// Inputs of one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub elements: &'a [Element],
    pub annotations: &'a BTreeMap<PointKey, AnnotationConfig>,
    pub callouts: &'a CalloutStore,
    pub overlays: &'a OverlayStore,
    pub toggles: FeatureToggles,
    pub selected: Option<OverlayId>,
}

/// Where one annotation ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnnotation {
    pub key: PointKey,
    pub point: Point,
    pub status: AnnotationStatus,
}

#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Every annotation with geometry this frame, in draw order.
    pub resolved: Vec<ResolvedAnnotation>,
    /// Freshly computed callout defaults, for `calloutX` / `calloutY`.
    pub callout_defaults: Vec<(PointKey, Point)>,
    /// URLs referenced this frame that are not decoded yet, deduplicated.
    pub missing_images: Vec<String>,
    /// Hit-test view of what was just drawn.
    pub hit_scene: HitScene,
}

impl FrameReport {
    pub fn point_of(&self, key: PointKey) -> Option<Point> {
        self.resolved.iter().find(|r| r.key == key).map(|r| r.point)
    }

    fn note_missing(&mut self, url: String) {
        if !self.missing_images.contains(&url) {
            self.missing_images.push(url);
        }
    }
}

/// Draw every annotation, then every overlay.
pub fn render_frame<S, P>(s: &mut S, images: &P, input: &FrameInput<'_>) -> FrameReport
where
    S: DrawingSurface,
    P: ImageProvider<S::Image> + ?Sized,
{
    let mut report = FrameReport::default();
    let mut elements = input.elements.to_vec();
    sort_elements(&mut elements);

    for element in &elements {
        let Some(config) = input.annotations.get(&element.key) else {
            continue;
        };
        let resolved = resolve(&element.geometry, config, input.callouts, element.key);
        if let Some(p) = resolved.persist {
            report.callout_defaults.push((element.key, p));
        }

        let status = draw_annotation(s, images, &element.geometry, config, resolved.point, &input.toggles);
        log::trace!("annotation {} at {:?}: {:?}", element.key, resolved.point, status);

        if let AnnotationStatus::Pending(url) = &status {
            report.note_missing(url.clone());
        }
        if config.anchor == Anchor::Callout && status.is_visible() && !config.fills(&element.geometry, &input.toggles) {
            report
                .hit_scene
                .callouts
                .push(CalloutTarget::new(element.key, resolved.point, config.size));
        }
        report.resolved.push(ResolvedAnnotation {
            key: element.key,
            point: resolved.point,
            status,
        });
    }

    let order = input.overlays.draw_order();
    for url in draw_overlays(s, images, order.iter().copied(), input.selected) {
        report.note_missing(url);
    }

    report.hit_scene.overlays = order.into_iter().rev().cloned().collect();
    report.hit_scene.selected = input.selected;
    report
}
