//! One element annotation: fill modes, clipped badge, label, callout arrow.

use crate::arrow::{arrow_geometry, draw_arrow};
use crate::label::draw_label;
use crate::shape::{cast_shadow, sector_path, shape_path, stroke_border};
use crate::surface::{DrawingSurface, ImageProvider};
use cm_core::fit::{bar_bounds, fit_image, slice_fill};
use cm_core::{
    Anchor, AnnotationConfig, Content, ElementGeometry, FeatureToggles, Placement, callout_origin,
};
use kurbo::{Point, Rect, Size};

/// Outcome of drawing one annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationStatus {
    Drawn,
    /// Switched off by a feature toggle.
    Hidden,
    /// Image not decoded yet; nothing drawn for it this frame.
    Pending(String),
    /// Nothing to draw: empty URL, or no fit with positive area.
    Empty,
}

impl AnnotationStatus {
    pub fn is_visible(&self) -> bool {
        !matches!(self, AnnotationStatus::Hidden)
    }
}

/// Whether the content kind is switched on.
pub fn content_enabled(config: &AnnotationConfig, toggles: &FeatureToggles) -> bool {
    match config.content {
        Content::Image { .. } => toggles.show_images,
        Content::Text { .. } => toggles.show_labels,
    }
}

/// Draw the annotation of one element at its resolved point `at`.
pub fn draw_annotation<S, P>(
    s: &mut S,
    images: &P,
    geometry: &ElementGeometry,
    config: &AnnotationConfig,
    at: Point,
    toggles: &FeatureToggles,
) -> AnnotationStatus
where
    S: DrawingSurface,
    P: ImageProvider<S::Image> + ?Sized,
{
    if !content_enabled(config, toggles) {
        return AnnotationStatus::Hidden;
    }

    if config.fills(geometry, toggles) {
        return draw_fill(s, images, geometry, config, toggles);
    }

    if config.anchor == Anchor::Callout && (config.arrow.line || config.arrow.head) {
        let start = callout_origin(geometry);
        if let Some(arrow) = arrow_geometry(start, at, &config.arrow, geometry.as_sector(), s.size()) {
            draw_arrow(s, &arrow, &config.arrow);
        }
    }

    match &config.content {
        Content::Text { text } => {
            draw_label(s, text, at, &config.label);
            AnnotationStatus::Drawn
        }
        Content::Image { url } => {
            if url.is_empty() {
                return AnnotationStatus::Empty;
            }
            let Some(img) = images.loaded(url) else {
                return AnnotationStatus::Pending(url.clone());
            };
            let badge = Rect::from_center_size(at, Size::new(config.size, config.size));
            let placement = fit_image(badge, img.natural, config.image_fit);
            if toggles.show_border && config.shadow {
                cast_shadow(s, config.shape, badge);
            }
            s.save();
            if shape_path(s, config.shape, badge) {
                s.clip();
            }
            s.draw_image(&img.image, placement.src, placement.dest);
            s.restore();
            if toggles.show_border {
                stroke_border(
                    s,
                    config.shape,
                    badge,
                    config.border_width,
                    &config.border_color,
                );
            }
            AnnotationStatus::Drawn
        }
    }
}

/// `fillBar` / `fillSlice`: the image covers the element itself.
fn draw_fill<S, P>(
    s: &mut S,
    images: &P,
    geometry: &ElementGeometry,
    config: &AnnotationConfig,
    toggles: &FeatureToggles,
) -> AnnotationStatus
where
    S: DrawingSurface,
    P: ImageProvider<S::Image> + ?Sized,
{
    let url = config.content.image_url().unwrap_or_default();
    if url.is_empty() {
        return AnnotationStatus::Empty;
    }
    let Some(img) = images.loaded(url) else {
        return AnnotationStatus::Pending(url.to_string());
    };

    match geometry {
        ElementGeometry::Bar(bar) => {
            let bounds = bar_bounds(bar);
            if bounds.area() <= 0.0 {
                return AnnotationStatus::Empty;
            }
            let Placement { src, dest } = fit_image(bounds, img.natural, config.image_fit);
            s.save();
            s.begin_path();
            s.rect(bounds);
            s.clip();
            s.draw_image(&img.image, src, dest);
            s.restore();
            if toggles.show_border && config.border_width > 0.0 {
                s.save();
                s.begin_path();
                s.rect(bounds);
                s.set_stroke_color(&config.border_color);
                s.set_line_width(config.border_width);
                s.stroke();
                s.restore();
            }
            AnnotationStatus::Drawn
        }
        ElementGeometry::Sector(sector) => {
            let Some(Placement { src, dest }) = slice_fill(sector, img.natural, config.image_fit)
            else {
                return AnnotationStatus::Empty;
            };
            s.save();
            sector_path(s, sector);
            s.clip();
            s.draw_image(&img.image, src, dest);
            s.restore();
            if toggles.show_border && config.border_width > 0.0 {
                s.save();
                sector_path(s, sector);
                s.set_stroke_color(&config.border_color);
                s.set_line_width(config.border_width);
                s.stroke();
                s.restore();
            }
            AnnotationStatus::Drawn
        }
        ElementGeometry::Point(_) => AnnotationStatus::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DrawOp, RecordingSurface};
    use crate::surface::LoadedImage;
    use cm_core::{BarGeometry, ImageFit, PointGeometry, Sector};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn images() -> HashMap<String, LoadedImage<String>> {
        HashMap::from([(
            "wide.png".to_string(),
            LoadedImage {
                image: "wide".to_string(),
                natural: Size::new(200.0, 100.0),
            },
        )])
    }

    fn bar() -> ElementGeometry {
        ElementGeometry::Bar(BarGeometry {
            x: 100.0,
            y: 100.0,
            base: 300.0,
            width: 40.0,
            height: 200.0,
            horizontal: false,
        })
    }

    #[test]
    fn bar_fill_contain_letterboxes() {
        let mut s = RecordingSurface::new(400.0, 400.0);
        let mut cfg = AnnotationConfig::image("wide.png");
        cfg.fill_bar = true;
        cfg.image_fit = ImageFit::Contain;
        let status = draw_annotation(&mut s, &images(), &bar(), &cfg, Point::ZERO, &FeatureToggles::default());
        assert_eq!(status, AnnotationStatus::Drawn);
        let drawn = s.images();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].2, Rect::new(80.0, 190.0, 120.0, 210.0));
    }

    #[test]
    fn hidden_when_images_toggled_off() {
        let mut s = RecordingSurface::new(400.0, 400.0);
        let toggles = FeatureToggles {
            show_images: false,
            ..FeatureToggles::default()
        };
        let cfg = AnnotationConfig::image("wide.png");
        let status = draw_annotation(&mut s, &images(), &bar(), &cfg, Point::ZERO, &toggles);
        assert_eq!(status, AnnotationStatus::Hidden);
        assert!(s.ops.is_empty());
    }

    #[test]
    fn pending_image_draws_nothing() {
        let mut s = RecordingSurface::new(400.0, 400.0);
        let cfg = AnnotationConfig::image("later.png");
        let status = draw_annotation(&mut s, &images(), &bar(), &cfg, Point::ZERO, &FeatureToggles::default());
        assert_eq!(status, AnnotationStatus::Pending("later.png".into()));
        assert!(s.images().is_empty());
    }

    #[test]
    fn badge_is_clipped_then_bordered() {
        let mut s = RecordingSurface::new(400.0, 400.0);
        let cfg = AnnotationConfig::image("wide.png");
        let at = Point::new(50.0, 50.0);
        draw_annotation(&mut s, &images(), &bar(), &cfg, at, &FeatureToggles::default());
        let clip = s.ops.iter().position(|op| matches!(op, DrawOp::Clip));
        let stroke = s.ops.iter().rposition(|op| matches!(op, DrawOp::Stroke { .. }));
        let restore_after_clip = s.ops.iter().position(|op| matches!(op, DrawOp::Restore));
        assert!(clip.is_some() && stroke.is_some());
        assert!(restore_after_clip < stroke, "border is stroked after the clip is popped");
        // cover crops the 2:1 image to the square badge
        assert_eq!(s.images()[0].1, Rect::new(50.0, 0.0, 150.0, 100.0));
        assert!(s.is_balanced());
    }

    #[test]
    fn callout_draws_arrow_from_origin() {
        let mut s = RecordingSurface::new(400.0, 400.0);
        let mut cfg = AnnotationConfig::text("peak");
        cfg.anchor = Anchor::Callout;
        let g = ElementGeometry::Point(PointGeometry {
            x: 10.0,
            y: 10.0,
            radius: 3.0,
        });
        draw_annotation(&mut s, &images(), &g, &cfg, Point::new(50.0, -30.0), &FeatureToggles::default());
        assert_eq!(s.ops.iter().find(|op| matches!(op, DrawOp::MoveTo(_))), Some(&DrawOp::MoveTo(Point::new(10.0, 10.0))));
        let texts = s.texts();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].0, "peak");
        assert!((texts[0].1.y + 30.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_slice_fill_is_a_no_op() {
        let mut s = RecordingSurface::new(400.0, 400.0);
        let mut cfg = AnnotationConfig::image("wide.png");
        cfg.fill_slice = true;
        cfg.image_fit = ImageFit::Contain;
        let g = ElementGeometry::Sector(Sector::new(Point::new(50.0, 50.0), 1.0, 1.0, 0.0, 100.0));
        let status = draw_annotation(&mut s, &images(), &g, &cfg, Point::ZERO, &FeatureToggles::default());
        assert_eq!(status, AnnotationStatus::Empty);
        assert!(s.ops.is_empty());
    }
}
