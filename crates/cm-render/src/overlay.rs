//! Free-floating overlays: rotation, opacity, clipped images, text boxes,
//! loading placeholders and the selection chrome.

use crate::hit::Handle;
use crate::label::draw_text_box;
use crate::shape::{shape_path, stroke_border};
use crate::surface::{DrawingSurface, ImageProvider};
use cm_core::{OverlayId, OverlayKind, OverlayObject, ShapeKind};
use kurbo::Rect;

pub const SELECTION_COLOR: &str = "#4FC3F7";
pub const PLACEHOLDER_COLOR: &str = "#86868B";
pub const PLACEHOLDER_DASH: [f64; 2] = [4.0, 4.0];

/// Draw overlays in the given (draw) order. Returns the image URLs that
/// are not decoded yet; those overlays got a placeholder.
pub fn draw_overlays<'a, S, P>(
    s: &mut S,
    images: &P,
    overlays: impl IntoIterator<Item = &'a OverlayObject>,
    selected: Option<OverlayId>,
) -> Vec<String>
where
    S: DrawingSurface,
    P: ImageProvider<S::Image> + ?Sized,
{
    let mut missing = Vec::new();
    for o in overlays {
        if !o.frame.visible {
            continue;
        }
        if let Some(url) = draw_overlay(s, images, o)
            && !missing.contains(&url)
        {
            missing.push(url);
        }
        if selected == Some(o.id()) {
            with_frame_transform(s, o, |s| draw_selection(s, o.frame.rect()));
        }
    }
    missing
}

/// Run `f` with the surface rotated about the overlay center.
fn with_frame_transform<S: DrawingSurface>(s: &mut S, o: &OverlayObject, f: impl FnOnce(&mut S)) {
    s.save();
    if o.frame.rotation != 0.0 {
        let c = o.frame.center().to_vec2();
        s.translate(c);
        s.rotate(o.frame.rotation.to_radians());
        s.translate(-c);
    }
    f(s);
    s.restore();
}

/// Draw one overlay; returns its URL when the image is still loading.
pub fn draw_overlay<S, P>(s: &mut S, images: &P, o: &OverlayObject) -> Option<String>
where
    S: DrawingSurface,
    P: ImageProvider<S::Image> + ?Sized,
{
    let r = o.frame.rect();
    if r.width() <= 0.0 || r.height() <= 0.0 {
        return None;
    }
    let mut pending = None;
    with_frame_transform(s, o, |s| {
        s.set_global_alpha(o.frame.opacity.clamp(0.0, 1.0));
        match &o.kind {
            OverlayKind::Image { url } => match images.loaded(url) {
                Some(img) => {
                    s.save();
                    if shape_path(s, o.frame.shape, r) {
                        s.clip();
                    }
                    let src = Rect::new(0.0, 0.0, img.natural.width, img.natural.height);
                    s.draw_image(&img.image, src, r);
                    s.restore();
                }
                None => {
                    draw_placeholder(s, r);
                    if !url.is_empty() {
                        pending = Some(url.clone());
                    }
                }
            },
            OverlayKind::Text(style) => draw_text_box(s, r, style),
        }
        let border_shape = match o.frame.shape {
            ShapeKind::None => ShapeKind::Square,
            shape => shape,
        };
        stroke_border(
            s,
            border_shape,
            r,
            o.frame.border_width,
            &o.frame.border_color,
        );
    });
    log::trace!("overlay {} drawn at {:?}", o.id(), r);
    pending
}

fn draw_placeholder<S: DrawingSurface>(s: &mut S, r: Rect) {
    s.save();
    s.set_stroke_color(PLACEHOLDER_COLOR);
    s.set_line_width(1.0);
    s.set_line_dash(&PLACEHOLDER_DASH);
    s.begin_path();
    s.rect(r);
    s.stroke();
    s.restore();
}

/// Outline plus the eight handles.
pub fn draw_selection<S: DrawingSurface>(s: &mut S, r: Rect) {
    s.save();
    s.set_stroke_color(SELECTION_COLOR);
    s.set_line_width(1.5);
    s.begin_path();
    s.rect(r.inflate(1.0, 1.0));
    s.stroke();

    s.set_fill_color("#FFFFFF");
    for h in Handle::ALL {
        s.begin_path();
        s.rect(h.rect(r));
        s.fill();
        s.stroke();
    }
    s.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DrawOp, RecordingSurface};
    use crate::surface::LoadedImage;
    use kurbo::Size;
    use std::collections::HashMap;

    fn images() -> HashMap<String, LoadedImage<String>> {
        HashMap::from([(
            "a.png".to_string(),
            LoadedImage {
                image: "A".to_string(),
                natural: Size::new(64.0, 32.0),
            },
        )])
    }

    #[test]
    fn missing_image_gets_placeholder_and_is_reported() {
        let mut s = RecordingSurface::new(200.0, 200.0);
        let o = OverlayObject::image("x", "b.png", Rect::new(0.0, 0.0, 10.0, 10.0));
        let missing = draw_overlays(&mut s, &images(), [&o], None);
        assert_eq!(missing, vec!["b.png".to_string()]);
        assert!(s.ops.contains(&DrawOp::LineDash(vec![4.0, 4.0])));
        assert!(s.images().is_empty());
        assert!(s.is_balanced());
    }

    #[test]
    fn loaded_image_fills_frame() {
        let mut s = RecordingSurface::new(200.0, 200.0);
        let o = OverlayObject::image("x", "a.png", Rect::new(10.0, 10.0, 50.0, 30.0));
        let missing = draw_overlays(&mut s, &images(), [&o], None);
        assert!(missing.is_empty());
        assert_eq!(
            s.images(),
            vec![("A", Rect::new(0.0, 0.0, 64.0, 32.0), Rect::new(10.0, 10.0, 50.0, 30.0))]
        );
    }

    #[test]
    fn hidden_overlays_are_skipped() {
        let mut s = RecordingSurface::new(200.0, 200.0);
        let mut o = OverlayObject::image("x", "a.png", Rect::new(0.0, 0.0, 10.0, 10.0));
        o.frame.visible = false;
        draw_overlays(&mut s, &images(), [&o], None);
        assert!(s.ops.is_empty());
    }

    #[test]
    fn rotation_wraps_the_draw_in_a_transform() {
        let mut s = RecordingSurface::new(200.0, 200.0);
        let mut o = OverlayObject::text("t", "hello", Rect::new(0.0, 0.0, 100.0, 20.0));
        o.frame.rotation = 180.0;
        draw_overlays(&mut s, &images(), [&o], None);
        assert!(s.ops.contains(&DrawOp::Rotate(std::f64::consts::PI)));
        assert_eq!(s.texts().len(), 1);
    }

    #[test]
    fn selection_draws_all_handles() {
        let mut s = RecordingSurface::new(200.0, 200.0);
        let o = OverlayObject::text("t", "", Rect::new(0.0, 0.0, 100.0, 20.0));
        draw_overlays(&mut s, &images(), [&o], Some(o.id()));
        let handle_rects = s.count(|op| matches!(op, DrawOp::Rect(r) if r.width() == 8.0));
        assert_eq!(handle_rects, 8);
    }
}
