//! Path builders and the clip / border passes shared by every annotation.

use crate::surface::{DrawingSurface, Shadow};
use cm_core::{Sector, ShapeKind};
use kurbo::{Point, Rect};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Rounded rectangle path. The radius is clamped to half the shorter side.
pub fn rounded_rect_path<S: DrawingSurface>(s: &mut S, r: Rect, radius: f64) {
    let radius = radius.min(r.width() / 2.0).min(r.height() / 2.0).max(0.0);
    s.begin_path();
    if radius <= 0.0 {
        s.rect(r);
        return;
    }
    s.move_to(Point::new(r.x0 + radius, r.y0));
    s.line_to(Point::new(r.x1 - radius, r.y0));
    s.arc(Point::new(r.x1 - radius, r.y0 + radius), radius, -FRAC_PI_2, 0.0, false);
    s.line_to(Point::new(r.x1, r.y1 - radius));
    s.arc(Point::new(r.x1 - radius, r.y1 - radius), radius, 0.0, FRAC_PI_2, false);
    s.line_to(Point::new(r.x0 + radius, r.y1));
    s.arc(Point::new(r.x0 + radius, r.y1 - radius), radius, FRAC_PI_2, PI, false);
    s.line_to(Point::new(r.x0, r.y0 + radius));
    s.arc(Point::new(r.x0 + radius, r.y0 + radius), radius, PI, PI + FRAC_PI_2, false);
    s.close_path();
}

pub fn circle_path<S: DrawingSurface>(s: &mut S, center: Point, radius: f64) {
    s.begin_path();
    s.arc(center, radius.max(0.0), 0.0, TAU, false);
    s.close_path();
}

/// Path of a clip shape inscribed in `r`. Returns `false` for
/// [`ShapeKind::None`], which has no path.
pub fn shape_path<S: DrawingSurface>(s: &mut S, shape: ShapeKind, r: Rect) -> bool {
    match shape {
        ShapeKind::Circle => {
            circle_path(s, r.center(), r.width().min(r.height()) / 2.0);
            true
        }
        ShapeKind::Square => {
            s.begin_path();
            s.rect(r);
            true
        }
        ShapeKind::Rounded => {
            rounded_rect_path(s, r, shape.corner_radius(r.width(), r.height()));
            true
        }
        ShapeKind::None => false,
    }
}

/// Wedge path of a sector: outer arc, then either the inner arc back or the
/// apex for a full pie slice.
pub fn sector_path<S: DrawingSurface>(s: &mut S, sector: &Sector) {
    let end = sector.start_angle + sector.sweep();
    s.begin_path();
    s.arc(sector.center, sector.outer_radius, sector.start_angle, end, false);
    if sector.inner_radius > 0.0 {
        s.arc(sector.center, sector.inner_radius, end, sector.start_angle, true);
    } else {
        s.line_to(sector.center);
    }
    s.close_path();
}

/// Regular star with `points` tips.
pub fn star_path<S: DrawingSurface>(s: &mut S, center: Point, outer: f64, inner: f64, points: usize) {
    let points = points.max(2);
    let step = PI / points as f64;
    s.begin_path();
    for i in 0..points * 2 {
        let radius = if i % 2 == 0 { outer } else { inner };
        // First tip points straight up.
        let angle = -FRAC_PI_2 + step * i as f64;
        let p = Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
        if i == 0 {
            s.move_to(p);
        } else {
            s.line_to(p);
        }
    }
    s.close_path();
}

/// Backing color the shadow pass fills under badge content.
pub const SHADOW_BACKDROP: &str = "#ffffff";

/// Drop shadow of the shape, cast by an opaque backing fill. Run before the
/// clipped content pass so the content covers the backing. A shape of
/// `None` casts a square shadow.
pub fn cast_shadow<S: DrawingSurface>(s: &mut S, shape: ShapeKind, r: Rect) {
    let shape = match shape {
        ShapeKind::None => ShapeKind::Square,
        shape => shape,
    };
    s.save();
    if shape_path(s, shape, r) {
        s.set_shadow(&Shadow::default());
        s.set_fill_color(SHADOW_BACKDROP);
        s.fill();
    }
    s.restore();
}

/// Un-clipped border over the shape. Run after the clipped content pass so
/// the border is never clipped away.
pub fn stroke_border<S: DrawingSurface>(s: &mut S, shape: ShapeKind, r: Rect, width: f64, color: &str) {
    if width <= 0.0 {
        return;
    }
    s.save();
    if shape_path(s, shape, r) {
        s.set_stroke_color(color);
        s.set_line_width(width);
        s.stroke();
    }
    s.restore();
}
