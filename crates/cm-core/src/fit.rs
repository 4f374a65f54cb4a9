//! Shape fitting: where an image goes when it fills a bar or a slice.
//!
//! Two strategies:
//!
//! - **Bounding-box fit**: the element's axis-aligned bounds, then
//!   `fill` / `cover` / `contain` against the image's natural aspect.
//! - **Largest inscribed rectangle**: `contain` inside a sector. A
//!   deterministic grid search (30 × 30 cells, 10 bisection steps per cell)
//!   over rectangles of the image's aspect ratio whose four corners pass the
//!   sector membership test. The constants are shared with the export
//!   runtime, so changing them changes exported output too.

use crate::geometry::{ImageFit, Sector};
use crate::model::BarGeometry;
use kurbo::{Point, Rect, Size};

/// Angle and radius subdivisions of the inscribed-rectangle grid.
pub const SECTOR_GRID_STEPS: usize = 30;
/// Bisection iterations per grid cell.
pub const SECTOR_SEARCH_ITERATIONS: usize = 10;
/// Angular tolerance (radians) of the membership test.
pub const ANGLE_EPSILON: f64 = 1e-3;
/// Radial tolerance (pixels) of the membership test.
pub const RADIUS_EPSILON: f64 = 0.5;
/// Smart overlay size: this fraction of the surface height.
pub const SMART_SIZE_FRACTION: f64 = 0.2;
/// Smart overlay size: neither side smaller than this.
pub const SMART_SIZE_MIN: f64 = 50.0;

/// Source crop (image pixels) and destination (canvas pixels) of a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub src: Rect,
    pub dest: Rect,
}

/// Axis-aligned rectangle of a bar element.
pub fn bar_bounds(bar: &BarGeometry) -> Rect {
    if bar.horizontal {
        let half = bar.height / 2.0;
        Rect::new(
            bar.x.min(bar.base),
            bar.y - half,
            bar.x.max(bar.base),
            bar.y + half,
        )
    } else {
        let half = bar.width / 2.0;
        Rect::new(
            bar.x - half,
            bar.y.min(bar.base),
            bar.x + half,
            bar.y.max(bar.base),
        )
    }
}

/// Bounding box of a sector element, sampled along its arc.
pub fn sector_bounds(sector: &Sector) -> Rect {
    sector.bounds()
}

/// Scale an image of `natural` size into `bounds`.
pub fn fit_image(bounds: Rect, natural: Size, fit: ImageFit) -> Placement {
    let full = Rect::new(0.0, 0.0, natural.width, natural.height);
    let (bw, bh) = (bounds.width(), bounds.height());
    if natural.width <= 0.0 || natural.height <= 0.0 || bw <= 0.0 || bh <= 0.0 {
        return Placement {
            src: full,
            dest: bounds,
        };
    }

    match fit {
        ImageFit::Fill => Placement {
            src: full,
            dest: bounds,
        },
        ImageFit::Contain => {
            let scale = (bw / natural.width).min(bh / natural.height);
            let size = Size::new(natural.width * scale, natural.height * scale);
            Placement {
                src: full,
                dest: Rect::from_center_size(bounds.center(), size),
            }
        }
        ImageFit::Cover => {
            let scale = (bw / natural.width).max(bh / natural.height);
            let (sw, sh) = (bw / scale, bh / scale);
            let sx = (natural.width - sw) / 2.0;
            let sy = (natural.height - sh) / 2.0;
            Placement {
                src: Rect::new(sx, sy, sx + sw, sy + sh),
                dest: bounds,
            }
        }
    }
}

/// Largest rectangle of `aspect` (width / height) whose corners all lie in
/// the sector. `None` for degenerate sectors or when nothing fits.
pub fn largest_inscribed_rect(sector: &Sector, aspect: f64) -> Option<Rect> {
    if sector.is_degenerate() || !aspect.is_finite() || aspect <= 0.0 {
        return None;
    }

    let sweep = sector.sweep();
    let ring = sector.thickness();
    let steps = SECTOR_GRID_STEPS as f64;
    let mut best: Option<(f64, Point, f64)> = None;

    for i in 0..SECTOR_GRID_STEPS {
        let angle = sector.start_angle + sweep * (i as f64 + 0.5) / steps;
        for j in 0..SECTOR_GRID_STEPS {
            let radius = sector.inner_radius + ring * (j as f64 + 0.5) / steps;
            let center = sector.point_at(radius, angle);
            let half_w = max_half_width(sector, center, aspect);
            let area = (2.0 * half_w) * (2.0 * half_w / aspect);
            if area > best.map_or(0.0, |(a, _, _)| a) {
                best = Some((area, center, half_w));
            }
        }
    }

    if best.is_none() {
        log::trace!("no rectangle of aspect {aspect} fits sector at {:?}", sector.center);
    }
    best.map(|(_, c, hw)| {
        let hh = hw / aspect;
        Rect::new(c.x - hw, c.y - hh, c.x + hw, c.y + hh)
    })
}

/// Bisect the half-width of the largest rectangle centered at `center`.
fn max_half_width(sector: &Sector, center: Point, aspect: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = sector.outer_radius;
    for _ in 0..SECTOR_SEARCH_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if corners_inside(sector, center, mid, mid / aspect) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

fn corners_inside(sector: &Sector, c: Point, hw: f64, hh: f64) -> bool {
    [
        Point::new(c.x - hw, c.y - hh),
        Point::new(c.x + hw, c.y - hh),
        Point::new(c.x + hw, c.y + hh),
        Point::new(c.x - hw, c.y + hh),
    ]
    .into_iter()
    .all(|p| sector.contains(p, ANGLE_EPSILON, RADIUS_EPSILON))
}

/// Image placement for a slice fill. `contain` uses the inscribed
/// rectangle; the other modes fit the sector's bounding box (the renderer
/// clips to the wedge).
pub fn slice_fill(sector: &Sector, natural: Size, fit: ImageFit) -> Option<Placement> {
    let full = Rect::new(0.0, 0.0, natural.width, natural.height);
    match fit {
        ImageFit::Contain => {
            let aspect = if natural.height > 0.0 {
                natural.width / natural.height
            } else {
                1.0
            };
            largest_inscribed_rect(sector, aspect).map(|dest| Placement { src: full, dest })
        }
        _ => {
            if sector.is_degenerate() {
                return None;
            }
            let bounds = sector_bounds(sector);
            if bounds.area() <= 0.0 {
                return None;
            }
            Some(fit_image(bounds, natural, fit))
        }
    }
}

/// Default overlay size once an image's natural size is known: 20% of the
/// surface height, aspect-preserving, no side under 50 px.
pub fn smart_overlay_size(natural: Size, surface_height: f64) -> Size {
    let target = surface_height * SMART_SIZE_FRACTION;
    if natural.width <= 0.0 || natural.height <= 0.0 {
        let side = target.max(SMART_SIZE_MIN);
        return Size::new(side, side);
    }
    let scale = target / natural.height;
    let (mut w, mut h) = (natural.width * scale, natural.height * scale);
    let shortest = w.min(h);
    if shortest < SMART_SIZE_MIN {
        let k = SMART_SIZE_MIN / shortest.max(f64::EPSILON);
        w *= k;
        h *= k;
    }
    Size::new(w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn contain_letterboxes_inside_bar() {
        let bar = BarGeometry {
            x: 100.0,
            y: 100.0,
            base: 300.0,
            width: 40.0,
            height: 200.0,
            horizontal: false,
        };
        let p = fit_image(bar_bounds(&bar), Size::new(200.0, 100.0), ImageFit::Contain);
        assert_eq!(p.dest, Rect::new(80.0, 190.0, 120.0, 210.0));
    }

    #[test]
    fn cover_crops_the_center() {
        let p = fit_image(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Size::new(200.0, 100.0),
            ImageFit::Cover,
        );
        assert_eq!(p.dest, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(p.src, Rect::new(50.0, 0.0, 150.0, 100.0));
    }

    #[test]
    fn fill_stretches() {
        let bounds = Rect::new(10.0, 10.0, 30.0, 90.0);
        let p = fit_image(bounds, Size::new(5.0, 5.0), ImageFit::Fill);
        assert_eq!(p.dest, bounds);
    }

    #[test]
    fn inscribed_rect_corners_stay_in_sector() {
        let s = Sector::new(Point::new(200.0, 200.0), 0.0, FRAC_PI_2, 40.0, 150.0);
        let r = largest_inscribed_rect(&s, 1.5).expect("quarter ring fits a rectangle");
        assert!(r.area() > 0.0);
        assert!((r.width() / r.height() - 1.5).abs() < 1e-9);
        for p in [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ] {
            assert!(s.contains(p, ANGLE_EPSILON, RADIUS_EPSILON), "{p:?} escapes");
        }
    }

    #[test]
    fn inscribed_rect_is_deterministic() {
        let s = Sector::new(Point::new(0.0, 0.0), -PI / 3.0, PI / 5.0, 0.0, 90.0);
        assert_eq!(largest_inscribed_rect(&s, 1.0), largest_inscribed_rect(&s, 1.0));
    }

    #[test]
    fn degenerate_sector_fits_nothing() {
        let s = Sector::new(Point::new(50.0, 50.0), 1.0, 1.0, 0.0, 100.0);
        assert_eq!(largest_inscribed_rect(&s, 1.0), None);
        assert_eq!(slice_fill(&s, Size::new(10.0, 10.0), ImageFit::Contain), None);
        assert_eq!(slice_fill(&s, Size::new(10.0, 10.0), ImageFit::Cover), None);
    }

    #[test]
    fn slice_cover_uses_bounding_box() {
        let s = Sector::new(Point::new(50.0, 50.0), 0.0, FRAC_PI_2, 0.0, 100.0);
        let p = slice_fill(&s, Size::new(100.0, 100.0), ImageFit::Cover).unwrap();
        assert!((p.dest.width() - 100.0).abs() < 1e-9);
        assert!((p.dest.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn smart_size_is_fifth_of_height_with_floor() {
        let s = smart_overlay_size(Size::new(400.0, 200.0), 600.0);
        assert_eq!(s, Size::new(240.0, 120.0));
        let small = smart_overlay_size(Size::new(100.0, 100.0), 100.0);
        assert_eq!(small, Size::new(50.0, 50.0));
    }
}
