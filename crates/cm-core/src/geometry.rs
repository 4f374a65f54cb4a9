//! Shared geometry value types.
//!
//! Points and rectangles come from `kurbo`; this module adds the angular
//! `Sector` used by pie/doughnut/polarArea elements and the small enums
//! that name anchors, clip shapes, and image fit modes.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Angular steps used when sampling a sector outline for its bounding box.
pub const SECTOR_BOUNDS_STEPS: usize = 100;

// ─── Sector ─────────────────────────────────────────────────────────────

/// Wedge geometry of a sector element. Angles in radians, measured from
/// the +x axis, growing clockwise on screen (y points down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub center: Point,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Sector {
    pub fn new(
        center: Point,
        start_angle: f64,
        end_angle: f64,
        inner_radius: f64,
        outer_radius: f64,
    ) -> Self {
        Self {
            center,
            start_angle,
            end_angle,
            inner_radius,
            outer_radius,
        }
    }

    /// Angular extent, never negative.
    pub fn sweep(&self) -> f64 {
        (self.end_angle - self.start_angle).max(0.0)
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// Radial thickness (`outer - inner`), never negative.
    pub fn thickness(&self) -> f64 {
        (self.outer_radius - self.inner_radius).max(0.0)
    }

    /// `true` when the wedge has no angular or radial extent.
    pub fn is_degenerate(&self) -> bool {
        self.sweep() <= 0.0 || self.outer_radius <= self.inner_radius
    }

    /// Point at `radius` from the chart center along `angle`.
    pub fn point_at(&self, radius: f64, angle: f64) -> Point {
        Point::new(
            self.center.x + radius * angle.cos(),
            self.center.y + radius * angle.sin(),
        )
    }

    /// Sector membership predicate with tolerances on both radius and angle.
    pub fn contains(&self, p: Point, angle_epsilon: f64, radius_epsilon: f64) -> bool {
        let d = p - self.center;
        let r = d.hypot();
        if r < self.inner_radius - radius_epsilon || r > self.outer_radius + radius_epsilon {
            return false;
        }
        let sweep = self.sweep();
        if sweep >= TAU - angle_epsilon {
            return true;
        }
        // The apex of a pie slice has no meaningful angle.
        if r <= radius_epsilon && self.inner_radius <= radius_epsilon {
            return true;
        }
        let rel = (d.y.atan2(d.x) - self.start_angle).rem_euclid(TAU);
        rel <= sweep + angle_epsilon || rel >= TAU - angle_epsilon
    }

    /// Axis-aligned bounding box, sampled with a 100-step sweep at both radii.
    pub fn bounds(&self) -> Rect {
        let sweep = self.sweep();
        let first = self.point_at(self.outer_radius, self.start_angle);
        let mut rect = Rect::from_points(first, first);
        for i in 0..=SECTOR_BOUNDS_STEPS {
            let angle = self.start_angle + sweep * i as f64 / SECTOR_BOUNDS_STEPS as f64;
            rect = rect.union_pt(self.point_at(self.outer_radius, angle));
            rect = rect.union_pt(self.point_at(self.inner_radius, angle));
        }
        rect
    }
}

// ─── Enums ──────────────────────────────────────────────────────────────

/// Named logical position relative to a chart element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    #[default]
    Center,
    Above,
    Below,
    Callout,
}

/// Clip shape applied to annotation content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    #[default]
    Circle,
    Square,
    Rounded,
    None,
}

impl ShapeKind {
    /// Corner radius used by `Rounded`, as a fraction of the shorter side.
    pub const ROUNDED_RADIUS_FRACTION: f64 = 0.15;

    pub fn corner_radius(self, width: f64, height: f64) -> f64 {
        match self {
            ShapeKind::Rounded => width.min(height) * Self::ROUNDED_RADIUS_FRACTION,
            _ => 0.0,
        }
    }
}

/// How an image is scaled into a target area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageFit {
    /// Stretch to the target, ignoring aspect ratio.
    Fill,
    /// Scale to cover the target, center-cropping the overflow.
    #[default]
    Cover,
    /// Scale to fit inside the target, letterboxing the rest.
    Contain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn quarter() -> Sector {
        Sector::new(Point::new(50.0, 50.0), 0.0, FRAC_PI_2, 0.0, 100.0)
    }

    #[test]
    fn point_at_follows_screen_angles() {
        let s = quarter();
        let p = s.point_at(100.0, FRAC_PI_2);
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn membership_respects_angle_and_radius() {
        let s = quarter();
        assert!(s.contains(Point::new(100.0, 100.0), 1e-3, 0.5));
        assert!(!s.contains(Point::new(0.0, 100.0), 1e-3, 0.5));
        assert!(!s.contains(Point::new(200.0, 200.0), 1e-3, 0.5));
        assert!(s.contains(Point::new(50.0, 50.0), 1e-3, 0.5), "apex belongs to a pie slice");
    }

    #[test]
    fn membership_wraps_across_zero() {
        let s = Sector::new(Point::ZERO, -PI / 4.0, PI / 4.0, 10.0, 50.0);
        assert!(s.contains(Point::new(30.0, 0.0), 1e-3, 0.5));
        assert!(s.contains(Point::new(30.0, -5.0), 1e-3, 0.5));
        assert!(!s.contains(Point::new(-30.0, 0.0), 1e-3, 0.5));
        assert!(!s.contains(Point::new(5.0, 0.0), 1e-3, 0.5), "inside the hole");
    }

    #[test]
    fn bounds_of_quarter_pie() {
        let b = quarter().bounds();
        assert!((b.x0 - 50.0).abs() < 1e-9);
        assert!((b.y0 - 50.0).abs() < 1e-9);
        assert!((b.x1 - 150.0).abs() < 1e-9);
        assert!((b.y1 - 150.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_sector_bounds_collapse() {
        let s = Sector::new(Point::new(10.0, 10.0), 1.0, 1.0, 0.0, 40.0);
        assert!(s.is_degenerate());
        let b = s.bounds();
        assert!(b.width() <= 40.0 && b.height() <= 40.0);
    }

    #[test]
    fn rounded_corner_radius_uses_shorter_side() {
        assert!((ShapeKind::Rounded.corner_radius(100.0, 40.0) - 6.0).abs() < 1e-9);
        assert_eq!(ShapeKind::Square.corner_radius(100.0, 40.0), 0.0);
    }
}
