//! Anchor resolution: (element geometry, anchor, config) → pixel point.
//!
//! Pure functions. The only state consulted is the callout store, and the
//! only "side effect" is reported back to the caller through
//! [`Resolved::persist`] for it to apply (or not).

use crate::geometry::Anchor;
use crate::id::PointKey;
use crate::model::{AnnotationConfig, BarGeometry, ElementGeometry};
use crate::store::CalloutStore;
use kurbo::Point;

/// Gap between a bar end and an `above`/`below` annotation.
pub const BAR_MARGIN: f64 = 8.0;
/// Vertical offset of `above`/`below` annotations on point elements.
pub const POINT_MARGIN: f64 = 12.0;
/// Distance of a fresh callout from its origin.
pub const DEFAULT_CALLOUT_OFFSET: f64 = 40.0;
/// Radial position of `center` within the ring, as a fraction of its thickness.
pub const SECTOR_CENTER_FRACTION: f64 = 0.5;
/// Radial position of `below` (inside) within the ring.
pub const SECTOR_INSIDE_FRACTION: f64 = 0.2;
/// `above` (outside) sits this many annotation sizes past the outer radius.
pub const SECTOR_OUTSIDE_SIZE_FACTOR: f64 = 0.7;

/// Result of resolving one annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub point: Point,
    /// A freshly computed callout default the caller may write into
    /// `calloutX`/`calloutY` so later drags start from a stable point.
    pub persist: Option<Point>,
}

impl Resolved {
    fn at(point: Point) -> Self {
        Self {
            point,
            persist: None,
        }
    }
}

/// Resolve the annotation for `key` to a pixel point.
///
/// Callouts prefer, in order: the user's drag position, the config's
/// persisted position, the computed default.
pub fn resolve(
    geometry: &ElementGeometry,
    config: &AnnotationConfig,
    callouts: &CalloutStore,
    key: PointKey,
) -> Resolved {
    if config.anchor != Anchor::Callout {
        return Resolved::at(anchor_point(geometry, config.anchor, config.size));
    }
    if let Some(p) = callouts.get(key) {
        return Resolved::at(p);
    }
    if let Some(p) = config.persisted_callout() {
        return Resolved::at(p);
    }
    let p = default_callout(geometry, config.callout_offset);
    Resolved {
        point: p,
        persist: Some(p),
    }
}

/// Point for a non-callout anchor. `Anchor::Callout` falls back to the
/// computed default with the standard offset.
pub fn anchor_point(geometry: &ElementGeometry, anchor: Anchor, size: f64) -> Point {
    let half = size / 2.0;
    match geometry {
        ElementGeometry::Bar(bar) if bar.horizontal => horizontal_bar_anchor(bar, anchor, half),
        ElementGeometry::Bar(bar) => vertical_bar_anchor(bar, anchor, half),
        ElementGeometry::Point(p) => match anchor {
            Anchor::Center => Point::new(p.x, p.y),
            Anchor::Above => Point::new(p.x, p.y - POINT_MARGIN),
            Anchor::Below => Point::new(p.x, p.y + POINT_MARGIN),
            Anchor::Callout => default_callout(geometry, DEFAULT_CALLOUT_OFFSET),
        },
        ElementGeometry::Sector(s) => {
            let mid = s.mid_angle();
            let ring = s.outer_radius - s.inner_radius;
            let center_r = s.inner_radius + SECTOR_CENTER_FRACTION * ring;
            if s.sweep() <= 0.0 && anchor != Anchor::Callout {
                return s.point_at(center_r, mid);
            }
            match anchor {
                Anchor::Center => s.point_at(center_r, mid),
                Anchor::Above => s.point_at(s.outer_radius + SECTOR_OUTSIDE_SIZE_FACTOR * size, mid),
                Anchor::Below => s.point_at(s.inner_radius + SECTOR_INSIDE_FRACTION * ring, mid),
                Anchor::Callout => default_callout(geometry, DEFAULT_CALLOUT_OFFSET),
            }
        }
    }
}

fn vertical_bar_anchor(bar: &BarGeometry, anchor: Anchor, half: f64) -> Point {
    let top = bar.y.min(bar.base);
    let bottom = bar.y.max(bar.base);
    match anchor {
        Anchor::Center => Point::new(bar.x, (bar.y + bar.base) / 2.0),
        Anchor::Above => Point::new(bar.x, top - half - BAR_MARGIN),
        Anchor::Below => Point::new(bar.x, bottom - half - BAR_MARGIN),
        Anchor::Callout => default_callout(&ElementGeometry::Bar(*bar), DEFAULT_CALLOUT_OFFSET),
    }
}

fn horizontal_bar_anchor(bar: &BarGeometry, anchor: Anchor, half: f64) -> Point {
    let left = bar.x.min(bar.base);
    let right = bar.x.max(bar.base);
    match anchor {
        Anchor::Center => Point::new((bar.x + bar.base) / 2.0, bar.y),
        Anchor::Above => Point::new(right + half + BAR_MARGIN, bar.y),
        Anchor::Below => Point::new(left + half + BAR_MARGIN, bar.y),
        Anchor::Callout => default_callout(&ElementGeometry::Bar(*bar), DEFAULT_CALLOUT_OFFSET),
    }
}

/// Where a callout arrow starts: the bar's value end, the data point, or
/// the outer edge of a sector along its mid-angle.
pub fn callout_origin(geometry: &ElementGeometry) -> Point {
    match geometry {
        ElementGeometry::Bar(bar) => Point::new(bar.x, bar.y),
        ElementGeometry::Point(p) => Point::new(p.x, p.y),
        ElementGeometry::Sector(s) => s.point_at(s.outer_radius, s.mid_angle()),
    }
}

/// Computed callout position: up-right of the origin for bars and points,
/// radially outward for sectors.
pub fn default_callout(geometry: &ElementGeometry, offset: f64) -> Point {
    match geometry {
        ElementGeometry::Sector(s) => s.point_at(s.outer_radius + offset, s.mid_angle()),
        _ => {
            let o = callout_origin(geometry);
            Point::new(o.x + offset, o.y - offset)
        }
    }
}
