//! Callout arrows.
//!
//! Geometry is computed first as plain data (`ArrowGeometry`) and only then
//! stroked, so the bend and head math can be tested without a surface.

use crate::surface::DrawingSurface;
use cm_core::{ArrowHead, ArrowStyle, ElbowBend, Sector};
use kurbo::{Point, Size, Vec2};
use smallvec::SmallVec;

/// Length of the radial elbow segment used by sector charts when no bend
/// point is configured.
pub const RADIAL_ELBOW_LENGTH: f64 = 20.0;

/// Shaft segments shorter than this draw nothing.
pub const MIN_SEGMENT: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadGeometry {
    /// Two strokes from the wings to the tip.
    Open { left: Point, tip: Point, right: Point },
    /// Closed triangle.
    Filled { left: Point, tip: Point, right: Point },
    /// Tick across the tip, perpendicular to the shaft.
    Bar { from: Point, to: Point },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowGeometry {
    /// Polyline of the shaft: start, optional bend, end.
    pub shaft: SmallVec<[Point; 3]>,
    pub head: Option<HeadGeometry>,
}

/// Where the elbow bends, if the style asks for one.
pub fn bend_point(
    start: Point,
    style: &ArrowStyle,
    sector: Option<&Sector>,
    canvas: Size,
) -> Option<Point> {
    if !style.elbow {
        return None;
    }
    match style.bend {
        Some(ElbowBend::Absolute { x, y }) => Some(Point::new(x, y)),
        Some(ElbowBend::Relative { fx, fy }) => {
            Some(Point::new(fx * canvas.width, fy * canvas.height))
        }
        Some(ElbowBend::Radial { length }) => sector.map(|s| radial_from(s, start, length)),
        None => sector.map(|s| radial_from(s, start, RADIAL_ELBOW_LENGTH)),
    }
}

fn radial_from(sector: &Sector, start: Point, length: f64) -> Point {
    let (sin, cos) = sector.mid_angle().sin_cos();
    start + Vec2::new(cos, sin) * length
}

/// Arrow from `start` to `target`. `None` when both ends coincide and
/// there is no elbow to draw.
pub fn arrow_geometry(
    start: Point,
    target: Point,
    style: &ArrowStyle,
    sector: Option<&Sector>,
    canvas: Size,
) -> Option<ArrowGeometry> {
    let bend = bend_point(start, style, sector, canvas);
    let from = bend.unwrap_or(start);
    let d = target - from;
    let len = d.hypot();

    let mut shaft: SmallVec<[Point; 3]> = SmallVec::new();
    shaft.push(start);
    if let Some(b) = bend {
        shaft.push(b);
    }

    if len < MIN_SEGMENT {
        if bend.is_none() {
            return None;
        }
        return Some(ArrowGeometry { shaft, head: None });
    }

    let u = d / len;
    let gap = style.end_gap.max(0.0).min(len);
    let tip = target - u * gap;
    let head = style.head.then(|| head_geometry(style.head_style, tip, u, style.head_size));

    // A filled head covers the last `head_size` of the shaft; stop there so
    // the line cap does not poke through the tip.
    let end = match head {
        Some(HeadGeometry::Filled { .. }) => tip - u * style.head_size.min(len - gap),
        _ => tip,
    };
    shaft.push(end);
    Some(ArrowGeometry { shaft, head })
}

fn head_geometry(kind: ArrowHead, tip: Point, u: Vec2, size: f64) -> HeadGeometry {
    let n = Vec2::new(-u.y, u.x);
    let half = size / 2.0;
    let base = tip - u * size;
    match kind {
        ArrowHead::Open => HeadGeometry::Open {
            left: base + n * half,
            tip,
            right: base - n * half,
        },
        ArrowHead::Filled => HeadGeometry::Filled {
            left: base + n * half,
            tip,
            right: base - n * half,
        },
        ArrowHead::Bar => HeadGeometry::Bar {
            from: tip + n * half,
            to: tip - n * half,
        },
    }
}

/// Stroke the shaft (if `style.line`) and draw the head (if any).
pub fn draw_arrow<S: DrawingSurface>(s: &mut S, arrow: &ArrowGeometry, style: &ArrowStyle) {
    s.save();
    s.set_stroke_color(&style.color);
    s.set_fill_color(&style.color);
    s.set_line_width(style.width);

    if style.line && arrow.shaft.len() >= 2 {
        s.begin_path();
        s.move_to(arrow.shaft[0]);
        for p in &arrow.shaft[1..] {
            s.line_to(*p);
        }
        s.stroke();
    }

    match arrow.head {
        Some(HeadGeometry::Open { left, tip, right }) => {
            s.begin_path();
            s.move_to(left);
            s.line_to(tip);
            s.line_to(right);
            s.stroke();
        }
        Some(HeadGeometry::Filled { left, tip, right }) => {
            s.begin_path();
            s.move_to(left);
            s.line_to(tip);
            s.line_to(right);
            s.close_path();
            s.fill();
        }
        Some(HeadGeometry::Bar { from, to }) => {
            s.begin_path();
            s.move_to(from);
            s.line_to(to);
            s.stroke();
        }
        None => {}
    }
    s.restore();
}
