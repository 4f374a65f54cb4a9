//! Per-handle resize rules.
//!
//! Every handle moves only the edges it touches; the opposite edges stay
//! fixed. When the minimum size clamp engages the moving edge stops, the
//! fixed edge never moves. Corner drags with Shift held keep the starting
//! aspect ratio.

use cm_render::Handle;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Smallest width or height a resize can produce.
pub const MIN_SIZE: f64 = 20.0;

fn moves_left(h: Handle) -> bool {
    matches!(h, Handle::W | Handle::Nw | Handle::Sw)
}

fn moves_right(h: Handle) -> bool {
    matches!(h, Handle::E | Handle::Ne | Handle::Se)
}

fn moves_top(h: Handle) -> bool {
    matches!(h, Handle::N | Handle::Ne | Handle::Nw)
}

fn moves_bottom(h: Handle) -> bool {
    matches!(h, Handle::S | Handle::Se | Handle::Sw)
}

/// New frame after dragging `handle` by `delta` from the `start` frame.
pub fn apply_resize(handle: Handle, start: Rect, delta: Vec2) -> Rect {
    let mut r = start;
    if moves_right(handle) {
        r.x1 = (start.x1 + delta.x).max(start.x0 + MIN_SIZE);
    }
    if moves_left(handle) {
        r.x0 = (start.x0 + delta.x).min(start.x1 - MIN_SIZE);
    }
    if moves_bottom(handle) {
        r.y1 = (start.y1 + delta.y).max(start.y0 + MIN_SIZE);
    }
    if moves_top(handle) {
        r.y0 = (start.y0 + delta.y).min(start.y1 - MIN_SIZE);
    }
    r
}

/// Scale `next` back to the aspect ratio of `start`, anchored at the corner
/// opposite `handle`. The larger of the two axis scales wins. Edge handles
/// pass through unchanged.
pub fn keep_aspect(handle: Handle, start: Rect, next: Rect) -> Rect {
    let corner = matches!(handle, Handle::Nw | Handle::Ne | Handle::Se | Handle::Sw);
    if !corner || start.width() <= 0.0 || start.height() <= 0.0 {
        return next;
    }
    let min_scale = (MIN_SIZE / start.width()).max(MIN_SIZE / start.height());
    let scale = (next.width() / start.width())
        .max(next.height() / start.height())
        .max(min_scale);
    let size = Size::new(start.width() * scale, start.height() * scale);
    let x0 = if moves_left(handle) { start.x1 - size.width } else { start.x0 };
    let y0 = if moves_top(handle) { start.y1 - size.height } else { start.y0 };
    Rect::from_origin_size(Point::new(x0, y0), size)
}

/// Resize of a frame rotated by `rotation` degrees about its center.
///
/// `delta` is in canvas space. It is mapped into the frame's own axes, the
/// handle rule applied there, and the result shifted so the fixed corner
/// keeps its on-screen position.
pub fn apply_rotated_resize(
    handle: Handle,
    start: Rect,
    delta: Vec2,
    rotation: f64,
    lock_aspect: bool,
) -> Rect {
    let rot = Affine::rotate(rotation.to_radians());
    let local_delta = if rotation == 0.0 {
        delta
    } else {
        (rot.inverse() * Point::new(delta.x, delta.y)).to_vec2()
    };
    let mut next = apply_resize(handle, start, local_delta);
    if lock_aspect {
        next = keep_aspect(handle, start, next);
    }
    if rotation == 0.0 {
        return next;
    }

    let c0 = start.center().to_vec2();
    let c1 = next.center().to_vec2();
    let turned = rot * (c1 - c0).to_point();
    let shift = (c0 - c1) + turned.to_vec2();
    next + shift
}
