//! Hit testing: pointer position → overlay, resize handle or callout.
//!
//! Overlays are walked topmost first (descending z-index). The selected
//! overlay's handles are tested before its body. Callouts come last, in
//! reverse draw order, so whatever was painted on top wins.

use cm_core::{OverlayId, OverlayObject, PointKey, ShapeKind, Target};
use kurbo::{Point, Rect};

/// Side of a square resize handle.
pub const HANDLE_SIZE: f64 = 8.0;
/// Extra slop around each handle.
pub const HANDLE_TOLERANCE: f64 = 4.0;
/// A callout is grabbed within `size / CALLOUT_HIT_DIVISOR` of its center.
pub const CALLOUT_HIT_DIVISOR: f64 = 1.5;

/// The eight resize handles: corners and edge midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::N,
        Handle::Ne,
        Handle::E,
        Handle::Se,
        Handle::S,
        Handle::Sw,
        Handle::W,
    ];

    /// Handle center on the (unrotated) frame `r`.
    pub fn position(self, r: Rect) -> Point {
        let (cx, cy) = (r.center().x, r.center().y);
        match self {
            Handle::N => Point::new(cx, r.y0),
            Handle::Ne => Point::new(r.x1, r.y0),
            Handle::E => Point::new(r.x1, cy),
            Handle::Se => Point::new(r.x1, r.y1),
            Handle::S => Point::new(cx, r.y1),
            Handle::Sw => Point::new(r.x0, r.y1),
            Handle::W => Point::new(r.x0, cy),
            Handle::Nw => Point::new(r.x0, r.y0),
        }
    }

    /// Drawn square of the handle.
    pub fn rect(self, r: Rect) -> Rect {
        Rect::from_center_size(self.position(r), (HANDLE_SIZE, HANDLE_SIZE))
    }

    /// CSS cursor for hovering this handle.
    pub fn cursor(self) -> &'static str {
        match self {
            Handle::N | Handle::S => "ns-resize",
            Handle::E | Handle::W => "ew-resize",
            Handle::Ne | Handle::Sw => "nesw-resize",
            Handle::Se | Handle::Nw => "nwse-resize",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::N => "n",
            Handle::Ne => "ne",
            Handle::E => "e",
            Handle::Se => "se",
            Handle::S => "s",
            Handle::Sw => "sw",
            Handle::W => "w",
            Handle::Nw => "nw",
        }
    }
}

/// A draggable callout resolved during the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalloutTarget {
    pub key: PointKey,
    pub center: Point,
    pub radius: f64,
}

impl CalloutTarget {
    pub fn new(key: PointKey, center: Point, size: f64) -> Self {
        Self {
            key,
            center,
            radius: size / CALLOUT_HIT_DIVISOR,
        }
    }
}

/// What was under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Handle { id: OverlayId, handle: Handle },
    Overlay(Target),
    Callout(CalloutTarget),
}

/// Everything hit testing needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct HitScene {
    /// Overlays in hit order (topmost first).
    pub overlays: Vec<OverlayObject>,
    /// Callouts in draw order.
    pub callouts: Vec<CalloutTarget>,
    pub selected: Option<OverlayId>,
}

impl HitScene {
    pub fn overlay(&self, id: OverlayId) -> Option<&OverlayObject> {
        self.overlays.iter().find(|o| o.id() == id)
    }

    pub fn callout(&self, key: PointKey) -> Option<&CalloutTarget> {
        self.callouts.iter().find(|c| c.key == key)
    }

    /// Topmost target at `p`, or `None` for empty space.
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        for o in &self.overlays {
            if !o.frame.visible {
                continue;
            }
            if self.selected == Some(o.id())
                && let Some(handle) = hit_handle(o, p)
            {
                return Some(Hit::Handle { id: o.id(), handle });
            }
            if overlay_contains(o, p) {
                return Some(Hit::Overlay(overlay_target(o)));
            }
        }
        self.callouts
            .iter()
            .rev()
            .find(|c| (p - c.center).hypot() <= c.radius)
            .map(|c| Hit::Callout(*c))
    }
}

pub fn overlay_target(o: &OverlayObject) -> Target {
    if o.is_image() {
        Target::Image { id: o.id() }
    } else {
        Target::Text { id: o.id() }
    }
}

/// Body test in the overlay's unrotated frame.
pub fn overlay_contains(o: &OverlayObject, p: Point) -> bool {
    let local = o.frame.unrotate(p);
    let r = o.frame.rect();
    match o.frame.shape {
        ShapeKind::Circle => (local - r.center()).hypot() <= r.width().min(r.height()) / 2.0,
        _ => r.contains(local),
    }
}

/// Handle under `p`, tolerance included.
pub fn hit_handle(o: &OverlayObject, p: Point) -> Option<Handle> {
    let local = o.frame.unrotate(p);
    let r = o.frame.rect();
    let reach = HANDLE_SIZE / 2.0 + HANDLE_TOLERANCE;
    Handle::ALL.into_iter().find(|h| {
        let c = h.position(r);
        (local.x - c.x).abs() <= reach && (local.y - c.y).abs() <= reach
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::OverlayStore;

    fn scene() -> HitScene {
        let store = OverlayStore::from_objects([
            OverlayObject::image("low", "a.png", Rect::new(0.0, 0.0, 100.0, 100.0)).with_z(0),
            OverlayObject::text("high", "t", Rect::new(50.0, 50.0, 150.0, 150.0)).with_z(5),
        ]);
        HitScene {
            overlays: store.hit_order().into_iter().cloned().collect(),
            callouts: vec![CalloutTarget::new(PointKey::new(0, 0), Point::new(300.0, 300.0), 30.0)],
            selected: None,
        }
    }

    #[test]
    fn topmost_overlay_wins() {
        let hit = scene().hit_test(Point::new(75.0, 75.0));
        assert_eq!(
            hit,
            Some(Hit::Overlay(Target::Text {
                id: OverlayId::intern("high")
            }))
        );
    }

    #[test]
    fn handles_only_for_selected() {
        let mut sc = scene();
        let corner = Point::new(153.0, 153.0);
        assert_eq!(sc.hit_test(corner), None);
        sc.selected = Some(OverlayId::intern("high"));
        assert_eq!(
            sc.hit_test(corner),
            Some(Hit::Handle {
                id: OverlayId::intern("high"),
                handle: Handle::Se
            })
        );
    }

    #[test]
    fn callout_radius_is_size_over_one_and_a_half() {
        let sc = scene();
        assert!(matches!(sc.hit_test(Point::new(319.0, 300.0)), Some(Hit::Callout(_))));
        assert_eq!(sc.hit_test(Point::new(321.0, 300.0)), None);
    }

    #[test]
    fn circle_overlays_use_radial_distance() {
        let o = OverlayObject::image("c", "c.png", Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_shape(ShapeKind::Circle);
        assert!(overlay_contains(&o, Point::new(50.0, 5.0)));
        assert!(!overlay_contains(&o, Point::new(3.0, 3.0)), "corner lies outside the circle");
    }

    #[test]
    fn rotated_overlay_is_hit_in_its_own_frame() {
        let mut o = OverlayObject::image("r", "r.png", Rect::new(0.0, 40.0, 100.0, 60.0));
        o.frame.rotation = 90.0;
        // Rotated a quarter turn the 100x20 bar stands upright around (50, 50).
        assert!(overlay_contains(&o, Point::new(50.0, 5.0)));
        assert!(!overlay_contains(&o, Point::new(5.0, 50.0)));
    }
}
