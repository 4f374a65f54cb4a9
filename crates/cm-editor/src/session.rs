//! The per-surface drag session.

use cm_core::{OverlayId, Target};
use cm_render::Handle;
use kurbo::{Point, Rect, Vec2};

/// Transient gesture state. Exactly one per interaction machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        target: Target,
        /// Pointer minus the target's position at pointer-down.
        offset: Vec2,
        /// Pointer position at pointer-down.
        origin: Point,
        moved: bool,
    },
    Resizing {
        id: OverlayId,
        target: Target,
        handle: Handle,
        /// Overlay frame at pointer-down.
        snapshot: Rect,
        rotation: f64,
        pointer_start: Point,
    },
}

impl DragSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragSession::Idle)
    }

    pub fn target(&self) -> Option<Target> {
        match self {
            DragSession::Idle => None,
            DragSession::Dragging { target, .. } | DragSession::Resizing { target, .. } => {
                Some(*target)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DragSession::Idle => "idle",
            DragSession::Dragging { .. } => "dragging",
            DragSession::Resizing { .. } => "resizing",
        }
    }
}
