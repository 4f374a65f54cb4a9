//! Input abstraction layer.
//!
//! Normalizes mouse, touch and keyboard events into a unified
//! `InputEvent` consumed by the interaction machine. Touch maps one-for-one
//! onto the pointer events; anything with more than one finger is dropped.

use kurbo::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Platform command key: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button of a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// From `MouseEvent.button`.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

/// A normalized input event, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// The pointer left the surface. Ends a gesture exactly like `PointerUp`.
    PointerLeave,
    /// Right click, or a long-press recognized by the host.
    ContextMenu {
        x: f64,
        y: f64,
    },
    Key {
        key: String,
        modifiers: Modifiers,
    },
}

/// Phase of a DOM touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.into(),
            modifiers,
        }
    }

    /// Translate a touch event. `touch_count` is the number of fingers the
    /// event concerns (`touches.length` for start/move, `changedTouches.length`
    /// for end/cancel). Anything but a single touch yields `None`.
    pub fn from_touch(phase: TouchPhase, touch_count: usize, at: Point) -> Option<Self> {
        if touch_count != 1 {
            return None;
        }
        Some(match phase {
            TouchPhase::Start => Self::pointer_down(at.x, at.y),
            TouchPhase::Move => Self::pointer_move(at.x, at.y),
            TouchPhase::End => Self::pointer_up(at.x, at.y),
            TouchPhase::Cancel => Self::PointerLeave,
        })
    }

    /// Position if this is a positioned pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y }
            | Self::ContextMenu { x, y } => Some(Point::new(*x, *y)),
            Self::PointerLeave | Self::Key { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_touch_mirrors_pointer() {
        let at = Point::new(3.0, 4.0);
        assert_eq!(
            InputEvent::from_touch(TouchPhase::Start, 1, at),
            Some(InputEvent::pointer_down(3.0, 4.0))
        );
        assert_eq!(
            InputEvent::from_touch(TouchPhase::End, 1, at),
            Some(InputEvent::pointer_up(3.0, 4.0))
        );
        assert_eq!(
            InputEvent::from_touch(TouchPhase::Cancel, 1, at),
            Some(InputEvent::PointerLeave)
        );
    }

    #[test]
    fn multi_touch_is_dropped() {
        assert_eq!(InputEvent::from_touch(TouchPhase::Start, 2, Point::ZERO), None);
        assert_eq!(InputEvent::from_touch(TouchPhase::Move, 3, Point::ZERO), None);
    }

    #[test]
    fn dom_buttons() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
    }
}
