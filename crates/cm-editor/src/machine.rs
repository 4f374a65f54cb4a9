//! The interaction state machine.
//!
//! `Idle → (pointer-down on a target) → Dragging | Resizing → (pointer-up
//! or leave) → Idle`. Every event goes through [`InteractionMachine::handle_event`];
//! the result is a list of intents for the caller plus a redraw request.
//! The machine owns no overlay state: it reads the last frame's
//! [`HitScene`] and writes only the callout store.

use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::resize::apply_rotated_resize;
use crate::session::DragSession;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use cm_core::{CalloutStore, Intent, Target};
use cm_render::hit::overlay_target;
use cm_render::{Hit, HitScene};
use kurbo::Point;
use smallvec::{SmallVec, smallvec};

/// How the caller should redraw after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Redraw {
    #[default]
    None,
    /// Redraw now, without animation.
    Immediate,
}

/// Result of one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub intents: SmallVec<[Intent; 2]>,
    pub redraw: Redraw,
}

impl Outcome {
    fn immediate(intent: Intent) -> Self {
        Self {
            intents: smallvec![intent],
            redraw: Redraw::Immediate,
        }
    }

    fn silent(intent: Intent) -> Self {
        Self {
            intents: smallvec![intent],
            redraw: Redraw::None,
        }
    }
}

#[derive(Debug, Default)]
pub struct InteractionMachine {
    session: DragSession,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_idle()
    }

    /// Single entry point for every input event.
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        scene: &HitScene,
        callouts: &mut CalloutStore,
    ) -> Outcome {
        match event {
            InputEvent::PointerDown { x, y, button, .. } => {
                if *button != PointerButton::Primary {
                    return Outcome::default();
                }
                if !self.session.is_idle() {
                    // A second press without a release: close the old gesture first.
                    self.end_gesture(scene, false);
                }
                self.pointer_down(Point::new(*x, *y), scene, callouts)
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(*x, *y), modifiers.shift, callouts)
            }
            InputEvent::PointerUp { .. } => self.end_gesture(scene, true),
            InputEvent::PointerLeave => self.end_gesture(scene, false),
            InputEvent::ContextMenu { x, y } => context_menu(Point::new(*x, *y), scene),
            InputEvent::Key { key, modifiers } => {
                if self.session.is_idle() {
                    key_action(key, *modifiers, scene)
                } else {
                    Outcome::default()
                }
            }
        }
    }

    fn pointer_down(&mut self, p: Point, scene: &HitScene, callouts: &mut CalloutStore) -> Outcome {
        match scene.hit_test(p) {
            Some(Hit::Handle { id, handle }) => {
                let Some(o) = scene.overlay(id) else {
                    return Outcome::default();
                };
                self.session = DragSession::Resizing {
                    id,
                    target: overlay_target(o),
                    handle,
                    snapshot: o.frame.rect(),
                    rotation: o.frame.rotation,
                    pointer_start: p,
                };
                log::debug!("idle -> resizing {id} from {}", handle.as_str());
                Outcome::default()
            }
            Some(Hit::Overlay(target)) => {
                let Some(o) = target.overlay_id().and_then(|id| scene.overlay(id)) else {
                    return Outcome::default();
                };
                self.session = DragSession::Dragging {
                    target,
                    offset: p - Point::new(o.frame.x, o.frame.y),
                    origin: p,
                    moved: false,
                };
                log::debug!("idle -> dragging overlay {}", o.id());
                Outcome::default()
            }
            Some(Hit::Callout(c)) => {
                // From here on the callout sticks to wherever the user puts it.
                callouts.insert(c.key, c.center);
                self.session = DragSession::Dragging {
                    target: Target::Callout(c.key),
                    offset: p - c.center,
                    origin: p,
                    moved: false,
                };
                log::debug!("idle -> dragging callout {}", c.key);
                Outcome::default()
            }
            None if scene.selected.is_some() => Outcome::immediate(Intent::deselect()),
            None => Outcome::default(),
        }
    }

    /// `lock_aspect` is Shift: corner resizes keep the starting aspect ratio.
    fn pointer_move(&mut self, p: Point, lock_aspect: bool, callouts: &mut CalloutStore) -> Outcome {
        match &mut self.session {
            DragSession::Idle => Outcome::default(),
            DragSession::Dragging {
                target,
                offset,
                origin,
                moved,
            } => {
                if !*moved && p == *origin {
                    return Outcome::default();
                }
                *moved = true;
                let pos = p - *offset;
                if let Target::Callout(key) = target {
                    callouts.insert(*key, pos);
                }
                Outcome::immediate(Intent::Move {
                    target: *target,
                    x: pos.x,
                    y: pos.y,
                })
            }
            DragSession::Resizing {
                target,
                handle,
                snapshot,
                rotation,
                pointer_start,
                ..
            } => {
                let r = apply_rotated_resize(
                    *handle,
                    *snapshot,
                    p - *pointer_start,
                    *rotation,
                    lock_aspect,
                );
                Outcome::immediate(Intent::Resize {
                    target: *target,
                    x: r.x0,
                    y: r.y0,
                    width: r.width(),
                    height: r.height(),
                    use_natural_size: Some(false),
                    natural_width: None,
                    natural_height: None,
                })
            }
        }
    }

    /// Pointer-up and pointer-leave both land here. The last emitted intent
    /// already is the final state; nothing is rolled back. Only a real
    /// release (`click`) without movement selects.
    fn end_gesture(&mut self, scene: &HitScene, click: bool) -> Outcome {
        let session = std::mem::take(&mut self.session);
        if !session.is_idle() {
            log::debug!("{} -> idle", session.name());
        }
        match session {
            DragSession::Dragging {
                target,
                moved: false,
                ..
            } if click => match target.overlay_id() {
                Some(id) if scene.selected != Some(id) => Outcome::immediate(Intent::select(target)),
                _ => Outcome::default(),
            },
            _ => Outcome::default(),
        }
    }

    /// CSS cursor hint for hovering `p`.
    pub fn cursor_at(&self, p: Point, scene: &HitScene) -> &'static str {
        match &self.session {
            DragSession::Dragging { .. } => "grabbing",
            DragSession::Resizing { handle, .. } => handle.cursor(),
            DragSession::Idle => match scene.hit_test(p) {
                Some(Hit::Handle { handle, .. }) => handle.cursor(),
                Some(Hit::Overlay(_)) | Some(Hit::Callout(_)) => "move",
                None => "default",
            },
        }
    }
}

fn context_menu(p: Point, scene: &HitScene) -> Outcome {
    let target = match scene.hit_test(p) {
        Some(Hit::Handle { id, .. }) => scene.overlay(id).map(overlay_target),
        Some(Hit::Overlay(t)) => Some(t),
        Some(Hit::Callout(c)) => Some(Target::Callout(c.key)),
        None => None,
    };
    match target {
        Some(target) => Outcome::silent(Intent::ContextMenu {
            target,
            x: p.x,
            y: p.y,
        }),
        None => Outcome::default(),
    }
}

fn key_action(key: &str, modifiers: Modifiers, scene: &HitScene) -> Outcome {
    let Some(action) = ShortcutMap::resolve(key, modifiers) else {
        return Outcome::default();
    };
    let Some(o) = scene.selected.and_then(|id| scene.overlay(id)) else {
        return Outcome::default();
    };
    let target = overlay_target(o);
    match action {
        ShortcutAction::Nudge { dx, dy } => Outcome::immediate(Intent::Move {
            target,
            x: o.frame.x + dx,
            y: o.frame.y + dy,
        }),
        ShortcutAction::Delete => Outcome::immediate(Intent::Remove { target }),
        ShortcutAction::Deselect => Outcome::immediate(Intent::deselect()),
    }
}
