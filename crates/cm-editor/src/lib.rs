pub mod canvas;
pub mod images;
pub mod input;
pub mod machine;
pub mod redraw;
pub mod resize;
pub mod session;
pub mod shortcuts;

pub use canvas::AnnotationCanvas;
pub use images::{Completion, ImageCache, Request, Waiter};
pub use input::{InputEvent, Modifiers, PointerButton, TouchPhase};
pub use machine::{InteractionMachine, Outcome, Redraw};
pub use redraw::RedrawCoordinator;
pub use resize::{MIN_SIZE, apply_resize, apply_rotated_resize, keep_aspect};
pub use session::DragSession;
pub use shortcuts::{ShortcutAction, ShortcutMap};
