pub mod annotation;
pub mod arrow;
pub mod frame;
pub mod hit;
pub mod label;
pub mod overlay;
pub mod record;
pub mod shape;
pub mod surface;

pub use annotation::{AnnotationStatus, draw_annotation};
pub use frame::{FrameInput, FrameReport, ResolvedAnnotation, render_frame};
pub use hit::{CalloutTarget, Handle, Hit, HitScene};
pub use record::{DrawOp, RecordingSurface};
pub use surface::{
    DrawingSurface, ImageProvider, LoadedImage, NoImages, Shadow, TextAlign, TextBaseline,
};
