pub mod anchor;
pub mod fit;
pub mod geometry;
pub mod id;
pub mod intent;
pub mod model;
pub mod overlay;
pub mod store;

pub use anchor::{Resolved, callout_origin, resolve};
pub use fit::{Placement, bar_bounds, fit_image, largest_inscribed_rect, sector_bounds, slice_fill};
pub use geometry::{Anchor, ImageFit, ShapeKind, Sector};
pub use id::{OverlayId, PointKey};
pub use intent::{Intent, OverlayTag, Target};
pub use model::*;
pub use overlay::{OverlayFrame, OverlayKind, OverlayObject, TextStyle};
pub use store::{CalloutStore, OverlayStore};

// Re-export kurbo primitives so downstream crates share one geometry vocabulary
pub use kurbo::{Point, Rect, Size, Vec2};
