//! Update intents emitted by the engine for the caller to persist.
//!
//! The engine never stores overlay state itself; every drag, resize,
//! selection or menu request leaves as an `Intent`. The last intent of a
//! gesture is its final state.

use crate::id::{OverlayId, PointKey};
use serde::{Deserialize, Serialize};

/// What an intent refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Target {
    Image { id: OverlayId },
    Text { id: OverlayId },
    Callout(PointKey),
}

impl Target {
    pub fn overlay_id(&self) -> Option<OverlayId> {
        match self {
            Target::Image { id } | Target::Text { id } => Some(*id),
            Target::Callout(_) => None,
        }
    }

    pub fn callout_key(&self) -> Option<PointKey> {
        match self {
            Target::Callout(key) => Some(*key),
            _ => None,
        }
    }
}

/// Overlay kind named by selection intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayTag {
    Image,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Intent {
    Move {
        #[serde(flatten)]
        target: Target,
        x: f64,
        y: f64,
    },
    Resize {
        #[serde(flatten)]
        target: Target,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        use_natural_size: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        natural_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        natural_height: Option<f64>,
    },
    /// `kind`/`id` are `None` when the click landed on empty space.
    Select {
        kind: Option<OverlayTag>,
        id: Option<OverlayId>,
    },
    ContextMenu {
        #[serde(flatten)]
        target: Target,
        x: f64,
        y: f64,
    },
    Remove {
        #[serde(flatten)]
        target: Target,
    },
}

impl Intent {
    pub fn target(&self) -> Option<Target> {
        match self {
            Intent::Move { target, .. }
            | Intent::Resize { target, .. }
            | Intent::ContextMenu { target, .. }
            | Intent::Remove { target } => Some(*target),
            Intent::Select { .. } => None,
        }
    }

    pub fn deselect() -> Self {
        Intent::Select {
            kind: None,
            id: None,
        }
    }

    pub fn select(target: Target) -> Self {
        match target {
            Target::Image { id } => Intent::Select {
                kind: Some(OverlayTag::Image),
                id: Some(id),
            },
            Target::Text { id } => Intent::Select {
                kind: Some(OverlayTag::Text),
                id: Some(id),
            },
            Target::Callout(_) => Intent::deselect(),
        }
    }
}
