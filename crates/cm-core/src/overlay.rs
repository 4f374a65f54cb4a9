//! Free-floating overlay objects (images and text boxes not bound to any
//! chart element). Owned by the caller's store; the engine reads them and
//! emits update intents.

use crate::geometry::ShapeKind;
use crate::id::OverlayId;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Placement and decoration shared by every overlay kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayFrame {
    pub id: OverlayId,
    /// Top-left corner in canvas pixels (before rotation).
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Draw at the image's natural size instead of `width`/`height`.
    pub use_natural_size: bool,
    pub natural_width: Option<f64>,
    pub natural_height: Option<f64>,
    /// Clockwise rotation about the center, in degrees.
    pub rotation: f64,
    pub opacity: f64,
    pub visible: bool,
    pub z_index: i32,
    pub shape: ShapeKind,
    pub border_width: f64,
    pub border_color: String,
}

impl Default for OverlayFrame {
    fn default() -> Self {
        Self {
            id: OverlayId::intern(""),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            use_natural_size: false,
            natural_width: None,
            natural_height: None,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            z_index: 0,
            shape: ShapeKind::None,
            border_width: 0.0,
            border_color: "#000000".to_string(),
        }
    }
}

impl OverlayFrame {
    pub fn natural_size(&self) -> Option<Size> {
        match (self.natural_width, self.natural_height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(Size::new(w, h)),
            _ => None,
        }
    }

    /// Size actually drawn: natural size when requested and known.
    pub fn size(&self) -> Size {
        if self.use_natural_size
            && let Some(n) = self.natural_size()
        {
            return n;
        }
        Size::new(self.width.max(0.0), self.height.max(0.0))
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(Point::new(self.x, self.y), self.size())
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Map a canvas point into the overlay's unrotated frame.
    pub fn unrotate(&self, p: Point) -> Point {
        if self.rotation == 0.0 {
            return p;
        }
        let c = self.center();
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let d = p - c;
        c + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
    }
}

/// Text box styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub color: String,
    pub background: Option<String>,
    pub padding: f64,
    /// Wrap width; falls back to the frame width.
    pub max_width: Option<f64>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            font_weight: 400,
            color: "#000000".to_string(),
            background: None,
            padding: 4.0,
            max_width: None,
        }
    }
}

impl TextStyle {
    pub fn css_font(&self) -> String {
        format!("{} {}px {}", self.font_weight, self.font_size, self.font_family)
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OverlayKind {
    Image { url: String },
    Text(TextStyle),
}

/// A free-floating image or text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayObject {
    #[serde(flatten)]
    pub frame: OverlayFrame,
    #[serde(flatten)]
    pub kind: OverlayKind,
}

impl OverlayObject {
    pub fn image(id: &str, url: impl Into<String>, rect: Rect) -> Self {
        Self {
            frame: OverlayFrame {
                id: OverlayId::intern(id),
                x: rect.x0,
                y: rect.y0,
                width: rect.width(),
                height: rect.height(),
                ..OverlayFrame::default()
            },
            kind: OverlayKind::Image { url: url.into() },
        }
    }

    pub fn text(id: &str, text: impl Into<String>, rect: Rect) -> Self {
        Self {
            frame: OverlayFrame {
                id: OverlayId::intern(id),
                x: rect.x0,
                y: rect.y0,
                width: rect.width(),
                height: rect.height(),
                ..OverlayFrame::default()
            },
            kind: OverlayKind::Text(TextStyle {
                text: text.into(),
                ..TextStyle::default()
            }),
        }
    }

    pub fn id(&self) -> OverlayId {
        self.frame.id
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, OverlayKind::Image { .. })
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.kind {
            OverlayKind::Image { url } => Some(url),
            OverlayKind::Text(_) => None,
        }
    }

    pub fn with_z(mut self, z_index: i32) -> Self {
        self.frame.z_index = z_index;
        self
    }

    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.frame.shape = shape;
        self
    }
}
