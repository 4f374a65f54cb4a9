//! Annotation data model.
//!
//! Two halves meet here: the per-frame geometry handed over by the host
//! chart library (`RawElement`, normalized into `ElementGeometry`), and the
//! caller-owned annotation configuration (`AnnotationConfig`). Neither is
//! persisted by the engine; every struct round-trips through JSON so the
//! wasm bridge and the export generator can exchange it with JavaScript.

use crate::geometry::{Anchor, ImageFit, Sector, ShapeKind};
use crate::id::PointKey;
use kurbo::Point;
use serde::{Deserialize, Serialize};

// ─── Chart types ────────────────────────────────────────────────────────

/// Chart-type tag supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    #[default]
    Bar,
    HorizontalBar,
    Line,
    Scatter,
    Bubble,
    Radar,
    Pie,
    Doughnut,
    PolarArea,
}

/// Geometry family shared by several chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartFamily {
    Bar,
    Point,
    Sector,
}

impl ChartType {
    pub fn family(self) -> ChartFamily {
        match self {
            ChartType::Bar | ChartType::HorizontalBar => ChartFamily::Bar,
            ChartType::Line | ChartType::Scatter | ChartType::Bubble | ChartType::Radar => {
                ChartFamily::Point
            }
            ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => ChartFamily::Sector,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::HorizontalBar => "horizontalBar",
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Radar => "radar",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::PolarArea => "polarArea",
        }
    }
}

// ─── Element geometry ───────────────────────────────────────────────────

/// A bar element. For vertical bars `x` is the bar center, `y` the value
/// end and `base` the baseline y. For horizontal bars `y` is the center,
/// `x` the value end and `base` the baseline x.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarGeometry {
    pub x: f64,
    pub y: f64,
    pub base: f64,
    pub width: f64,
    pub height: f64,
    pub horizontal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointGeometry {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Narrow, validated per-element geometry, tagged by chart family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ElementGeometry {
    Bar(BarGeometry),
    Point(PointGeometry),
    Sector(Sector),
}

/// Loosely-typed element descriptor as reported by the host chart library.
/// Every field is optional; `ElementGeometry::normalize` fills the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawElement {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub base: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub horizontal: Option<bool>,
    pub radius: Option<f64>,
    pub start_angle: Option<f64>,
    pub end_angle: Option<f64>,
    pub inner_radius: Option<f64>,
    pub outer_radius: Option<f64>,
}

fn num(v: Option<f64>) -> f64 {
    v.filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl ElementGeometry {
    /// Validate a host descriptor into the variant for `chart_type`.
    /// Missing or non-finite fields become `0`; never fails.
    pub fn normalize(chart_type: ChartType, raw: &RawElement) -> Self {
        match chart_type.family() {
            ChartFamily::Bar => {
                let horizontal =
                    raw.horizontal.unwrap_or(matches!(chart_type, ChartType::HorizontalBar));
                let (x, y, base) = (num(raw.x), num(raw.y), num(raw.base));
                let (width, height) = if horizontal {
                    (
                        raw.width.map_or((x - base).abs(), |_| num(raw.width)),
                        num(raw.height),
                    )
                } else {
                    (
                        num(raw.width),
                        raw.height.map_or((base - y).abs(), |_| num(raw.height)),
                    )
                };
                ElementGeometry::Bar(BarGeometry {
                    x,
                    y,
                    base,
                    width,
                    height,
                    horizontal,
                })
            }
            ChartFamily::Point => ElementGeometry::Point(PointGeometry {
                x: num(raw.x),
                y: num(raw.y),
                radius: num(raw.radius),
            }),
            ChartFamily::Sector => ElementGeometry::Sector(Sector {
                center: Point::new(num(raw.x), num(raw.y)),
                start_angle: num(raw.start_angle),
                end_angle: num(raw.end_angle),
                inner_radius: num(raw.inner_radius).max(0.0),
                outer_radius: num(raw.outer_radius).max(0.0),
            }),
        }
    }

    pub fn family(&self) -> ChartFamily {
        match self {
            ElementGeometry::Bar(_) => ChartFamily::Bar,
            ElementGeometry::Point(_) => ChartFamily::Point,
            ElementGeometry::Sector(_) => ChartFamily::Sector,
        }
    }

    pub fn as_sector(&self) -> Option<&Sector> {
        match self {
            ElementGeometry::Sector(s) => Some(s),
            _ => None,
        }
    }
}

/// One rendered chart element for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(flatten)]
    pub key: PointKey,
    pub geometry: ElementGeometry,
}

impl Element {
    pub fn new(key: PointKey, geometry: ElementGeometry) -> Self {
        Self { key, geometry }
    }
}

/// Sort elements into the stable `(dataset, point)` order used by every pass.
pub fn sort_elements(elements: &mut [Element]) {
    elements.sort_by_key(|e| e.key);
}

// ─── Feature toggles ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureToggles {
    pub show_images: bool,
    pub show_labels: bool,
    /// Master switch for `fillBar` / `fillSlice`.
    pub fill_area: bool,
    pub show_border: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            show_images: true,
            show_labels: true,
            fill_area: true,
            show_border: true,
        }
    }
}

// ─── Annotation configuration ───────────────────────────────────────────

/// What an element annotation shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Content {
    Image { url: String },
    Text { text: String },
}

impl Default for Content {
    fn default() -> Self {
        Content::Image { url: String::new() }
    }
}

impl Content {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Content::Image { url } => Some(url),
            Content::Text { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Content::Image { .. })
    }
}

/// Arrow-head styles for callout arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowHead {
    /// Two strokes forming a V.
    Open,
    /// Closed, filled triangle.
    #[default]
    Filled,
    /// A tick perpendicular to the shaft.
    Bar,
}

/// Where an elbowed callout arrow bends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ElbowBend {
    /// Absolute canvas coordinates.
    Absolute { x: f64, y: f64 },
    /// Fractions of the canvas width and height.
    Relative { fx: f64, fy: f64 },
    /// A radial segment of `length` pixels out from the arrow start.
    Radial { length: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrowStyle {
    pub line: bool,
    pub head: bool,
    pub head_style: ArrowHead,
    pub head_size: f64,
    pub color: String,
    pub width: f64,
    /// Pixels to leave between the arrow tip and its target.
    pub end_gap: f64,
    pub elbow: bool,
    /// Bend point; `None` means "radial for sectors, straight otherwise".
    pub bend: Option<ElbowBend>,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            line: true,
            head: true,
            head_style: ArrowHead::Filled,
            head_size: 8.0,
            color: "#333333".to_string(),
            width: 1.5,
            end_gap: 0.0,
            elbow: false,
            bend: None,
        }
    }
}

/// Shape drawn beneath a text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelBackground {
    #[default]
    None,
    Rectangle,
    Circle,
    Star,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub color: String,
    pub background: LabelBackground,
    pub background_color: String,
    pub padding: f64,
    pub border_width: f64,
    pub border_color: String,
    pub radius: f64,
    pub max_width: Option<f64>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            font_weight: 600,
            color: "#333333".to_string(),
            background: LabelBackground::None,
            background_color: "#ffffff".to_string(),
            padding: 4.0,
            border_width: 0.0,
            border_color: "#333333".to_string(),
            radius: 4.0,
            max_width: None,
        }
    }
}

impl LabelStyle {
    /// CSS font shorthand understood by Canvas2D.
    pub fn css_font(&self) -> String {
        format!("{} {}px {}", self.font_weight, self.font_size, self.font_family)
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }
}

/// Per-element annotation configuration. Read-only to the engine except
/// for `callout_x` / `callout_y`, which receive the computed callout default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationConfig {
    pub content: Content,
    pub shape: ShapeKind,
    pub anchor: Anchor,
    pub size: f64,
    pub border_width: f64,
    pub border_color: String,
    pub shadow: bool,
    pub fill_bar: bool,
    pub fill_slice: bool,
    pub image_fit: ImageFit,
    pub callout_offset: f64,
    pub callout_x: Option<f64>,
    pub callout_y: Option<f64>,
    pub arrow: ArrowStyle,
    pub label: LabelStyle,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            content: Content::default(),
            shape: ShapeKind::Circle,
            anchor: Anchor::Center,
            size: 30.0,
            border_width: 2.0,
            border_color: "#ffffff".to_string(),
            shadow: false,
            fill_bar: false,
            fill_slice: false,
            image_fit: ImageFit::Cover,
            callout_offset: crate::anchor::DEFAULT_CALLOUT_OFFSET,
            callout_x: None,
            callout_y: None,
            arrow: ArrowStyle::default(),
            label: LabelStyle::default(),
        }
    }
}

impl AnnotationConfig {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            content: Content::Image { url: url.into() },
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Content::Text { text: text.into() },
            ..Self::default()
        }
    }

    /// Previously persisted callout position, if both coordinates are set.
    pub fn persisted_callout(&self) -> Option<Point> {
        match (self.callout_x, self.callout_y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Write a callout position back into the config.
    pub fn persist_callout(&mut self, p: Point) {
        self.callout_x = Some(p.x);
        self.callout_y = Some(p.y);
    }

    /// Whether a fill mode applies to `geometry` under `toggles`.
    pub fn fills(&self, geometry: &ElementGeometry, toggles: &FeatureToggles) -> bool {
        if !toggles.fill_area || !self.content.is_image() {
            return false;
        }
        match geometry {
            ElementGeometry::Bar(_) => self.fill_bar,
            ElementGeometry::Sector(_) => self.fill_slice,
            ElementGeometry::Point(_) => false,
        }
    }
}

/// An annotation bound to one chart element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(flatten)]
    pub key: PointKey,
    #[serde(flatten)]
    pub config: AnnotationConfig,
}

impl Annotation {
    pub fn new(key: PointKey, config: AnnotationConfig) -> Self {
        Self { key, config }
    }
}
