//! A surface that records draw operations instead of rasterizing.

use crate::surface::{DrawingSurface, Shadow, TextAlign, TextBaseline};
use kurbo::{Point, Rect, Size, Vec2};

/// One recorded operation. Fill and stroke capture the style in effect.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f64),
    Alpha(f64),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    },
    Rect(Rect),
    ClosePath,
    Fill { color: String },
    Stroke { color: String, width: f64 },
    Clip,
    LineDash(Vec<f64>),
    Shadow(Shadow),
    ClearShadow,
    Font(String),
    Text { text: String, at: Point, align: TextAlign },
    Image { image: String, src: Rect, dest: Rect },
}

/// Records every call. Images are plain names; text is measured at a fixed
/// `char_width` per character.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    pub char_width: f64,
    size: Size,
    fill_color: String,
    stroke_color: String,
    line_width: f64,
    align: TextAlign,
    depth: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            ops: Vec::new(),
            char_width: 6.0,
            size: Size::new(width, height),
            fill_color: "#000000".to_string(),
            stroke_color: "#000000".to_string(),
            line_width: 1.0,
            align: TextAlign::Left,
            depth: 0,
        }
    }

    /// Every `draw_image` call as `(image, src, dest)`.
    pub fn images(&self) -> Vec<(&str, Rect, Rect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { image, src, dest } => Some((image.as_str(), *src, *dest)),
                _ => None,
            })
            .collect()
    }

    /// Every `fill_text` call.
    pub fn texts(&self) -> Vec<(&str, Point)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, at, .. } => Some((text.as_str(), *at)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// `true` when every `save` has a matching `restore`.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }
}

impl DrawingSurface for RecordingSurface {
    type Image = String;

    fn size(&self) -> Size {
        self.size
    }

    fn save(&mut self) {
        self.depth += 1;
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, by: Vec2) {
        self.ops.push(DrawOp::Translate(by));
    }

    fn rotate(&mut self, radians: f64) {
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::Alpha(alpha));
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.ops.push(DrawOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(DrawOp::LineTo(p));
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        self.ops.push(DrawOp::Arc {
            center,
            radius,
            start,
            end,
            anticlockwise,
        });
    }

    fn rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Rect(rect));
    }

    fn close_path(&mut self) {
        self.ops.push(DrawOp::ClosePath);
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill {
            color: self.fill_color.clone(),
        });
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke {
            color: self.stroke_color.clone(),
            width: self.line_width,
        });
    }

    fn clip(&mut self) {
        self.ops.push(DrawOp::Clip);
    }

    fn set_fill_color(&mut self, color: &str) {
        self.fill_color = color.to_string();
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.stroke_color = color.to_string();
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.ops.push(DrawOp::LineDash(segments.to_vec()));
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        self.ops.push(DrawOp::Shadow(shadow.clone()));
    }

    fn clear_shadow(&mut self) {
        self.ops.push(DrawOp::ClearShadow);
    }

    fn set_font(&mut self, css_font: &str) {
        self.ops.push(DrawOp::Font(css_font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    fn set_text_baseline(&mut self, _baseline: TextBaseline) {}

    fn fill_text(&mut self, text: &str, at: Point) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            align: self.align,
        });
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    fn draw_image(&mut self, image: &String, src: Rect, dest: Rect) {
        self.ops.push(DrawOp::Image {
            image: image.clone(),
            src,
            dest,
        });
    }
}
