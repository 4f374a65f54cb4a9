//! The drawing surface abstraction.
//!
//! A deliberately small, Canvas2D-shaped API. The browser bridge implements
//! it over `CanvasRenderingContext2d`; tests use [`RecordingSurface`]
//! (`crate::record`) to assert on the emitted operations.
//!
//! [`RecordingSurface`]: crate::record::RecordingSurface

use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Alphabetic,
}

impl TextBaseline {
    pub fn as_str(self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Alphabetic => "alphabetic",
        }
    }
}

/// Drop shadow parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    pub offset: Vec2,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: "rgba(0, 0, 0, 0.35)".to_string(),
            blur: 6.0,
            offset: Vec2::new(0.0, 2.0),
        }
    }
}

/// Immediate-mode 2D drawing target.
///
/// Path construction follows Canvas2D: `begin_path`, segments, then
/// `fill`/`stroke`/`clip` consume the current path. State (`save`/`restore`)
/// covers transform, clip, alpha, styles and shadow.
pub trait DrawingSurface {
    /// Decoded image handle accepted by [`draw_image`](Self::draw_image).
    type Image;

    /// Surface size in CSS pixels.
    fn size(&self) -> Size;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, by: Vec2);
    /// Clockwise rotation in radians.
    fn rotate(&mut self, radians: f64);
    fn set_global_alpha(&mut self, alpha: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    /// Circular arc; angles in radians, clockwise unless `anticlockwise`.
    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, anticlockwise: bool);
    fn rect(&mut self, rect: Rect);
    fn close_path(&mut self);

    fn fill(&mut self);
    fn stroke(&mut self);
    fn clip(&mut self);

    fn set_fill_color(&mut self, color: &str);
    fn set_stroke_color(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    /// Empty slice resets to a solid line.
    fn set_line_dash(&mut self, segments: &[f64]);
    fn set_shadow(&mut self, shadow: &Shadow);
    fn clear_shadow(&mut self);

    fn set_font(&mut self, css_font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn fill_text(&mut self, text: &str, at: Point);
    /// Advance width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;

    /// Draw the `src` crop of `image` (image pixels) into `dest` (canvas pixels).
    fn draw_image(&mut self, image: &Self::Image, src: Rect, dest: Rect);
}

// ─── Image lookup ───────────────────────────────────────────────────────

/// A decoded image and its natural size.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage<I> {
    pub image: I,
    pub natural: Size,
}

/// Read-only view of decoded images, keyed by URL.
pub trait ImageProvider<I> {
    fn loaded(&self, url: &str) -> Option<&LoadedImage<I>>;
}

impl<I> ImageProvider<I> for HashMap<String, LoadedImage<I>> {
    fn loaded(&self, url: &str) -> Option<&LoadedImage<I>> {
        self.get(url)
    }
}

/// Provider that never has any image. Useful for text-only passes.
pub struct NoImages;

impl<I> ImageProvider<I> for NoImages {
    fn loaded(&self, _url: &str) -> Option<&LoadedImage<I>> {
        None
    }
}
