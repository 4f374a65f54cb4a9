//! Canvas2D drawing surface.
//!
//! Forwards every `DrawingSurface` call to an HTML `<canvas>` through
//! `CanvasRenderingContext2d`. Fallible context calls only fail on invalid
//! arguments (negative radii, non-finite numbers), which draw nothing.

use cm_render::{DrawingSurface, Shadow, TextAlign, TextBaseline};
use kurbo::{Point, Rect, Size, Vec2};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    size: Size,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self {
            ctx,
            size: Size::new(width, height),
        }
    }
}

impl DrawingSurface for CanvasSurface<'_> {
    type Image = HtmlImageElement;

    fn size(&self) -> Size {
        self.size
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, by: Vec2) {
        let _ = self.ctx.translate(by.x, by.y);
    }

    fn rotate(&mut self, radians: f64) {
        let _ = self.ctx.rotate(radians);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, p: Point) {
        self.ctx.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        self.ctx.line_to(p.x, p.y);
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        let _ = self
            .ctx
            .arc_with_anticlockwise(center.x, center.y, radius, start, end, anticlockwise);
    }

    fn rect(&mut self, r: Rect) {
        self.ctx.rect(r.x0, r.y0, r.width(), r.height());
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn clip(&mut self) {
        self.ctx.clip();
    }

    fn set_fill_color(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        let dash: js_sys::Array = segments.iter().map(|s| JsValue::from_f64(*s)).collect();
        let _ = self.ctx.set_line_dash(&dash);
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        self.ctx.set_shadow_color(&shadow.color);
        self.ctx.set_shadow_blur(shadow.blur);
        self.ctx.set_shadow_offset_x(shadow.offset.x);
        self.ctx.set_shadow_offset_y(shadow.offset.y);
    }

    fn clear_shadow(&mut self) {
        self.ctx.set_shadow_color("transparent");
        self.ctx.set_shadow_blur(0.0);
        self.ctx.set_shadow_offset_x(0.0);
        self.ctx.set_shadow_offset_y(0.0);
    }

    fn set_font(&mut self, css_font: &str) {
        self.ctx.set_font(css_font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ctx.set_text_align(align.as_str());
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.ctx.set_text_baseline(baseline.as_str());
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
    }

    fn draw_image(&mut self, image: &HtmlImageElement, src: Rect, dest: Rect) {
        let _ = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                src.x0,
                src.y0,
                src.width(),
                src.height(),
                dest.x0,
                dest.y0,
                dest.width(),
                dest.height(),
            );
    }
}
