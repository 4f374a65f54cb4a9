//! Text labels: word wrapping, background shapes and overlay text boxes.

use crate::shape::{circle_path, rounded_rect_path, star_path};
use crate::surface::{DrawingSurface, TextAlign, TextBaseline};
use cm_core::{LabelBackground, LabelStyle, TextStyle};
use kurbo::{Point, Rect, Size};

/// Tips of the star background.
pub const STAR_POINTS: usize = 5;
/// Inner radius of the star background relative to its outer radius.
pub const STAR_INNER_RATIO: f64 = 0.5;

/// Greedy word wrap. Explicit newlines always break; a single word wider
/// than `max_width` gets a line of its own.
pub fn wrap_lines<S: DrawingSurface>(s: &mut S, text: &str, max_width: Option<f64>) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let Some(limit) = max_width.filter(|w| *w > 0.0) else {
            lines.push(paragraph.to_string());
            continue;
        };
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if s.measure_text(&candidate) <= limit {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }
    lines
}

/// Measured label, centered on its anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub lines: Vec<String>,
    /// Background box including padding.
    pub frame: Rect,
    pub line_height: f64,
}

/// Lay out `text` centered on `at`. Sets the label font on the surface.
pub fn layout_label<S: DrawingSurface>(s: &mut S, text: &str, at: Point, style: &LabelStyle) -> LabelLayout {
    s.set_font(&style.css_font());
    let lines = wrap_lines(s, text, style.max_width);
    let widest = lines.iter().map(|l| s.measure_text(l)).fold(0.0, f64::max);
    let line_height = style.line_height();
    let size = Size::new(
        widest + 2.0 * style.padding,
        line_height * lines.len() as f64 + 2.0 * style.padding,
    );
    LabelLayout {
        lines,
        frame: Rect::from_center_size(at, size),
        line_height,
    }
}

/// Background shape, then centered text lines.
pub fn draw_label<S: DrawingSurface>(s: &mut S, text: &str, at: Point, style: &LabelStyle) -> LabelLayout {
    s.save();
    let layout = layout_label(s, text, at, style);
    let f = layout.frame;

    let has_path = match style.background {
        LabelBackground::None => false,
        LabelBackground::Rectangle => {
            rounded_rect_path(s, f, style.radius);
            true
        }
        LabelBackground::Circle => {
            circle_path(s, f.center(), f.width().max(f.height()) / 2.0);
            true
        }
        LabelBackground::Star => {
            let outer = f.width().max(f.height()) / 2.0 / STAR_INNER_RATIO;
            star_path(s, f.center(), outer, outer * STAR_INNER_RATIO, STAR_POINTS);
            true
        }
    };
    if has_path {
        s.set_fill_color(&style.background_color);
        s.fill();
        if style.border_width > 0.0 {
            s.set_stroke_color(&style.border_color);
            s.set_line_width(style.border_width);
            s.stroke();
        }
    }

    s.set_fill_color(&style.color);
    s.set_text_align(TextAlign::Center);
    s.set_text_baseline(TextBaseline::Middle);
    let top = f.y0 + style.padding;
    for (i, line) in layout.lines.iter().enumerate() {
        let y = top + layout.line_height * (i as f64 + 0.5);
        s.fill_text(line, Point::new(at.x, y));
    }
    s.restore();
    layout
}

/// Text box of a free-floating overlay, in the overlay's unrotated frame:
/// optional background over the whole frame, lines from the top-left.
pub fn draw_text_box<S: DrawingSurface>(s: &mut S, frame: Rect, style: &TextStyle) {
    s.save();
    if let Some(bg) = &style.background {
        s.begin_path();
        s.rect(frame);
        s.set_fill_color(bg);
        s.fill();
    }
    s.set_font(&style.css_font());
    let wrap = style
        .max_width
        .unwrap_or(frame.width() - 2.0 * style.padding);
    let lines = wrap_lines(s, &style.text, Some(wrap));
    s.set_fill_color(&style.color);
    s.set_text_align(TextAlign::Left);
    s.set_text_baseline(TextBaseline::Top);
    let line_height = style.line_height();
    for (i, line) in lines.iter().enumerate() {
        let at = Point::new(
            frame.x0 + style.padding,
            frame.y0 + style.padding + line_height * i as f64,
        );
        s.fill_text(line, at);
    }
    s.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DrawOp, RecordingSurface};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn wraps_on_width_and_newlines() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        // 6px per char: "alpha beta" = 60px
        let lines = wrap_lines(&mut s, "alpha beta gamma\ndelta", Some(60.0));
        assert_eq!(lines, vec!["alpha beta", "gamma", "delta"]);
    }

    #[test]
    fn unbounded_width_keeps_paragraphs() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        assert_eq!(wrap_lines(&mut s, "one two", None), vec!["one two"]);
    }

    #[test]
    fn label_box_includes_padding() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        let style = LabelStyle {
            padding: 5.0,
            font_size: 10.0,
            ..LabelStyle::default()
        };
        let l = layout_label(&mut s, "abcd", Point::new(50.0, 50.0), &style);
        assert_eq!(l.frame.width(), 34.0);
        assert_eq!(l.frame.height(), 22.0);
        assert_eq!(l.frame.center(), Point::new(50.0, 50.0));
    }

    #[test]
    fn background_drawn_beneath_text() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        let style = LabelStyle {
            background: LabelBackground::Star,
            ..LabelStyle::default()
        };
        draw_label(&mut s, "hi", Point::new(10.0, 10.0), &style);
        let fill = s.ops.iter().position(|op| matches!(op, DrawOp::Fill { .. }));
        let text = s.ops.iter().position(|op| matches!(op, DrawOp::Text { .. }));
        assert!(fill < text, "background must precede text");
        assert!(s.is_balanced());
    }

    proptest! {
        #[test]
        fn wrapping_keeps_every_word_and_respects_the_limit(
            words in prop::collection::vec("[a-z]{1,12}", 1..20),
            limit in 12.0f64..200.0,
        ) {
            let mut s = RecordingSurface::new(400.0, 400.0);
            let text = words.join(" ");
            let lines = wrap_lines(&mut s, &text, Some(limit));
            let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
            prop_assert_eq!(rejoined, words.iter().map(String::as_str).collect::<Vec<_>>());
            for line in &lines {
                let single_word = !line.contains(' ');
                prop_assert!(single_word || s.measure_text(line) <= limit);
            }
        }
    }
}
