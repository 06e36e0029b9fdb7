use crate::paint::{Canvas, Color};

use super::{FontId, FontSystem};

/// Pen position of one glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct PlacedChar {
    pub ch: char,
    pub x: f32,
    pub baseline: f32,
}

/// Places `text` starting at `(x, y)`.
///
/// `'\n'` moves the baseline down by `line_height` and returns the pen to `x`.
pub(crate) fn place_chars(
    text: &str,
    x: f32,
    y: f32,
    line_height: f32,
    mut advance: impl FnMut(char) -> f32,
) -> Vec<PlacedChar> {
    let mut out = Vec::with_capacity(text.len());
    let (mut pen, mut baseline) = (x, y);
    for ch in text.chars() {
        if ch == '\n' {
            baseline += line_height;
            pen = x;
            continue;
        }
        out.push(PlacedChar { ch, x: pen, baseline });
        pen += advance(ch);
    }
    out
}

/// Width of the first line of `text`.
pub(crate) fn line_width(text: &str, mut advance: impl FnMut(char) -> f32) -> f32 {
    text.chars().take_while(|&c| c != '\n').map(&mut advance).sum()
}

/// Font, pixel size and color of a text draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub font: FontId,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(font: FontId, size: f32, color: Color) -> Self {
        Self { font, size, color }
    }
}

/// Writes `text` into `canvas` with the pen starting at `(x, y)` on the baseline.
///
/// Glyph coverage scales the alpha of the style color; uncovered pixels are
/// left untouched. Lines advance by the font size. Unknown fonts draw nothing.
pub fn draw_text<C: Canvas + ?Sized>(
    canvas: &mut C,
    fonts: &FontSystem,
    style: TextStyle,
    text: &str,
    x: i32,
    y: i32,
) {
    let TextStyle { font, size, color } = style;
    let Some(face) = fonts.get(font) else {
        log::debug!("draw_text: unknown font {font:?}");
        return;
    };

    let placed = place_chars(text, x as f32, y as f32, size, |c| {
        face.metrics(c, size).advance_width
    });

    for p in placed {
        let (m, coverage) = face.rasterize(p.ch, size);
        if m.width == 0 || m.height == 0 {
            continue;
        }
        let gx = (p.x.round() as i32).saturating_add(m.xmin);
        let gy = (p.baseline.round() as i32).saturating_sub(m.ymin.saturating_add(m.height as i32));

        for (row, line) in coverage.chunks_exact(m.width).enumerate() {
            for (col, &c) in line.iter().enumerate() {
                if c == 0 {
                    continue;
                }
                let a = (color.a as u32 * c as u32 / 255) as u8;
                canvas.put_pixel(
                    gx.saturating_add(col as i32),
                    gy.saturating_add(row as i32),
                    Color::rgba(color.r, color.g, color.b, a),
                );
            }
        }
    }
}

/// Advance width of the first line of `text`, in pixels.
pub fn text_width(fonts: &FontSystem, font: FontId, size: f32, text: &str) -> f32 {
    let Some(face) = fonts.get(font) else {
        return 0.0;
    };
    line_width(text, |c| face.metrics(c, size).advance_width)
}
