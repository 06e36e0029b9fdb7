use super::{Canvas, ColorGenerator, Palette};

/// Fills `[x0, x1] × [y0, y1]` with `cell × cell` blocks of procedural color.
///
/// The rect is clamped to the canvas; cells on the right and bottom edge are
/// truncated. Each cell samples `colors` once at its top-left corner.
/// A reversed rect or `cell < 1` is ignored.
#[allow(clippy::too_many_arguments)]
pub fn paint_grid<C: Canvas + ?Sized>(
    canvas: &mut C,
    colors: &ColorGenerator,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    cell: i32,
    offset: (i32, i32),
    palette: Palette,
) {
    if x0 > x1 || y0 > y1 || cell < 1 {
        log::debug!("paint_grid: ignoring rect ({x0},{y0})-({x1},{y1}) with cell {cell}");
        return;
    }

    let (w, h) = canvas.size();
    let (w, h) = (w as i32, h as i32);
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(w - 1);
    let y1 = y1.min(h - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    let mut py = y0;
    while py <= y1 {
        let cy1 = py.saturating_add(cell - 1).min(y1);
        let mut px = x0;
        while px <= x1 {
            let cx1 = px.saturating_add(cell - 1).min(x1);
            let color = colors.color(px, py, offset.0, offset.1, palette);
            canvas.fill_rect(px, py, cx1, cy1, color);
            let Some(next) = px.checked_add(cell) else { break };
            px = next;
        }
        let Some(next) = py.checked_add(cell) else { break };
        py = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::upload::MemoryTexture;

    #[test]
    fn cells_are_uniform() {
        let mut tex = MemoryTexture::new(20, 20);
        let colors = ColorGenerator::new(3);
        paint_grid(&mut tex, &colors, 0, 0, 19, 19, 5, (0, 0), Palette::Grass);

        for cy in 0..4 {
            for cx in 0..4 {
                let expected = colors.color(cx * 5, cy * 5, 0, 0, Palette::Grass);
                for dy in 0..5 {
                    for dx in 0..5 {
                        assert_eq!(tex.pixel(cx * 5 + dx, cy * 5 + dy), Some(expected));
                    }
                }
            }
        }
    }

    #[test]
    fn clamps_to_canvas() {
        let mut tex = MemoryTexture::new(8, 8);
        let colors = ColorGenerator::default();
        paint_grid(&mut tex, &colors, -10, -10, 100, 100, 3, (0, 0), Palette::Full);
        assert!(tex.pixels().chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
    }

    #[test]
    fn invalid_input_is_noop() {
        let mut tex = MemoryTexture::new(8, 8);
        let colors = ColorGenerator::default();
        paint_grid(&mut tex, &colors, 5, 0, 1, 7, 2, (0, 0), Palette::Full);
        paint_grid(&mut tex, &colors, 0, 0, 7, 7, 0, (0, 0), Palette::Full);
        assert_eq!(tex.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn huge_cell_fills_once() {
        let mut tex = MemoryTexture::new(8, 8);
        let colors = ColorGenerator::default();
        paint_grid(&mut tex, &colors, 2, 2, 7, 7, i32::MAX, (0, 0), Palette::Full);
        assert_eq!(tex.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(tex.pixel(7, 7), Some(Color::WHITE));
        assert_eq!(tex.pixel(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn rect_at_coordinate_limit() {
        let mut tex = MemoryTexture::new(8, 8);
        let colors = ColorGenerator::default();
        paint_grid(&mut tex, &colors, i32::MIN, i32::MIN, i32::MAX, i32::MAX, 3, (0, 0), Palette::Full);
        assert!(tex.pixels().chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
    }
}
