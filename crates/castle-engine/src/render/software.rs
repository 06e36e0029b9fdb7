//! CPU compositing of chunk-backed layers.
//!
//! Produces the image the GPU compositor would for the same CPU layers,
//! using [`blend_over`]. Shaders are not evaluated here: every layer is
//! blended from its live pixels.

use crate::layer::Layer;
use crate::paint::Color;
use crate::upload::MemoryTexture;

use super::blend::blend_over;
use super::compositor::Compositor;

/// Blends `layers` in order over `out`. Returns the number of layers drawn.
///
/// GPU layers have no CPU pixels and are skipped.
pub fn composite(layers: &[&Layer], out: &mut MemoryTexture) -> usize {
    let mut drawn = 0;
    for item in Compositor::plan(layers) {
        let layer = layers[item.index];
        let Some(grid) = layer.grid() else {
            log::debug!("software composite: `{}` has no CPU pixels; skipped", layer.name());
            continue;
        };
        let Some(rect) = item.rect.clamp_to(out.width(), out.height()) else {
            continue;
        };

        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                let Some(src) = grid.pixel(x, y) else { continue };
                if src.a == 0 {
                    continue;
                }
                let dst = out.pixel(x, y).unwrap_or(Color::TRANSPARENT);
                out.set_pixel(x, y, blend_over(dst, src));
            }
        }
        drawn += 1;
    }
    drawn
}
