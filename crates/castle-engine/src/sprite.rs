//! Decoded RGBA images drawn into layers.
//!
//! A sprite is written into any [`Canvas`] as one rect per source pixel, so
//! CPU layers, GPU recordings and in-memory textures all accept it. For
//! direct compositing the sprite can also be uploaded once as a texture
//! (see [`crate::render::Compositor::draw_sprite`]).

use std::path::Path;

use crate::error::{RenderError, RenderResult};
use crate::paint::{Canvas, Color};
use crate::render::{RenderCtx, LAYER_FORMAT};

/// Horizontal strip animation window.
///
/// With `step_px > 0` the sprite is treated as frames `step_px` wide laid out
/// left to right; `index` selects one and wraps around the image width.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SpriteFrame {
    pub step_px: u32,
    pub index: u32,
}

impl SpriteFrame {
    /// Draws the whole image.
    pub const WHOLE: SpriteFrame = SpriteFrame { step_px: 0, index: 0 };

    pub const fn strip(step_px: u32, index: u32) -> Self {
        Self { step_px, index }
    }
}

struct SpriteTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Straight-alpha RGBA8 image, row 0 at the top.
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    texture: Option<SpriteTexture>,
}

impl Sprite {
    /// Decodes an image file (PNG, JPEG or BMP) into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| RenderError::ImageDecode {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        let (width, height) = image.dimensions();
        log::debug!("loaded sprite {} ({width}x{height})", path.display());
        Self::from_rgba(width, height, image.into_raw())
    }

    /// Wraps tightly packed RGBA8 rows.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSprite(format!("empty image {width}x{height}")));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::InvalidSprite(format!(
                "{width}x{height} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            texture: None,
        })
    }

    /// Reads image dimensions without decoding pixels.
    pub fn probe_size(path: impl AsRef<Path>) -> RenderResult<(u32, u32)> {
        let path = path.as_ref();
        image::image_dimensions(path).map_err(|source| RenderError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(at..at + 4)?;
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    /// Source columns `(offset, width)` covered by `frame`.
    pub fn frame_window(&self, frame: SpriteFrame) -> Option<(u32, u32)> {
        if frame.step_px == 0 {
            return Some((0, self.width));
        }
        let offset = (frame.step_px as u64 * frame.index as u64 % self.width as u64) as u32;
        let width = frame.step_px.min(self.width).min(self.width - offset);
        (width > 0).then_some((offset, width))
    }

    /// Writes the sprite with its top-left corner at `(x, y)`.
    ///
    /// Each source pixel becomes a `scale × scale` rect, color-multiplied by
    /// `modifier` (`c * m / 255` per channel). Transparent source pixels are
    /// written too, replacing what the canvas held.
    pub fn draw_to<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        x: i32,
        y: i32,
        scale: u32,
        modifier: Color,
        frame: SpriteFrame,
    ) {
        if scale == 0 {
            log::debug!("sprite draw with scale 0; ignored");
            return;
        }
        let Some((offset, frame_width)) = self.frame_window(frame) else {
            log::debug!("sprite frame {frame:?} is empty; ignored");
            return;
        };

        // Cell corners are placed in i64; anything past the canvas is skipped.
        let (cw, ch) = canvas.size();
        let s = i64::from(scale);
        for sy in 0..self.height {
            let y0 = i64::from(y) + i64::from(sy) * s;
            if y0 >= i64::from(ch) {
                break;
            }
            if y0 + s <= 0 {
                continue;
            }
            for sx in 0..frame_width {
                let x0 = i64::from(x) + i64::from(sx) * s;
                if x0 >= i64::from(cw) {
                    break;
                }
                if x0 + s <= 0 {
                    continue;
                }
                let Some(color) = self.pixel(offset + sx, sy) else { continue };
                canvas.fill_rect(
                    saturate_i32(x0),
                    saturate_i32(y0),
                    saturate_i32(x0 + s - 1),
                    saturate_i32(y0 + s - 1),
                    color.modulate(modifier),
                );
            }
        }
    }

    /// Creates the GPU copy of the sprite on first call.
    pub fn ensure_uploaded(&mut self, ctx: &RenderCtx<'_>) -> &wgpu::TextureView {
        let (width, height) = (self.width, self.height);
        let pixels = &self.pixels;
        let uploaded = self.texture.get_or_insert_with(|| {
            let size = wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            };
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("castle sprite"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: LAYER_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * 4),
                    rows_per_image: Some(height),
                },
                size,
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            SpriteTexture { texture, view }
        });
        &uploaded.view
    }

    /// GPU view, once [`Sprite::ensure_uploaded`] has run.
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.texture.as_ref().map(|t| &t.view)
    }

    /// Frees the GPU copy; the next [`Sprite::ensure_uploaded`] recreates it.
    pub fn release_texture(&mut self) {
        if let Some(t) = self.texture.take() {
            t.texture.destroy();
        }
    }
}

impl std::fmt::Debug for Sprite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sprite")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("uploaded", &self.texture.is_some())
            .finish()
    }
}

#[inline]
fn saturate_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::MemoryTexture;

    const R: [u8; 4] = [255, 0, 0, 255];
    const G: [u8; 4] = [0, 255, 0, 255];
    const B: [u8; 4] = [0, 0, 255, 255];
    const T: [u8; 4] = [0, 0, 0, 0];

    /// 3×2 sprite: top row R G B, bottom row T R G.
    fn sprite() -> Sprite {
        let px = [R, G, B, T, R, G].concat();
        Sprite::from_rgba(3, 2, px).unwrap()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn rejects_wrong_length() {
        let err = Sprite::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidSprite(_)));
    }

    #[test]
    fn rejects_empty() {
        assert!(Sprite::from_rgba(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = Sprite::load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, RenderError::ImageDecode { .. }));
        assert!(Sprite::probe_size("/definitely/not/here.png").is_err());
    }

    #[test]
    fn pixels_are_top_down() {
        let s = sprite();
        assert_eq!(s.pixel(0, 0), Some(Color::rgb(255, 0, 0)));
        assert_eq!(s.pixel(0, 1), Some(Color::TRANSPARENT));
        assert_eq!(s.pixel(3, 0), None);
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn whole_frame() {
        assert_eq!(sprite().frame_window(SpriteFrame::WHOLE), Some((0, 3)));
    }

    #[test]
    fn strip_frames_wrap() {
        let s = sprite();
        assert_eq!(s.frame_window(SpriteFrame::strip(1, 0)), Some((0, 1)));
        assert_eq!(s.frame_window(SpriteFrame::strip(1, 2)), Some((2, 1)));
        assert_eq!(s.frame_window(SpriteFrame::strip(1, 4)), Some((1, 1)));
    }

    #[test]
    fn strip_frame_is_clamped_to_image() {
        let s = sprite();
        assert_eq!(s.frame_window(SpriteFrame::strip(2, 1)), Some((2, 1)));
        assert_eq!(s.frame_window(SpriteFrame::strip(10, 0)), Some((0, 3)));
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn draws_scaled_pixels() {
        let mut tex = MemoryTexture::new(8, 8);
        sprite().draw_to(&mut tex, 1, 1, 2, Color::WHITE, SpriteFrame::WHOLE);
        assert_eq!(tex.pixel(1, 1), Some(Color::rgb(255, 0, 0)));
        assert_eq!(tex.pixel(2, 2), Some(Color::rgb(255, 0, 0)));
        assert_eq!(tex.pixel(3, 1), Some(Color::rgb(0, 255, 0)));
        assert_eq!(tex.pixel(6, 4), Some(Color::rgb(0, 255, 0)));
    }

    #[test]
    fn transparent_pixels_overwrite() {
        let mut tex = MemoryTexture::new(3, 2);
        tex.fill_rect(0, 0, 2, 1, Color::WHITE);
        sprite().draw_to(&mut tex, 0, 0, 1, Color::WHITE, SpriteFrame::WHOLE);
        assert_eq!(tex.pixel(0, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn modifier_scales_channels() {
        let mut tex = MemoryTexture::new(1, 1);
        let s = Sprite::from_rgba(1, 1, vec![200, 100, 50, 255]).unwrap();
        s.draw_to(&mut tex, 0, 0, 1, Color::rgba(128, 255, 0, 255), SpriteFrame::WHOLE);
        assert_eq!(tex.pixel(0, 0), Some(Color::rgba(100, 100, 0, 255)));
    }

    #[test]
    fn frame_selects_columns() {
        let mut tex = MemoryTexture::new(4, 4);
        sprite().draw_to(&mut tex, 0, 0, 1, Color::WHITE, SpriteFrame::strip(1, 2));
        assert_eq!(tex.pixel(0, 0), Some(Color::rgb(0, 0, 255)));
        assert_eq!(tex.pixel(0, 1), Some(Color::rgb(0, 255, 0)));
        assert_eq!(tex.pixel(1, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn zero_scale_is_ignored() {
        let mut tex = MemoryTexture::new(4, 4);
        tex.fill_rect(0, 0, 3, 3, Color::WHITE);
        sprite().draw_to(&mut tex, 0, 0, 0, Color::WHITE, SpriteFrame::WHOLE);
        assert_eq!(tex.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn offscreen_parts_are_clipped() {
        let mut tex = MemoryTexture::new(2, 2);
        sprite().draw_to(&mut tex, -1, -1, 1, Color::WHITE, SpriteFrame::WHOLE);
        // Source (1,1) lands on (0,0).
        assert_eq!(tex.pixel(0, 0), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn far_offscreen_draw_is_dropped() {
        let mut tex = MemoryTexture::new(8, 8);
        sprite().draw_to(&mut tex, i32::MAX - 1, 0, 4, Color::WHITE, SpriteFrame::WHOLE);
        sprite().draw_to(&mut tex, 0, i32::MIN, 4, Color::WHITE, SpriteFrame::WHOLE);
        assert!(tex.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn partially_offscreen_draw_is_clipped() {
        let mut tex = MemoryTexture::new(4, 4);
        sprite().draw_to(&mut tex, -2, 0, 2, Color::WHITE, SpriteFrame::WHOLE);
        assert_eq!(tex.pixel(0, 0), Some(Color::rgb(0, 255, 0)));
        assert_eq!(tex.pixel(2, 1), Some(Color::rgb(0, 0, 255)));
        assert_eq!(tex.pixel(0, 2), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn huge_scale_covers_canvas() {
        let mut tex = MemoryTexture::new(4, 4);
        sprite().draw_to(&mut tex, 0, 0, u32::MAX, Color::WHITE, SpriteFrame::WHOLE);
        assert!(tex.pixels().chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
    }
}
