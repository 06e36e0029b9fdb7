use crate::chunk::Region;
use crate::coords::PixelRect;
use crate::paint::{Canvas, Color};

use super::TextureSink;

/// CPU-side RGBA8 image that accepts chunk uploads.
///
/// Stands in for a GPU texture in headless runs: snapshots, software
/// compositing and tests. Both upload paths write the same bytes; only the
/// transfer capacity decides which one the uploader picks.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTexture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    transfer_capacity: u64,
}

impl MemoryTexture {
    /// Transparent `width × height` image that stages every chunk.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            transfer_capacity: u64::MAX,
        }
    }

    pub fn with_transfer_capacity(mut self, bytes: u64) -> Self {
        self.transfer_capacity = bytes;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes, no row padding.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let at = self.offset(x, y)?;
        let p = &self.pixels[at..at + 4];
        Some(Color::rgba(p[0], p[1], p[2], p[3]))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(at) = self.offset(x, y) {
            self.pixels[at..at + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Copies a tightly packed RGBA block into `region`, clipping at the edges.
    pub fn blit(&mut self, region: Region, rgba: &[u8]) {
        let src_stride = region.width as usize * 4;
        let Some(dst) = region.rect().clamp_to(self.width, self.height) else {
            return;
        };
        let span = dst.width() as usize * 4;
        let src_x = (dst.x0 - region.x as i32) as usize * 4;

        for y in dst.y0..dst.y1 {
            let src_row = (y - region.y as i32) as usize * src_stride + src_x;
            let Some(src) = rgba.get(src_row..src_row + span) else {
                return;
            };
            let dst_row = (y as usize * self.width as usize + dst.x0 as usize) * 4;
            self.pixels[dst_row..dst_row + span].copy_from_slice(src);
        }
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let bounds = PixelRect::from_size(0, 0, self.width, self.height);
        bounds
            .contains(x, y)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }
}

impl TextureSink for MemoryTexture {
    fn transfer_capacity(&self) -> u64 {
        self.transfer_capacity
    }

    fn write_staged(&mut self, _slot: usize, region: Region, rgba: &[u8]) {
        self.blit(region, rgba);
    }

    fn write_direct(&mut self, region: Region, rgba: &[u8]) {
        self.blit(region, rgba);
    }
}

impl Canvas for MemoryTexture {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.set_pixel(x, y, color);
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let Some(r) = PixelRect::from_corners(x0, y0, x1, y1).clamp_to(self.width, self.height)
        else {
            return;
        };
        let bytes = color.to_bytes();
        for y in r.y0..r.y1 {
            let row = (y as usize * self.width as usize + r.x0 as usize) * 4;
            let span = &mut self.pixels[row..row + r.width() as usize * 4];
            for px in span.chunks_exact_mut(4) {
                px.copy_from_slice(&bytes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkGrid;
    use crate::upload::sync_chunks;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn round_trip_center_rect() {
        // 540x540 with chunk 270: pixel 270 starts the second chunk on both
        // axes, so a 3x3 rect centered on (270, 270) straddles all four chunks.
        let mut grid = ChunkGrid::new(540, 540, 270).unwrap();
        grid.write_rect(269, 269, 271, 271, RED);
        assert_eq!(grid.dirty_count(), 4);

        let mut tex = MemoryTexture::new(540, 540);
        let report = sync_chunks(&mut grid, 512, &mut tex);
        assert_eq!(report.uploaded, 4);
        assert!(report.is_complete());
        assert!(!grid.has_dirty());

        for y in 0..540 {
            for x in 0..540 {
                let expected = if (269..=271).contains(&x) && (269..=271).contains(&y) {
                    RED
                } else {
                    Color::TRANSPARENT
                };
                assert_eq!(tex.pixel(x, y), Some(expected), "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn only_touched_chunks_upload() {
        let mut grid = ChunkGrid::new(540, 540, 270).unwrap();
        let mut tex = MemoryTexture::new(540, 540);
        grid.clear(RED);
        sync_chunks(&mut grid, 512, &mut tex);

        grid.write_pixel(10, 10, Color::WHITE);
        // Scribble on the texture; a correct sync must not touch this pixel.
        tex.set_pixel(500, 500, Color::BLACK);
        let report = sync_chunks(&mut grid, 512, &mut tex);
        assert_eq!(report.uploaded, 1);
        assert_eq!(tex.pixel(10, 10), Some(Color::WHITE));
        assert_eq!(tex.pixel(500, 500), Some(Color::BLACK));
    }

    #[test]
    fn direct_and_staged_paths_agree() {
        let mut a = ChunkGrid::new(50, 30, 16).unwrap();
        a.write_rect(3, 4, 40, 22, RED);
        a.write_pixel(49, 29, Color::WHITE);
        let mut b = a.clone();

        let mut staged = MemoryTexture::new(50, 30);
        let mut direct = MemoryTexture::new(50, 30).with_transfer_capacity(0);
        let rs = sync_chunks(&mut a, 64, &mut staged);
        let rd = sync_chunks(&mut b, 64, &mut direct);
        assert_eq!(rs.direct, 0);
        assert_eq!(rd.staged, 0);
        assert_eq!(staged.pixels(), direct.pixels());
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut tex = MemoryTexture::new(4, 4);
        let block = [255u8; 3 * 3 * 4];
        tex.blit(Region { x: 2, y: 2, width: 3, height: 3 }, &block);
        assert_eq!(tex.pixel(3, 3), Some(Color::WHITE));
        assert_eq!(tex.pixel(1, 1), Some(Color::TRANSPARENT));
    }
}
