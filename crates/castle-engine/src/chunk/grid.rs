use crate::config::DEFAULT_CHUNK_SIZE;
use crate::coords::PixelRect;
use crate::error::{RenderError, RenderResult};
use crate::paint::{Canvas, Color};

/// Pixel region of a chunk within its layer, in unsigned texel coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    #[inline]
    pub fn rect(self) -> PixelRect {
        PixelRect::from_size(self.x as i32, self.y as i32, self.width, self.height)
    }

    /// Tightly packed RGBA byte size.
    #[inline]
    pub fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// One tile of a CPU layer.
///
/// The pixels live in the owning grid's arena at `offset..offset + byte_len`.
#[derive(Debug, Clone)]
pub struct Chunk {
    region: Region,
    offset: usize,
    dirty: bool,
    visible: bool,
}

impl Chunk {
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    fn bytes(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.region.byte_len()
    }
}

/// Chunked RGBA pixel store backing a CPU layer.
///
/// The canvas is tiled row-major into square chunks; the last row and column
/// are truncated to the canvas edge. Chunks are stored flat (`row * cols + col`)
/// and share a single zero-initialized arena, so a new grid is fully
/// transparent and clean.
///
/// `has_dirty` is a fast-path flag: while it is `false` no chunk is dirty.
/// It may stay `true` after every chunk is clean again, until the next
/// complete upload scan settles it.
#[derive(Debug, Clone)]
pub struct ChunkGrid {
    width: u32,
    height: u32,
    chunk_size: u32,
    cols: u32,
    rows: u32,
    chunks: Vec<Chunk>,
    pixels: Vec<u8>,
    has_dirty: bool,
}

impl ChunkGrid {
    /// Allocates a transparent `width × height` grid.
    ///
    /// A zero `chunk_size` falls back to the default edge length.
    pub fn new(width: u32, height: u32, chunk_size: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidCanvas { width, height });
        }

        let chunk_size = if chunk_size == 0 {
            log::debug!("chunk size 0 requested; using {DEFAULT_CHUNK_SIZE}");
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };

        let cols = width.div_ceil(chunk_size);
        let rows = height.div_ceil(chunk_size);

        let mut chunks = Vec::with_capacity(table_index(cols, rows, 0));
        let mut offset = 0usize;
        for row in 0..rows {
            for col in 0..cols {
                let x = col * chunk_size;
                let y = row * chunk_size;
                let region = Region {
                    x,
                    y,
                    width: chunk_size.min(width - x),
                    height: chunk_size.min(height - y),
                };
                chunks.push(Chunk {
                    region,
                    offset,
                    dirty: false,
                    visible: true,
                });
                offset += region.byte_len();
            }
        }

        Ok(Self {
            width,
            height,
            chunk_size,
            cols,
            rows,
            chunks,
            pixels: vec![0; offset],
            has_dirty: false,
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
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// `(cols, rows)` of the chunk lattice.
    #[inline]
    pub fn dims(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn chunk_index(&self, col: u32, row: u32) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| table_index(self.cols, row, col))
    }

    #[inline]
    pub fn has_dirty(&self) -> bool {
        self.has_dirty
    }

    pub fn dirty_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.dirty).count()
    }

    /// Packed RGBA bytes of chunk `index`, rows of `region.width` pixels.
    pub fn chunk_pixels(&self, index: usize) -> Option<&[u8]> {
        let chunk = self.chunks.get(index)?;
        self.pixels.get(chunk.bytes())
    }

    /// Hides or shows a chunk. Hidden chunks keep their dirty state but are
    /// skipped by uploads until shown again.
    pub fn set_chunk_visible(&mut self, index: usize, visible: bool) {
        if let Some(chunk) = self.chunks.get_mut(index) {
            chunk.visible = visible;
        }
    }

    /// Reads back one pixel, `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let (index, local) = self.locate(x, y)?;
        let at = self.chunks[index].offset + local;
        let px = self.pixels.get(at..at + 4)?;
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    /// Writes one pixel.
    ///
    /// Out-of-range coordinates are dropped. Writing the color already stored
    /// leaves the chunk clean. Returns whether the pixel changed.
    pub fn write_pixel(&mut self, x: i32, y: i32, color: Color) -> bool {
        let Some((index, local)) = self.locate(x, y) else {
            return false;
        };

        let chunk = &mut self.chunks[index];
        let at = chunk.offset + local;
        let bytes = color.to_bytes();
        let Some(px) = self.pixels.get_mut(at..at + 4) else {
            return false;
        };
        if *px == bytes {
            return false;
        }

        px.copy_from_slice(&bytes);
        chunk.dirty = true;
        self.has_dirty = true;
        true
    }

    /// Fills the inclusive rectangle spanned by two corners.
    ///
    /// Corners may be given in any order and are clamped to the canvas.
    /// Every chunk the clamped rect touches is marked dirty, whether or not
    /// its pixels actually changed.
    pub fn write_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let Some(rect) = PixelRect::from_corners(x0, y0, x1, y1).clamp_to(self.width, self.height)
        else {
            return;
        };

        let c = self.chunk_size as i32;
        let bytes = color.to_bytes();

        for row in (rect.y0 / c)..=((rect.y1 - 1) / c) {
            for col in (rect.x0 / c)..=((rect.x1 - 1) / c) {
                let index = table_index(self.cols, row as u32, col as u32);
                let chunk = &mut self.chunks[index];
                let Some(local) = rect.intersect(chunk.region.rect()) else {
                    continue;
                };

                let stride = chunk.region.width as usize * 4;
                let lx0 = (local.x0 - chunk.region.x as i32) as usize;
                let lx1 = (local.x1 - chunk.region.x as i32) as usize;
                for ly in (local.y0 - chunk.region.y as i32)..(local.y1 - chunk.region.y as i32) {
                    let row_start = chunk.offset + ly as usize * stride;
                    let span = &mut self.pixels[row_start + lx0 * 4..row_start + lx1 * 4];
                    for px in span.chunks_exact_mut(4) {
                        px.copy_from_slice(&bytes);
                    }
                }
                chunk.dirty = true;
            }
        }

        self.has_dirty = true;
    }

    /// Fills the whole canvas.
    pub fn clear(&mut self, color: Color) {
        self.write_rect(0, 0, self.width as i32 - 1, self.height as i32 - 1, color);
    }

    pub(crate) fn mark_clean(&mut self, index: usize) {
        if let Some(chunk) = self.chunks.get_mut(index) {
            chunk.dirty = false;
        }
    }

    /// Records the outcome of an upload scan. Only a scan that left nothing
    /// behind may drop the fast-path flag.
    pub(crate) fn settle(&mut self, complete: bool) {
        if complete {
            self.has_dirty = false;
        }
    }

    /// Chunk index and byte offset within the chunk for a canvas pixel.
    #[inline]
    fn locate(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        let index = table_index(self.cols, y / self.chunk_size, x / self.chunk_size);
        let region = self.chunks.get(index)?.region;
        let local =
            ((y % self.chunk_size) as usize * region.width as usize + (x % self.chunk_size) as usize) * 4;
        Some((index, local))
    }
}

impl Canvas for ChunkGrid {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.write_pixel(x, y, color);
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.write_rect(x0, y0, x1, y1, color);
    }
}

/// Row-major chunk index, computed in `usize` so large grids don't wrap.
#[inline]
fn table_index(cols: u32, row: u32, col: u32) -> usize {
    row as usize * cols as usize + col as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn grid(w: u32, h: u32, c: u32) -> ChunkGrid {
        ChunkGrid::new(w, h, c).unwrap()
    }

    // ── tiling ────────────────────────────────────────────────────────────

    #[test]
    fn chunks_tile_canvas_exactly() {
        for (w, h) in [(1, 1), (7, 3), (16, 16), (17, 33), (64, 5), (100, 81)] {
            for c in [1, 2, 5, 8, 16, 270] {
                let g = grid(w, h, c);
                let mut coverage = vec![0u8; (w * h) as usize];
                for chunk in g.chunks() {
                    let r = chunk.region();
                    assert!(r.width >= 1 && r.width <= c);
                    assert!(r.height >= 1 && r.height <= c);
                    for y in r.y..r.y + r.height {
                        for x in r.x..r.x + r.width {
                            coverage[(y * w + x) as usize] += 1;
                        }
                    }
                }
                assert!(
                    coverage.iter().all(|&n| n == 1),
                    "{w}x{h} with chunk {c} has gaps or overlaps"
                );
                assert_eq!(g.dims(), (w.div_ceil(c), h.div_ceil(c)));
            }
        }
    }

    #[test]
    fn last_row_and_column_are_truncated() {
        let g = grid(600, 300, 270);
        assert_eq!(g.dims(), (3, 2));
        let last = g.chunks().last().unwrap().region();
        assert_eq!(last, Region { x: 540, y: 270, width: 60, height: 30 });
    }

    #[test]
    fn new_grid_is_clean_and_transparent() {
        let g = grid(40, 40, 16);
        assert!(!g.has_dirty());
        assert_eq!(g.dirty_count(), 0);
        assert_eq!(g.pixel(39, 39), Some(Color::TRANSPARENT));
    }

    #[test]
    fn zero_canvas_is_rejected() {
        assert!(matches!(
            ChunkGrid::new(0, 10, 4),
            Err(RenderError::InvalidCanvas { width: 0, height: 10 })
        ));
    }

    #[test]
    fn zero_chunk_size_uses_default() {
        assert_eq!(grid(10, 10, 0).chunk_size(), DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn table_index_is_row_major() {
        assert_eq!(table_index(3, 0, 2), 2);
        assert_eq!(table_index(3, 2, 1), 7);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn table_index_does_not_wrap_u32() {
        assert_eq!(table_index(65_536, 65_536, 0), 1usize << 32);
        assert_eq!(table_index(u32::MAX, 2, 5), 2 * u32::MAX as usize + 5);
    }

    // ── write_pixel ───────────────────────────────────────────────────────

    #[test]
    fn write_pixel_marks_owning_chunk() {
        let mut g = grid(32, 32, 16);
        assert!(g.write_pixel(20, 3, RED));
        assert!(g.has_dirty());
        let idx = g.chunk_index(1, 0).unwrap();
        assert!(g.chunks()[idx].is_dirty());
        assert_eq!(g.dirty_count(), 1);
        assert_eq!(g.pixel(20, 3), Some(RED));
    }

    #[test]
    fn same_color_write_is_noop() {
        let mut g = grid(32, 32, 16);
        assert!(!g.write_pixel(5, 5, Color::TRANSPARENT));
        assert!(!g.has_dirty());
        assert_eq!(g.dirty_count(), 0);
    }

    #[test]
    fn out_of_range_pixels_are_dropped() {
        let mut g = grid(10, 10, 4);
        for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 10), (i32::MIN, i32::MAX)] {
            assert!(!g.write_pixel(x, y, RED));
        }
        assert!(!g.has_dirty());
        assert_eq!(g.pixel(10, 0), None);
    }

    #[test]
    fn pixel_lands_in_truncated_chunk() {
        let mut g = grid(10, 10, 4);
        g.write_pixel(9, 9, RED);
        assert_eq!(g.pixel(9, 9), Some(RED));
        let last = g.chunk_count() - 1;
        let px = g.chunk_pixels(last).unwrap();
        // Chunk (2, 2) is 2x2; (9, 9) is its bottom-right pixel.
        assert_eq!(&px[12..16], &[255, 0, 0, 255]);
    }

    // ── write_rect ────────────────────────────────────────────────────────

    #[test]
    fn rect_marks_every_touched_chunk() {
        let mut g = grid(540, 540, 270);
        g.write_rect(269, 269, 271, 271, RED);
        assert_eq!(g.dirty_count(), 4);
        for y in 269..=271 {
            for x in 269..=271 {
                assert_eq!(g.pixel(x, y), Some(RED));
            }
        }
        assert_eq!(g.pixel(268, 269), Some(Color::TRANSPARENT));
        assert_eq!(g.pixel(272, 271), Some(Color::TRANSPARENT));
    }

    #[test]
    fn reversed_rect_is_normalized() {
        let mut a = grid(20, 20, 8);
        let mut b = grid(20, 20, 8);
        a.write_rect(2, 3, 12, 15, RED);
        b.write_rect(12, 15, 2, 3, RED);
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn rect_is_clamped_to_canvas() {
        let mut g = grid(10, 10, 4);
        g.write_rect(-100, -100, 100, 100, RED);
        assert!((0..10).all(|y| (0..10).all(|x| g.pixel(x, y) == Some(RED))));
        assert_eq!(g.dirty_count(), g.chunk_count());
    }

    #[test]
    fn rect_outside_canvas_is_noop() {
        let mut g = grid(10, 10, 4);
        g.write_rect(20, 20, 30, 30, RED);
        g.write_rect(-5, -5, -1, -1, RED);
        assert!(!g.has_dirty());
    }

    #[test]
    fn rect_marks_dirty_even_without_change() {
        let mut g = grid(10, 10, 4);
        g.write_rect(0, 0, 1, 1, Color::TRANSPARENT);
        assert_eq!(g.dirty_count(), 1);
        assert!(g.has_dirty());
    }

    #[test]
    fn clear_fills_everything() {
        let mut g = grid(9, 5, 4);
        g.clear(RED);
        assert!(g.pixels.chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
    }

    // ── visibility ────────────────────────────────────────────────────────

    #[test]
    fn hidden_chunks_keep_dirty_state() {
        let mut g = grid(8, 8, 4);
        g.set_chunk_visible(0, false);
        g.write_pixel(0, 0, RED);
        assert!(g.chunks()[0].is_dirty());
        assert!(!g.chunks()[0].is_visible());
    }
}
