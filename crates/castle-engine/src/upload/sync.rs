use crate::chunk::{ChunkGrid, Region};
use crate::config::padded_row_bytes;

/// Destination of chunk uploads.
///
/// A sink owns two transfer slots of `transfer_capacity` bytes each. Chunks
/// that fit are handed over with alternating slot indices so that staging
/// the next chunk never overwrites a buffer the previous copy still reads.
/// Larger chunks bypass the slots.
pub trait TextureSink {
    /// Byte size of each transfer slot.
    fn transfer_capacity(&self) -> u64;

    /// Uploads `rgba` (tightly packed rows) through transfer slot `slot` (0 or 1).
    fn write_staged(&mut self, slot: usize, region: Region, rgba: &[u8]);

    /// Uploads `rgba` straight into the texture.
    fn write_direct(&mut self, region: Region, rgba: &[u8]);

    /// Flushes any batched work. Called once at the end of every sync.
    fn finish(&mut self) {}
}

/// Outcome of one sync pass.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Chunks uploaded in this pass.
    pub uploaded: usize,
    /// Of those, how many went through a transfer slot.
    pub staged: usize,
    /// Of those, how many were written directly.
    pub direct: usize,
    /// Dirty chunks left for a later pass (over the cap or hidden).
    pub deferred: usize,
}

impl UploadReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.deferred == 0
    }
}

/// Pushes up to `cap` dirty, visible chunks of `grid` into `sink`.
///
/// Chunks are visited row-major. Uploaded chunks become clean; the grid's
/// fast-path flag is only cleared when nothing was deferred. Calling this on a
/// clean grid does nothing, so it is safe to call every frame.
pub fn sync_chunks<S: TextureSink + ?Sized>(
    grid: &mut ChunkGrid,
    cap: usize,
    sink: &mut S,
) -> UploadReport {
    let mut report = UploadReport::default();
    if !grid.has_dirty() {
        return report;
    }

    let capacity = sink.transfer_capacity();
    let mut slot = 0usize;

    for index in 0..grid.chunk_count() {
        let chunk = &grid.chunks()[index];
        if !chunk.is_dirty() {
            continue;
        }
        if !chunk.is_visible() || report.uploaded >= cap {
            report.deferred += 1;
            continue;
        }

        let region = chunk.region();
        let Some(rgba) = grid.chunk_pixels(index) else {
            continue;
        };

        let staged_bytes = padded_row_bytes(region.width) as u64 * region.height as u64;
        if staged_bytes > capacity {
            sink.write_direct(region, rgba);
            report.direct += 1;
        } else {
            sink.write_staged(slot, region, rgba);
            slot ^= 1;
            report.staged += 1;
        }

        grid.mark_clean(index);
        report.uploaded += 1;
    }

    sink.finish();
    grid.settle(report.is_complete());

    if report.uploaded > 0 {
        log::trace!(
            "synced {} chunks ({} staged, {} direct, {} deferred)",
            report.uploaded,
            report.staged,
            report.direct,
            report.deferred
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    const RED: Color = Color::rgb(255, 0, 0);

    /// Records every call instead of storing pixels.
    #[derive(Default)]
    struct Recorder {
        capacity: u64,
        staged: Vec<(usize, Region)>,
        direct: Vec<Region>,
        finishes: usize,
    }

    impl Recorder {
        fn with_capacity(capacity: u64) -> Self {
            Self { capacity, ..Self::default() }
        }
    }

    impl TextureSink for Recorder {
        fn transfer_capacity(&self) -> u64 {
            self.capacity
        }

        fn write_staged(&mut self, slot: usize, region: Region, rgba: &[u8]) {
            assert_eq!(rgba.len(), region.byte_len());
            self.staged.push((slot, region));
        }

        fn write_direct(&mut self, region: Region, rgba: &[u8]) {
            assert_eq!(rgba.len(), region.byte_len());
            self.direct.push(region);
        }

        fn finish(&mut self) {
            self.finishes += 1;
        }
    }

    fn grid(w: u32, h: u32, c: u32) -> ChunkGrid {
        ChunkGrid::new(w, h, c).unwrap()
    }

    // ── idempotence ───────────────────────────────────────────────────────

    #[test]
    fn clean_grid_does_nothing() {
        let mut g = grid(64, 64, 16);
        let mut sink = Recorder::with_capacity(u64::MAX);
        let report = sync_chunks(&mut g, 8, &mut sink);
        assert_eq!(report, UploadReport::default());
        assert_eq!(sink.finishes, 0);
    }

    #[test]
    fn second_sync_is_noop() {
        let mut g = grid(64, 64, 16);
        g.write_pixel(3, 3, RED);
        let mut sink = Recorder::with_capacity(u64::MAX);
        assert_eq!(sync_chunks(&mut g, 8, &mut sink).uploaded, 1);
        assert!(!g.has_dirty());
        assert_eq!(sync_chunks(&mut g, 8, &mut sink).uploaded, 0);
        assert_eq!(sink.staged.len(), 1);
    }

    // ── slots ─────────────────────────────────────────────────────────────

    #[test]
    fn staged_uploads_alternate_slots() {
        let mut g = grid(64, 16, 16);
        g.clear(RED);
        let mut sink = Recorder::with_capacity(u64::MAX);
        sync_chunks(&mut g, 8, &mut sink);
        let slots: Vec<usize> = sink.staged.iter().map(|(s, _)| *s).collect();
        assert_eq!(slots, vec![0, 1, 0, 1]);
    }

    #[test]
    fn oversized_chunks_go_direct() {
        let mut g = grid(32, 16, 16);
        g.clear(RED);
        // A 16x16 chunk stages 256 * 16 bytes; one byte less forces the direct path.
        let mut sink = Recorder::with_capacity(256 * 16 - 1);
        let report = sync_chunks(&mut g, 8, &mut sink);
        assert_eq!(report.direct, 2);
        assert_eq!(report.staged, 0);
        assert!(sink.staged.is_empty());
    }

    #[test]
    fn truncated_chunks_can_still_stage() {
        // 20 tall with chunk 16: the bottom row is 4 pixels tall.
        let mut g = grid(16, 20, 16);
        g.clear(RED);
        let mut sink = Recorder::with_capacity(256 * 16 - 1);
        let report = sync_chunks(&mut g, 8, &mut sink);
        assert_eq!(report.direct, 1);
        assert_eq!(report.staged, 1);
        assert_eq!(sink.staged[0].1, Region { x: 0, y: 16, width: 16, height: 4 });
    }

    // ── cap and convergence ───────────────────────────────────────────────

    #[test]
    fn cap_defers_remaining_chunks() {
        let mut g = grid(80, 80, 16);
        g.clear(RED);
        let mut sink = Recorder::with_capacity(u64::MAX);
        let report = sync_chunks(&mut g, 10, &mut sink);
        assert_eq!(report.uploaded, 10);
        assert_eq!(report.deferred, 15);
        assert!(g.has_dirty());
        assert_eq!(g.dirty_count(), 15);
    }

    #[test]
    fn converges_within_ceil_chunks_over_cap() {
        for cap in [1usize, 3, 7, 25, 100] {
            let mut g = grid(80, 80, 16);
            g.clear(RED);
            let bound = g.chunk_count().div_ceil(cap);
            let mut sink = Recorder::with_capacity(u64::MAX);
            let mut calls = 0;
            while g.has_dirty() {
                sync_chunks(&mut g, cap, &mut sink);
                calls += 1;
                assert!(calls <= bound, "cap {cap} needed more than {bound} syncs");
            }
            assert_eq!(g.dirty_count(), 0);
            assert_eq!(sink.staged.len(), g.chunk_count());
        }
    }

    #[test]
    fn uploads_in_row_major_order() {
        let mut g = grid(32, 32, 16);
        g.write_pixel(20, 20, RED);
        g.write_pixel(1, 1, RED);
        g.write_pixel(20, 1, RED);
        let mut sink = Recorder::with_capacity(u64::MAX);
        sync_chunks(&mut g, 8, &mut sink);
        let origins: Vec<(u32, u32)> = sink.staged.iter().map(|(_, r)| (r.x, r.y)).collect();
        assert_eq!(origins, vec![(0, 0), (16, 0), (16, 16)]);
    }

    // ── visibility ────────────────────────────────────────────────────────

    #[test]
    fn hidden_chunks_stay_dirty() {
        let mut g = grid(32, 16, 16);
        g.set_chunk_visible(1, false);
        g.clear(RED);
        let mut sink = Recorder::with_capacity(u64::MAX);
        let report = sync_chunks(&mut g, 8, &mut sink);
        assert_eq!(report.uploaded, 1);
        assert_eq!(report.deferred, 1);
        assert!(g.has_dirty());

        g.set_chunk_visible(1, true);
        let report = sync_chunks(&mut g, 8, &mut sink);
        assert_eq!(report.uploaded, 1);
        assert!(!g.has_dirty());
    }
}
