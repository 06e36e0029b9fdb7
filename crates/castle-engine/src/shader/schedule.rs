use crate::upload::UploadReport;

use super::ShaderMode;

/// Tracks when a layer's effect must be recomputed.
///
/// Every layer carries one, even without an attached shader, so content
/// writes can mark it dirty unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BakeSchedule {
    mode: ShaderMode,
    dirty: bool,
    bakes: u64,
}

impl BakeSchedule {
    #[inline]
    pub fn mode(&self) -> ShaderMode {
        self.mode
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of completed recomputes.
    #[inline]
    pub fn bakes(&self) -> u64 {
        self.bakes
    }

    pub fn set_mode(&mut self, mode: ShaderMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a pass should run now for a layer with (`attached`) or without a shader.
    pub fn is_due(&self, attached: bool) -> bool {
        attached
            && match self.mode {
                ShaderMode::None => false,
                ShaderMode::EachFrame => true,
                ShaderMode::BakeOnDirty => self.dirty,
            }
    }

    /// Folds an upload pass into the schedule.
    ///
    /// Chunks reaching the live texture make any processed image stale, even
    /// when the writes that dirtied them were already accounted for by an
    /// earlier bake over a partially uploaded texture.
    pub fn uploaded(&mut self, report: &UploadReport) {
        if report.uploaded > 0 {
            self.dirty = true;
        }
    }

    /// Records a successful recompute.
    pub fn baked(&mut self) {
        self.dirty = false;
        self.bakes += 1;
    }

    /// Whether a processed image exists to composite.
    #[inline]
    pub fn has_output(&self) -> bool {
        self.bakes > 0
    }

    /// Forgets previous output; the next due check starts from a dirty state.
    pub(crate) fn reset(&mut self) {
        self.dirty = true;
        self.bakes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(mode: ShaderMode) -> BakeSchedule {
        let mut s = BakeSchedule::default();
        s.set_mode(mode);
        s.reset();
        s
    }

    // ── due checks ────────────────────────────────────────────────────────

    #[test]
    fn bake_on_dirty_is_due_only_while_dirty() {
        let mut s = schedule(ShaderMode::BakeOnDirty);
        assert!(s.is_due(true));
        s.baked();
        assert!(!s.is_due(true));
        assert!(s.has_output());
        s.mark_dirty();
        assert!(s.is_due(true));
    }

    #[test]
    fn each_frame_is_always_due() {
        let mut s = schedule(ShaderMode::EachFrame);
        s.baked();
        assert!(!s.is_dirty());
        assert!(s.is_due(true));
    }

    #[test]
    fn none_is_never_due() {
        let s = schedule(ShaderMode::None);
        assert!(s.is_dirty());
        assert!(!s.is_due(true));
        assert!(!s.has_output());
    }

    #[test]
    fn nothing_due_without_shader() {
        let mut s = BakeSchedule::default();
        s.set_mode(ShaderMode::EachFrame);
        s.mark_dirty();
        assert!(!s.is_due(false));
    }

    #[test]
    fn reset_forgets_output() {
        let mut s = schedule(ShaderMode::BakeOnDirty);
        s.baked();
        s.reset();
        assert!(s.is_dirty());
        assert!(!s.has_output());
        assert_eq!(s.bakes(), 0);
    }

    // ── uploads ───────────────────────────────────────────────────────────

    #[test]
    fn upload_after_bake_redirties() {
        let mut s = schedule(ShaderMode::BakeOnDirty);
        s.baked();
        s.uploaded(&UploadReport {
            uploaded: 2,
            staged: 2,
            direct: 0,
            deferred: 1,
        });
        assert!(s.is_due(true));
    }

    #[test]
    fn empty_upload_keeps_clean() {
        let mut s = schedule(ShaderMode::BakeOnDirty);
        s.baked();
        s.uploaded(&UploadReport {
            deferred: 3,
            ..UploadReport::default()
        });
        assert!(!s.is_dirty());
    }
}
