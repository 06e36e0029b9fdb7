use crate::coords::{PixelRect, Viewport};
use crate::error::{RenderError, RenderResult};
use crate::paint::{Canvas, Color};
use crate::render::fill::{FillInstance, FillRenderer};
use crate::render::{RenderCtx, LAYER_FORMAT};

use super::{Backend, DrawSource, Layer, LayerId};

/// Render target that was active when a recording began.
///
/// Popped when the recording ends; draws issued afterwards go back to this
/// target and viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SavedTarget {
    /// Enclosing recorded layer, or `None` for the frame target.
    pub layer: Option<LayerId>,
    pub viewport: Viewport,
}

/// Bounded stack of active GPU-layer recordings.
#[derive(Debug)]
pub struct TargetStack {
    frames: Vec<SavedTarget>,
    max_depth: usize,
}

impl TargetStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    pub fn push(&mut self, target: SavedTarget) -> RenderResult<()> {
        if self.frames.len() >= self.max_depth {
            return Err(RenderError::RecordingOverflow {
                max_depth: self.max_depth,
            });
        }
        self.frames.push(target);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<SavedTarget> {
        self.frames.pop()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Innermost recording, if any.
    #[inline]
    pub fn active(&self) -> Option<&SavedTarget> {
        self.frames.last()
    }
}

/// Scope during which a layer is the active draw target.
///
/// On a GPU layer, writes are collected as fills and rendered into the
/// layer's texture when the recording is flushed: before a nested
/// recording opens, on [`Recording::end`], or on drop. On a CPU layer the
/// recording only forwards writes to the chunk store.
pub struct Recording<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layer: &'a mut Layer,
    targets: &'a mut TargetStack,
    fill: &'a mut FillRenderer,

    pending: Vec<FillInstance>,
    clear: Option<Color>,
    drew: bool,
    pushed: bool,
    finished: bool,
}

impl<'a> Recording<'a> {
    /// `ctx` and `outer` describe the target active before this recording.
    pub(crate) fn begin(
        ctx: &RenderCtx<'a>,
        outer: Option<LayerId>,
        layer: &'a mut Layer,
        targets: &'a mut TargetStack,
        fill: &'a mut FillRenderer,
    ) -> RenderResult<Self> {
        let pushed = layer.backend() == Backend::Gpu && !layer.is_destroyed();
        if pushed {
            targets.push(SavedTarget {
                layer: outer,
                viewport: ctx.viewport,
            })?;
            log::trace!("recording `{}` (depth {})", layer.name(), targets.depth());
        }
        Ok(Self {
            device: ctx.device,
            queue: ctx.queue,
            layer,
            targets,
            fill,
            pending: Vec::new(),
            clear: None,
            drew: false,
            pushed,
            finished: false,
        })
    }

    #[inline]
    pub fn layer(&self) -> &Layer {
        &*self.layer
    }

    /// Recording depth including this one.
    #[inline]
    pub fn depth(&self) -> usize {
        self.targets.depth()
    }

    /// Opens a recording on `child` while this one stays open.
    ///
    /// Draws recorded so far are flushed first, so they land before anything
    /// the child's content is composited over.
    pub fn nested<'b>(&'b mut self, child: &'b mut Layer) -> RenderResult<Recording<'b>> {
        self.flush();
        let ctx = self.layer_ctx();
        let outer = Some(self.layer.id());
        Recording::begin(&ctx, outer, child, &mut *self.targets, &mut *self.fill)
    }

    /// Renders collected fills into the layer texture.
    pub fn flush(&mut self) {
        if self.pending.is_empty() && self.clear.is_none() {
            return;
        }
        let ctx = self.layer_ctx();
        if let Some(view) = self.layer.view(DrawSource::Live) {
            self.fill.render(&ctx, view, self.clear, &self.pending);
        }
        self.pending.clear();
        self.clear = None;
    }

    /// Ends the recording, reporting a failed bake.
    pub fn end(mut self) -> RenderResult<()> {
        self.finish()
    }

    fn finish(&mut self) -> RenderResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        self.flush();
        if self.pushed {
            if let Some(saved) = self.targets.pop() {
                log::trace!(
                    "recording `{}` ended, back to {:?} at {}x{}",
                    self.layer.name(),
                    saved.layer,
                    saved.viewport.width,
                    saved.viewport.height
                );
            }
        }
        if !self.drew || self.layer.backend() != Backend::Gpu {
            return Ok(());
        }
        if !self.layer.note_recorded_draw() {
            return Ok(());
        }

        let ctx = self.layer_ctx();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("castle bake encoder"),
            });
        let ran = self.layer.run_due_effect(&ctx, &mut encoder)?;
        if ran {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
        Ok(())
    }

    fn layer_ctx(&self) -> RenderCtx<'a> {
        RenderCtx::new(
            self.device,
            self.queue,
            LAYER_FORMAT,
            Viewport::for_target(self.layer.width(), self.layer.height()),
            1.0,
        )
    }

    /// Replaces the whole layer content with `color`.
    pub fn clear(&mut self, color: Color) {
        match self.layer.backend() {
            Backend::Cpu => self.layer.clear(color),
            Backend::Gpu => {
                self.pending.clear();
                self.clear = Some(color);
                self.drew = true;
            }
        }
    }

    fn record(&mut self, rect: PixelRect, color: Color) {
        if let Some(r) = rect.clamp_to(self.layer.width(), self.layer.height()) {
            self.pending.push(FillInstance::from_rect(r, color));
            self.drew = true;
        }
    }
}

impl Canvas for Recording<'_> {
    fn size(&self) -> (u32, u32) {
        (self.layer.width(), self.layer.height())
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        match self.layer.backend() {
            Backend::Cpu => self.layer.write_pixel(x, y, color),
            Backend::Gpu => self.record(PixelRect::from_size(x, y, 1, 1), color),
        }
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        match self.layer.backend() {
            Backend::Cpu => self.layer.write_rect(x0, y0, x1, y1, color),
            Backend::Gpu => self.record(PixelRect::from_corners(x0, y0, x1, y1), color),
        }
    }
}

impl Drop for Recording<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::warn!("recording `{}` ended with error: {e}", self.layer.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(id: u64) -> SavedTarget {
        SavedTarget {
            layer: Some(LayerId(id)),
            viewport: Viewport::new(8.0, 8.0),
        }
    }

    #[test]
    fn stack_tracks_innermost() {
        let mut s = TargetStack::new(4);
        s.push(saved(1)).unwrap();
        s.push(saved(2)).unwrap();
        assert_eq!(s.depth(), 2);
        assert_eq!(s.active().map(|t| t.layer), Some(Some(LayerId(2))));
        assert_eq!(s.pop().map(|t| t.layer), Some(Some(LayerId(2))));
        assert_eq!(s.active().map(|t| t.layer), Some(Some(LayerId(1))));
    }

    #[test]
    fn stack_overflow_is_an_error() {
        let mut s = TargetStack::new(2);
        s.push(saved(1)).unwrap();
        s.push(saved(2)).unwrap();
        let err = s.push(saved(3)).unwrap_err();
        assert!(matches!(err, RenderError::RecordingOverflow { max_depth: 2 }));
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut s = TargetStack::new(1);
        assert!(s.pop().is_none());
        assert!(s.active().is_none());
    }

    #[test]
    fn pop_restores_the_enclosing_target() {
        let frame = Viewport::new(800.0, 600.0);
        let outer = Viewport::for_target(64, 32);
        let mut s = TargetStack::new(4);
        s.push(SavedTarget {
            layer: None,
            viewport: frame,
        })
        .unwrap();
        s.push(SavedTarget {
            layer: Some(LayerId(7)),
            viewport: outer,
        })
        .unwrap();

        let inner_end = s.pop().unwrap();
        assert_eq!(inner_end.layer, Some(LayerId(7)));
        assert_eq!(inner_end.viewport, outer);
        let outer_end = s.pop().unwrap();
        assert_eq!(outer_end.layer, None);
        assert_eq!(outer_end.viewport, frame);
    }
}
