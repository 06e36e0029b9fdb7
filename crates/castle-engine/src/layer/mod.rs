//! Drawing surfaces composited by the engine.
//!
//! A layer is either CPU-backed (a chunked pixel store uploaded on demand)
//! or GPU-backed (a render target written through a [`Recording`]).
//! Only the order layers are handed to the compositor encodes depth.

mod recording;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::chunk::ChunkGrid;
use crate::config::EngineConfig;
use crate::coords::PixelRect;
use crate::error::{RenderError, RenderResult};
use crate::paint::{Canvas, Color};
use crate::render::{CompositeBlend, RenderCtx, LAYER_FORMAT};
use crate::shader::{BakeSchedule, ProcessedTarget, Shader, ShaderMode, ShaderUniforms};
use crate::upload::{sync_chunks, GpuTextureSink, TextureSink, TransferRing, UploadReport};

pub use recording::{Recording, SavedTarget, TargetStack};

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique layer identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        Self(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Chunked pixel store, uploaded before compositing.
    Cpu,
    /// Render target written by recorded draws.
    Gpu,
}

/// Which texture of a layer the compositor samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawSource {
    Live,
    Processed,
}

pub(crate) struct LayerTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl LayerTexture {
    fn new(device: &wgpu::Device, name: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

enum Storage {
    Cpu {
        grid: ChunkGrid,
        /// Absent for detached layers.
        gpu: Option<(LayerTexture, TransferRing)>,
    },
    Gpu {
        target: LayerTexture,
    },
    Released,
}

impl Storage {
    fn live(&self) -> Option<&LayerTexture> {
        match self {
            Storage::Cpu { gpu, .. } => gpu.as_ref().map(|(t, _)| t),
            Storage::Gpu { target } => Some(target),
            Storage::Released => None,
        }
    }
}

struct ShaderAttachment {
    shader: Rc<Shader>,
    uniforms: ShaderUniforms,
}

/// Rejects sizes the device cannot allocate as a render target.
pub fn check_target_size(name: &str, width: u32, height: u32, max_dimension: u32) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidCanvas { width, height });
    }
    if width > max_dimension || height > max_dimension {
        return Err(RenderError::TargetIncomplete {
            name: name.to_string(),
            reason: format!("{width}x{height} exceeds the device limit of {max_dimension}"),
        });
    }
    Ok(())
}

/// A drawing surface.
pub struct Layer {
    id: LayerId,
    name: String,
    width: u32,
    height: u32,
    backend: Backend,
    enabled: bool,
    upload_cap: usize,
    storage: Storage,

    schedule: BakeSchedule,
    attachment: Option<ShaderAttachment>,
    processed: Option<ProcessedTarget>,

    warned_unrecorded_write: bool,
}

impl Layer {
    fn with_storage(
        name: &str,
        width: u32,
        height: u32,
        backend: Backend,
        upload_cap: usize,
        storage: Storage,
    ) -> Self {
        let id = LayerId::next();
        log::debug!("created {backend:?} layer `{name}` {id} ({width}x{height})");
        Self {
            id,
            name: name.to_string(),
            width,
            height,
            backend,
            enabled: true,
            upload_cap,
            storage,
            schedule: BakeSchedule::default(),
            attachment: None,
            processed: None,
            warned_unrecorded_write: false,
        }
    }

    /// CPU layer with a chunk store and a GPU texture it uploads into.
    pub fn cpu(
        ctx: &RenderCtx<'_>,
        config: &EngineConfig,
        width: u32,
        height: u32,
        name: &str,
    ) -> RenderResult<Self> {
        check_target_size(name, width, height, ctx.max_texture_dimension())?;
        let grid = ChunkGrid::new(width, height, config.chunk_size)?;
        let texture = LayerTexture::new(ctx.device, name, width, height);
        let ring = TransferRing::new(ctx.device, name, config.transfer_capacity);
        Ok(Self::with_storage(
            name,
            width,
            height,
            Backend::Cpu,
            config.upload_cap,
            Storage::Cpu {
                grid,
                gpu: Some((texture, ring)),
            },
        ))
    }

    /// GPU layer backed by a transparent render target.
    pub fn gpu(ctx: &RenderCtx<'_>, width: u32, height: u32, name: &str) -> RenderResult<Self> {
        check_target_size(name, width, height, ctx.max_texture_dimension())?;
        let target = LayerTexture::new(ctx.device, name, width, height);
        Ok(Self::with_storage(
            name,
            width,
            height,
            Backend::Gpu,
            0,
            Storage::Gpu { target },
        ))
    }

    /// CPU layer without a GPU texture.
    ///
    /// Usable for offline painting and [`crate::render::software::composite`].
    pub fn detached(config: &EngineConfig, width: u32, height: u32, name: &str) -> RenderResult<Self> {
        let grid = ChunkGrid::new(width, height, config.chunk_size)?;
        Ok(Self::with_storage(
            name,
            width,
            height,
            Backend::Cpu,
            config.upload_cap,
            Storage::Cpu { grid, gpu: None },
        ))
    }

    // ── identity ──────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
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
    pub fn backend(&self) -> Backend {
        self.backend
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled layers keep their content but are skipped when compositing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    /// Whether the layer has no GPU texture.
    pub fn is_detached(&self) -> bool {
        self.storage.live().is_none()
    }

    /// Quad covering the layer in logical pixels.
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::from_size(0, 0, self.width, self.height)
    }

    // ── cpu content ───────────────────────────────────────────────────────

    /// Chunk store of a CPU layer.
    pub fn grid(&self) -> Option<&ChunkGrid> {
        match &self.storage {
            Storage::Cpu { grid, .. } => Some(grid),
            _ => None,
        }
    }

    pub fn grid_mut(&mut self) -> Option<&mut ChunkGrid> {
        match &mut self.storage {
            Storage::Cpu { grid, .. } => Some(grid),
            _ => None,
        }
    }

    /// Whether any chunk still waits for upload.
    pub fn has_dirty(&self) -> bool {
        self.grid().is_some_and(ChunkGrid::has_dirty)
    }

    /// Reads one pixel of a CPU layer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.grid()?.pixel(x, y)
    }

    /// Writes one pixel of a CPU layer.
    ///
    /// GPU layers are written through a [`Recording`]; direct writes to them
    /// are dropped.
    pub fn write_pixel(&mut self, x: i32, y: i32, color: Color) {
        let changed = match self.storage {
            Storage::Cpu { ref mut grid, .. } => grid.write_pixel(x, y, color),
            Storage::Gpu { .. } => {
                self.warn_unrecorded_write();
                false
            }
            Storage::Released => false,
        };
        if changed {
            self.schedule.mark_dirty();
        }
    }

    /// Fills an inclusive rect of a CPU layer. Corners may be in any order.
    pub fn write_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let touched = PixelRect::from_corners(x0, y0, x1, y1)
            .clamp_to(self.width, self.height)
            .is_some();
        match self.storage {
            Storage::Cpu { ref mut grid, .. } => {
                grid.write_rect(x0, y0, x1, y1, color);
                if touched {
                    self.schedule.mark_dirty();
                }
            }
            Storage::Gpu { .. } => self.warn_unrecorded_write(),
            Storage::Released => {}
        }
    }

    /// Fills the whole CPU layer.
    pub fn clear(&mut self, color: Color) {
        self.write_rect(0, 0, self.width as i32 - 1, self.height as i32 - 1, color);
    }

    /// Shows or hides one chunk from uploads.
    pub fn set_chunk_visible(&mut self, index: usize, visible: bool) {
        if let Some(grid) = self.grid_mut() {
            grid.set_chunk_visible(index, visible);
        }
    }

    fn warn_unrecorded_write(&mut self) {
        if !self.warned_unrecorded_write {
            log::debug!(
                "layer `{}`: GPU layer written outside a recording; ignored",
                self.name
            );
            self.warned_unrecorded_write = true;
        }
    }

    // ── upload ────────────────────────────────────────────────────────────

    /// Uploads pending chunks into the layer texture.
    ///
    /// Safe to call every frame; returns an empty report for clean, GPU,
    /// detached and destroyed layers. Any uploaded chunk marks the effect
    /// dirty, so a bake over a partially uploaded texture is redone once the
    /// deferred chunks arrive.
    pub fn sync_to_texture(&mut self, ctx: &RenderCtx<'_>) -> UploadReport {
        let cap = self.upload_cap;
        let report = match &mut self.storage {
            Storage::Cpu {
                grid,
                gpu: Some((texture, ring)),
            } => {
                let mut sink = GpuTextureSink::new(ctx.device, ctx.queue, &texture.texture, ring);
                sync_chunks(grid, cap, &mut sink)
            }
            _ => UploadReport::default(),
        };
        self.schedule.uploaded(&report);
        report
    }

    /// Uploads pending chunks into an arbitrary sink.
    pub fn sync_into<S: TextureSink + ?Sized>(&mut self, sink: &mut S) -> UploadReport {
        let cap = self.upload_cap;
        let report = match &mut self.storage {
            Storage::Cpu { grid, .. } => sync_chunks(grid, cap, sink),
            _ => UploadReport::default(),
        };
        self.schedule.uploaded(&report);
        report
    }

    // ── shaders ───────────────────────────────────────────────────────────

    /// Attaches a post-process shader. The next composite recomputes it.
    pub fn attach_shader(&mut self, shader: Rc<Shader>, mode: ShaderMode, uniforms: ShaderUniforms) {
        log::debug!(
            "layer `{}`: attached shader `{}` ({mode:?})",
            self.name,
            shader.name()
        );
        self.attachment = Some(ShaderAttachment { shader, uniforms });
        self.restart_schedule(mode);
    }

    fn restart_schedule(&mut self, mode: ShaderMode) {
        self.schedule.set_mode(mode);
        self.schedule.reset();
    }

    pub fn detach_shader(&mut self) {
        self.attachment = None;
        self.schedule.set_mode(ShaderMode::None);
        if let Some(processed) = self.processed.take() {
            processed.destroy();
        }
    }

    pub fn shader(&self) -> Option<&Rc<Shader>> {
        self.attachment.as_ref().map(|a| &a.shader)
    }

    #[inline]
    pub fn schedule(&self) -> &BakeSchedule {
        &self.schedule
    }

    pub fn set_shader_mode(&mut self, mode: ShaderMode) {
        self.schedule.set_mode(mode);
        self.schedule.mark_dirty();
    }

    pub fn set_shader_uniforms(&mut self, uniforms: ShaderUniforms) {
        if let Some(attachment) = self.attachment.as_mut() {
            attachment.uniforms = uniforms;
            self.schedule.mark_dirty();
        }
    }

    /// Recomputes `shader` over the live texture into the processed target.
    ///
    /// The processed target is created on first use. `ctx` may describe any
    /// target; only its device and queue are used.
    pub fn apply_shader(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        shader: &Shader,
        uniforms: &ShaderUniforms,
    ) -> RenderResult<()> {
        let Some(live) = self.storage.live() else {
            return Err(RenderError::NotUploaded(format!("layer `{}`", self.name)));
        };
        let (name, width, height) = (&self.name, self.width, self.height);
        let processed = self
            .processed
            .get_or_insert_with(|| ProcessedTarget::new(ctx.device, name, width, height));
        shader.apply(ctx, encoder, &live.view, processed, uniforms);
        Ok(())
    }

    /// Runs the attached shader if its schedule says so. Returns whether it ran.
    pub(crate) fn run_due_effect(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
    ) -> RenderResult<bool> {
        if !self.enabled || self.is_destroyed() {
            return Ok(false);
        }
        let Some((shader, uniforms)) = self
            .attachment
            .as_ref()
            .filter(|_| self.bake_due())
            .map(|a| (Rc::clone(&a.shader), a.uniforms))
        else {
            return Ok(false);
        };

        self.apply_shader(ctx, encoder, &shader, &uniforms)?;
        self.schedule.baked();
        log::trace!("layer `{}`: ran `{}`", self.name, shader.name());
        Ok(true)
    }

    /// Which texture to composite and how, or `None` to skip the layer.
    pub(crate) fn composite_source(&self) -> Option<(DrawSource, CompositeBlend)> {
        if !self.enabled || self.is_destroyed() {
            return None;
        }
        match &self.attachment {
            Some(a) if self.schedule.mode() != ShaderMode::None && self.schedule.has_output() => {
                Some((DrawSource::Processed, a.shader.kind().composite_blend()))
            }
            _ => Some((DrawSource::Live, CompositeBlend::Alpha)),
        }
    }

    pub(crate) fn view(&self, source: DrawSource) -> Option<&wgpu::TextureView> {
        match source {
            DrawSource::Live => self.storage.live().map(|t| &t.view),
            DrawSource::Processed => self.processed.as_ref().map(ProcessedTarget::view),
        }
    }

    /// Whether the attached shader should run on this composite.
    #[inline]
    pub(crate) fn bake_due(&self) -> bool {
        self.schedule.is_due(self.attachment.is_some())
    }

    /// Notes that a recording drew into the live texture.
    ///
    /// Returns whether the effect should be baked right away rather than on
    /// the next composite.
    pub(crate) fn note_recorded_draw(&mut self) -> bool {
        self.schedule.mark_dirty();
        self.schedule.mode() == ShaderMode::BakeOnDirty
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Releases textures, transfer buffers and chunk memory.
    ///
    /// Calling it again does nothing. A destroyed layer ignores writes and is
    /// skipped by the compositor.
    pub fn destroy(&mut self) {
        match std::mem::replace(&mut self.storage, Storage::Released) {
            Storage::Cpu { gpu, .. } => {
                if let Some((texture, ring)) = gpu {
                    texture.texture.destroy();
                    ring.destroy();
                }
            }
            Storage::Gpu { target } => target.texture.destroy(),
            Storage::Released => return,
        }
        if let Some(processed) = self.processed.take() {
            processed.destroy();
        }
        self.attachment = None;
        log::debug!("destroyed layer `{}` {}", self.name, self.id);
    }
}

impl Drop for Layer {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &(self.width, self.height))
            .field("backend", &self.backend)
            .field("enabled", &self.enabled)
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

impl Canvas for Layer {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::MemoryTexture;

    fn layer(w: u32, h: u32) -> Layer {
        Layer::detached(&EngineConfig::default(), w, h, "test").unwrap()
    }

    // ── creation ──────────────────────────────────────────────────────────

    #[test]
    fn detached_layer_is_cpu() {
        let l = layer(64, 32);
        assert_eq!(l.backend(), Backend::Cpu);
        assert!(l.is_detached());
        assert!(l.is_enabled());
        assert_eq!(l.bounds(), PixelRect::new(0, 0, 64, 32));
    }

    #[test]
    fn zero_size_is_rejected() {
        let err = Layer::detached(&EngineConfig::default(), 0, 10, "bad").unwrap_err();
        assert!(matches!(err, RenderError::InvalidCanvas { width: 0, height: 10 }));
    }

    #[test]
    fn ids_are_unique() {
        let a = layer(1, 1);
        let b = layer(1, 1);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn target_size_limits() {
        assert!(check_target_size("ok", 8192, 8192, 8192).is_ok());
        let err = check_target_size("big", 8193, 10, 8192).unwrap_err();
        assert!(matches!(err, RenderError::TargetIncomplete { ref name, .. } if name == "big"));
        assert!(matches!(
            check_target_size("empty", 0, 0, 8192),
            Err(RenderError::InvalidCanvas { .. })
        ));
    }

    // ── writes ────────────────────────────────────────────────────────────

    #[test]
    fn writes_reach_the_grid() {
        let mut l = layer(10, 10);
        l.write_pixel(3, 4, Color::WHITE);
        l.write_rect(0, 0, 1, 1, Color::BLACK);
        assert_eq!(l.pixel(3, 4), Some(Color::WHITE));
        assert_eq!(l.pixel(1, 1), Some(Color::BLACK));
        assert!(l.has_dirty());
    }

    #[test]
    fn writes_mark_the_effect_dirty() {
        let mut l = layer(10, 10);
        l.set_shader_mode(ShaderMode::BakeOnDirty);
        l.schedule.baked();
        assert!(!l.schedule().is_dirty());

        l.write_pixel(1, 1, Color::WHITE);
        // No shader attached: nothing is due, but the flag still tracks content.
        assert!(l.schedule().is_dirty());
        assert!(!l.schedule().is_due(false));
    }

    #[test]
    fn same_color_write_keeps_schedule_clean() {
        let mut l = layer(4, 4);
        l.write_pixel(0, 0, Color::TRANSPARENT);
        assert!(!l.schedule().is_dirty());
        assert!(!l.has_dirty());
    }

    #[test]
    fn out_of_range_rect_keeps_schedule_clean() {
        let mut l = layer(4, 4);
        l.write_rect(10, 10, 20, 20, Color::WHITE);
        assert!(!l.schedule().is_dirty());
    }

    #[test]
    fn sync_into_memory() {
        let mut l = layer(20, 20);
        l.write_rect(2, 2, 4, 4, Color::rgb(0, 255, 0));
        let mut tex = MemoryTexture::new(20, 20);
        let report = l.sync_into(&mut tex);
        assert_eq!(report.uploaded, 1);
        assert!(!l.has_dirty());
        assert_eq!(tex.pixel(3, 3), Some(Color::rgb(0, 255, 0)));
    }

    #[test]
    fn detached_layer_has_no_view() {
        let mut l = layer(4, 4);
        l.write_pixel(0, 0, Color::WHITE);
        assert!(l.has_dirty());
        assert!(l.view(DrawSource::Live).is_none());
    }

    // ── shaders ───────────────────────────────────────────────────────────

    /// Composites `frames` times the way `render_pie` does for an attached
    /// bake-on-dirty effect: upload, then bake if due.
    fn composite_frames(l: &mut Layer, tex: &mut MemoryTexture, frames: usize) -> Vec<bool> {
        (0..frames)
            .map(|_| {
                l.sync_into(tex);
                let due = l.schedule().is_due(true);
                if due {
                    l.schedule.baked();
                }
                due
            })
            .collect()
    }

    #[test]
    fn deferred_chunks_rebake_when_they_arrive() {
        let config = EngineConfig::default().with_chunk_size(4).with_upload_cap(1);
        let mut l = Layer::detached(&config, 8, 8, "glow").unwrap();
        l.restart_schedule(ShaderMode::BakeOnDirty);
        l.clear(Color::WHITE);
        let mut tex = MemoryTexture::new(8, 8);

        let baked = composite_frames(&mut l, &mut tex, 6);
        assert_eq!(baked, [true, true, true, true, false, false]);
        assert!(!l.has_dirty());
        assert!(!l.schedule().is_dirty());
        assert_eq!(tex.pixel(7, 7), Some(Color::WHITE));
    }

    #[test]
    fn hidden_chunk_rebakes_once_shown() {
        let config = EngineConfig::default().with_chunk_size(4);
        let mut l = Layer::detached(&config, 8, 4, "glow").unwrap();
        l.restart_schedule(ShaderMode::BakeOnDirty);
        l.set_chunk_visible(1, false);
        l.clear(Color::WHITE);
        let mut tex = MemoryTexture::new(8, 4);

        assert_eq!(composite_frames(&mut l, &mut tex, 3), [true, false, false]);
        assert!(l.has_dirty());

        l.set_chunk_visible(1, true);
        assert_eq!(composite_frames(&mut l, &mut tex, 2), [true, false]);
        assert!(!l.has_dirty());
    }

    #[test]
    fn restarted_schedule_bakes_once_per_write() {
        let mut l = layer(10, 10);
        l.restart_schedule(ShaderMode::BakeOnDirty);
        assert!(!l.schedule().has_output());
        let mut tex = MemoryTexture::new(10, 10);

        assert_eq!(composite_frames(&mut l, &mut tex, 3), [true, false, false]);
        l.write_pixel(2, 2, Color::BLACK);
        assert_eq!(composite_frames(&mut l, &mut tex, 3), [true, false, false]);
        assert_eq!(l.schedule().bakes(), 2);
    }

    #[test]
    fn bake_is_not_due_without_attachment() {
        let mut l = layer(10, 10);
        l.restart_schedule(ShaderMode::EachFrame);
        l.write_pixel(1, 1, Color::WHITE);
        assert!(l.schedule().is_dirty());
        assert!(!l.bake_due());
    }

    #[test]
    fn recorded_draw_requests_bake_on_dirty() {
        let mut l = layer(10, 10);
        l.restart_schedule(ShaderMode::BakeOnDirty);
        l.schedule.baked();
        assert!(l.note_recorded_draw());
        assert!(l.schedule().is_dirty());

        l.restart_schedule(ShaderMode::EachFrame);
        l.schedule.baked();
        assert!(!l.note_recorded_draw());
        assert!(l.schedule().is_dirty());
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn destroy_is_idempotent() {
        let mut l = layer(8, 8);
        l.destroy();
        l.destroy();
        assert!(l.is_destroyed());
        assert!(l.grid().is_none());
    }

    #[test]
    fn destroyed_layer_ignores_writes() {
        let mut l = layer(8, 8);
        l.destroy();
        l.write_pixel(0, 0, Color::WHITE);
        l.clear(Color::WHITE);
        assert_eq!(l.pixel(0, 0), None);
        assert!(l.composite_source().is_none());
    }

    #[test]
    fn disabled_layer_is_not_composited() {
        let mut l = layer(8, 8);
        l.set_enabled(false);
        assert!(l.composite_source().is_none());
        l.set_enabled(true);
        assert_eq!(
            l.composite_source(),
            Some((DrawSource::Live, CompositeBlend::Alpha))
        );
    }
}
