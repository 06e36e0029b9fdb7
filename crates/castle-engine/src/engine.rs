//! Engine facade.
//!
//! Owns the configuration, the procedural color generator, the renderers and
//! the recording stack. Layers are owned by the caller and handed in per call.

use std::path::Path;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::coords::PixelRect;
use crate::error::RenderResult;
use crate::layer::{Layer, Recording, TargetStack};
use crate::paint::{Color, ColorGenerator, Palette};
use crate::render::{Compositor, FillRenderer, RenderCtx, RenderTarget};
use crate::shader::{Shader, ShaderKind};
use crate::sprite::Sprite;

/// Counters for one composite.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub layers_drawn: usize,
    pub chunks_uploaded: usize,
    pub chunks_deferred: usize,
    pub effects_run: usize,
    pub effects_failed: usize,
}

pub struct Engine {
    config: EngineConfig,
    colors: ColorGenerator,
    compositor: Compositor,
    fill: FillRenderer,
    targets: TargetStack,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        log::info!(
            "engine: chunk {}px, upload cap {}, transfer {} B, seed {}",
            config.chunk_size,
            config.upload_cap,
            config.transfer_capacity,
            config.seed
        );
        Self {
            colors: ColorGenerator::new(config.seed),
            targets: TargetStack::new(config.max_recording_depth),
            compositor: Compositor::new(),
            fill: FillRenderer::new(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── colors ────────────────────────────────────────────────────────────

    /// Procedural color of `palette` at a world position.
    pub fn color(&self, pos_x: i32, pos_y: i32, offset_x: i32, offset_y: i32, palette: Palette) -> Color {
        self.colors.color(pos_x, pos_y, offset_x, offset_y, palette)
    }

    #[inline]
    pub fn colors(&self) -> &ColorGenerator {
        &self.colors
    }

    /// Changes the seed of colors generated from now on.
    pub fn set_seed(&mut self, seed: u32) {
        self.config.seed = seed;
        self.colors.reseed(seed);
    }

    // ── layers ────────────────────────────────────────────────────────────

    pub fn create_cpu_layer(&self, ctx: &RenderCtx<'_>, width: u32, height: u32, name: &str) -> RenderResult<Layer> {
        Layer::cpu(ctx, &self.config, width, height, name)
    }

    pub fn create_gpu_layer(&self, ctx: &RenderCtx<'_>, width: u32, height: u32, name: &str) -> RenderResult<Layer> {
        Layer::gpu(ctx, width, height, name)
    }

    pub fn create_detached_layer(&self, width: u32, height: u32, name: &str) -> RenderResult<Layer> {
        Layer::detached(&self.config, width, height, name)
    }

    /// Makes `layer` the active draw target until the returned guard ends.
    ///
    /// Fails with [`crate::RenderError::RecordingOverflow`] when the recording
    /// stack is full.
    pub fn begin_recording<'a>(
        &'a mut self,
        ctx: &RenderCtx<'a>,
        layer: &'a mut Layer,
    ) -> RenderResult<Recording<'a>> {
        Recording::begin(ctx, None, layer, &mut self.targets, &mut self.fill)
    }

    /// Number of GPU-layer recordings currently open.
    #[inline]
    pub fn recording_depth(&self) -> usize {
        self.targets.depth()
    }

    // ── compositing ───────────────────────────────────────────────────────

    /// Composites `layers` into `target`, first entry at the bottom.
    ///
    /// Pending CPU chunks are uploaded and due shader passes are recorded
    /// before any layer is drawn. A failing shader pass is logged and the
    /// layer is drawn unshaded.
    pub fn render_pie(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        layers: &mut [&mut Layer],
    ) -> FrameStats {
        let mut stats = FrameStats::default();

        for layer in layers.iter_mut() {
            if !layer.is_enabled() || layer.is_destroyed() {
                continue;
            }
            let report = layer.sync_to_texture(ctx);
            stats.chunks_uploaded += report.uploaded;
            stats.chunks_deferred += report.deferred;

            let layer_ctx = ctx.for_layer(layer.width(), layer.height());
            match layer.run_due_effect(&layer_ctx, target.encoder) {
                Ok(true) => stats.effects_run += 1,
                Ok(false) => {}
                Err(e) => {
                    stats.effects_failed += 1;
                    log::warn!("layer `{}`: shader pass failed, drawing unshaded: {e}", layer.name());
                }
            }
        }

        let refs: Vec<&Layer> = layers.iter().map(|l| &**l).collect();
        stats.layers_drawn = self.compositor.draw(ctx, target, &refs);
        stats
    }

    /// Composites a single layer.
    pub fn render_layer(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        layer: &mut Layer,
    ) -> FrameStats {
        self.render_pie(ctx, target, &mut [layer])
    }

    /// Uploads `sprite` if needed and composites it into `dst`.
    pub fn draw_sprite(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        sprite: &mut Sprite,
        dst: PixelRect,
        modulate: Color,
    ) -> RenderResult<()> {
        sprite.ensure_uploaded(ctx);
        self.compositor.draw_sprite(ctx, target, sprite, dst, modulate)
    }

    // ── shaders ───────────────────────────────────────────────────────────

    /// Compiles a built-in effect, or a custom fragment when `fragment` is given.
    pub fn load_shader(
        &self,
        ctx: &RenderCtx<'_>,
        kind: ShaderKind,
        fragment: Option<&str>,
    ) -> RenderResult<Rc<Shader>> {
        let shader = match fragment {
            Some(src) => Shader::from_fragment(ctx, kind.label(), kind, src)?,
            None => Shader::builtin(ctx, kind)?,
        };
        Ok(Rc::new(shader))
    }

    pub fn load_shader_file(
        &self,
        ctx: &RenderCtx<'_>,
        path: impl AsRef<Path>,
        kind: ShaderKind,
    ) -> RenderResult<Rc<Shader>> {
        Ok(Rc::new(Shader::from_file(ctx, path, kind)?))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
