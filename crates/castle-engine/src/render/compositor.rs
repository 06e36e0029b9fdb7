use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::PixelRect;
use crate::error::{RenderError, RenderResult};
use crate::layer::{DrawSource, Layer};
use crate::paint::Color;
use crate::sprite::Sprite;

use super::blend::CompositeBlend;
use super::quad::{
    pixel_sampler, triangle_list, viewport_bgl_entry, QuadBuffers, QuadVertex, ViewportUniform,
};
use super::{RenderCtx, RenderTarget};

/// Full-texture UVs. Every texture the engine samples stores row 0 at the top.
pub const FULL_UV: ([f32; 2], [f32; 2]) = ([0.0, 0.0], [1.0, 1.0]);

/// One planned composite draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawItem {
    /// Position in the caller's layer list.
    pub index: usize,
    pub source: DrawSource,
    pub blend: CompositeBlend,
    /// Destination quad in logical pixels.
    pub rect: PixelRect,
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LayerInstance {
    origin: [f32; 2],
    size: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    modulate: [f32; 4],
}

impl LayerInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32x4  // modulate
    ];

    fn new(rect: PixelRect, uv_min: [f32; 2], uv_max: [f32; 2], modulate: Color) -> Self {
        Self {
            origin: [rect.x0 as f32, rect.y0 as f32],
            size: [rect.width() as f32, rect.height() as f32],
            uv_min,
            uv_max,
            modulate: modulate.to_f32(),
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LayerInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Draws layer textures into a frame, one blended quad per layer.
///
/// Pipelines are cached per target format. Uniform and instance buffers
/// are created per call: several composites may be recorded into one
/// encoder before it is submitted.
#[derive(Default)]
pub struct Compositor {
    pipeline_format: Option<wgpu::TextureFormat>,
    alpha_pipeline: Option<wgpu::RenderPipeline>,
    additive_pipeline: Option<wgpu::RenderPipeline>,

    viewport_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,
    quad: Option<QuadBuffers>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw list for `layers`, bottom to top.
    ///
    /// Destroyed and disabled layers are skipped. A layer samples its
    /// processed texture once its attached shader is active and has run.
    pub fn plan(layers: &[&Layer]) -> Vec<DrawItem> {
        let (uv_min, uv_max) = FULL_UV;
        layers
            .iter()
            .enumerate()
            .filter_map(|(index, layer)| {
                let (source, blend) = layer.composite_source()?;
                Some(DrawItem {
                    index,
                    source,
                    blend,
                    rect: layer.bounds(),
                    uv_min,
                    uv_max,
                })
            })
            .collect()
    }

    /// Composites `layers` over whatever `target` already holds.
    ///
    /// Layers without a texture (detached) are skipped. Returns the number
    /// of layers drawn.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        layers: &[&Layer],
    ) -> usize {
        let items: Vec<(DrawItem, &wgpu::TextureView)> = Self::plan(layers)
            .into_iter()
            .filter_map(|item| Some((item, layers[item.index].view(item.source)?)))
            .collect();
        if items.is_empty() {
            return 0;
        }

        let instances: Vec<LayerInstance> = items
            .iter()
            .map(|(item, _)| LayerInstance::new(item.rect, item.uv_min, item.uv_max, Color::WHITE))
            .collect();
        let draws: Vec<(CompositeBlend, &wgpu::TextureView)> =
            items.iter().map(|(item, view)| (item.blend, *view)).collect();

        self.encode(ctx, target, &instances, &draws);
        draws.len()
    }

    /// Composites an uploaded sprite into `dst`, multiplied by `modulate`.
    pub fn draw_sprite(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        sprite: &Sprite,
        dst: PixelRect,
        modulate: Color,
    ) -> RenderResult<()> {
        let view = sprite
            .view()
            .ok_or_else(|| RenderError::NotUploaded("sprite".to_string()))?;
        if dst.is_empty() {
            return Ok(());
        }
        let (uv_min, uv_max) = FULL_UV;
        let instance = LayerInstance::new(dst, uv_min, uv_max, modulate);
        self.encode(ctx, target, &[instance], &[(CompositeBlend::Alpha, view)]);
        Ok(())
    }

    fn encode(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        instances: &[LayerInstance],
        draws: &[(CompositeBlend, &wgpu::TextureView)],
    ) {
        self.ensure_pipelines(ctx);
        if self.quad.is_none() {
            self.quad = Some(QuadBuffers::new(ctx.device, "castle composite"));
        }
        if self.sampler.is_none() {
            self.sampler = Some(pixel_sampler(ctx.device, "castle composite sampler"));
        }

        let (Some(alpha), Some(additive), Some(viewport_bgl), Some(texture_bgl), Some(sampler), Some(quad)) = (
            self.alpha_pipeline.as_ref(),
            self.additive_pipeline.as_ref(),
            self.viewport_bgl.as_ref(),
            self.texture_bgl.as_ref(),
            self.sampler.as_ref(),
            self.quad.as_ref(),
        ) else {
            return;
        };

        let viewport_ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("castle composite viewport ubo"),
            contents: bytemuck::bytes_of(&ViewportUniform::from_viewport(ctx.viewport)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let viewport_bg = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("castle composite viewport bind group"),
            layout: viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });
        let instance_vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("castle composite instance vbo"),
            contents: bytemuck::cast_slice(instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let texture_bgs: Vec<wgpu::BindGroup> = draws
            .iter()
            .map(|(_, view)| {
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("castle composite texture bind group"),
                    layout: texture_bgl,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                    ],
                })
            })
            .collect();

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("castle composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, &viewport_bg, &[]);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);

        // Draw order is list order; switch pipelines only when the blend changes.
        let mut bound: Option<CompositeBlend> = None;
        for (i, ((blend, _), bg)) in draws.iter().zip(&texture_bgs).enumerate() {
            if bound != Some(*blend) {
                rpass.set_pipeline(match blend {
                    CompositeBlend::Alpha => alpha,
                    CompositeBlend::Additive => additive,
                });
                bound = Some(*blend);
            }
            rpass.set_bind_group(1, bg, &[]);
            let i = i as u32;
            rpass.draw_indexed(0..6, 0, i..i + 1);
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format)
            && self.alpha_pipeline.is_some()
            && self.additive_pipeline.is_some()
        {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("castle composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/layer.wgsl").into()),
        });

        let viewport_bgl =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("castle composite viewport bgl"),
                    entries: &[viewport_bgl_entry()],
                });

        let texture_bgl =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("castle composite texture bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("castle composite pipeline layout"),
                    bind_group_layouts: &[&viewport_bgl, &texture_bgl],
                    immediate_size: 0,
                });

        let make = |label: &str, blend: CompositeBlend| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[QuadVertex::layout(), LayerInstance::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(blend.state()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: triangle_list(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        self.alpha_pipeline = Some(make("castle composite alpha pipeline", CompositeBlend::Alpha));
        self.additive_pipeline = Some(make(
            "castle composite additive pipeline",
            CompositeBlend::Additive,
        ));
        self.pipeline_format = Some(ctx.surface_format);
        self.viewport_bgl = Some(viewport_bgl);
        self.texture_bgl = Some(texture_bgl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn layer(w: u32, h: u32) -> Layer {
        Layer::detached(&EngineConfig::default(), w, h, "plan").unwrap()
    }

    #[test]
    fn plan_keeps_caller_order() {
        let a = layer(10, 10);
        let b = layer(20, 5);
        let plan = Compositor::plan(&[&b, &a]);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].index, 0);
        assert_eq!(plan[0].rect, PixelRect::new(0, 0, 20, 5));
        assert_eq!(plan[1].rect, PixelRect::new(0, 0, 10, 10));
    }

    #[test]
    fn plan_skips_disabled_and_destroyed() {
        let a = layer(4, 4);
        let mut b = layer(4, 4);
        let mut c = layer(4, 4);
        b.set_enabled(false);
        c.destroy();
        let plan = Compositor::plan(&[&a, &b, &c]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].index, 0);
    }

    #[test]
    fn plan_uses_full_uvs_and_live_alpha() {
        let a = layer(3, 7);
        let item = Compositor::plan(&[&a])[0];
        assert_eq!((item.uv_min, item.uv_max), FULL_UV);
        assert_eq!(item.source, DrawSource::Live);
        assert_eq!(item.blend, CompositeBlend::Alpha);
    }

    #[test]
    fn empty_list_plans_nothing() {
        assert!(Compositor::plan(&[]).is_empty());
    }

    #[test]
    fn instance_maps_rect() {
        let inst = LayerInstance::new(PixelRect::new(2, 3, 12, 8), [0.0, 0.0], [1.0, 1.0], Color::WHITE);
        assert_eq!(inst.origin, [2.0, 3.0]);
        assert_eq!(inst.size, [10.0, 5.0]);
        assert_eq!(inst.modulate, [1.0; 4]);
    }
}
