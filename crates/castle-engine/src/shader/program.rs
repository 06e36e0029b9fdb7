use std::path::Path;

use crate::error::{RenderError, RenderResult};
use crate::render::quad::pixel_sampler;
use crate::render::{RenderCtx, LAYER_FORMAT};

use super::source::{compose_source, validate_wgsl};
use super::{ShaderKind, ShaderUniforms};

/// Offscreen texture holding a layer's post-processed image.
pub struct ProcessedTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    uniform: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl ProcessedTarget {
    pub(crate) fn new(device: &wgpu::Device, name: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{name} processed")),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{name} postfx ubo")),
            size: std::mem::size_of::<super::kind::PostFxUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            texture,
            view,
            uniform,
            width,
            height,
        }
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn destroy(&self) {
        self.texture.destroy();
        self.uniform.destroy();
    }
}

/// Compiled post-process program.
///
/// One program may be attached to several layers (share it through `Rc`);
/// per-layer state lives in each layer's [`ProcessedTarget`].
pub struct Shader {
    name: String,
    kind: ShaderKind,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl Shader {
    /// Compiles one of the built-in effects.
    pub fn builtin(ctx: &RenderCtx<'_>, kind: ShaderKind) -> RenderResult<Self> {
        let fragment = kind.builtin_fragment().ok_or_else(|| RenderError::ShaderCompile {
            name: kind.label().to_string(),
            message: "custom shaders need a fragment source".to_string(),
        })?;
        Self::from_fragment(ctx, kind.label(), kind, fragment)
    }

    /// Compiles a WGSL fragment against the shared post-process prelude.
    pub fn from_fragment(
        ctx: &RenderCtx<'_>,
        name: &str,
        kind: ShaderKind,
        fragment: &str,
    ) -> RenderResult<Self> {
        let source = compose_source(fragment);
        validate_wgsl(name, &source)?;

        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("castle postfx bgl"),
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
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("castle postfx pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: LAYER_FORMAT,
                    // The pass replaces the cleared target outright.
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: crate::render::quad::triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("compiled {} shader `{name}`", kind.label());

        Ok(Self {
            name: name.to_string(),
            kind,
            pipeline,
            bind_group_layout,
            sampler: pixel_sampler(ctx.device, "castle postfx sampler"),
        })
    }

    /// Reads a WGSL fragment from disk and compiles it.
    pub fn from_file(ctx: &RenderCtx<'_>, path: impl AsRef<Path>, kind: ShaderKind) -> RenderResult<Self> {
        let path = path.as_ref();
        let fragment = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(kind.label());
        Self::from_fragment(ctx, name, kind, &fragment)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    /// Records a full recompute of `dst` from `src` into `encoder`.
    ///
    /// The destination is cleared to transparent first.
    pub(crate) fn apply(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        src: &wgpu::TextureView,
        dst: &ProcessedTarget,
        uniforms: &ShaderUniforms,
    ) {
        let (w, h) = dst.size();
        ctx.queue
            .write_buffer(&dst.uniform, 0, bytemuck::bytes_of(&uniforms.to_gpu(w, h)));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("castle postfx bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(src),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: dst.uniform.as_entire_binding(),
                },
            ],
        });

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("castle postfx pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: dst.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}
