use bytemuck::{Pod, Zeroable};

use crate::coords::PixelRect;
use crate::paint::Color;

use super::blend::layer_blend;
use super::quad::{
    triangle_list, viewport_bgl_entry, InstanceBuffer, QuadBuffers, QuadVertex, ViewportUniform,
};
use super::RenderCtx;

/// One solid rect recorded into a GPU layer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub(crate) struct FillInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl FillInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    pub(crate) fn from_rect(rect: PixelRect, color: Color) -> Self {
        Self {
            origin: [rect.x0 as f32, rect.y0 as f32],
            size: [rect.width() as f32, rect.height() as f32],
            color: color.to_f32(),
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FillInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Draws solid rects into a GPU layer's render target.
///
/// Each call records and submits its own encoder, so the uniform and
/// instance buffers are safely reused between calls.
#[derive(Default)]
pub struct FillRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,

    quad: Option<QuadBuffers>,
    instances: InstanceBuffer,
}

impl FillRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `fills` into `view`, optionally clearing it first.
    ///
    /// `ctx` must describe the target (see [`RenderCtx::for_layer`]).
    pub(crate) fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        view: &wgpu::TextureView,
        clear: Option<Color>,
        fills: &[FillInstance],
    ) {
        if fills.is_empty() && clear.is_none() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        if self.quad.is_none() {
            self.quad = Some(QuadBuffers::new(ctx.device, "castle fill"));
        }

        if let Some(ubo) = self.viewport_ubo.as_ref() {
            let u = ViewportUniform::from_viewport(ctx.viewport);
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }

        let instance_vbo = if fills.is_empty() {
            None
        } else {
            self.instances
                .upload(ctx.device, ctx.queue, "castle fill instance vbo", fills)
        };

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("castle fill encoder"),
            });

        {
            let load = match clear {
                Some(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
                None => wgpu::LoadOp::Load,
            };
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("castle fill pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let (Some(instance_vbo), Some(pipeline), Some(bind_group), Some(quad)) = (
                instance_vbo,
                self.pipeline.as_ref(),
                self.bind_group.as_ref(),
                self.quad.as_ref(),
            ) {
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, bind_group, &[]);
                rpass.set_vertex_buffer(0, quad.vbo.slice(..));
                rpass.set_vertex_buffer(1, instance_vbo.slice(..));
                rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..6, 0, 0..fills.len() as u32);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("castle fill shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/fill.wgsl").into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("castle fill bgl"),
                    entries: &[viewport_bgl_entry()],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("castle fill pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("castle fill pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), FillInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(layer_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.viewport_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("castle fill viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("castle fill bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        self.viewport_ubo = Some(viewport_ubo);
        self.bind_group = Some(bind_group);
    }
}
