//! Shared GPU types for the instanced quad renderers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Viewport;

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    pub(crate) fn from_viewport(vp: Viewport) -> Self {
        Self {
            viewport: [vp.width.max(1.0), vp.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }
}

/// Minimum binding size of the viewport uniform buffer.
pub(crate) fn viewport_ubo_min_binding_size() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<ViewportUniform>() as u64)
}

pub(crate) fn viewport_bgl_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: viewport_ubo_min_binding_size(),
        },
        count: None,
    }
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(crate) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(crate) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Unit quad vertex and index buffers.
pub(crate) struct QuadBuffers {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
}

impl QuadBuffers {
    pub(crate) fn new(device: &wgpu::Device, label: &str) -> Self {
        Self {
            vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} quad vbo")),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} quad ibo")),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }),
        }
    }
}

// ── instance buffer ───────────────────────────────────────────────────────

/// Grow-only instance vertex buffer.
#[derive(Default)]
pub(crate) struct InstanceBuffer {
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
}

impl InstanceBuffer {
    /// Uploads `data`, reallocating when it does not fit.
    pub(crate) fn upload<T: Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[T],
    ) -> Option<&wgpu::Buffer> {
        if data.len() > self.capacity || self.buffer.is_none() {
            let cap = data.len().next_power_of_two().max(64);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (cap * std::mem::size_of::<T>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = cap;
        }
        let buffer = self.buffer.as_ref()?;
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
        Some(buffer)
    }
}

pub(crate) fn triangle_list() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// Nearest-neighbour sampler; layer texels map 1:1 to pixels.
pub(crate) fn pixel_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
