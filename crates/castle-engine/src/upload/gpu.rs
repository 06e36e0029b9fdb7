use crate::chunk::Region;
use crate::config::padded_row_bytes;

use super::TextureSink;

/// Pair of staging buffers owned by a CPU layer.
///
/// Chunks are copied into alternating buffers and then copied buffer→texture
/// on the GPU, so the CPU can fill one buffer while the other is in flight.
pub struct TransferRing {
    buffers: [wgpu::Buffer; 2],
    capacity: u64,
}

impl TransferRing {
    pub fn new(device: &wgpu::Device, label: &str, capacity: u64) -> Self {
        // wgpu rejects zero-sized copies; keep a minimal buffer so the ring
        // stays valid and every chunk takes the direct path.
        let size = capacity
            .max(wgpu::COPY_BUFFER_ALIGNMENT)
            .next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let make = |i: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label} transfer {i}")),
                size,
                usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        Self {
            buffers: [make(0), make(1)],
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn destroy(&self) {
        for b in &self.buffers {
            b.destroy();
        }
    }
}

/// Uploads chunks into a layer texture through its [`TransferRing`].
///
/// At most one copy per slot is pending at a time: reusing a slot submits the
/// batch first, because `Queue::write_buffer` lands before any copy recorded
/// in a not-yet-submitted encoder.
pub struct GpuTextureSink<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    texture: &'a wgpu::Texture,
    ring: &'a TransferRing,

    encoder: Option<wgpu::CommandEncoder>,
    pending: [bool; 2],
    scratch: Vec<u8>,
}

impl<'a> GpuTextureSink<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        texture: &'a wgpu::Texture,
        ring: &'a TransferRing,
    ) -> Self {
        Self {
            device,
            queue,
            texture,
            ring,
            encoder: None,
            pending: [false; 2],
            scratch: Vec::new(),
        }
    }

    fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
        self.pending = [false; 2];
    }

    fn texel_target(&self, region: Region) -> wgpu::TexelCopyTextureInfo<'a> {
        wgpu::TexelCopyTextureInfo {
            texture: self.texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: region.x,
                y: region.y,
                z: 0,
            },
            aspect: wgpu::TextureAspect::All,
        }
    }
}

#[inline]
fn extent(region: Region) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: region.width,
        height: region.height,
        depth_or_array_layers: 1,
    }
}

impl TextureSink for GpuTextureSink<'_> {
    fn transfer_capacity(&self) -> u64 {
        self.ring.capacity()
    }

    fn write_staged(&mut self, slot: usize, region: Region, rgba: &[u8]) {
        let slot = slot & 1;
        if self.pending[slot] {
            self.submit();
        }

        let row = region.width as usize * 4;
        let padded = padded_row_bytes(region.width) as usize;
        self.scratch.clear();
        self.scratch.resize(padded * region.height as usize, 0);
        for (dst, src) in self.scratch.chunks_exact_mut(padded).zip(rgba.chunks_exact(row)) {
            dst[..row].copy_from_slice(src);
        }

        let ring = self.ring;
        let device = self.device;
        let buffer = &ring.buffers[slot];
        self.queue.write_buffer(buffer, 0, &self.scratch);

        let target = self.texel_target(region);
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("castle chunk upload encoder"),
            })
        });
        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded as u32),
                    rows_per_image: Some(region.height),
                },
            },
            target,
            extent(region),
        );
        self.pending[slot] = true;
    }

    fn write_direct(&mut self, region: Region, rgba: &[u8]) {
        self.queue.write_texture(
            self.texel_target(region),
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(region.width * 4),
                rows_per_image: Some(region.height),
            },
            extent(region),
        );
    }

    fn finish(&mut self) {
        self.submit();
    }
}
