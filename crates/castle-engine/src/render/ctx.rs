use crate::coords::Viewport;

/// Renderer-facing context (device/queue + target format + viewport).
///
/// The frame loop builds one for the window surface; layer recordings and
/// shader passes derive their own with [`RenderCtx::for_layer`].
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport, // logical px
    pub scale_factor: f32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
        scale_factor: f32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
            scale_factor,
        }
    }

    /// Same device, retargeted at a `width × height` layer texture.
    #[inline]
    pub fn for_layer(&self, width: u32, height: u32) -> RenderCtx<'a> {
        RenderCtx::new(
            self.device,
            self.queue,
            super::LAYER_FORMAT,
            Viewport::for_target(width, height),
            1.0,
        )
    }

    /// Largest texture edge this device accepts.
    #[inline]
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
