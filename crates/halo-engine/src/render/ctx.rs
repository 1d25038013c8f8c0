use crate::coords::Viewport;

/// Context handed to scene nodes while a frame is encoded.
///
/// This is intentionally small and stable.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target_format: wgpu::TextureFormat,
    pub viewport: Viewport, // physical px of the drawing buffer
    /// Uniform buffer holding the frame's `CameraUniform`.
    pub camera: &'a wgpu::Buffer,
    /// Sample count pipelines must be built with to draw into `RenderTarget::color_view`.
    pub sample_count: u32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target_format: wgpu::TextureFormat,
        viewport: Viewport,
        camera: &'a wgpu::Buffer,
        sample_count: u32,
    ) -> Self {
        Self {
            device,
            queue,
            target_format,
            viewport,
            camera,
            sample_count,
        }
    }
}

/// Target for drawing (encoder + color view).
///
/// When the context is antialiased `color_view` is the multisampled target and
/// `resolve_target` the drawing buffer. Nodes should load, not clear.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub resolve_target: Option<&'a wgpu::TextureView>,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        resolve_target: Option<&'a wgpu::TextureView>,
    ) -> Self {
        Self { encoder, color_view, resolve_target }
    }
}
